// SPDX-License-Identifier: MIT
//! # Shell Link Builder
//!
//! Builds Windows Shell Link (`.lnk`) files byte for byte.
//!
//! ## Format Overview
//!
//! A Shell Link is a self-describing little-endian container. A fixed
//! header carries a flag register that announces which optional sections
//! follow; several sections locate their variable-length parts through
//! offset fields relative to the section start.
//!
//! ```text
//! Shell Link
//! ==========
//!
//! Header (76 bytes)
//!   size, class id, link flags, file attributes, three FILETIMEs,
//!   file size, icon index, show command, hot key, reserved
//!
//! Optional sections, present when their link flag is set:
//!   LinkTargetIDList   u16 size, item records, u16 zero terminator
//!   LinkInfo           volume / local path / network share, by offset
//!   StringData         Name, RelativePath, WorkingDir, Arguments,
//!                      IconLocation (u16 count + UTF-16LE each)
//!
//! ExtraData: typed blocks followed by a u32 zero terminal block
//! ```
//!
//! ## Offset Resolution
//!
//! Sections with offset fields implement [`layout::Structure`]. A structure
//! describes its emission once; [`layout::build`] runs it twice, first to
//! record where every named slot lands and then to write the resolved
//! offsets and sizes. Offsets can never drift from the bytes they point at.
//!
//! ## Usage
//!
//! ```rust
//! use shell_link_builder::{
//!     DriveType, LinkInfo, LinkTargetIdList, LocalTarget, ShellItem, ShellLink, VolumeId,
//!     VolumeLabel,
//! };
//!
//! let mut id_list = LinkTargetIdList::new();
//! id_list.push(&ShellItem::my_computer()).unwrap();
//! id_list.push(&ShellItem::volume("C:\\")).unwrap();
//!
//! let volume = VolumeId::new(DriveType::Fixed, 0x307A_8A81, VolumeLabel::default()).unwrap();
//! let info = LinkInfo::new().with_local(LocalTarget::new(volume, "C:\\").unwrap());
//!
//! let mut link = ShellLink::new();
//! link.set_id_list(id_list).unwrap();
//! link.set_link_info(info).unwrap();
//! link.set_working_dir("C:\\").unwrap();
//!
//! let bytes = link.serialize().unwrap();
//! assert_eq!(&bytes[..4], &[0x4C, 0, 0, 0]);
//! ```
//!
//! Setting a link flag by hand without attaching its section fails with
//! [`SerializeError::InconsistentFlags`]:
//!
//! ```rust
//! use shell_link_builder::{SerializeError, ShellLink};
//!
//! let mut link = ShellLink::new();
//! link.set("HasArguments", 1).unwrap();
//! assert!(matches!(
//!     link.serialize(),
//!     Err(SerializeError::InconsistentFlags { .. })
//! ));
//! ```

pub mod config;
pub mod error;
pub mod extra_data;
pub mod flags;
pub mod header;
pub mod id_list;
pub mod layout;
pub mod link;
pub mod link_info;
pub mod strings;

// Re-export main types
pub use config::Config;
pub use error::{ConstructionError, SerializeError};
pub use extra_data::{ConsoleBlock, EnvironmentVariableBlock, ExtraData, ExtraDataBlock};
pub use flags::{FlagRegister, FlagSchema, StorageWidth};
pub use header::{FileTime, HotKey, ShellLinkHeader, ShowCommand, HEADER_SIZE};
pub use id_list::{
    FileEntry, FileEntryExtension, FileEntryKind, ItemId, ItemIdList, LinkTargetIdList, ShellItem,
};
pub use layout::{build, layout_of, Layout, Structure};
pub use link::{serialize, ShellLink};
pub use link_info::{DriveType, LinkInfo, LocalTarget, NetworkLink, VolumeId, VolumeLabel};
pub use strings::{encode_string_data, StringData, StringKind, StringSegment};
