// SPDX-License-Identifier: MIT
//! Shell Link assembler
//!
//! ```text
//! SHELL_LINK = SHELL_LINK_HEADER [LINKTARGET_IDLIST] [LINKINFO]
//!              [STRING_DATA] *EXTRA_DATA TERMINAL_BLOCK
//! ```
//!
//! The header's link flags decide which optional sections are written.
//! A flag that is set without its section attached is rejected with
//! [`SerializeError::InconsistentFlags`] rather than producing a container
//! whose header promises data that is not there.

use std::io::Write;

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{ConstructionError, SerializeError};
use crate::extra_data::ExtraData;
use crate::flags::link_flags;
use crate::header::{ShellLinkHeader, HEADER_SIZE};
use crate::id_list::LinkTargetIdList;
use crate::layout;
use crate::link_info::LinkInfo;
use crate::strings::{StringData, StringKind};

/// A complete Shell Link container
///
/// Serialization takes `&self` and shares no state between calls, so
/// independent links can be built on different threads. Mutating one link
/// from several threads at once is up to the caller to synchronize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellLink {
    pub header: ShellLinkHeader,
    id_list: Option<LinkTargetIdList>,
    link_info: Option<LinkInfo>,
    strings: StringData,
    pub extra_data: ExtraData,
    trace_sections: bool,
}

impl ShellLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a link with configured defaults
    pub fn with_config(config: &Config) -> Self {
        let mut link = Self::new();
        link.header.show_command = config.show_command;
        link.trace_sections = config.trace_sections;
        link
    }

    /// Get a header link flag
    pub fn get(&self, flag: &str) -> Result<u8, ConstructionError> {
        self.header.link_flags.get(flag)
    }

    /// Set a header link flag
    pub fn set(&mut self, flag: &str, state: u8) -> Result<(), ConstructionError> {
        self.header.link_flags.set(flag, state)
    }

    /// Attach the item identifier list and set HasLinkTargetIDList
    pub fn set_id_list(&mut self, id_list: LinkTargetIdList) -> Result<(), ConstructionError> {
        self.id_list = Some(id_list);
        self.set(link_flags::HAS_LINK_TARGET_ID_LIST, 1)
    }

    /// Detach the item identifier list; the flag is left untouched
    pub fn take_id_list(&mut self) -> Option<LinkTargetIdList> {
        self.id_list.take()
    }

    pub fn id_list(&self) -> Option<&LinkTargetIdList> {
        self.id_list.as_ref()
    }

    /// Attach location info and set HasLinkInfo
    pub fn set_link_info(&mut self, link_info: LinkInfo) -> Result<(), ConstructionError> {
        self.link_info = Some(link_info);
        self.set(link_flags::HAS_LINK_INFO, 1)
    }

    /// Detach location info; the flag is left untouched
    pub fn take_link_info(&mut self) -> Option<LinkInfo> {
        self.link_info.take()
    }

    pub fn link_info(&self) -> Option<&LinkInfo> {
        self.link_info.as_ref()
    }

    /// Attach a string segment and set its flag together with IsUnicode
    pub fn set_string(&mut self, kind: StringKind, text: impl Into<String>) -> Result<(), ConstructionError> {
        self.strings.set(kind, text)?;
        self.set(kind.flag(), 1)?;
        self.set(link_flags::IS_UNICODE, 1)
    }

    pub fn set_name(&mut self, text: impl Into<String>) -> Result<(), ConstructionError> {
        self.set_string(StringKind::Name, text)
    }

    pub fn set_relative_path(&mut self, text: impl Into<String>) -> Result<(), ConstructionError> {
        self.set_string(StringKind::RelativePath, text)
    }

    pub fn set_working_dir(&mut self, text: impl Into<String>) -> Result<(), ConstructionError> {
        self.set_string(StringKind::WorkingDir, text)
    }

    pub fn set_arguments(&mut self, text: impl Into<String>) -> Result<(), ConstructionError> {
        self.set_string(StringKind::Arguments, text)
    }

    pub fn set_icon_location(&mut self, text: impl Into<String>) -> Result<(), ConstructionError> {
        self.set_string(StringKind::IconLocation, text)
    }

    pub fn strings(&self) -> &StringData {
        &self.strings
    }

    /// String segments, without touching the header flags
    pub fn strings_mut(&mut self) -> &mut StringData {
        &mut self.strings
    }

    /// Encode an optional section if its flag is set
    fn optional_section<T>(
        &self,
        flag: &'static str,
        section: &'static str,
        data: Option<&T>,
        encode: impl FnOnce(&T) -> Result<Vec<u8>, ConstructionError>,
    ) -> Result<Option<Vec<u8>>, SerializeError> {
        match (self.header.link_flags.is_set(flag)?, data) {
            (true, Some(data)) => Ok(Some(encode(data)?)),
            (true, None) => Err(SerializeError::InconsistentFlags { flag, section }),
            (false, Some(_)) => {
                warn!(flag, section, "section attached but flag is clear, skipping");
                Ok(None)
            }
            (false, None) => Ok(None),
        }
    }

    fn append(&self, buffer: &mut Vec<u8>, section: &'static str, bytes: &[u8]) {
        debug!(section, offset = buffer.len(), len = bytes.len(), "appending section");
        if self.trace_sections {
            trace!(section, bytes = %hex::encode(bytes), "section bytes");
        }
        buffer.extend_from_slice(bytes);
    }

    /// Serialize the complete container
    ///
    /// Either the whole container is produced or an error is returned;
    /// there is no partial output.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let mut buffer = Vec::with_capacity(HEADER_SIZE);
        let header = self.header.to_bytes();
        self.append(&mut buffer, "header", &header);

        if let Some(bytes) = self.optional_section(
            link_flags::HAS_LINK_TARGET_ID_LIST,
            "item identifier list",
            self.id_list.as_ref(),
            LinkTargetIdList::to_bytes,
        )? {
            self.append(&mut buffer, "item identifier list", &bytes);
        }

        if let Some(bytes) = self.optional_section(
            link_flags::HAS_LINK_INFO,
            "location info",
            self.link_info.as_ref(),
            |info| layout::build(info),
        )? {
            self.append(&mut buffer, "location info", &bytes);
        }

        for &kind in StringKind::all() {
            if let Some(bytes) = self.optional_section(
                kind.flag(),
                kind.name(),
                self.strings.get(kind),
                |segment| Ok(segment.as_bytes().to_vec()),
            )? {
                self.append(&mut buffer, kind.name(), &bytes);
            }
        }

        let extra = self.extra_data.to_bytes()?;
        self.append(&mut buffer, "extra data", &extra);

        debug!(len = buffer.len(), "serialized shell link");
        Ok(buffer)
    }

    /// Serialize and write the container to `writer`
    ///
    /// Nothing is written unless serialization succeeds.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let bytes = self.serialize()?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

/// Serialize a container
#[inline]
pub fn serialize(link: &ShellLink) -> Result<Vec<u8>, SerializeError> {
    link.serialize()
}
