// SPDX-License-Identifier: MIT
//! LinkInfo section: where the link target lives
//!
//! ```text
//! LinkInfo
//!   LinkInfoSize                      u32   total size
//!   LinkInfoHeaderSize                u32   0x1C, or 0x24 with Unicode offsets
//!   LinkInfoFlags                     u32
//!   VolumeIDOffset                    u32   0 without a local target
//!   LocalBasePathOffset               u32   0 without a local target
//!   CommonNetworkRelativeLinkOffset   u32   0 without a network target
//!   CommonPathSuffixOffset            u32
//!   LocalBasePathOffsetUnicode        u32   Unicode only
//!   CommonPathSuffixOffsetUnicode     u32   Unicode only
//!   VolumeID | LocalBasePath | CommonNetworkRelativeLink | CommonPathSuffix
//!   [LocalBasePathUnicode] [CommonPathSuffixUnicode]
//! ```
//!
//! The section flags are derived from which targets are attached, so a
//! flag can never claim a sub-structure that is missing.

use crate::config::Config;
use crate::error::ConstructionError;
use crate::flags::{FlagRegister, LINK_INFO_FLAGS, NETWORK_LINK_FLAGS};
use crate::layout::{Emitter, FieldWidth, Structure};
use crate::strings::{ascii_z, unicode_z};

const LINK_INFO_HEADER_SIZE: u32 = 0x1C;
const LINK_INFO_HEADER_SIZE_UNICODE: u32 = 0x24;

fn check_ascii(text: &str) -> Result<(), ConstructionError> {
    if text.is_ascii() {
        Ok(())
    } else {
        Err(ConstructionError::NotAscii(text.to_string()))
    }
}

/// Type of the drive the target was stored on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum DriveType {
    #[default]
    Unknown = 0,
    NoRootDir = 1,
    Removable = 2,
    Fixed = 3,
    Remote = 4,
    Cdrom = 5,
    RamDisk = 6,
}

/// Volume label, stored narrow or wide
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeLabel {
    Ansi(String),
    Unicode(String),
}

impl Default for VolumeLabel {
    fn default() -> Self {
        VolumeLabel::Ansi(String::new())
    }
}

/// Volume the target was on when the link was created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeId {
    pub drive_type: DriveType,
    pub drive_serial_number: u32,
    label: VolumeLabel,
}

impl VolumeId {
    pub fn new(
        drive_type: DriveType,
        drive_serial_number: u32,
        label: VolumeLabel,
    ) -> Result<Self, ConstructionError> {
        if let VolumeLabel::Ansi(text) = &label {
            check_ascii(text)?;
        }
        Ok(Self {
            drive_type,
            drive_serial_number,
            label,
        })
    }

    pub fn label(&self) -> &VolumeLabel {
        &self.label
    }
}

impl Structure for VolumeId {
    fn name(&self) -> &'static str {
        "VolumeID"
    }

    fn emit(&self, out: &mut Emitter<'_>) -> Result<(), ConstructionError> {
        out.size_field(FieldWidth::U32)?;
        out.u32(self.drive_type as u32);
        out.u32(self.drive_serial_number);
        // A label offset of 0x14 tells readers to use the Unicode offset
        out.offset_of("label", FieldWidth::U32)?;
        match &self.label {
            VolumeLabel::Ansi(text) => {
                out.segment("label", &ascii_z(text)?);
            }
            VolumeLabel::Unicode(text) => {
                out.offset_of("label", FieldWidth::U32)?;
                out.segment("label", &unicode_z(text));
            }
        }
        Ok(())
    }
}

/// Network location of the target (CommonNetworkRelativeLink)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkLink {
    net_name: String,
    device_name: Option<String>,
    /// Network provider type; sets ValidNetType when present
    pub provider_type: Option<u32>,
    /// Also write UTF-16 copies of the names
    pub unicode: bool,
}

impl NetworkLink {
    /// Create a descriptor for a share such as `\\server\share`
    pub fn new(net_name: impl Into<String>) -> Result<Self, ConstructionError> {
        let net_name = net_name.into();
        check_ascii(&net_name)?;
        Ok(Self {
            net_name,
            device_name: None,
            provider_type: None,
            unicode: false,
        })
    }

    /// Attach a mapped drive name such as `Z:`
    pub fn with_device_name(mut self, device_name: impl Into<String>) -> Result<Self, ConstructionError> {
        let device_name = device_name.into();
        check_ascii(&device_name)?;
        self.device_name = Some(device_name);
        Ok(self)
    }

    pub fn net_name(&self) -> &str {
        &self.net_name
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    /// ValidDevice / ValidNetType register
    pub fn flags(&self) -> Result<FlagRegister, ConstructionError> {
        let mut flags = NETWORK_LINK_FLAGS.register();
        flags.set_bool("ValidDevice", self.device_name.is_some())?;
        flags.set_bool("ValidNetType", self.provider_type.is_some())?;
        Ok(flags)
    }
}

impl Structure for NetworkLink {
    fn name(&self) -> &'static str {
        "CommonNetworkRelativeLink"
    }

    fn emit(&self, out: &mut Emitter<'_>) -> Result<(), ConstructionError> {
        out.size_field(FieldWidth::U32)?;
        out.bytes(&self.flags()?.serialize());
        out.offset_of("net_name", FieldWidth::U32)?;
        match self.device_name {
            Some(_) => out.offset_of("device_name", FieldWidth::U32)?,
            None => out.u32(0),
        }
        out.u32(self.provider_type.unwrap_or(0));
        if self.unicode {
            out.offset_of("net_name_unicode", FieldWidth::U32)?;
            match self.device_name {
                Some(_) => out.offset_of("device_name_unicode", FieldWidth::U32)?,
                None => out.u32(0),
            }
        }

        out.segment("net_name", &ascii_z(&self.net_name)?);
        if let Some(device_name) = &self.device_name {
            out.segment("device_name", &ascii_z(device_name)?);
        }
        if self.unicode {
            out.segment("net_name_unicode", &unicode_z(&self.net_name));
            if let Some(device_name) = &self.device_name {
                out.segment("device_name_unicode", &unicode_z(device_name));
            }
        }
        Ok(())
    }
}

/// Local target: the volume plus the full path on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTarget {
    pub volume_id: VolumeId,
    local_base_path: String,
}

impl LocalTarget {
    pub fn new(volume_id: VolumeId, local_base_path: impl Into<String>) -> Result<Self, ConstructionError> {
        let local_base_path = local_base_path.into();
        check_ascii(&local_base_path)?;
        Ok(Self {
            volume_id,
            local_base_path,
        })
    }

    pub fn local_base_path(&self) -> &str {
        &self.local_base_path
    }
}

/// The LinkInfo section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkInfo {
    local: Option<LocalTarget>,
    network: Option<NetworkLink>,
    common_path_suffix: String,
    /// Write the optional Unicode path offsets and strings
    pub unicode: bool,
}

impl LinkInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty section using the configured Unicode mode
    pub fn from_config(config: &Config) -> Self {
        Self {
            unicode: config.unicode_link_info,
            ..Self::default()
        }
    }

    pub fn with_local(mut self, local: LocalTarget) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_network(mut self, network: NetworkLink) -> Self {
        self.network = Some(network);
        self
    }

    pub fn set_common_path_suffix(&mut self, suffix: impl Into<String>) -> Result<(), ConstructionError> {
        let suffix = suffix.into();
        check_ascii(&suffix)?;
        self.common_path_suffix = suffix;
        Ok(())
    }

    pub fn local(&self) -> Option<&LocalTarget> {
        self.local.as_ref()
    }

    pub fn network(&self) -> Option<&NetworkLink> {
        self.network.as_ref()
    }

    pub fn common_path_suffix(&self) -> &str {
        &self.common_path_suffix
    }

    /// Section flags derived from the attached targets
    pub fn flags(&self) -> Result<FlagRegister, ConstructionError> {
        let mut flags = LINK_INFO_FLAGS.register();
        flags.set_bool("VolumeIDAndLocalBasePath", self.local.is_some())?;
        flags.set_bool("CommonNetworkRelativeLinkAndPathSuffix", self.network.is_some())?;
        Ok(flags)
    }

    pub fn header_size(&self) -> u32 {
        if self.unicode {
            LINK_INFO_HEADER_SIZE_UNICODE
        } else {
            LINK_INFO_HEADER_SIZE
        }
    }
}

impl Structure for LinkInfo {
    fn name(&self) -> &'static str {
        "LinkInfo"
    }

    fn emit(&self, out: &mut Emitter<'_>) -> Result<(), ConstructionError> {
        out.size_field(FieldWidth::U32)?;
        out.u32(self.header_size());
        out.bytes(&self.flags()?.serialize());

        if self.local.is_some() {
            out.offset_of("volume_id", FieldWidth::U32)?;
            out.offset_of("local_base_path", FieldWidth::U32)?;
        } else {
            out.u32(0);
            out.u32(0);
        }
        match self.network {
            Some(_) => out.offset_of("network_link", FieldWidth::U32)?,
            None => out.u32(0),
        }
        out.offset_of("common_path_suffix", FieldWidth::U32)?;
        if self.unicode {
            match self.local {
                Some(_) => out.offset_of("local_base_path_unicode", FieldWidth::U32)?,
                None => out.u32(0),
            }
            out.offset_of("common_path_suffix_unicode", FieldWidth::U32)?;
        }
        debug_assert_eq!(out.position(), self.header_size() as usize);

        if let Some(local) = &self.local {
            out.nested("volume_id", &local.volume_id)?;
            out.segment("local_base_path", &ascii_z(&local.local_base_path)?);
        }
        if let Some(network) = &self.network {
            out.nested("network_link", network)?;
        }
        out.segment("common_path_suffix", &ascii_z(&self.common_path_suffix)?);
        if self.unicode {
            if let Some(local) = &self.local {
                out.segment("local_base_path_unicode", &unicode_z(&local.local_base_path));
            }
            out.segment(
                "common_path_suffix_unicode",
                &unicode_z(&self.common_path_suffix),
            );
        }
        Ok(())
    }
}
