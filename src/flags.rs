// SPDX-License-Identifier: MIT
//! Named bit-flag registers
//!
//! A [`FlagRegister`] packs an ordered list of named boolean fields into one
//! little-endian unsigned integer. The first declared name is bit 0.
//! Structures declare their registers once as a static [`FlagSchema`].

use std::borrow::Cow;

use crate::error::ConstructionError;

/// Storage width of a flag register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageWidth {
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

impl StorageWidth {
    /// Width in bits
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            StorageWidth::Bits8 => 8,
            StorageWidth::Bits16 => 16,
            StorageWidth::Bits32 => 32,
            StorageWidth::Bits64 => 64,
        }
    }

    /// Width in bytes
    #[inline]
    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }
}

impl TryFrom<u32> for StorageWidth {
    type Error = ConstructionError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(StorageWidth::Bits8),
            16 => Ok(StorageWidth::Bits16),
            32 => Ok(StorageWidth::Bits32),
            64 => Ok(StorageWidth::Bits64),
            other => Err(ConstructionError::InvalidWidth(other)),
        }
    }
}

/// Static declaration of a register layout
#[derive(Debug, Clone, Copy)]
pub struct FlagSchema {
    /// Register name, used in log output
    pub name: &'static str,
    /// Field names in bit order (LSB first)
    pub fields: &'static [&'static str],
    pub width: StorageWidth,
}

impl FlagSchema {
    /// Create an all-clear register for this schema
    pub fn register(&self) -> FlagRegister {
        debug_assert!(self.fields.len() <= self.width.bits() as usize);
        FlagRegister {
            names: self.fields.iter().map(|n| Cow::Borrowed(*n)).collect(),
            width: self.width,
            states: 0,
        }
    }
}

/// Link flag names used by the assembler
pub mod link_flags {
    pub const HAS_LINK_TARGET_ID_LIST: &str = "HasLinkTargetIDList";
    pub const HAS_LINK_INFO: &str = "HasLinkInfo";
    pub const HAS_NAME: &str = "HasName";
    pub const HAS_RELATIVE_PATH: &str = "HasRelativePath";
    pub const HAS_WORKING_DIR: &str = "HasWorkingDir";
    pub const HAS_ARGUMENTS: &str = "HasArguments";
    pub const HAS_ICON_LOCATION: &str = "HasIconLocation";
    pub const IS_UNICODE: &str = "IsUnicode";
}

/// Header link flags (27 meaningful bits in a 32-bit register)
pub const LINK_FLAGS: FlagSchema = FlagSchema {
    name: "LinkFlags",
    fields: &[
        "HasLinkTargetIDList",
        "HasLinkInfo",
        "HasName",
        "HasRelativePath",
        "HasWorkingDir",
        "HasArguments",
        "HasIconLocation",
        "IsUnicode",
        "ForceNoLinkInfo",
        "HasExpString",
        "RunInSeparateProcess",
        "Unused1",
        "HasDarwinID",
        "RunAsUser",
        "HasExpIcon",
        "NoPidlAlias",
        "Unused2",
        "RunWithShimLayer",
        "ForceNoLinkTrack",
        "EnableTargetMetadata",
        "DisableLinkPathTracking",
        "DisableKnownFolderTracking",
        "DisableKnownFolderAlias",
        "AllowLinkToLink",
        "UnaliasOnSave",
        "PreferEnvironmentPath",
        "KeepLocalIDListForUNCTarget",
    ],
    width: StorageWidth::Bits32,
};

const FILE_ATTRIBUTE_NAMES: &[&str] = &[
    "FILE_ATTRIBUTE_READONLY",
    "FILE_ATTRIBUTE_HIDDEN",
    "FILE_ATTRIBUTE_SYSTEM",
    "FILE_ATTRIBUTE_VOLUME_LABEL",
    "FILE_ATTRIBUTE_DIRECTORY",
    "FILE_ATTRIBUTE_ARCHIVE",
    "FILE_ATTRIBUTE_NORMAL",
    "FILE_ATTRIBUTE_TEMPORARY",
    "FILE_ATTRIBUTE_SPARSE_FILE",
    "FILE_ATTRIBUTE_REPARSE_POINT",
    "FILE_ATTRIBUTE_COMPRESSED",
    "FILE_ATTRIBUTE_OFFLINE",
    "FILE_ATTRIBUTE_NOT_CONTENT_INDEXED",
    "FILE_ATTRIBUTE_ENCRYPTED",
    "FILE_ATTRIBUTE_INTEGRITY_STREAM",
    "FILE_ATTRIBUTE_VIRTUAL",
];

/// File attributes as stored in the fixed header (widened to 32 bits)
pub const FILE_ATTRIBUTE_FLAGS: FlagSchema = FlagSchema {
    name: "FileAttributes",
    fields: FILE_ATTRIBUTE_NAMES,
    width: StorageWidth::Bits32,
};

/// File attributes as stored in file-entry item records
pub const ITEM_ATTRIBUTE_FLAGS: FlagSchema = FlagSchema {
    name: "ItemFileAttributes",
    fields: FILE_ATTRIBUTE_NAMES,
    width: StorageWidth::Bits16,
};

/// Location-info section flags
pub const LINK_INFO_FLAGS: FlagSchema = FlagSchema {
    name: "LinkInfoFlags",
    fields: &[
        "VolumeIDAndLocalBasePath",
        "CommonNetworkRelativeLinkAndPathSuffix",
    ],
    width: StorageWidth::Bits32,
};

/// Network descriptor flags
pub const NETWORK_LINK_FLAGS: FlagSchema = FlagSchema {
    name: "CommonNetworkRelativeLinkFlags",
    fields: &["ValidDevice", "ValidNetType"],
    width: StorageWidth::Bits32,
};

/// A fixed-width register of named boolean fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRegister {
    names: Vec<Cow<'static, str>>,
    width: StorageWidth,
    states: u64,
}

impl FlagRegister {
    /// Create a register from an ordered list of field names
    ///
    /// Fails with `InvalidWidth` for widths other than 8/16/32/64,
    /// `TooManyFields` if the names do not fit, and `DuplicateField`
    /// if a name repeats.
    pub fn new<I, S>(names: I, width: u32) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        let width = StorageWidth::try_from(width)?;
        let names: Vec<Cow<'static, str>> = names.into_iter().map(Into::into).collect();

        if names.len() > width.bits() as usize {
            return Err(ConstructionError::TooManyFields {
                fields: names.len(),
                width: width.bits(),
            });
        }

        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ConstructionError::DuplicateField(name.to_string()));
            }
        }

        Ok(Self {
            names,
            width,
            states: 0,
        })
    }

    fn index_of(&self, name: &str) -> Result<usize, ConstructionError> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ConstructionError::UnknownField(name.to_string()))
    }

    /// Get the state (0 or 1) of a named field
    pub fn get(&self, name: &str) -> Result<u8, ConstructionError> {
        let index = self.index_of(name)?;
        Ok(((self.states >> index) & 1) as u8)
    }

    /// Check whether a named field is set
    #[inline]
    pub fn is_set(&self, name: &str) -> Result<bool, ConstructionError> {
        Ok(self.get(name)? == 1)
    }

    /// Set the state of a named field; `state` must be 0 or 1
    pub fn set(&mut self, name: &str, state: u8) -> Result<(), ConstructionError> {
        if state > 1 {
            return Err(ConstructionError::InvalidState(state));
        }
        let index = self.index_of(name)?;
        if state == 1 {
            self.states |= 1 << index;
        } else {
            self.states &= !(1 << index);
        }
        Ok(())
    }

    /// Set a named field from a boolean
    #[inline]
    pub fn set_bool(&mut self, name: &str, on: bool) -> Result<(), ConstructionError> {
        self.set(name, u8::from(on))
    }

    /// Packed register value
    #[inline]
    pub fn value(&self) -> u64 {
        self.states
    }

    pub fn width(&self) -> StorageWidth {
        self.width
    }

    /// Declared field names in bit order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_ref())
    }

    /// Append the little-endian register value to a buffer
    #[inline]
    pub fn write_to_buffer(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.states.to_le_bytes()[..self.width.bytes()]);
    }

    /// Serialize to exactly `width / 8` little-endian bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.width.bytes());
        self.write_to_buffer(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_width_try_from() {
        assert_eq!(StorageWidth::try_from(16).unwrap(), StorageWidth::Bits16);
        assert_eq!(StorageWidth::Bits64.bytes(), 8);
        assert_eq!(
            StorageWidth::try_from(24).unwrap_err(),
            ConstructionError::InvalidWidth(24)
        );
    }

    #[test]
    fn test_register_invalid_width() {
        let err = FlagRegister::new(["A"], 12).unwrap_err();
        assert_eq!(err, ConstructionError::InvalidWidth(12));
    }

    #[test]
    fn test_register_too_many_fields() {
        let names = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];
        let err = FlagRegister::new(names, 8).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::TooManyFields {
                fields: 9,
                width: 8
            }
        );
    }

    #[test]
    fn test_register_duplicate_field() {
        let err = FlagRegister::new(["A", "B", "A"], 8).unwrap_err();
        assert_eq!(err, ConstructionError::DuplicateField("A".into()));
    }

    #[test]
    fn test_get_set() {
        let mut reg = FlagRegister::new(["A", "B", "C"], 8).unwrap();
        assert_eq!(reg.get("B").unwrap(), 0);

        reg.set("B", 1).unwrap();
        assert_eq!(reg.get("B").unwrap(), 1);
        assert!(reg.is_set("B").unwrap());
        assert!(!reg.is_set("A").unwrap());

        reg.set("B", 0).unwrap();
        assert_eq!(reg.value(), 0);
    }

    #[test]
    fn test_set_invalid_state() {
        let mut reg = FlagRegister::new(["A"], 8).unwrap();
        assert_eq!(
            reg.set("A", 2).unwrap_err(),
            ConstructionError::InvalidState(2)
        );
        assert_eq!(reg.get("A").unwrap(), 0);
    }

    #[test]
    fn test_unknown_field() {
        let mut reg = FlagRegister::new(["A"], 8).unwrap();
        assert!(matches!(
            reg.get("Z"),
            Err(ConstructionError::UnknownField(_))
        ));
        assert!(matches!(
            reg.set("Z", 1),
            Err(ConstructionError::UnknownField(_))
        ));
    }

    #[test]
    fn test_serialize_little_endian() {
        let names: Vec<String> = (0..10).map(|i| format!("F{i}")).collect();
        let mut reg = FlagRegister::new(names, 16).unwrap();
        reg.set("F0", 1).unwrap();
        reg.set("F9", 1).unwrap();

        assert_eq!(reg.serialize(), vec![0x01, 0x02]);
    }

    #[test]
    fn test_serialize_width_bytes() {
        for (bits, len) in [(8, 1), (16, 2), (32, 4), (64, 8)] {
            let reg = FlagRegister::new(["A"], bits).unwrap();
            assert_eq!(reg.serialize().len(), len);
        }
    }

    #[test]
    fn test_top_bit_of_64_bit_register() {
        let names: Vec<String> = (0..64).map(|i| format!("F{i}")).collect();
        let mut reg = FlagRegister::new(names, 64).unwrap();
        reg.set("F63", 1).unwrap();
        assert_eq!(reg.serialize(), 0x8000_0000_0000_0000u64.to_le_bytes().to_vec());
    }

    #[test]
    fn test_static_schemas_are_valid() {
        for schema in [
            LINK_FLAGS,
            FILE_ATTRIBUTE_FLAGS,
            ITEM_ATTRIBUTE_FLAGS,
            LINK_INFO_FLAGS,
            NETWORK_LINK_FLAGS,
        ] {
            let checked = FlagRegister::new(schema.fields.iter().copied(), schema.width.bits());
            assert!(checked.is_ok(), "schema {} is invalid", schema.name);
            let reg = checked.unwrap();
            assert_eq!(reg.width(), schema.width);
            assert!(reg.names().eq(schema.fields.iter().copied()));
            assert_eq!(reg, schema.register());
        }
        assert_eq!(LINK_FLAGS.fields.len(), 27);
    }

    #[test]
    fn test_link_flag_bit_positions() {
        let mut reg = LINK_FLAGS.register();
        reg.set(link_flags::HAS_NAME, 1).unwrap();
        reg.set(link_flags::IS_UNICODE, 1).unwrap();
        reg.set("EnableTargetMetadata", 1).unwrap();
        assert_eq!(reg.value(), (1 << 2) | (1 << 7) | (1 << 19));
    }
}
