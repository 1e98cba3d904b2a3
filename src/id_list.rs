// SPDX-License-Identifier: MIT
//! Item identifier lists
//!
//! An item identifier list is the shell's representation of a path: an
//! ordered sequence of self-sized records, root-most first, terminated by
//! a zero-length record.
//!
//! ```text
//! ItemID      u16 size (whole record) | u8 type<<4 | type data | payload
//! IDList      ItemID* | 0x0000
//! LinkTarget  u16 IDListSize | IDList
//! ```

use uuid::Uuid;

use crate::error::ConstructionError;
use crate::flags::{FlagRegister, ITEM_ATTRIBUTE_FLAGS};
use crate::layout::{self, Emitter, FieldWidth, Structure};
use crate::strings::{ascii_z, fixed_ascii, unicode_z};

/// Largest encodable record (and list), including its size prefix
pub const MAX_ITEM_SIZE: usize = 0xFFFF;

/// Size prefix plus the type byte
const ITEM_HEADER_SIZE: usize = 3;

/// Zero-length record ending a list
const TERMINAL_ID: [u8; 2] = [0, 0];

/// "My Computer" shell folder
pub const CLSID_MY_COMPUTER: Uuid = Uuid::from_u128(0x20d04fe0_3aea_1069_a2d8_08002b30309d);

/// One record of an item identifier list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemId {
    type_tag: u8,
    type_data: u8,
    payload: Vec<u8>,
}

impl ItemId {
    /// Create a record; `type_tag` and `type_data` are 4-bit values
    pub fn new(
        type_tag: u8,
        type_data: u8,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self, ConstructionError> {
        if type_tag > 0xF || type_data > 0xF {
            return Err(ConstructionError::InvalidPayload(format!(
                "type {type_tag:#x} / type data {type_data:#x} exceed 4 bits"
            )));
        }

        let payload = payload.into();
        let size = ITEM_HEADER_SIZE + payload.len();
        if size > MAX_ITEM_SIZE {
            return Err(ConstructionError::TooLarge {
                size,
                max: MAX_ITEM_SIZE,
            });
        }

        Ok(Self {
            type_tag,
            type_data,
            payload,
        })
    }

    /// Encoded record size, prefix included
    #[inline]
    pub fn size(&self) -> usize {
        ITEM_HEADER_SIZE + self.payload.len()
    }

    pub fn type_tag(&self) -> u8 {
        self.type_tag
    }

    pub fn type_data(&self) -> u8 {
        self.type_data
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl Structure for ItemId {
    fn name(&self) -> &'static str {
        "ItemID"
    }

    fn emit(&self, out: &mut Emitter<'_>) -> Result<(), ConstructionError> {
        out.size_field(FieldWidth::U16)?;
        out.u8(self.type_data | self.type_tag << 4);
        out.segment("payload", &self.payload);
        Ok(())
    }
}

/// Ordered list of item records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemIdList {
    items: Vec<ItemId>,
}

impl ItemIdList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw record
    pub fn append(
        &mut self,
        type_tag: u8,
        type_data: u8,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), ConstructionError> {
        self.items.push(ItemId::new(type_tag, type_data, payload)?);
        Ok(())
    }

    /// Append a typed shell item
    pub fn push(&mut self, item: &ShellItem) -> Result<(), ConstructionError> {
        self.append(item.type_tag(), item.type_data(), item.payload()?)
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Encoded length: every record plus the terminator
    pub fn encoded_len(&self) -> usize {
        self.items.iter().map(ItemId::size).sum::<usize>() + TERMINAL_ID.len()
    }

    /// Records in insertion order followed by the zero terminator
    pub fn serialize(&self) -> Result<Vec<u8>, ConstructionError> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        for item in &self.items {
            bytes.extend_from_slice(&layout::build(item)?);
        }
        bytes.extend_from_slice(&TERMINAL_ID);
        Ok(bytes)
    }
}

/// The LinkTargetIDList section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTargetIdList {
    list: ItemIdList,
}

impl LinkTargetIdList {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_fits(&self, extra: usize) -> Result<(), ConstructionError> {
        let size = self.list.encoded_len() + extra;
        if size > MAX_ITEM_SIZE {
            return Err(ConstructionError::TooLarge {
                size,
                max: MAX_ITEM_SIZE,
            });
        }
        Ok(())
    }

    /// Append a raw record; the whole list must stay within 65535 bytes
    pub fn append(
        &mut self,
        type_tag: u8,
        type_data: u8,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), ConstructionError> {
        let item = ItemId::new(type_tag, type_data, payload)?;
        self.check_fits(item.size())?;
        self.list.items.push(item);
        Ok(())
    }

    /// Append a typed shell item
    pub fn push(&mut self, item: &ShellItem) -> Result<(), ConstructionError> {
        self.append(item.type_tag(), item.type_data(), item.payload()?)
    }

    pub fn list(&self) -> &ItemIdList {
        &self.list
    }

    /// `IDListSize` followed by the list
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConstructionError> {
        let list = self.list.serialize()?;
        let mut bytes = Vec::with_capacity(2 + list.len());
        bytes.extend_from_slice(&(list.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&list);
        Ok(bytes)
    }
}

/// Whether a file entry names a directory or a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEntryKind {
    Directory,
    File,
}

/// Typed payloads for item records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellItem {
    /// Root folder, identified by class
    Root { sort_index: u8, clsid: Uuid },
    /// Volume, e.g. `C:\`
    Volume { name: String },
    /// File or directory on a volume
    File(FileEntry),
}

impl ShellItem {
    /// Length of the zero-padded volume name buffer
    pub const VOLUME_NAME_LEN: usize = 22;

    /// The "My Computer" root
    pub fn my_computer() -> Self {
        ShellItem::Root {
            sort_index: 0x50,
            clsid: CLSID_MY_COMPUTER,
        }
    }

    pub fn volume(name: impl Into<String>) -> Self {
        ShellItem::Volume { name: name.into() }
    }

    pub fn type_tag(&self) -> u8 {
        match self {
            ShellItem::Root { .. } => 1,
            ShellItem::Volume { .. } => 2,
            ShellItem::File(_) => 3,
        }
    }

    pub fn type_data(&self) -> u8 {
        match self {
            ShellItem::Root { .. } | ShellItem::Volume { .. } => 0xF,
            ShellItem::File(entry) => match entry.kind {
                FileEntryKind::Directory => 1,
                FileEntryKind::File => 2,
            },
        }
    }

    /// Record payload (everything after the type byte)
    pub fn payload(&self) -> Result<Vec<u8>, ConstructionError> {
        match self {
            ShellItem::Root { sort_index, clsid } => {
                let mut bytes = Vec::with_capacity(17);
                bytes.push(*sort_index);
                bytes.extend_from_slice(&clsid.to_bytes_le());
                Ok(bytes)
            }
            ShellItem::Volume { name } => fixed_ascii(name, Self::VOLUME_NAME_LEN),
            ShellItem::File(entry) => entry.payload(),
        }
    }
}

/// File-entry item: size, modification time, attributes and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub kind: FileEntryKind,
    pub file_size: u32,
    /// DOS date (low word) and time (high word)
    pub modified: u32,
    /// 16-bit file attribute register
    pub attributes: FlagRegister,
    name: String,
    pub extension: Option<FileEntryExtension>,
}

impl FileEntry {
    /// Create an entry; the primary name must be ASCII
    pub fn new(name: impl Into<String>, kind: FileEntryKind) -> Result<Self, ConstructionError> {
        let name = name.into();
        if !name.is_ascii() {
            return Err(ConstructionError::NotAscii(name));
        }
        Ok(Self {
            kind,
            file_size: 0,
            modified: 0,
            attributes: ITEM_ATTRIBUTE_FLAGS.register(),
            name,
            extension: None,
        })
    }

    /// Attach a metadata block carrying the same name in UTF-16
    pub fn with_extension(mut self) -> Self {
        self.extension = Some(FileEntryExtension::new(self.name.clone()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn payload(&self) -> Result<Vec<u8>, ConstructionError> {
        let mut bytes = vec![0u8];
        bytes.extend_from_slice(&self.file_size.to_le_bytes());
        bytes.extend_from_slice(&self.modified.to_le_bytes());
        self.attributes.write_to_buffer(&mut bytes);

        let mut name = ascii_z(&self.name)?;
        if name.len() % 2 == 1 {
            name.push(0);
        }
        bytes.extend_from_slice(&name);

        if let Some(extension) = &self.extension {
            bytes.extend_from_slice(&layout::build(extension)?);
        }
        Ok(bytes)
    }
}

/// Trailing metadata block of a file entry (signature 0xBEEF0004)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntryExtension {
    pub version: u16,
    /// DOS creation date/time
    pub created: u32,
    /// DOS access date/time
    pub accessed: u32,
    pub identifier: u16,
    pub file_reference: u64,
    pub long_string_size: u16,
    pub long_name: String,
    pub first_extension_version_offset: u16,
}

impl FileEntryExtension {
    pub const SIGNATURE: u32 = 0xBEEF_0004;

    pub fn new(long_name: impl Into<String>) -> Self {
        Self {
            version: 0x0009,
            created: 0,
            accessed: 0,
            identifier: 0x002E,
            file_reference: 0,
            long_string_size: 0,
            long_name: long_name.into(),
            first_extension_version_offset: 0x0014,
        }
    }
}

impl Structure for FileEntryExtension {
    fn name(&self) -> &'static str {
        "FileEntryExtension"
    }

    fn emit(&self, out: &mut Emitter<'_>) -> Result<(), ConstructionError> {
        out.size_field(FieldWidth::U16)?;
        out.u16(self.version);
        out.u32(Self::SIGNATURE);
        out.u32(self.created);
        out.u32(self.accessed);
        out.u16(self.identifier);
        out.u16(0);
        out.u64(self.file_reference);
        out.u64(0);
        out.u16(self.long_string_size);
        out.u32(0);
        out.u32(0);
        out.segment("long_name", &unicode_z(&self.long_name));
        out.u16(self.first_extension_version_offset);
        Ok(())
    }
}
