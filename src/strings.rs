// SPDX-License-Identifier: MIT
//! String encodings used by Shell Link structures
//!
//! StringData segments are a 16-bit little-endian count of UTF-16 code
//! units (terminator included) followed by the UTF-16LE text. Location-info
//! and item records also carry plain null-terminated narrow or wide strings,
//! and extension blocks use fixed-size zero-padded buffers.

use crate::error::ConstructionError;

/// Maximum number of UTF-16 code units in a StringData segment
pub const MAX_STRING_UNITS: usize = 0xFFFF;

fn terminated_units(text: &str) -> Vec<u16> {
    let mut units: Vec<u16> = text.encode_utf16().collect();
    if units.last() != Some(&0) {
        units.push(0);
    }
    units
}

/// Encode `text` as a counted, null-terminated UTF-16LE segment
///
/// A terminator is appended unless `text` already ends with one.
pub fn encode_string_data(text: &str) -> Result<Vec<u8>, ConstructionError> {
    let units = terminated_units(text);
    if units.len() > MAX_STRING_UNITS {
        return Err(ConstructionError::TooLong {
            units: units.len(),
            max: MAX_STRING_UNITS,
        });
    }

    let mut bytes = Vec::with_capacity(2 + units.len() * 2);
    bytes.extend_from_slice(&(units.len() as u16).to_le_bytes());
    for unit in units {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    Ok(bytes)
}

/// Null-terminated ASCII string
pub fn ascii_z(text: &str) -> Result<Vec<u8>, ConstructionError> {
    if !text.is_ascii() {
        return Err(ConstructionError::NotAscii(text.to_string()));
    }
    let mut bytes = text.as_bytes().to_vec();
    if bytes.last() != Some(&0) {
        bytes.push(0);
    }
    Ok(bytes)
}

/// Null-terminated UTF-16LE string
pub fn unicode_z(text: &str) -> Vec<u8> {
    terminated_units(text)
        .into_iter()
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// ASCII text zero-padded to exactly `len` bytes
///
/// At least one trailing zero is always kept, so the text may be at most
/// `len - 1` bytes long.
pub fn fixed_ascii(text: &str, len: usize) -> Result<Vec<u8>, ConstructionError> {
    if !text.is_ascii() {
        return Err(ConstructionError::NotAscii(text.to_string()));
    }
    let text = text.trim_end_matches('\0');
    if text.len() >= len {
        return Err(ConstructionError::TooLong {
            units: text.len(),
            max: len - 1,
        });
    }
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(len, 0);
    Ok(bytes)
}

/// UTF-16LE text zero-padded to exactly `units` code units
pub fn fixed_unicode(text: &str, units: usize) -> Result<Vec<u8>, ConstructionError> {
    let encoded: Vec<u16> = text.trim_end_matches('\0').encode_utf16().collect();
    if encoded.len() >= units {
        return Err(ConstructionError::TooLong {
            units: encoded.len(),
            max: units - 1,
        });
    }
    let mut bytes: Vec<u8> = encoded.into_iter().flat_map(u16::to_le_bytes).collect();
    bytes.resize(units * 2, 0);
    Ok(bytes)
}

/// A validated StringData segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringSegment {
    text: String,
    encoded: Vec<u8>,
}

impl StringSegment {
    /// Encode and validate a segment; fails with `TooLong` past 65535 units
    pub fn new(text: impl Into<String>) -> Result<Self, ConstructionError> {
        let text = text.into();
        let encoded = encode_string_data(&text)?;
        Ok(Self { text, encoded })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Declared character count (terminator included)
    pub fn char_count(&self) -> u16 {
        u16::from_le_bytes([self.encoded[0], self.encoded[1]])
    }

    /// Encoded segment bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.encoded
    }
}

/// The five optional StringData segments, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    Name,
    RelativePath,
    WorkingDir,
    Arguments,
    IconLocation,
}

impl StringKind {
    /// All kinds in the order they are written
    pub fn all() -> &'static [StringKind] {
        &[
            StringKind::Name,
            StringKind::RelativePath,
            StringKind::WorkingDir,
            StringKind::Arguments,
            StringKind::IconLocation,
        ]
    }

    /// Header flag that governs this segment
    pub fn flag(&self) -> &'static str {
        use crate::flags::link_flags;
        match self {
            StringKind::Name => link_flags::HAS_NAME,
            StringKind::RelativePath => link_flags::HAS_RELATIVE_PATH,
            StringKind::WorkingDir => link_flags::HAS_WORKING_DIR,
            StringKind::Arguments => link_flags::HAS_ARGUMENTS,
            StringKind::IconLocation => link_flags::HAS_ICON_LOCATION,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StringKind::Name => "name",
            StringKind::RelativePath => "relative path",
            StringKind::WorkingDir => "working directory",
            StringKind::Arguments => "command arguments",
            StringKind::IconLocation => "icon location",
        }
    }
}

/// StringData section contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringData {
    segments: [Option<StringSegment>; 5],
}

impl StringData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a segment, validating it immediately
    pub fn set(&mut self, kind: StringKind, text: impl Into<String>) -> Result<(), ConstructionError> {
        self.segments[kind as usize] = Some(StringSegment::new(text)?);
        Ok(())
    }

    /// Detach a segment, returning it
    pub fn take(&mut self, kind: StringKind) -> Option<StringSegment> {
        self.segments[kind as usize].take()
    }

    #[inline]
    pub fn get(&self, kind: StringKind) -> Option<&StringSegment> {
        self.segments[kind as usize].as_ref()
    }
}
