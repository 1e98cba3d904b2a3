// SPDX-License-Identifier: MIT
//! Fixed 76-byte Shell Link header
//!
//! ```text
//! HeaderSize      u32      0x0000004C
//! LinkCLSID       16 bytes 00021401-0000-0000-C000-000000000046
//! LinkFlags       u32      presence of the optional sections
//! FileAttributes  u32
//! CreationTime    FILETIME
//! AccessTime      FILETIME
//! WriteTime       FILETIME
//! FileSize        u32
//! IconIndex       i32
//! ShowCommand     u32
//! HotKey          u16
//! Reserved1       u16
//! Reserved2       u32
//! Reserved3       u32
//! ```

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flags::{FlagRegister, FILE_ATTRIBUTE_FLAGS, LINK_FLAGS};

/// Header size in bytes
pub const HEADER_SIZE: usize = 0x4C;

/// Shell Link class identifier
pub const LINK_CLSID: Uuid = Uuid::from_u128(0x00021401_0000_0000_c000_000000000046);

/// Seconds between 1601-01-01 and the Unix epoch
const FILETIME_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// 100-nanosecond ticks since 1601-01-01 UTC, split into two u32 halves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileTime {
    pub low: u32,
    pub high: u32,
}

impl FileTime {
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    pub const fn from_ticks(ticks: u64) -> Self {
        Self {
            low: ticks as u32,
            high: (ticks >> 32) as u32,
        }
    }

    pub const fn ticks(&self) -> u64 {
        (self.high as u64) << 32 | self.low as u64
    }

    #[inline]
    pub fn write_to_buffer(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.low.to_le_bytes());
        buffer.extend_from_slice(&self.high.to_le_bytes());
    }
}

/// Times before 1601 clamp to zero; times past the last tick saturate
impl From<DateTime<Utc>> for FileTime {
    fn from(time: DateTime<Utc>) -> Self {
        let secs = time.timestamp() + FILETIME_EPOCH_OFFSET_SECS;
        if secs < 0 {
            return Self::default();
        }
        let ticks = (secs as u64)
            .checked_mul(10_000_000)
            .and_then(|t| t.checked_add(u64::from(time.timestamp_subsec_nanos() / 100)))
            .unwrap_or(u64::MAX);
        Self::from_ticks(ticks)
    }
}

/// Pack a timestamp into the 32-bit DOS date (low word) and time (high word)
///
/// DOS timestamps cover 1980..=2107 with two-second resolution; anything
/// outside that range packs to zero.
pub fn dos_date_time(time: NaiveDateTime) -> u32 {
    let year = time.year();
    if !(1980..=2107).contains(&year) {
        return 0;
    }
    let date = ((year - 1980) as u32) << 9 | time.month() << 5 | time.day();
    let clock = time.hour() << 11 | time.minute() << 5 | time.second() / 2;
    date | clock << 16
}

/// Window state applied when the target is launched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum ShowCommand {
    #[default]
    Normal = 0x1,
    Maximized = 0x3,
    MinNoActive = 0x7,
}

impl FromStr for ShowCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(ShowCommand::Normal),
            "maximized" => Ok(ShowCommand::Maximized),
            "min_no_active" | "minnoactive" => Ok(ShowCommand::MinNoActive),
            other => Err(format!("Unknown show command: {}", other)),
        }
    }
}

/// Keyboard shortcut: virtual key code (low byte) and modifiers (high byte)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HotKey {
    pub key: u8,
    pub modifiers: u8,
}

/// The fixed header at the start of every Shell Link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLinkHeader {
    /// Presence of the optional sections and other link options
    pub link_flags: FlagRegister,
    /// Attributes of the link target
    pub file_attributes: FlagRegister,
    pub creation_time: FileTime,
    pub access_time: FileTime,
    pub write_time: FileTime,
    /// Low 32 bits of the target's size
    pub file_size: u32,
    pub icon_index: i32,
    pub show_command: ShowCommand,
    pub hot_key: HotKey,
}

impl ShellLinkHeader {
    pub fn new() -> Self {
        Self {
            link_flags: LINK_FLAGS.register(),
            file_attributes: FILE_ATTRIBUTE_FLAGS.register(),
            creation_time: FileTime::default(),
            access_time: FileTime::default(),
            write_time: FileTime::default(),
            file_size: 0,
            icon_index: 0,
            show_command: ShowCommand::default(),
            hot_key: HotKey::default(),
        }
    }

    /// Write the header (exactly [`HEADER_SIZE`] bytes)
    pub fn write_to_buffer(&self, buffer: &mut Vec<u8>) {
        buffer.reserve(HEADER_SIZE);

        buffer.extend_from_slice(&(HEADER_SIZE as u32).to_le_bytes());
        buffer.extend_from_slice(&LINK_CLSID.to_bytes_le());
        self.link_flags.write_to_buffer(buffer);
        self.file_attributes.write_to_buffer(buffer);
        self.creation_time.write_to_buffer(buffer);
        self.access_time.write_to_buffer(buffer);
        self.write_time.write_to_buffer(buffer);
        buffer.extend_from_slice(&self.file_size.to_le_bytes());
        buffer.extend_from_slice(&self.icon_index.to_le_bytes());
        buffer.extend_from_slice(&(self.show_command as u32).to_le_bytes());
        buffer.push(self.hot_key.key);
        buffer.push(self.hot_key.modifiers);
        // Reserved1, Reserved2, Reserved3
        buffer.extend_from_slice(&[0u8; 10]);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        self.write_to_buffer(&mut bytes);
        bytes
    }
}

impl Default for ShellLinkHeader {
    fn default() -> Self {
        Self::new()
    }
}
