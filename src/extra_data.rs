// SPDX-License-Identifier: MIT
//! ExtraData: trailing typed extension blocks
//!
//! Each block starts with a u32 size (whole block) and a u32 signature.
//! The sequence ends with a terminal block, a single u32 zero.

use crate::error::ConstructionError;
use crate::layout::{self, Emitter, FieldWidth, Structure};
use crate::strings::{fixed_ascii, fixed_unicode};

/// Terminal block marking the end of the extension sequence
pub const TERMINAL_BLOCK: [u8; 4] = [0, 0, 0, 0];

/// Environment-variable path to the link target (signature 0xA0000001)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentVariableBlock {
    target: String,
}

impl EnvironmentVariableBlock {
    pub const SIGNATURE: u32 = 0xA000_0001;
    /// Longest target, in characters
    pub const MAX_LEN: usize = 259;
    const BUFFER_LEN: usize = Self::MAX_LEN + 1;

    /// Create a block for a path such as `%windir%\system32\cmd.exe`
    ///
    /// The target must be ASCII and at most 259 characters.
    pub fn new(target: impl Into<String>) -> Result<Self, ConstructionError> {
        let target = target.into();
        // validate both encodings up front
        fixed_ascii(&target, Self::BUFFER_LEN)?;
        fixed_unicode(&target, Self::BUFFER_LEN)?;
        Ok(Self { target })
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Structure for EnvironmentVariableBlock {
    fn name(&self) -> &'static str {
        "EnvironmentVariableDataBlock"
    }

    fn emit(&self, out: &mut Emitter<'_>) -> Result<(), ConstructionError> {
        out.size_field(FieldWidth::U32)?;
        out.u32(Self::SIGNATURE);
        out.segment("target_ansi", &fixed_ascii(&self.target, Self::BUFFER_LEN)?);
        out.segment(
            "target_unicode",
            &fixed_unicode(&self.target, Self::BUFFER_LEN)?,
        );
        Ok(())
    }
}

/// Console window settings (signature 0xA0000002)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleBlock {
    pub fill_attributes: u16,
    pub popup_fill_attributes: u16,
    pub screen_buffer_size: (u16, u16),
    pub window_size: (u16, u16),
    pub window_origin: (u16, u16),
    pub font_size: u32,
    pub font_family: u32,
    pub font_weight: u32,
    face_name: String,
    pub cursor_size: u32,
    pub full_screen: bool,
    pub quick_edit: bool,
    pub insert_mode: bool,
    pub auto_position: bool,
    pub history_buffer_size: u32,
    pub number_of_history_buffers: u32,
    pub history_no_dup: bool,
    pub color_table: [u32; 16],
}

impl ConsoleBlock {
    pub const SIGNATURE: u32 = 0xA000_0002;
    /// Face name buffer length in UTF-16 units
    const FACE_NAME_LEN: usize = 32;

    pub fn new() -> Self {
        Self {
            fill_attributes: 0x0007,
            popup_fill_attributes: 0x00F5,
            screen_buffer_size: (0x78, 0x2329),
            window_size: (0x78, 0x1E),
            window_origin: (0, 0),
            font_size: 0x0010_0000,
            font_family: 0x36,
            font_weight: 0x190,
            face_name: "Consolas".to_string(),
            cursor_size: 0x19,
            full_screen: false,
            quick_edit: true,
            insert_mode: true,
            auto_position: true,
            history_buffer_size: 0x32,
            number_of_history_buffers: 0x4,
            history_no_dup: false,
            color_table: [
                0x0000_0000, 0x0080_0000, 0x0000_8000, 0x0080_8000,
                0x0000_0080, 0x0080_0080, 0x0000_8080, 0x00C0_C0C0,
                0x0080_8080, 0x00FF_0000, 0x0000_FF00, 0x00FF_FF00,
                0x0000_00FF, 0x00FF_00FF, 0x0000_FFFF, 0x00FF_FFFF,
            ],
        }
    }

    pub fn face_name(&self) -> &str {
        &self.face_name
    }

    /// Set the console font face; at most 31 UTF-16 units
    pub fn set_face_name(&mut self, face_name: impl Into<String>) -> Result<(), ConstructionError> {
        let face_name = face_name.into();
        fixed_unicode(&face_name, Self::FACE_NAME_LEN)?;
        self.face_name = face_name;
        Ok(())
    }
}

impl Default for ConsoleBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl Structure for ConsoleBlock {
    fn name(&self) -> &'static str {
        "ConsoleDataBlock"
    }

    fn emit(&self, out: &mut Emitter<'_>) -> Result<(), ConstructionError> {
        out.size_field(FieldWidth::U32)?;
        out.u32(Self::SIGNATURE);
        out.u16(self.fill_attributes);
        out.u16(self.popup_fill_attributes);
        for (x, y) in [self.screen_buffer_size, self.window_size, self.window_origin] {
            out.u16(x);
            out.u16(y);
        }
        // Unused1, Unused2
        out.u32(0);
        out.u32(0);
        out.u32(self.font_size);
        out.u32(self.font_family);
        out.u32(self.font_weight);
        out.segment(
            "face_name",
            &fixed_unicode(&self.face_name, Self::FACE_NAME_LEN)?,
        );
        out.u32(self.cursor_size);
        out.u32(u32::from(self.full_screen));
        out.u32(u32::from(self.quick_edit));
        out.u32(u32::from(self.insert_mode));
        out.u32(u32::from(self.auto_position));
        out.u32(self.history_buffer_size);
        out.u32(self.number_of_history_buffers);
        out.u32(u32::from(self.history_no_dup));
        for color in self.color_table {
            out.u32(color);
        }
        Ok(())
    }
}

/// A typed extension block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraDataBlock {
    EnvironmentVariables(EnvironmentVariableBlock),
    Console(ConsoleBlock),
}

impl ExtraDataBlock {
    pub fn signature(&self) -> u32 {
        match self {
            ExtraDataBlock::EnvironmentVariables(_) => EnvironmentVariableBlock::SIGNATURE,
            ExtraDataBlock::Console(_) => ConsoleBlock::SIGNATURE,
        }
    }
}

impl Structure for ExtraDataBlock {
    fn name(&self) -> &'static str {
        match self {
            ExtraDataBlock::EnvironmentVariables(block) => block.name(),
            ExtraDataBlock::Console(block) => block.name(),
        }
    }

    fn emit(&self, out: &mut Emitter<'_>) -> Result<(), ConstructionError> {
        match self {
            ExtraDataBlock::EnvironmentVariables(block) => block.emit(out),
            ExtraDataBlock::Console(block) => block.emit(out),
        }
    }
}

impl From<EnvironmentVariableBlock> for ExtraDataBlock {
    fn from(block: EnvironmentVariableBlock) -> Self {
        ExtraDataBlock::EnvironmentVariables(block)
    }
}

impl From<ConsoleBlock> for ExtraDataBlock {
    fn from(block: ConsoleBlock) -> Self {
        ExtraDataBlock::Console(block)
    }
}

/// The ExtraData section: blocks in insertion order plus the terminal block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraData {
    blocks: Vec<ExtraDataBlock>,
}

impl ExtraData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: impl Into<ExtraDataBlock>) {
        self.blocks.push(block.into());
    }

    pub fn blocks(&self) -> &[ExtraDataBlock] {
        &self.blocks
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConstructionError> {
        let mut bytes = Vec::new();
        for block in &self.blocks {
            bytes.extend_from_slice(&layout::build(block)?);
        }
        bytes.extend_from_slice(&TERMINAL_BLOCK);
        Ok(bytes)
    }
}
