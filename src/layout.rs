// SPDX-License-Identifier: MIT
//! Two-pass offset-resolving emission
//!
//! Shell Link structures store, in their own headers, the byte offsets of
//! segments written after the header, and often their own total size. A
//! [`Structure`] describes its byte stream once, in declaration order,
//! through an [`Emitter`]. [`build`] runs that description twice:
//!
//! 1. **Provisional pass**: offset and size fields are written as zero
//!    placeholders while the emitter records where every marked segment
//!    starts and how long the whole stream is. The result is a [`Layout`].
//! 2. **Resolving pass**: the same description is replayed with the
//!    layout available, so every offset and size field receives its final
//!    value.
//!
//! Placeholders have the same width as the final values, so the second
//! pass reproduces the first pass's layout exactly and a third pass would
//! change nothing. Offsets are relative to the start of the structure
//! being built; nested structures are built independently and appended as
//! opaque segments.

use tracing::trace;

use crate::error::ConstructionError;

/// Width of an integer offset or size field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    U16,
    U32,
}

impl FieldWidth {
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            FieldWidth::U16 => 2,
            FieldWidth::U32 => 4,
        }
    }

    #[inline]
    const fn max(self) -> usize {
        match self {
            FieldWidth::U16 => u16::MAX as usize,
            FieldWidth::U32 => u32::MAX as usize,
        }
    }
}

/// Segment offsets and total size discovered by the provisional pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    offsets: Vec<(&'static str, usize)>,
    total_size: usize,
}

impl Layout {
    /// Offset of a marked segment, relative to the structure start
    pub fn offset(&self, slot: &str) -> Option<usize> {
        self.offsets
            .iter()
            .find(|(name, _)| *name == slot)
            .map(|(_, offset)| *offset)
    }

    /// Length of the complete structure in bytes
    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Marked segments in emission order
    pub fn slots(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.offsets.iter().copied()
    }
}

/// A structure whose bytes can be produced by the two-pass builder
///
/// `emit` must be deterministic: given the same structure it has to write
/// the same sequence of fields on every call, whatever the emitter's pass.
pub trait Structure {
    /// Name used in log output
    fn name(&self) -> &'static str;

    /// Write the structure's fields in declaration order
    fn emit(&self, out: &mut Emitter<'_>) -> Result<(), ConstructionError>;
}

/// Byte sink handed to [`Structure::emit`]
pub struct Emitter<'a> {
    buffer: Vec<u8>,
    resolved: Option<&'a Layout>,
    offsets: Vec<(&'static str, usize)>,
    referenced: Vec<&'static str>,
}

impl<'a> Emitter<'a> {
    fn provisional() -> Self {
        Self {
            buffer: Vec::new(),
            resolved: None,
            offsets: Vec::new(),
            referenced: Vec::new(),
        }
    }

    fn resolving(layout: &'a Layout) -> Self {
        Self {
            buffer: Vec::with_capacity(layout.total_size),
            resolved: Some(layout),
            offsets: Vec::with_capacity(layout.offsets.len()),
            referenced: Vec::new(),
        }
    }

    /// Current length of the stream
    #[inline]
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    #[inline]
    pub fn u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    #[inline]
    pub fn zeros(&mut self, count: usize) {
        self.buffer.resize(self.buffer.len() + count, 0);
    }

    /// Record the current position as the start of `slot`
    pub fn mark(&mut self, slot: &'static str) {
        debug_assert!(
            !self.offsets.iter().any(|(name, _)| *name == slot),
            "slot {slot} marked twice"
        );
        self.offsets.push((slot, self.buffer.len()));
    }

    /// Mark `slot` and append its bytes
    pub fn segment(&mut self, slot: &'static str, bytes: &[u8]) {
        self.mark(slot);
        self.bytes(bytes);
    }

    /// Build a nested structure and append it as segment `slot`
    pub fn nested<S: Structure + ?Sized>(
        &mut self,
        slot: &'static str,
        structure: &S,
    ) -> Result<(), ConstructionError> {
        let bytes = build(structure)?;
        self.segment(slot, &bytes);
        Ok(())
    }

    /// Write a field holding the offset of `slot`
    ///
    /// The slot must be marked somewhere in the same structure, before or
    /// after this field.
    pub fn offset_of(
        &mut self,
        slot: &'static str,
        width: FieldWidth,
    ) -> Result<(), ConstructionError> {
        let value = match self.resolved {
            None => {
                self.referenced.push(slot);
                0
            }
            Some(layout) => layout
                .offset(slot)
                .ok_or(ConstructionError::UnresolvedOffset(slot))?,
        };
        self.field(slot, value, width)
    }

    /// Write a field holding the total size of the structure
    pub fn size_field(&mut self, width: FieldWidth) -> Result<(), ConstructionError> {
        let value = self.resolved.map_or(0, Layout::total_size);
        self.field("size", value, width)
    }

    fn field(
        &mut self,
        slot: &'static str,
        value: usize,
        width: FieldWidth,
    ) -> Result<(), ConstructionError> {
        if value > width.max() {
            return Err(ConstructionError::FieldOverflow {
                slot,
                value,
                width: width.bytes(),
            });
        }
        match width {
            FieldWidth::U16 => self.u16(value as u16),
            FieldWidth::U32 => self.u32(value as u32),
        }
        Ok(())
    }

    fn into_layout(self) -> Result<Layout, ConstructionError> {
        for slot in &self.referenced {
            if !self.offsets.iter().any(|(name, _)| name == slot) {
                return Err(ConstructionError::UnresolvedOffset(*slot));
            }
        }
        Ok(Layout {
            offsets: self.offsets,
            total_size: self.buffer.len(),
        })
    }
}

/// Run the provisional pass only and return the discovered layout
pub fn layout_of<S: Structure + ?Sized>(structure: &S) -> Result<Layout, ConstructionError> {
    let mut pass = Emitter::provisional();
    structure.emit(&mut pass)?;
    pass.into_layout()
}

/// Build a structure into its final byte stream
///
/// Either every offset and size field is resolved or an error is returned;
/// no partially resolved output is ever produced.
pub fn build<S: Structure + ?Sized>(structure: &S) -> Result<Vec<u8>, ConstructionError> {
    let layout = layout_of(structure)?;

    let mut pass = Emitter::resolving(&layout);
    structure.emit(&mut pass)?;

    debug_assert_eq!(pass.buffer.len(), layout.total_size);
    debug_assert_eq!(pass.offsets, layout.offsets);

    trace!(
        structure = structure.name(),
        size = layout.total_size,
        segments = layout.offsets.len(),
        "resolved structure layout"
    );
    Ok(pass.buffer)
}
