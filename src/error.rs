// SPDX-License-Identifier: MIT
//! Error types for Shell Link construction and serialization

/// Errors raised while constructing or mutating a structure.
///
/// These are reported eagerly, at the point where the invalid value is
/// supplied, so a structure that exists is always serializable on its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Invalid storage width: {0} (expected 8, 16, 32 or 64)")]
    InvalidWidth(u32),

    #[error("Too many fields: {fields} do not fit in {width} bits")]
    TooManyFields { fields: usize, width: u32 },

    #[error("Field declared more than once: {0}")]
    DuplicateField(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid flag state: {0} (expected 0 or 1)")]
    InvalidState(u8),

    #[error("String too long: {units} units > {max}")]
    TooLong { units: usize, max: usize },

    #[error("Data too large: {size} bytes > {max}")]
    TooLarge { size: usize, max: usize },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Not an ASCII string: {0:?}")]
    NotAscii(String),

    #[error("Value {value} of field {slot} does not fit in {width} bytes")]
    FieldOverflow {
        slot: &'static str,
        value: usize,
        width: usize,
    },

    #[error("Offset field references a segment that was never emitted: {0}")]
    UnresolvedOffset(&'static str),
}

/// Errors that can occur while assembling a complete container
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("Flag {flag} is set but no {section} is attached")]
    InconsistentFlags {
        flag: &'static str,
        section: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
