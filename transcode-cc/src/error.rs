//! Closed caption decoding errors.
//!
//! The decoders themselves never fail on malformed caption data; these errors
//! only surface from the strict entry points, which report input that violates
//! the framing preconditions (partial triples, truncated commands).

use thiserror::Error;

/// Errors from closed caption decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptionError {
    /// CEA-608 payload is not made of whole `(type, data1, data2)` triples.
    #[error("CEA-608 payload of {len} bytes is not a whole number of triples")]
    IncompleteTriple {
        /// Length of the rejected payload.
        len: usize,
    },

    /// CEA-708 command runs past the end of the service block.
    #[error(
        "CEA-708 opcode 0x{opcode:02X} at offset {offset} needs {needed} operand bytes, {available} available"
    )]
    TruncatedCommand {
        /// The opcode whose operands were cut off.
        opcode: u8,
        /// Offset of the opcode within the payload.
        offset: usize,
        /// Operand bytes the opcode requires.
        needed: usize,
        /// Operand bytes left in the payload.
        available: usize,
    },
}

/// Result type for closed caption operations.
pub type Result<T> = std::result::Result<T, CaptionError>;
