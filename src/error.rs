//! Error types for the snapshot address space.

use thiserror::Error;

/// Which side of a memory access went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    /// Reading a field.
    Read,
    /// Writing a field.
    Write,
}

/// A field access that does not fit the modelled layout.
///
/// These are contract violations: the caller asked for something the
/// snapshot layout cannot hold. The battle loop treats every one of them as
/// fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The field extends past the end of the snapshot buffer.
    #[error("{access:?} of {field} at index {index:#06x}+{len} is outside the {size}-byte snapshot")]
    OutOfRange {
        /// Name of the field being accessed.
        field: &'static str,
        /// Buffer index the field resolves to.
        index: usize,
        /// Field length in bytes.
        len: usize,
        /// Size of the snapshot buffer.
        size: usize,
        /// The type of access attempted.
        access: AccessType,
    },
    /// The supplied bytes do not match the declared field length.
    #[error("{field} is {expected} bytes wide, got {actual}")]
    LengthMismatch {
        /// Name of the destination field.
        field: &'static str,
        /// Declared field length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// The party count byte claims more members than a party can hold.
    #[error("party count {0} exceeds the six-member party")]
    PartyTooLarge(u8),
    /// A state file is too short to hold every modelled field.
    #[error("snapshot is {actual} bytes, at least {required} required")]
    Truncated {
        /// Minimum snapshot size.
        required: usize,
        /// Size of the data supplied.
        actual: usize,
    },
}

/// Result type for snapshot field accesses.
pub type LayoutResult<T> = Result<T, LayoutError>;
