//! Snapshot address space.
//!
//! A bgb save state is a flat byte buffer. Emulator registers (program
//! counter, divider, clock counter) sit at fixed offsets near the start of
//! the file, and the game's work RAM follows at a fixed base so that
//! `index = address - BASE_OFFSET`. Every read and write in the crate goes
//! through a [`Field`] and is bounds-checked against the buffer; nothing
//! outside this module does address arithmetic.

pub mod layout;

use crate::error::{AccessType, LayoutError, LayoutResult};
use std::fs;
use std::io;
use std::path::Path;

/// Buffer index of work-RAM address zero inside a save state.
pub const BASE_OFFSET: usize = 0xBBC3;

/// Which address space a [`Field`] is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    /// Game Boy bus address, rebased by [`BASE_OFFSET`].
    Wram,
    /// Raw offset into the save-state file.
    Header,
}

/// A named region of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    /// Human-readable name used in error messages.
    pub name: &'static str,
    /// Address space of `addr`.
    pub space: Space,
    /// Absolute address (work RAM) or file offset (header).
    pub addr: usize,
    /// Width in bytes.
    pub len: usize,
}

impl Field {
    /// A work-RAM field at bus address `addr`.
    #[must_use]
    pub const fn wram(name: &'static str, addr: u16, len: usize) -> Self {
        Self {
            name,
            space: Space::Wram,
            addr: addr as usize,
            len,
        }
    }

    /// A save-state header field at file offset `offset`.
    #[must_use]
    pub const fn header(name: &'static str, offset: usize, len: usize) -> Self {
        Self {
            name,
            space: Space::Header,
            addr: offset,
            len,
        }
    }

    /// Buffer index of the first byte, or `None` for a work-RAM address
    /// below [`BASE_OFFSET`], which no save state holds.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self.space {
            Space::Wram => self.addr.checked_sub(BASE_OFFSET),
            Space::Header => Some(self.addr),
        }
    }

    /// Buffer index one past the last byte.
    #[must_use]
    pub const fn end(&self) -> Option<usize> {
        match self.index() {
            Some(index) => index.checked_add(self.len),
            None => None,
        }
    }

    /// The `i`-th element of an array field whose entries are `size` bytes.
    #[must_use]
    pub const fn element(&self, i: usize, size: usize) -> Self {
        Self {
            addr: self.addr + i * size,
            len: size,
            ..*self
        }
    }

    /// The first `len` bytes of this field.
    #[must_use]
    pub const fn prefix(&self, len: usize) -> Self {
        Self { len, ..*self }
    }

    /// A `len`-byte window starting `offset` bytes into this field.
    #[must_use]
    pub const fn slice(&self, offset: usize, len: usize) -> Self {
        Self {
            addr: self.addr + offset,
            len,
            ..*self
        }
    }
}

/// An in-memory save state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    data: Vec<u8>,
}

impl Snapshot {
    /// Wrap raw save-state bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Truncated`] if the buffer cannot hold every
    /// field in [`layout`].
    pub fn from_bytes(data: Vec<u8>) -> LayoutResult<Self> {
        if data.len() < layout::SNAPSHOT_MIN_LEN {
            return Err(LayoutError::Truncated {
                required: layout::SNAPSHOT_MIN_LEN,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    /// A zero-filled snapshot just large enough for every modelled field.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            data: vec![0; layout::SNAPSHOT_MIN_LEN],
        }
    }

    /// Read a save state from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is too short.
    pub fn load(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write the save state to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, &self.data)
    }

    /// Size of the buffer in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty. Never true for a validated snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw bytes, as written to a state file.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn check_bounds(&self, field: Field, access: AccessType) -> LayoutResult<usize> {
        let index = field.index();
        match (index, field.end()) {
            (Some(index), Some(end)) if end <= self.data.len() => Ok(index),
            _ => Err(LayoutError::OutOfRange {
                field: field.name,
                index: index.unwrap_or(0),
                len: field.len,
                size: self.data.len(),
                access,
            }),
        }
    }

    /// Borrow the bytes of a field.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfRange`] if the field does not fit.
    pub fn read(&self, field: Field) -> LayoutResult<&[u8]> {
        let index = self.check_bounds(field, AccessType::Read)?;
        Ok(&self.data[index..index + field.len])
    }

    /// Overwrite a field. `bytes` must be exactly `field.len` long.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::LengthMismatch`] or [`LayoutError::OutOfRange`].
    pub fn write(&mut self, field: Field, bytes: &[u8]) -> LayoutResult<()> {
        if bytes.len() != field.len {
            return Err(LayoutError::LengthMismatch {
                field: field.name,
                expected: field.len,
                actual: bytes.len(),
            });
        }
        let index = self.check_bounds(field, AccessType::Write)?;
        self.data[index..index + field.len].copy_from_slice(bytes);
        Ok(())
    }

    /// Copy `src` of `source` into `dest` of `self`.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the widths differ or either side is out
    /// of range.
    pub fn copy_from(&mut self, dest: Field, source: &Snapshot, src: Field) -> LayoutResult<()> {
        if src.len != dest.len {
            return Err(LayoutError::LengthMismatch {
                field: dest.name,
                expected: dest.len,
                actual: src.len,
            });
        }
        let bytes = source.read(src)?;
        self.write(dest, bytes)
    }

    /// Read a one-byte field.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the field is out of range.
    pub fn read_u8(&self, field: Field) -> LayoutResult<u8> {
        Ok(self.read(field.prefix(1))?[0])
    }

    /// Write a one-byte field.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the field is out of range.
    pub fn write_u8(&mut self, field: Field, value: u8) -> LayoutResult<()> {
        self.write(field.prefix(1), &[value])
    }

    /// Program counter at the moment the state was saved.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the header is out of range.
    pub fn program_counter(&self) -> LayoutResult<u16> {
        let bytes = self.read(layout::PROGRAM_COUNTER)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Elapsed emulated clock cycles since power-on.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the header is out of range.
    pub fn total_clocks(&self) -> LayoutResult<u64> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.read(layout::TOTAL_CLOCKS)?);
        Ok(u64::from_le_bytes(bytes))
    }

    /// Number of members in the player party.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::PartyTooLarge`] for a count above six.
    pub fn party_count(&self, field: Field) -> LayoutResult<usize> {
        let count = self.read_u8(field)?;
        if usize::from(count) > layout::PARTY_LENGTH {
            return Err(LayoutError::PartyTooLarge(count));
        }
        Ok(usize::from(count))
    }

    /// Current HP of party member `slot`.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the slot is outside the party array.
    pub fn party_member_hp(&self, slot: usize) -> LayoutResult<u16> {
        if slot >= layout::PARTY_LENGTH {
            return Err(LayoutError::OutOfRange {
                field: layout::PARTY_MON_HP.name,
                index: slot,
                len: layout::PARTY_MON_HP.len,
                size: layout::PARTY_LENGTH,
                access: AccessType::Read,
            });
        }
        let hp = self.read(layout::PARTY_MON_HP.element(slot, layout::PARTY_STRUCT_SIZE).prefix(2))?;
        // HP is stored big-endian in party structs
        Ok(u16::from_be_bytes([hp[0], hp[1]]))
    }
}
