//! In-game text encoding.
//!
//! The game uses its own single-byte character set. Display decoding is
//! total: bytes without a glyph render as `[0x..]`. Encoding is strict,
//! since a placeholder must never be written back into game memory.

use crate::memory::layout::NAME_TERMINATOR;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from encoding text into game bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    /// A character of the input has no byte in the character map.
    #[error("character {ch:?} in {text:?} has no in-game encoding")]
    UnmappedGlyph {
        /// The offending character.
        ch: char,
        /// The full input.
        text: String,
    },
}

/// Bidirectional byte ⇄ glyph table.
#[derive(Debug, Clone, Default)]
pub struct Charmap {
    glyphs: HashMap<u8, String>,
    codes: HashMap<String, u8>,
}

impl Charmap {
    /// Build from byte → glyph pairs. Later duplicates of a glyph win the
    /// reverse lookup.
    #[must_use]
    pub fn new(glyphs: HashMap<u8, String>) -> Self {
        let codes = glyphs.iter().map(|(&b, g)| (g.clone(), b)).collect();
        Self { glyphs, codes }
    }

    /// Glyph for one byte, if mapped.
    #[must_use]
    pub fn glyph(&self, byte: u8) -> Option<&str> {
        self.glyphs.get(&byte).map(String::as_str)
    }

    /// Render every byte for display.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        for &b in bytes {
            match self.glyph(b) {
                Some(glyph) => out.push_str(glyph),
                None => out.push_str(&format!("[0x{b:x}]")),
            }
        }
        out
    }

    /// Render a name field, stopping at the first terminator.
    #[must_use]
    pub fn decode_name(&self, bytes: &[u8]) -> String {
        let end = bytes
            .iter()
            .position(|&b| b == NAME_TERMINATOR)
            .unwrap_or(bytes.len());
        self.decode(&bytes[..end])
    }

    /// Encode `name` into exactly `length` bytes.
    ///
    /// Characters past `length` are dropped; positions past the end of the
    /// name are filled with the terminator.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::UnmappedGlyph`] if a kept character has no code.
    pub fn encode_name(&self, name: &str, length: usize) -> Result<Vec<u8>, TextError> {
        let mut out = Vec::with_capacity(length);
        for ch in name.chars().take(length) {
            let mut buf = [0u8; 4];
            let code = self
                .codes
                .get(ch.encode_utf8(&mut buf) as &str)
                .ok_or_else(|| TextError::UnmappedGlyph {
                    ch,
                    text: name.to_string(),
                })?;
            out.push(*code);
        }
        out.resize(length, NAME_TERMINATOR);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charmap() -> Charmap {
        let mut glyphs = HashMap::new();
        for (i, ch) in ('A'..='Z').enumerate() {
            glyphs.insert(0x80 + i as u8, ch.to_string());
        }
        glyphs.insert(0x7F, " ".to_string());
        Charmap::new(glyphs)
    }

    #[test]
    fn test_encode_pads_with_terminator() {
        let bytes = charmap().encode_name("ABC", 6).unwrap();
        assert_eq!(bytes, vec![0x80, 0x81, 0x82, 0x50, 0x50, 0x50]);
    }

    #[test]
    fn test_encode_truncates_long_names() {
        let bytes = charmap().encode_name("BUTTERFREE", 4).unwrap();
        assert_eq!(bytes, vec![0x81, 0x94, 0x93, 0x93]);
    }

    #[test]
    fn test_encode_rejects_unmapped() {
        let err = charmap().encode_name("Ab", 4).unwrap_err();
        assert!(matches!(err, TextError::UnmappedGlyph { ch: 'b', .. }));
    }

    #[test]
    fn test_unmapped_only_beyond_width_is_fine() {
        // Truncated characters are never looked up
        assert!(charmap().encode_name("ABc", 2).is_ok());
    }

    #[test]
    fn test_decode_placeholder() {
        assert_eq!(charmap().decode(&[0x80, 0x01, 0x81]), "A[0x1]B");
    }

    #[test]
    fn test_decode_name_stops_at_terminator() {
        let cm = charmap();
        let bytes = cm.encode_name("RED", 11).unwrap();
        assert_eq!(cm.decode_name(&bytes), "RED");
        // Raw decode shows the padding
        assert!(cm.decode(&bytes).ends_with("[0x50]"));
    }
}
