//! Bit-string model shared by every codec.
//!
//! A [`Code`] is an MSB-first sequence of bits. Codewords are written into it
//! as fixed-width big-endian integers or as raw bit paths, and read back with a
//! [`CodeReader`] cursor.
//!
//! The persisted form packs the bits into bytes and zero-pads the last byte.
//! There is no length field, so a decoder sees up to 7 extra zero bits after a
//! round trip through storage.

use crate::error::{Error, MalformedCode, Result};
use bitvec::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Backing storage for codes and variable-width codewords.
pub type Bits = BitVec<u8, Msb0>;

/// Padding added when packing never reaches a full byte.
const PAD_LIMIT: usize = 8;

/// Compressed form produced by [`Codec::encode`](crate::Codec::encode).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    bits: Bits,
}

impl Code {
    pub fn new() -> Self {
        Self { bits: Bits::new() }
    }

    /// Number of bits in the code.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_bitslice(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    /// Appends `value` as a zero-padded big-endian word of `width` bits.
    pub(crate) fn push_word(&mut self, value: u64, width: u32) {
        debug_assert!(width == 64 || value >> width == 0, "value wider than codeword");
        for shift in (0..width).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
    }

    /// Appends a variable-width codeword.
    pub(crate) fn push_bits(&mut self, bits: &BitSlice<u8, Msb0>) {
        self.bits.extend_from_bitslice(bits);
    }

    /// Packs the code MSB-first into bytes, zero-padding the final byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut padded = self.bits.clone();
        padded.resize(self.bits.len().div_ceil(8) * 8, false);
        padded.into_vec()
    }

    /// Expands every byte back into 8 bits. Padding is kept.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bits: bytes.view_bits::<Msb0>().to_bitvec(),
        }
    }
}

impl From<Bits> for Code {
    fn from(bits: Bits) -> Self {
        Self { bits }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().by_vals() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = Error;

    /// Parses a textual bit-string such as `"0110"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut bits = Bits::with_capacity(s.len());
        for (position, found) in s.chars().enumerate() {
            match found {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => return Err(MalformedCode::InvalidBit { position, found }.into()),
            }
        }
        Ok(Self { bits })
    }
}

/// Returns true when `bits` can only be storage padding.
pub(crate) fn is_padding(bits: &BitSlice<u8, Msb0>) -> bool {
    bits.len() < PAD_LIMIT && bits.not_any()
}

/// Forward-only cursor over a [`Code`].
pub(crate) struct CodeReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> CodeReader<'a> {
    pub(crate) fn new(code: &'a Code) -> Self {
        Self {
            bits: code.as_bitslice(),
            position: 0,
        }
    }

    /// Bit offset of the next read.
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// True when everything left could be storage padding.
    pub(crate) fn rest_is_padding(&self) -> bool {
        is_padding(&self.bits[self.position..])
    }

    pub(crate) fn read_bit(&mut self) -> Option<bool> {
        let bit = *self.bits.get(self.position)?;
        self.position += 1;
        Some(bit)
    }

    /// Reads the next fixed-width word.
    ///
    /// Returns `Ok(None)` at the end of the code, including when only padding
    /// is left. Any other remainder shorter than `width` is misaligned.
    pub(crate) fn read_word(&mut self, width: u32) -> Result<Option<u64>> {
        let rest = &self.bits[self.position..];
        if rest.is_empty() {
            return Ok(None);
        }

        let width_bits = width as usize;
        if rest.len() < width_bits {
            if is_padding(rest) {
                self.position = self.bits.len();
                return Ok(None);
            }
            return Err(MalformedCode::Misaligned {
                position: self.position,
                remaining: rest.len(),
                width,
            }
            .into());
        }

        let value = rest[..width_bits]
            .iter()
            .by_vals()
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit));
        self.position += width_bits;
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_word_zero_padded() {
        let mut code = Code::new();
        code.push_word(5, 4);
        code.push_word(0, 2);
        code.push_word(1, 1);
        assert_eq!(code.to_string(), "0101001");
        assert_eq!(code.len(), 7);
    }

    #[test]
    fn test_parse_roundtrip_text() {
        let code: Code = "1100101".parse().unwrap();
        assert_eq!(code.to_string(), "1100101");
    }

    #[test]
    fn test_parse_rejects_non_bits() {
        let err = "10x1".parse::<Code>().unwrap_err();
        assert_eq!(
            err,
            Error::MalformedCode(MalformedCode::InvalidBit {
                position: 2,
                found: 'x'
            })
        );
    }

    #[test]
    fn test_to_bytes_msb_first_with_padding() {
        let code: Code = "1010000011".parse().unwrap();
        assert_eq!(code.to_bytes(), vec![0b1010_0000, 0b1100_0000]);
    }

    #[test]
    fn test_from_bytes_keeps_padding() {
        let code: Code = "1010000011".parse().unwrap();
        let restored = Code::from_bytes(&code.to_bytes());
        assert_eq!(restored.len(), 16);
        assert_eq!(restored.to_string(), "1010000011000000");
    }

    #[test]
    fn test_empty_code_packs_to_nothing() {
        assert!(Code::new().to_bytes().is_empty());
        assert!(Code::from_bytes(&[]).is_empty());
    }

    #[test]
    fn test_reader_words() {
        let code: Code = "011100".parse().unwrap();
        let mut reader = CodeReader::new(&code);
        assert_eq!(reader.read_word(3), Ok(Some(0b011)));
        assert_eq!(reader.position(), 3);
        assert_eq!(reader.read_word(3), Ok(Some(0b100)));
        assert_eq!(reader.read_word(3), Ok(None));
    }

    #[test]
    fn test_reader_skips_padding() {
        let code: Code = "01100000".parse().unwrap();
        let mut reader = CodeReader::new(&code);
        assert_eq!(reader.read_word(3), Ok(Some(0b011)));
        assert_eq!(reader.read_word(3), Ok(Some(0)));
        assert_eq!(reader.read_word(3), Ok(None));
    }

    #[test]
    fn test_reader_misaligned() {
        let code: Code = "01101".parse().unwrap();
        let mut reader = CodeReader::new(&code);
        assert_eq!(reader.read_word(3), Ok(Some(0b011)));
        assert_eq!(
            reader.read_word(3),
            Err(Error::MalformedCode(MalformedCode::Misaligned {
                position: 3,
                remaining: 2,
                width: 3
            }))
        );
    }

    #[test]
    fn test_read_bit() {
        let code: Code = "10".parse().unwrap();
        let mut reader = CodeReader::new(&code);
        assert_eq!(reader.read_bit(), Some(true));
        assert_eq!(reader.read_bit(), Some(false));
        assert_eq!(reader.read_bit(), None);
    }
}
