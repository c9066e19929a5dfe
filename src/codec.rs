use crate::code::Code;
use crate::error::Result;

/// Bits per symbol of uncompressed text, one byte per character.
pub const UNCOMPRESSED_SYMBOL_BITS: usize = 8;

/// Encode/decode capability shared by every scheme.
///
/// For any source built only from the codec's alphabet,
/// `decode(&encode(source)?)? == source`.
pub trait Codec {
    /// Compresses `source` into a bit-string.
    fn encode(&self, source: &str) -> Result<Code>;

    /// Restores the text a code was produced from.
    fn decode(&self, code: &Code) -> Result<String>;

    /// Encodes `source` and measures the result.
    fn stats(&self, source: &str) -> Result<CompressionStats> {
        let code = self.encode(source)?;
        Ok(CompressionStats::measure(source, &code))
    }
}

/// Statistics about one encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    /// Number of symbols in the source
    pub source_symbols: usize,
    /// Size of the source at one byte per symbol
    pub uncompressed_bits: usize,
    /// Size of the code
    pub code_bits: usize,
}

impl CompressionStats {
    pub fn measure(source: &str, code: &Code) -> Self {
        let source_symbols = source.chars().count();
        Self {
            source_symbols,
            uncompressed_bits: source_symbols * UNCOMPRESSED_SYMBOL_BITS,
            code_bits: code.len(),
        }
    }

    /// Uncompressed size divided by compressed size; 0 for an empty code.
    pub fn compression_ratio(&self) -> f64 {
        if self.code_bits == 0 {
            0.0
        } else {
            self.uncompressed_bits as f64 / self.code_bits as f64
        }
    }

    /// Average code bits spent per source symbol.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.source_symbols == 0 {
            0.0
        } else {
            self.code_bits as f64 / self.source_symbols as f64
        }
    }
}
