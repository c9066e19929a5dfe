//! Adaptive LZW coding with dynamic codeword width.
//!
//! Nothing is trained: the dictionary starts with one entry per alphabet
//! symbol and grows while a call runs, identically on both sides. Two indices
//! are reserved for control codes:
//!
//! - [`RESIZE`] (0) is written at the old width just before the width grows.
//! - [`FLUSH`] (1) resets the dictionary when compression has degraded.
//!
//! Alphabet symbols occupy indices `2..a + 2`.
//!
//! # Example
//!
//! ```
//! use tamp_rs::{Alphabet, Codec, LzwCodec};
//!
//! let codec = LzwCodec::new(Alphabet::printable_ascii(), 12, 1.0).unwrap();
//! let code = codec.encode("TOBEORNOTTOBEORTOBEORNOT").unwrap();
//! assert_eq!(codec.decode(&code).unwrap(), "TOBEORNOTTOBEORTOBEORNOT");
//! ```

use crate::alphabet::Alphabet;
use crate::code::{Code, CodeReader};
use crate::codec::{Codec, UNCOMPRESSED_SYMBOL_BITS};
use crate::error::{ConfigError, Error, MalformedCode, Result};
use ahash::AHashMap as HashMap;
use log::{debug, warn};

/// Control code announcing a one-bit width increase.
pub const RESIZE: u64 = 0;
/// Control code announcing a dictionary reset.
pub const FLUSH: u64 = 1;
/// Initial codeword width when none is given.
pub const DEFAULT_INITIAL_BITS: u32 = 8;
/// Largest supported codeword width.
pub const MAX_SUPPORTED_BITS: u32 = 24;

const FIRST_INDEX: u32 = 2;

/// LZW parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LzwConfig {
    /// Codeword width at the start of a call and after every flush
    pub initial_bits: u32,
    /// Width at which the dictionary stops growing
    pub max_bits: u32,
    /// Minimum compression ratio tolerated once the dictionary is full
    pub compression_threshold: f64,
}

impl LzwConfig {
    pub fn new(max_bits: u32, compression_threshold: f64) -> Self {
        Self {
            initial_bits: DEFAULT_INITIAL_BITS,
            max_bits,
            compression_threshold,
        }
    }

    pub fn with_initial_bits(mut self, initial_bits: u32) -> Self {
        self.initial_bits = initial_bits;
        self
    }

    fn validate(&self, alphabet: &Alphabet) -> Result<()> {
        if self.initial_bits < 2
            || self.initial_bits > self.max_bits
            || self.max_bits > MAX_SUPPORTED_BITS
        {
            return Err(ConfigError::InvalidCodeWidth {
                initial: self.initial_bits,
                max: self.max_bits,
            }
            .into());
        }
        if alphabet.len() as u64 + u64::from(FIRST_INDEX) > 1u64 << self.initial_bits {
            return Err(ConfigError::AlphabetTooLarge {
                alphabet: alphabet.len(),
                bits: self.initial_bits,
            }
            .into());
        }
        if !self.compression_threshold.is_finite() || self.compression_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.compression_threshold).into());
        }
        Ok(())
    }

    /// Number of dictionary indices usable at `width` bits.
    fn limit(width: u32) -> u32 {
        (1u32 << width) - 2
    }
}

impl Default for LzwConfig {
    fn default() -> Self {
        Self::new(12, 1.0)
    }
}

/// What happened during one encode or decode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LzwTrace {
    /// Data codewords, excluding control codes
    pub codewords: usize,
    pub resizes: usize,
    pub flushes: usize,
    /// Source symbols removed because they are not in the alphabet
    pub dropped: usize,
    /// Codeword width when the call finished
    pub final_width: u32,
}

/// LZW codec. Holds only configuration, so it is safe to share.
#[derive(Debug, Clone)]
pub struct LzwCodec {
    alphabet: Alphabet,
    config: LzwConfig,
}

impl LzwCodec {
    /// Codec with the default initial width of 8 bits.
    pub fn new(alphabet: Alphabet, max_bits: u32, compression_threshold: f64) -> Result<Self> {
        Self::with_config(alphabet, LzwConfig::new(max_bits, compression_threshold))
    }

    pub fn with_config(alphabet: Alphabet, config: LzwConfig) -> Result<Self> {
        config.validate(&alphabet)?;
        Ok(Self { alphabet, config })
    }

    pub fn config(&self) -> &LzwConfig {
        &self.config
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Encodes `source`, dropping symbols outside the alphabet.
    pub fn encode_traced(&self, source: &str) -> (Code, LzwTrace) {
        let symbols: Vec<char> = source
            .chars()
            .filter(|&symbol| self.alphabet.contains(symbol))
            .collect();

        let mut encoder = Encoder::new(self);
        encoder.trace.dropped = source.chars().count() - symbols.len();

        let Some((&first, rest)) = symbols.split_first() else {
            return encoder.finish();
        };

        let mut pattern = encoder.single(first);
        let mut pattern_len = 1;
        for &symbol in rest {
            if let Some(&index) = encoder.entries.get(&(pattern, symbol)) {
                pattern = index;
                pattern_len += 1;
                continue;
            }

            encoder.miss(pattern, pattern_len, symbol);
            pattern = encoder.single(symbol);
            pattern_len = 1;
        }

        encoder.emit_data(pattern, pattern_len);
        encoder.finish()
    }

    /// Decodes `code`, following every control code it carries.
    pub fn decode_traced(&self, code: &Code) -> Result<(String, LzwTrace)> {
        let capacity = LzwConfig::limit(self.config.max_bits);
        let mut table = DecoderTable::new(&self.alphabet);
        let mut width = self.config.initial_bits;
        let mut previous: Option<u32> = None;
        let mut trace = LzwTrace::default();

        let mut reader = CodeReader::new(code);
        let mut output = String::new();
        let mut scratch = Vec::new();

        // Data codewords are never zero, so an all-zero tail is padding
        while !reader.rest_is_padding() {
            let position = reader.position();
            let Some(word) = reader.read_word(width)? else {
                break;
            };

            match word {
                RESIZE => {
                    if width >= self.config.max_bits {
                        return Err(MalformedCode::UnexpectedResize { position, width }.into());
                    }
                    width += 1;
                    trace.resizes += 1;
                    continue;
                }
                FLUSH => {
                    table.reset();
                    width = self.config.initial_bits;
                    previous = None;
                    trace.flushes += 1;
                    continue;
                }
                _ => {}
            }

            // Widths are capped well below 32 bits
            let index = word as u32;
            let next = table.next_index();
            if index < next {
                if let Some(prev) = previous {
                    if next < capacity {
                        table.push(prev, table.first_symbol(index));
                    }
                }
            } else if index == next {
                // Self-referential entry: previous pattern plus its own first symbol
                let prev = match previous {
                    Some(prev) if next < capacity => prev,
                    _ => return Err(Error::Desync { position, index, next }),
                };
                table.push(prev, table.first_symbol(prev));
            } else {
                return Err(Error::Desync { position, index, next });
            }

            table.expand(index, &mut scratch);
            output.extend(scratch.iter());
            previous = Some(index);
            trace.codewords += 1;
        }

        trace.final_width = width;
        Ok((output, trace))
    }
}

impl Codec for LzwCodec {
    fn encode(&self, source: &str) -> Result<Code> {
        let (code, trace) = self.encode_traced(source);
        if trace.dropped > 0 {
            warn!("lzw encode dropped {} symbols outside the alphabet", trace.dropped);
        }
        debug!(
            "lzw encode: {} codewords, {} resizes, {} flushes, final width {}",
            trace.codewords, trace.resizes, trace.flushes, trace.final_width
        );
        Ok(code)
    }

    fn decode(&self, code: &Code) -> Result<String> {
        let (output, trace) = self.decode_traced(code)?;
        debug!(
            "lzw decode: {} codewords, {} resizes, {} flushes, final width {}",
            trace.codewords, trace.resizes, trace.flushes, trace.final_width
        );
        Ok(output)
    }
}

/// Encoder working state for a single call.
struct Encoder<'a> {
    alphabet: &'a Alphabet,
    config: &'a LzwConfig,
    /// (prefix index, appended symbol) -> index
    entries: HashMap<(u32, char), u32>,
    next: u32,
    width: u32,
    code: Code,
    trace: LzwTrace,
    /// Uncompressed bits covered since the last flush
    covered_bits: usize,
    /// Bits written since the last flush
    emitted_bits: usize,
}

impl<'a> Encoder<'a> {
    fn new(codec: &'a LzwCodec) -> Self {
        Self {
            alphabet: &codec.alphabet,
            config: &codec.config,
            entries: HashMap::new(),
            next: FIRST_INDEX + codec.alphabet.len() as u32,
            width: codec.config.initial_bits,
            code: Code::new(),
            trace: LzwTrace::default(),
            covered_bits: 0,
            emitted_bits: 0,
        }
    }

    /// Index of a single alphabet symbol. Callers filter the source first.
    fn single(&self, symbol: char) -> u32 {
        let index = self.alphabet.index_of(symbol).unwrap_or_default();
        FIRST_INDEX + index as u32
    }

    fn capacity(&self) -> u32 {
        LzwConfig::limit(self.config.max_bits)
    }

    /// Handles a pattern that fell out of the dictionary when `symbol` was appended.
    fn miss(&mut self, pattern: u32, pattern_len: usize, symbol: char) {
        if self.width < self.config.max_bits && self.next >= LzwConfig::limit(self.width) {
            self.emit(RESIZE);
            self.width += 1;
            self.trace.resizes += 1;
        }

        if self.next < self.capacity() {
            self.entries.insert((pattern, symbol), self.next);
            self.next += 1;
        }

        self.emit_data(pattern, pattern_len);

        if self.saturated() && self.ratio() < self.config.compression_threshold {
            self.emit(FLUSH);
            self.trace.flushes += 1;
            self.reset();
        }
    }

    fn saturated(&self) -> bool {
        self.width == self.config.max_bits && self.next >= self.capacity()
    }

    fn ratio(&self) -> f64 {
        if self.emitted_bits == 0 {
            return f64::INFINITY;
        }
        self.covered_bits as f64 / self.emitted_bits as f64
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.next = FIRST_INDEX + self.alphabet.len() as u32;
        self.width = self.config.initial_bits;
        self.covered_bits = 0;
        self.emitted_bits = 0;
    }

    fn emit(&mut self, value: u64) {
        self.code.push_word(value, self.width);
        self.emitted_bits += self.width as usize;
    }

    fn emit_data(&mut self, index: u32, pattern_len: usize) {
        self.emit(u64::from(index));
        self.covered_bits += pattern_len * UNCOMPRESSED_SYMBOL_BITS;
        self.trace.codewords += 1;
    }

    fn finish(mut self) -> (Code, LzwTrace) {
        self.trace.final_width = self.width;
        (self.code, self.trace)
    }
}

/// Decoder dictionary. Each entry is stored as its prefix plus one symbol.
struct DecoderTable {
    /// Entry for index `FIRST_INDEX + i`
    entries: Vec<DecoderEntry>,
    alphabet_len: usize,
}

#[derive(Debug, Clone, Copy)]
struct DecoderEntry {
    prefix: Option<u32>,
    symbol: char,
    first: char,
}

impl DecoderTable {
    fn new(alphabet: &Alphabet) -> Self {
        let entries = alphabet
            .iter()
            .map(|symbol| DecoderEntry {
                prefix: None,
                symbol,
                first: symbol,
            })
            .collect();
        Self {
            entries,
            alphabet_len: alphabet.len(),
        }
    }

    fn reset(&mut self) {
        self.entries.truncate(self.alphabet_len);
    }

    fn next_index(&self) -> u32 {
        FIRST_INDEX + self.entries.len() as u32
    }

    fn entry(&self, index: u32) -> DecoderEntry {
        self.entries[(index - FIRST_INDEX) as usize]
    }

    fn first_symbol(&self, index: u32) -> char {
        self.entry(index).first
    }

    fn push(&mut self, prefix: u32, symbol: char) {
        let first = self.first_symbol(prefix);
        self.entries.push(DecoderEntry {
            prefix: Some(prefix),
            symbol,
            first,
        });
    }

    /// Writes the pattern of `index` into `out`.
    fn expand(&self, index: u32, out: &mut Vec<char>) {
        out.clear();
        let mut current = Some(index);
        while let Some(i) = current {
            let entry = self.entry(i);
            out.push(entry.symbol);
            current = entry.prefix;
        }
        out.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab_codec(initial_bits: u32, max_bits: u32, threshold: f64) -> LzwCodec {
        let alphabet = Alphabet::new("ab".chars()).unwrap();
        let config = LzwConfig::new(max_bits, threshold).with_initial_bits(initial_bits);
        LzwCodec::with_config(alphabet, config).unwrap()
    }

    /// Deterministic pseudo-random text over `symbols`.
    fn noise(symbols: &[char], len: usize) -> String {
        let mut seed = 12345u64;
        (0..len)
            .map(|_| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                symbols[((seed >> 16) % symbols.len() as u64) as usize]
            })
            .collect()
    }

    #[test]
    fn test_single_resize_on_repeated_pattern() {
        let codec = ab_codec(3, 6, 1.0);
        let source = "ab".repeat(8);

        let (code, trace) = codec.encode_traced(&source);
        assert_eq!(trace.resizes, 1);
        assert_eq!(trace.flushes, 0);
        assert_eq!(trace.codewords, 7);
        assert_eq!(trace.final_width, 4);
        // a b RESIZE ab aba ba bab abab
        assert_eq!(code.to_string(), "01001100001000110010110000111");

        let (decoded, decode_trace) = codec.decode_traced(&code).unwrap();
        assert_eq!(decoded, source);
        assert_eq!(decode_trace.resizes, 1);
        assert_eq!(decode_trace.codewords, 7);
    }

    #[test]
    fn test_self_referential_entry() {
        let codec = ab_codec(3, 6, 1.0);
        // "aaa" is coded as a, then index 4 before the decoder has registered it
        let (code, _) = codec.encode_traced("aaaa");
        assert_eq!(code.to_string(), "010100010");
        assert_eq!(codec.decode(&code).unwrap(), "aaaa");
    }

    #[test]
    fn test_empty_source() {
        let codec = ab_codec(3, 6, 1.0);
        let code = codec.encode("").unwrap();
        assert!(code.is_empty());
        assert_eq!(codec.decode(&code).unwrap(), "");
    }

    #[test]
    fn test_symbols_outside_alphabet_dropped() {
        let codec = ab_codec(3, 6, 1.0);
        let (code, trace) = codec.encode_traced("a-b?ba");
        assert_eq!(trace.dropped, 2);
        assert_eq!(codec.decode(&code).unwrap(), "abba");
    }

    #[test]
    fn test_flush_under_high_threshold() {
        let codec = ab_codec(3, 4, 100.0);
        let source = noise(&['a', 'b'], 500);

        let (code, trace) = codec.encode_traced(&source);
        assert!(trace.flushes > 0, "expected at least one flush");

        let (decoded, decode_trace) = codec.decode_traced(&code).unwrap();
        assert_eq!(decoded, source);
        assert_eq!(decode_trace.flushes, trace.flushes);
        assert_eq!(decode_trace.resizes, trace.resizes);
    }

    #[test]
    fn test_no_flush_under_zero_threshold() {
        let codec = ab_codec(3, 4, 0.0);
        let source = noise(&['a', 'b'], 500);

        let (code, trace) = codec.encode_traced(&source);
        assert_eq!(trace.flushes, 0);
        assert_eq!(trace.final_width, 4);
        assert_eq!(codec.decode(&code).unwrap(), source);
    }

    #[test]
    fn test_reference_alphabet_roundtrip() {
        let codec = LzwCodec::new(Alphabet::printable_ascii(), 12, 1.0).unwrap();
        let source = "It was the best of times, it was the worst of times,\n\
                      it was the age of wisdom, it was the age of foolishness,\n"
            .repeat(40);

        let (code, trace) = codec.encode_traced(&source);
        assert!(trace.resizes >= 1);
        assert!(code.len() < source.len() * 8);
        assert_eq!(codec.decode(&code).unwrap(), source);
    }

    #[test]
    fn test_padding_tolerated() {
        let codec = ab_codec(3, 6, 1.0);
        let source = "ab".repeat(8);
        let code = codec.encode(&source).unwrap();

        let restored = Code::from_bytes(&code.to_bytes());
        assert!(restored.len() > code.len());
        assert_eq!(codec.decode(&restored).unwrap(), source);
    }

    #[test]
    fn test_misaligned_code() {
        let codec = ab_codec(3, 6, 1.0);
        let code: Code = "01001".parse().unwrap();
        assert_eq!(
            codec.decode(&code).unwrap_err(),
            Error::MalformedCode(MalformedCode::Misaligned {
                position: 3,
                remaining: 2,
                width: 3
            })
        );
    }

    #[test]
    fn test_unregistered_index_desyncs() {
        let codec = ab_codec(3, 6, 1.0);
        let code: Code = "111".parse().unwrap();
        assert_eq!(
            codec.decode(&code).unwrap_err(),
            Error::Desync {
                position: 0,
                index: 7,
                next: 4
            }
        );
    }

    #[test]
    fn test_self_reference_without_previous_desyncs() {
        let codec = ab_codec(3, 6, 1.0);
        let code: Code = "100".parse().unwrap();
        assert_eq!(
            codec.decode(&code).unwrap_err(),
            Error::Desync {
                position: 0,
                index: 4,
                next: 4
            }
        );
    }

    #[test]
    fn test_resize_past_max_rejected() {
        let codec = ab_codec(3, 3, 1.0);
        let code: Code = "000010".parse().unwrap();
        assert_eq!(
            codec.decode(&code).unwrap_err(),
            Error::MalformedCode(MalformedCode::UnexpectedResize {
                position: 0,
                width: 3
            })
        );
    }

    #[test]
    fn test_config_validation() {
        let ab = || Alphabet::new("ab".chars()).unwrap();

        assert_eq!(
            LzwCodec::with_config(ab(), LzwConfig::new(6, 1.0).with_initial_bits(7)).unwrap_err(),
            Error::Configuration(ConfigError::InvalidCodeWidth { initial: 7, max: 6 })
        );
        assert!(LzwCodec::new(ab(), 25, 1.0).is_err());
        assert!(LzwCodec::with_config(ab(), LzwConfig::new(6, 1.0).with_initial_bits(1)).is_err());
        assert_eq!(
            LzwCodec::new(ab(), 12, f64::NAN).unwrap_err().to_string(),
            "configuration error: compression threshold NaN must be finite and non-negative"
        );
        assert_eq!(
            LzwCodec::new(ab(), 12, -1.0).unwrap_err(),
            Error::Configuration(ConfigError::InvalidThreshold(-1.0))
        );

        let abc = Alphabet::new("abc".chars()).unwrap();
        assert_eq!(
            LzwCodec::with_config(abc, LzwConfig::new(6, 1.0).with_initial_bits(2)).unwrap_err(),
            Error::Configuration(ConfigError::AlphabetTooLarge {
                alphabet: 3,
                bits: 2
            })
        );
    }

    #[test]
    fn test_default_config() {
        let config = LzwConfig::default();
        assert_eq!(config.initial_bits, 8);
        assert_eq!(config.max_bits, 12);
        assert!(LzwCodec::with_config(Alphabet::printable_ascii(), config).is_ok());
    }
}
