//! Error types shared by every codec.
//!
//! Configuration problems are reported when a codec is built; data problems
//! are reported from `encode`/`decode`. Nothing in the crate panics on bad
//! input.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A codec could not be built from the supplied parameters.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The source contains a symbol that has no codeword.
    #[error("symbol {symbol:?} at position {position} is not in the alphabet")]
    OutOfAlphabetSymbol { symbol: char, position: usize },

    /// The code cannot be parsed.
    #[error("malformed code: {0}")]
    MalformedCode(#[from] MalformedCode),

    /// An LZW index is neither registered nor the next free index.
    #[error("dictionary desync at bit {position}: index {index}, next free index {next}")]
    Desync {
        position: usize,
        index: u32,
        next: u32,
    },
}

/// Invalid codec parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("alphabet is empty")]
    EmptyAlphabet,

    #[error("symbol {0:?} appears more than once in the alphabet")]
    DuplicateSymbol(char),

    #[error("dictionary size {0} is not a power of two")]
    DictionarySizeNotPowerOfTwo(usize),

    /// The dictionary cannot hold every alphabet symbol.
    #[error("dictionary size {size} is too small for an alphabet of {alphabet} symbols")]
    DictionaryTooSmall { size: usize, alphabet: usize },

    #[error("invalid codeword widths: initial {initial}, max {max}")]
    InvalidCodeWidth { initial: u32, max: u32 },

    /// Alphabet indices do not fit in the initial codeword width.
    #[error("alphabet of {alphabet} symbols does not fit in {bits}-bit codewords")]
    AlphabetTooLarge { alphabet: usize, bits: u32 },

    #[error("compression threshold {0} must be finite and non-negative")]
    InvalidThreshold(f64),
}

/// Ways a code can fail to parse. `position` is always a bit offset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedCode {
    #[error("{remaining} trailing bits at bit {position} do not fill a {width}-bit codeword")]
    Misaligned {
        position: usize,
        remaining: usize,
        width: u32,
    },

    #[error("unknown {width}-bit codeword {value} at bit {position}")]
    UnknownCodeword {
        position: usize,
        value: u64,
        width: u32,
    },

    #[error("code ends inside a codeword: {leftover} dangling bits at bit {position}")]
    Truncated { position: usize, leftover: usize },

    #[error("resize at bit {position} past the maximum width of {width} bits")]
    UnexpectedResize { position: usize, width: u32 },

    /// Textual codes may only contain `0` and `1`.
    #[error("invalid bit character {found:?} at position {position}")]
    InvalidBit { position: usize, found: char },
}
