//! # tamp - Text Compression Codecs
//!
//! Three independent text-compression schemes behind one [`Codec`] trait:
//!
//! 1. **Digram coding** ([`DigramCodec`]): fixed-width codewords for every
//!    alphabet symbol plus the most frequent digrams of a training corpus
//! 2. **Huffman coding** ([`HuffmanCodec`]): variable-width prefix-free
//!    codewords from symbol frequencies of a training corpus
//! 3. **LZW coding** ([`LzwCodec`]): an adaptive dictionary with dynamic
//!    codeword width and in-band RESIZE/FLUSH control codes
//!
//! Every codec maps text to a [`Code`] bit-string and back. Trained codecs
//! are immutable and can be shared across threads.
//!
//! ## Example
//!
//! ```
//! use tamp_rs::{Alphabet, Code, Codec, HuffmanCodec};
//!
//! let corpus = "the quick brown fox jumps over the lazy dog";
//! let codec = HuffmanCodec::train(Alphabet::printable_ascii(), corpus).unwrap();
//!
//! let code = codec.encode("the lazy fox").unwrap();
//! let stored = code.to_bytes();
//!
//! let restored = Code::from_bytes(&stored);
//! assert!(restored.len() - code.len() < 8);
//! assert_eq!(codec.decode(&code).unwrap(), "the lazy fox");
//! ```
//!
//! ## Errors
//!
//! Codecs never silently skip data they cannot represent: out-of-alphabet
//! symbols, misaligned or truncated codes and desynchronized LZW indices are
//! all reported through [`Error`]. The one exception is LZW, which filters
//! out-of-alphabet symbols before encoding and logs how many it dropped.

mod alphabet;
mod code;
mod codec;
mod digram;
mod error;
mod huffman;
pub mod lzw;


pub use alphabet::Alphabet;
pub use code::{Bits, Code};
pub use codec::{Codec, CompressionStats, UNCOMPRESSED_SYMBOL_BITS};
pub use digram::DigramCodec;
pub use error::{ConfigError, Error, MalformedCode, Result};
pub use huffman::HuffmanCodec;
pub use lzw::{LzwCodec, LzwConfig, LzwTrace};
