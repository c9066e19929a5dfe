//! Fixed-width digram substitution coding.
//!
//! A dictionary of `D` codewords (a power of two) holds every alphabet symbol
//! followed by the `D - a` most frequent digrams of a training corpus. Every
//! codeword is `log2(D)` bits wide, so decoding is a fixed-stride split.
//!
//! # Example
//!
//! ```
//! use tamp_rs::{Alphabet, Codec, DigramCodec};
//!
//! let alphabet = Alphabet::new("ab".chars()).unwrap();
//! let codec = DigramCodec::train(alphabet, "aabab", 4).unwrap();
//!
//! let code = codec.encode("aabab").unwrap();
//! assert_eq!(code.to_string(), "110110");
//! assert_eq!(codec.decode(&code).unwrap(), "aabab");
//! ```

use crate::alphabet::Alphabet;
use crate::code::{Code, CodeReader};
use crate::codec::Codec;
use crate::error::{ConfigError, Error, MalformedCode, Result};
use ahash::AHashMap as HashMap;
use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

type Digram = [char; 2];

/// A digram with its corpus frequency, ordered for extraction from a max-heap.
#[derive(Debug, Clone, Eq, PartialEq)]
struct DigramRecord {
    frequency: usize,
    digram: Digram,
}

impl Ord for DigramRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher frequency first; ties go to the lexicographically smaller digram
        self.frequency
            .cmp(&other.frequency)
            .then_with(|| other.digram.cmp(&self.digram))
    }
}

impl PartialOrd for DigramRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Trained digram codec. Immutable and safe to share between threads.
#[derive(Debug, Clone)]
pub struct DigramCodec {
    alphabet: Alphabet,
    dictionary_size: usize,
    width: u32,
    /// Digram at codeword index `alphabet.len() + i`
    digrams: Vec<Digram>,
    digram_index: HashMap<Digram, u64>,
}

impl DigramCodec {
    /// Trains a dictionary of `dictionary_size` codewords from `corpus`.
    ///
    /// `dictionary_size` must be a power of two no smaller than the alphabet
    /// (and at least 2, so codewords have at least one bit).
    pub fn train(alphabet: Alphabet, corpus: &str, dictionary_size: usize) -> Result<Self> {
        if !dictionary_size.is_power_of_two() {
            return Err(ConfigError::DictionarySizeNotPowerOfTwo(dictionary_size).into());
        }
        if dictionary_size < 2 || dictionary_size < alphabet.len() {
            return Err(ConfigError::DictionaryTooSmall {
                size: dictionary_size,
                alphabet: alphabet.len(),
            }
            .into());
        }

        let frequencies = digram_frequencies(&alphabet, corpus);
        let digrams = most_frequent(frequencies, dictionary_size - alphabet.len());

        let digram_index = digrams
            .iter()
            .enumerate()
            .map(|(i, &digram)| (digram, (alphabet.len() + i) as u64))
            .collect();

        let width = dictionary_size.trailing_zeros();
        debug!(
            "trained digram dictionary: {} digrams in {} slots, {}-bit codewords",
            digrams.len(),
            dictionary_size - alphabet.len(),
            width
        );

        Ok(Self {
            alphabet,
            dictionary_size,
            width,
            digrams,
            digram_index,
        })
    }

    /// Codeword width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn dictionary_size(&self) -> usize {
        self.dictionary_size
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Trained digrams in codeword order, most frequent first.
    pub fn digrams(&self) -> impl Iterator<Item = String> + '_ {
        self.digrams.iter().map(|d| d.iter().collect())
    }

    /// Codeword index of a two-symbol string, if it was trained.
    pub fn digram_index(&self, digram: &str) -> Option<u64> {
        let mut chars = digram.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(first), Some(second), None) => self.digram_index.get(&[first, second]).copied(),
            _ => None,
        }
    }

    fn symbol_index(&self, symbol: char, position: usize) -> Result<u64> {
        self.alphabet
            .index_of(symbol)
            .map(|i| i as u64)
            .ok_or(Error::OutOfAlphabetSymbol { symbol, position })
    }
}

impl Codec for DigramCodec {
    fn encode(&self, source: &str) -> Result<Code> {
        let symbols: Vec<char> = source.chars().collect();
        let mut code = Code::new();

        let mut i = 0;
        while i < symbols.len() {
            // The last symbol has no lookahead and is always coded alone
            if let Some(&next) = symbols.get(i + 1) {
                if let Some(&index) = self.digram_index.get(&[symbols[i], next]) {
                    code.push_word(index, self.width);
                    i += 2;
                    continue;
                }
            }

            code.push_word(self.symbol_index(symbols[i], i)?, self.width);
            i += 1;
        }

        Ok(code)
    }

    fn decode(&self, code: &Code) -> Result<String> {
        let alphabet_len = self.alphabet.len() as u64;
        let mut reader = CodeReader::new(code);
        let mut output = String::new();

        loop {
            let position = reader.position();
            let Some(index) = reader.read_word(self.width)? else {
                break;
            };

            if index < alphabet_len {
                output.push(self.alphabet.symbols()[index as usize]);
            } else if let Some(digram) = self.digrams.get((index - alphabet_len) as usize) {
                output.extend(digram.iter());
            } else {
                return Err(MalformedCode::UnknownCodeword {
                    position,
                    value: index,
                    width: self.width,
                }
                .into());
            }
        }

        Ok(output)
    }
}

/// Counts consecutive pairs whose symbols are both in the alphabet.
fn digram_frequencies(alphabet: &Alphabet, corpus: &str) -> HashMap<Digram, usize> {
    let symbols: Vec<char> = corpus.chars().collect();
    let mut frequencies = HashMap::new();

    for pair in symbols.windows(2) {
        if alphabet.contains(pair[0]) && alphabet.contains(pair[1]) {
            *frequencies.entry([pair[0], pair[1]]).or_insert(0) += 1;
        }
    }

    frequencies
}

/// Extracts up to `limit` digrams in descending frequency order.
fn most_frequent(frequencies: HashMap<Digram, usize>, limit: usize) -> Vec<Digram> {
    let mut heap: BinaryHeap<DigramRecord> = frequencies
        .into_iter()
        .map(|(digram, frequency)| DigramRecord { frequency, digram })
        .collect();

    let mut selected = Vec::with_capacity(limit.min(heap.len()));
    while selected.len() < limit {
        let Some(record) = heap.pop() else {
            break;
        };
        selected.push(record.digram);
    }
    selected
}
