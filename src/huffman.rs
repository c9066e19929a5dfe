//! Huffman prefix coding.
//!
//! Training counts symbol frequencies in a corpus and builds the Huffman tree
//! bottom-up from a min-heap. Nodes live in a [`SlotMap`] arena; an internal
//! node holds the keys of its two children and each key has exactly one
//! parent, so the tree owns its nodes without shared pointers.
//!
//! # Example
//!
//! ```
//! use tamp_rs::{Alphabet, Codec, HuffmanCodec};
//!
//! let alphabet = Alphabet::new("abc".chars()).unwrap();
//! let codec = HuffmanCodec::train(alphabet, "aaaaabbc").unwrap();
//!
//! let code = codec.encode("abcab").unwrap();
//! assert_eq!(codec.decode(&code).unwrap(), "abcab");
//! ```

use crate::alphabet::Alphabet;
use crate::code::{is_padding, Bits, Code, CodeReader};
use crate::codec::Codec;
use crate::error::{ConfigError, Error, MalformedCode, Result};
use ahash::AHashMap as HashMap;
use bitvec::prelude::*;
use log::debug;
use slotmap::{DefaultKey, SlotMap};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A node of the Huffman tree.
#[derive(Debug, Clone, Copy)]
enum HuffmanNode {
    Leaf { symbol: char },
    Internal { left: DefaultKey, right: DefaultKey },
}

/// Heap entry keyed by frequency, then by insertion order.
#[derive(Debug, Clone, Eq, PartialEq)]
struct HeapEntry {
    frequency: usize,
    order: usize,
    key: DefaultKey,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and the lowest entry must pop first
        (other.frequency, other.order).cmp(&(self.frequency, self.order))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Trained Huffman codec. Immutable and safe to share between threads.
#[derive(Debug, Clone)]
pub struct HuffmanCodec {
    alphabet: Alphabet,
    /// Corpus frequency per symbol, in alphabet order
    frequencies: Vec<usize>,
    nodes: SlotMap<DefaultKey, HuffmanNode>,
    root: DefaultKey,
    codewords: HashMap<char, Bits>,
}

impl HuffmanCodec {
    /// Builds the Huffman tree for `alphabet` from symbol counts in `corpus`.
    ///
    /// Symbols that never occur still get a codeword. Corpus characters
    /// outside the alphabet are ignored.
    pub fn train(alphabet: Alphabet, corpus: &str) -> Result<Self> {
        let mut frequencies = vec![0usize; alphabet.len()];
        for symbol in corpus.chars() {
            if let Some(i) = alphabet.index_of(symbol) {
                frequencies[i] += 1;
            }
        }

        let mut nodes = SlotMap::with_capacity(2 * alphabet.len());
        let mut heap = BinaryHeap::with_capacity(alphabet.len());
        for (order, symbol) in alphabet.iter().enumerate() {
            let key = nodes.insert(HuffmanNode::Leaf { symbol });
            heap.push(HeapEntry {
                frequency: frequencies[order],
                order,
                key,
            });
        }

        let mut order = alphabet.len();
        let root = loop {
            let Some(left) = heap.pop() else {
                return Err(ConfigError::EmptyAlphabet.into());
            };
            let Some(right) = heap.pop() else {
                break left.key;
            };

            let key = nodes.insert(HuffmanNode::Internal {
                left: left.key,
                right: right.key,
            });
            heap.push(HeapEntry {
                frequency: left.frequency + right.frequency,
                order,
                key,
            });
            order += 1;
        };

        let codewords = build_codewords(&nodes, root);
        debug!(
            "trained huffman tree: {} symbols, longest codeword {} bits",
            codewords.len(),
            codewords.values().map(|c| c.len()).max().unwrap_or(0)
        );

        Ok(Self {
            alphabet,
            frequencies,
            nodes,
            root,
            codewords,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Codeword assigned to `symbol`.
    pub fn codeword(&self, symbol: char) -> Option<&BitSlice<u8, Msb0>> {
        self.codewords.get(&symbol).map(|bits| bits.as_bitslice())
    }

    /// Every symbol with its codeword, in alphabet order.
    pub fn codewords(&self) -> impl Iterator<Item = (char, &BitSlice<u8, Msb0>)> + '_ {
        self.alphabet
            .iter()
            .filter_map(|symbol| self.codeword(symbol).map(|bits| (symbol, bits)))
    }

    /// Number of times `symbol` occurred in the training corpus.
    pub fn frequency(&self, symbol: char) -> Option<usize> {
        self.alphabet.index_of(symbol).map(|i| self.frequencies[i])
    }
}

impl Codec for HuffmanCodec {
    fn encode(&self, source: &str) -> Result<Code> {
        let mut code = Code::new();
        for (position, symbol) in source.chars().enumerate() {
            let codeword = self
                .codewords
                .get(&symbol)
                .ok_or(Error::OutOfAlphabetSymbol { symbol, position })?;
            code.push_bits(codeword);
        }
        Ok(code)
    }

    fn decode(&self, code: &Code) -> Result<String> {
        let bits = code.as_bitslice();

        // A one-symbol alphabet has only empty codewords
        if let HuffmanNode::Leaf { .. } = self.nodes[self.root] {
            if bits.is_empty() || is_padding(bits) {
                return Ok(String::new());
            }
            return Err(MalformedCode::Truncated {
                position: 0,
                leftover: bits.len(),
            }
            .into());
        }

        let mut reader = CodeReader::new(code);
        let mut output = String::new();
        let mut current = self.root;
        let mut start = 0;

        while let Some(bit) = reader.read_bit() {
            let HuffmanNode::Internal { left, right } = self.nodes[current] else {
                unreachable!("decode cursor always rests on an internal node");
            };
            current = if bit { right } else { left };

            if let HuffmanNode::Leaf { symbol } = self.nodes[current] {
                output.push(symbol);
                current = self.root;
                start = reader.position();
            }
        }

        let leftover = &bits[start..];
        if !leftover.is_empty() && !is_padding(leftover) {
            return Err(MalformedCode::Truncated {
                position: start,
                leftover: leftover.len(),
            }
            .into());
        }

        Ok(output)
    }
}

/// Collects root-to-leaf paths with an explicit stack.
fn build_codewords(nodes: &SlotMap<DefaultKey, HuffmanNode>, root: DefaultKey) -> HashMap<char, Bits> {
    let mut codewords = HashMap::new();
    let mut stack = vec![(root, Bits::new())];

    while let Some((key, path)) = stack.pop() {
        match nodes[key] {
            HuffmanNode::Leaf { symbol } => {
                codewords.insert(symbol, path);
            }
            HuffmanNode::Internal { left, right } => {
                let mut left_path = path.clone();
                left_path.push(false);
                let mut right_path = path;
                right_path.push(true);
                stack.push((right, right_path));
                stack.push((left, left_path));
            }
        }
    }

    codewords
}
