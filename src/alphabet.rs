use crate::error::{ConfigError, Result};
use ahash::AHashMap as HashMap;

/// Ordered set of symbols a codec accepts.
///
/// Symbol order is significant: it fixes the index each symbol receives in
/// the digram and LZW tables and the leaf order of the Huffman tree.
#[derive(Debug, Clone)]
pub struct Alphabet {
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    /// Builds an alphabet from symbols in order.
    ///
    /// Fails on an empty input or a repeated symbol.
    pub fn new<I: IntoIterator<Item = char>>(symbols: I) -> Result<Self> {
        let symbols: Vec<char> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(ConfigError::EmptyAlphabet.into());
        }

        let mut index = HashMap::with_capacity(symbols.len());
        for (i, &symbol) in symbols.iter().enumerate() {
            if index.insert(symbol, i).is_some() {
                return Err(ConfigError::DuplicateSymbol(symbol).into());
            }
        }

        Ok(Self { symbols, index })
    }

    /// Tab, newline and printable ASCII (32..=126): 97 symbols.
    pub fn printable_ascii() -> Self {
        let symbols: Vec<char> = ['\t', '\n']
            .into_iter()
            .chain((32u8..=126).map(char::from))
            .collect();
        let index = symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { symbols, index }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; an alphabet cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.index.contains_key(&symbol)
    }

    /// Position of `symbol` in alphabet order.
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.index.get(&symbol).copied()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_printable_ascii() {
        let alphabet = Alphabet::printable_ascii();
        assert_eq!(alphabet.len(), 97);
        assert_eq!(alphabet.index_of('\t'), Some(0));
        assert_eq!(alphabet.index_of('\n'), Some(1));
        assert_eq!(alphabet.index_of(' '), Some(2));
        assert_eq!(alphabet.index_of('~'), Some(96));
        assert!(!alphabet.contains('\r'));
    }

    #[test]
    fn test_order_preserved() {
        let alphabet = Alphabet::new("cab".chars()).unwrap();
        assert_eq!(alphabet.symbols(), &['c', 'a', 'b']);
        assert_eq!(alphabet.index_of('a'), Some(1));
    }

    #[test]
    fn test_empty_rejected() {
        let err = Alphabet::new(std::iter::empty()).unwrap_err();
        assert_eq!(err, Error::Configuration(ConfigError::EmptyAlphabet));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Alphabet::new("abca".chars()).unwrap_err();
        assert_eq!(err, Error::Configuration(ConfigError::DuplicateSymbol('a')));
    }
}
