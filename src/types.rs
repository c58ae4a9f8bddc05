//! Core types: Symbol, Instrument

use std::fmt;

/// Maximum ticker length in bytes.
pub const SYMBOL_CAPACITY: usize = 8;

/// Ticker symbol stored inline (up to 8 ASCII bytes).
///
/// `Symbol` is `Copy` so it can be used as a map key and passed around by
/// value without allocation. Ordering is lexical on the ticker text.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    bytes: [u8; SYMBOL_CAPACITY],
    len: u8,
}

impl Symbol {
    /// Create a symbol from a ticker string.
    ///
    /// # Panics
    ///
    /// Panics if `ticker` is empty, longer than 8 bytes, or not ASCII.
    /// Use [`Symbol::try_new`] for untrusted input.
    #[track_caller]
    pub fn new(ticker: &str) -> Self {
        match Self::try_new(ticker) {
            Some(sym) => sym,
            None => panic!("invalid ticker {ticker:?}: must be 1-8 ASCII bytes"),
        }
    }

    /// Create a symbol, returning `None` if the ticker doesn't fit.
    pub fn try_new(ticker: &str) -> Option<Self> {
        let raw = ticker.as_bytes();
        if raw.is_empty() || raw.len() > SYMBOL_CAPACITY || !ticker.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; SYMBOL_CAPACITY];
        bytes[..raw.len()].copy_from_slice(raw);
        Some(Self {
            bytes,
            len: raw.len() as u8,
        })
    }

    /// The ticker text.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Constructed only from ASCII input
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ticker = String::deserialize(deserializer)?;
        Symbol::try_new(&ticker).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid ticker {ticker:?}: must be 1-8 ASCII bytes"))
        })
    }
}

/// A tradable instrument as registered with the host.
///
/// Immutable once created: the market identifier is fixed at registration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instrument {
    pub symbol: Symbol,
    /// Market identifier reported by the host, e.g. `"usa"`.
    pub market: String,
}

impl Instrument {
    pub fn new(symbol: Symbol, market: impl Into<String>) -> Self {
        Self {
            symbol,
            market: market.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_roundtrip_text() {
        let sym = Symbol::new("GOOGL");
        assert_eq!(sym.as_str(), "GOOGL");
        assert_eq!(format!("{sym}"), "GOOGL");
        assert_eq!(format!("{sym:?}"), "Symbol(\"GOOGL\")");
    }

    #[test]
    fn symbol_rejects_bad_tickers() {
        assert!(Symbol::try_new("").is_none());
        assert!(Symbol::try_new("TOOLONGNAME").is_none());
        assert!(Symbol::try_new("ÄPFEL").is_none());
        assert!(Symbol::try_new("ABCDEFGH").is_some());
    }

    #[test]
    #[should_panic(expected = "invalid ticker")]
    fn symbol_new_panics_on_overflow() {
        let _ = Symbol::new("NINECHARS");
    }

    #[test]
    fn symbol_ordering_is_lexical() {
        assert!(Symbol::new("AB") < Symbol::new("ABC"));
        assert!(Symbol::new("ABC") < Symbol::new("ABD"));
        assert!(Symbol::new("AAPL") < Symbol::new("MSFT"));
        assert!(Symbol::new("T") > Symbol::new("SNOW"));
    }
}
