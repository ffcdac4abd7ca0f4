use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Sentinel written into a cross-reference record before the real private
/// transaction id is known.
const PLACEHOLDER: &str = "pending";

/// Ledger transaction identifier.
///
/// Either a `0x`-prefixed 32-byte hex hash, stored lowercased, or the
/// [`placeholder`](TxId::placeholder) sentinel a record carries between
/// reservation and patching.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxId(String);

impl TxId {
    /// Parse a transaction id, accepting the placeholder sentinel.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s == PLACEHOLDER {
            return Ok(Self(PLACEHOLDER.to_string()));
        }
        let hex_part = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidTxId(format!("missing 0x prefix: {s}")))?;
        if hex_part.len() != 64 {
            return Err(TypeError::InvalidLength {
                expected: 64,
                actual: hex_part.len(),
            });
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidTxId(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Build from a raw 32-byte hash.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// The placeholder sentinel.
    pub fn placeholder() -> Self {
        Self(PLACEHOLDER.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log lines (`0x` plus first 8 hex chars).
    pub fn short(&self) -> String {
        if self.is_placeholder() {
            self.0.clone()
        } else {
            self.0[..10].to_string()
        }
    }
}

impl TryFrom<String> for TxId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, TypeError> {
        Self::parse(&s)
    }
}

impl From<TxId> for String {
    fn from(t: TxId) -> String {
        t.0
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.short())
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_str(byte: u8) -> String {
        format!("0x{}", hex::encode([byte; 32]))
    }

    #[test]
    fn parse_valid_hash() {
        let t = TxId::parse(&hash_str(0xab)).unwrap();
        assert!(!t.is_placeholder());
    }

    #[test]
    fn parse_lowercases() {
        let t = TxId::parse(&hash_str(0xab).to_uppercase().replace("0X", "0x")).unwrap();
        assert_eq!(t.as_str(), hash_str(0xab));
    }

    #[test]
    fn parse_accepts_placeholder() {
        let t = TxId::parse("pending").unwrap();
        assert!(t.is_placeholder());
        assert_eq!(t, TxId::placeholder());
    }

    #[test]
    fn parse_rejects_short_hash() {
        let err = TxId::parse("0xdead").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 64,
                actual: 4
            }
        );
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        let err = TxId::parse(&hash_str(1)[2..]).unwrap_err();
        assert!(matches!(err, TypeError::InvalidTxId(_)));
    }

    #[test]
    fn short_form() {
        let t = TxId::from_bytes(&[0xab; 32]);
        assert_eq!(t.short(), "0xabababab");
        assert_eq!(TxId::placeholder().short(), "pending");
    }

    #[test]
    fn serde_roundtrip() {
        let t = TxId::from_bytes(&[7; 32]);
        let json = serde_json::to_string(&t).unwrap();
        let parsed: TxId = serde_json::from_str(&json).unwrap();
        assert_eq!(t, parsed);
    }
}
