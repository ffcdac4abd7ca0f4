use xref_types::Address;

use crate::error::{ClientError, ClientResult};

/// Process-lifetime signing capability.
///
/// One signer exists per ledger connection and lives from process start to
/// shutdown; it is injected into the client constructor, never reached
/// through global state. All transactions on a connection are signed with
/// this one key (server-held custody).
pub struct Signer {
    key: ed25519_dalek::SigningKey,
    address: Address,
}

impl Signer {
    /// Create from a raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        let key = ed25519_dalek::SigningKey::from_bytes(&bytes);
        let address = derive_address(&key.verifying_key());
        Self { key, address }
    }

    /// Parse a hex-encoded 32-byte secret, with or without `0x` prefix.
    pub fn from_hex(secret: &str) -> ClientResult<Self> {
        let secret = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = hex::decode(secret).map_err(|e| ClientError::Key(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ClientError::Key("expected 32-byte secret".into()))?;
        Ok(Self::from_bytes(arr))
    }

    /// Generate a random signer for tests and demos.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        let key = ed25519_dalek::SigningKey::generate(&mut csprng);
        let address = derive_address(&key.verifying_key());
        Self { key, address }
    }

    /// The address this key signs for.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Sign a message, returning the hex-encoded signature.
    pub fn sign(&self, message: &[u8]) -> String {
        use ed25519_dalek::Signer as _;
        hex::encode(self.key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signer({}, key <redacted>)", self.address)
    }
}

fn derive_address(key: &ed25519_dalek::VerifyingKey) -> Address {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"xref-address-v1:");
    hasher.update(&key.to_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest.as_bytes()[..20]);
    Address::from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_derivation_is_deterministic() {
        let s1 = Signer::from_bytes([7; 32]);
        let s2 = Signer::from_bytes([7; 32]);
        assert_eq!(s1.address(), s2.address());
    }

    #[test]
    fn different_keys_different_addresses() {
        let s1 = Signer::from_bytes([1; 32]);
        let s2 = Signer::from_bytes([2; 32]);
        assert_ne!(s1.address(), s2.address());
    }

    #[test]
    fn from_hex_accepts_prefixed_and_bare() {
        let bare = hex::encode([9u8; 32]);
        let s1 = Signer::from_hex(&bare).unwrap();
        let s2 = Signer::from_hex(&format!("0x{bare}")).unwrap();
        assert_eq!(s1.address(), s2.address());
    }

    #[test]
    fn from_hex_rejects_short_secret() {
        let err = Signer::from_hex("0xabcd").unwrap_err();
        assert!(matches!(err, ClientError::Key(_)));
    }

    #[test]
    fn signatures_differ_by_message() {
        let s = Signer::from_bytes([3; 32]);
        assert_ne!(s.sign(b"a"), s.sign(b"b"));
    }

    #[test]
    fn debug_redacts_key() {
        let s = Signer::generate();
        let debug = format!("{s:?}");
        assert!(debug.contains("redacted"));
    }
}
