use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use ripemd::Ripemd160;
use secp256k1::{ecdsa, All, Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

/// A thread-safe, lazily initialized secp256k1 context, shared by all
/// signing and verification calls.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Version byte prepended to the RIPEMD-160 hash during address derivation.
const ADDRESS_VERSION: u8 = 0x00;

/// Number of checksum bytes appended to the versioned payload.
const ADDRESS_CHECKSUM_LEN: usize = 4;

/// Computes the SHA-256 digest of arbitrary bytes.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Failed to generate keypair: {0}")]
    KeyGeneration(String),

    #[error("Failed to sign digest: {0}")]
    Signing(String),

    #[error("Decoding error: {0}")]
    Decoding(String),
}

/// A wallet address: the base58 encoding of the versioned, checksummed
/// RIPEMD-160 hash of the public key coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Derives an address from a public key.
    ///
    /// The pipeline is fixed and order-sensitive:
    /// 1. concatenate the X and Y coordinates (32 big-endian bytes each)
    /// 2. SHA-256 over the 64 bytes
    /// 3. RIPEMD-160 over that digest (20 bytes)
    /// 4. prepend the version byte (21 bytes)
    /// 5. SHA-256 twice over the versioned payload
    /// 6. append the first 4 bytes of the second digest as checksum (25 bytes)
    /// 7. base58-encode the result
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        // SEC1 uncompressed form is 0x04 || X || Y; skip the tag byte.
        let uncompressed = public_key.serialize_uncompressed();
        let coord_hash = Sha256::digest(&uncompressed[1..]);
        let short_hash = Ripemd160::digest(coord_hash);

        let mut payload = [0u8; 21 + ADDRESS_CHECKSUM_LEN];
        payload[0] = ADDRESS_VERSION;
        payload[1..21].copy_from_slice(&short_hash);

        let checksum = Sha256::digest(Sha256::digest(&payload[..21]));
        payload[21..].copy_from_slice(&checksum[..ADDRESS_CHECKSUM_LEN]);

        Address(bs58::encode(payload).into_string())
    }

    /// Re-derives the checksum and compares it against the stored one.
    ///
    /// The forward pipeline does not enforce the checksum, so anything that
    /// accepts an address as a payment destination should call this first.
    pub fn verify_checksum(&self) -> bool {
        let bytes = match bs58::decode(&self.0).into_vec() {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        if bytes.len() != 21 + ADDRESS_CHECKSUM_LEN {
            return false;
        }

        let checksum = Sha256::digest(Sha256::digest(&bytes[..21]));
        bytes[21..] == checksum[..ADDRESS_CHECKSUM_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Validate that the string is a valid base58 encoding
        bs58::decode(s)
            .into_vec()
            .map_err(|e| CryptoError::Decoding(e.to_string()))?;

        Ok(Address(s.to_string()))
    }
}

/// An ECDSA signature as its two curve-scalar components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl Signature {
    /// Builds a signature from the 64-byte compact form (r || s).
    pub fn from_compact(bytes: [u8; 64]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Signature { r, s }
    }

    /// Serializes the signature back to the 64-byte compact form.
    pub fn to_compact(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        bytes
    }
}

/// A wallet holding one secp256k1 keypair and its derived address.
///
/// The secret key never leaves the wallet: signing is the only operation
/// that touches it.
#[derive(Clone)]
pub struct Wallet {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl Wallet {
    /// Creates a new wallet with a random keypair.
    ///
    /// Key generation draws from the operating system's secure random
    /// source; there is no fallback, a failure here is a hard failure.
    pub fn new() -> Result<Self, CryptoError> {
        let secret_key = SecretKey::new(&mut OsRng);
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        let address = Address::from_public_key(&public_key);

        Ok(Wallet {
            secret_key,
            public_key,
            address,
        })
    }

    /// Gets the wallet's address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Gets the wallet's public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Signs a 32-byte digest with the wallet's secret key.
    ///
    /// Callers must pass the digest of a canonical encoding, never raw or
    /// piecemeal fields.
    pub fn sign(&self, digest: &Hash) -> Result<Signature, CryptoError> {
        let message = Message::from_digest_slice(digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;

        let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, &self.secret_key);

        Ok(Signature::from_compact(signature.serialize_compact()))
    }
}

/// Verifies a signature against a 32-byte digest and public key.
///
/// Malformed signature components (zero or out-of-range scalars) verify as
/// `false` rather than erroring.
pub fn verify(public_key: &PublicKey, digest: &Hash, signature: &Signature) -> bool {
    let message = match Message::from_digest_slice(digest) {
        Ok(message) => message,
        Err(_) => return false,
    };

    let signature = match ecdsa::Signature::from_compact(&signature.to_compact()) {
        Ok(signature) => signature,
        Err(_) => return false,
    };

    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, public_key)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_creation() {
        let a = Wallet::new().unwrap();
        let b = Wallet::new().unwrap();

        assert!(!a.address().0.is_empty());
        assert_ne!(a.public_key(), b.public_key());
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_signing_and_verification() {
        let wallet = Wallet::new().unwrap();
        let digest = sha256(b"Hello, world!");

        let signature = wallet.sign(&digest).unwrap();
        assert!(verify(wallet.public_key(), &digest, &signature));

        // Verify with a different digest
        let wrong_digest = sha256(b"Wrong message");
        assert!(!verify(wallet.public_key(), &wrong_digest, &signature));

        // Verify with a different key
        let other = Wallet::new().unwrap();
        assert!(!verify(other.public_key(), &digest, &signature));
    }

    #[test]
    fn test_malformed_signature_verifies_false() {
        let wallet = Wallet::new().unwrap();
        let digest = sha256(b"some digest");

        let zeroed = Signature {
            r: [0u8; 32],
            s: [0u8; 32],
        };
        assert!(!verify(wallet.public_key(), &digest, &zeroed));

        let saturated = Signature {
            r: [0xff; 32],
            s: [0xff; 32],
        };
        assert!(!verify(wallet.public_key(), &digest, &saturated));
    }

    #[test]
    fn test_signature_compact_roundtrip() {
        let wallet = Wallet::new().unwrap();
        let digest = sha256(b"roundtrip");

        let signature = wallet.sign(&digest).unwrap();
        let rebuilt = Signature::from_compact(signature.to_compact());

        assert_eq!(signature, rebuilt);
    }

    #[test]
    fn test_address_derivation_is_deterministic() {
        let wallet = Wallet::new().unwrap();

        let first = Address::from_public_key(wallet.public_key());
        let second = Address::from_public_key(wallet.public_key());

        assert_eq!(first, second);
        assert_eq!(&first, wallet.address());
    }

    #[test]
    fn test_address_has_version_prefix() {
        // Version byte 0x00 encodes as a leading '1' in base58.
        let wallet = Wallet::new().unwrap();
        assert!(wallet.address().0.starts_with('1'));
    }

    #[test]
    fn test_address_checksum() {
        let wallet = Wallet::new().unwrap();
        let address = wallet.address().clone();

        assert!(address.verify_checksum());

        // Corrupt one payload character; the checksum no longer matches.
        let mut chars: Vec<char> = address.0.chars().collect();
        let i = chars.len() / 2;
        chars[i] = if chars[i] == '2' { '3' } else { '2' };
        let tampered = Address(chars.into_iter().collect());

        assert!(!tampered.verify_checksum());
    }

    #[test]
    fn test_checksum_rejects_non_base58() {
        assert!(!Address("not base58 0OIl".to_string()).verify_checksum());
        assert!(!Address("THE BLOCKCHAIN".to_string()).verify_checksum());
    }

    #[test]
    fn test_address_from_str() {
        let wallet = Wallet::new().unwrap();
        let parsed = Address::from_str(&wallet.address().0).unwrap();
        assert_eq!(&parsed, wallet.address());

        assert!(Address::from_str("zero 0 is not base58").is_err());
    }
}
