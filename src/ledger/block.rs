use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::crypto::{sha256, Hash};
use super::transaction::Transaction;

/// Previous-hash sentinel carried by the genesis block: the ASCII bytes
/// `"initial hash"` zero-padded to the digest width.
const GENESIS_PREVIOUS_HASH: Hash = *b"initial hash\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0";

/// A block in the chain, immutable once appended.
///
/// The hash pre-image covers `previous_hash`, `transactions` (in order) and
/// `nonce`. The timestamp is a construction-time wall-clock reading and is
/// deliberately outside the pre-image: proof-of-work validation must be
/// repeatable for the exact stored block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Hash of the previous block
    #[serde(with = "hex::serde")]
    pub previous_hash: Hash,

    /// Transactions included in this block; order affects the block hash
    pub transactions: Vec<Transaction>,

    /// Timestamp when the block was constructed
    pub timestamp: DateTime<Utc>,

    /// Nonce found by proof-of-work
    pub nonce: u64,
}

impl Block {
    /// Creates a new block
    pub fn new(nonce: u64, previous_hash: Hash, transactions: Vec<Transaction>) -> Self {
        Block {
            previous_hash,
            transactions,
            timestamp: Utc::now(),
            nonce,
        }
    }

    /// Creates the genesis block: a fixed sentinel with a zero nonce, the
    /// constant previous-hash value and no transactions. It is the only
    /// block that never undergoes proof-of-work validation.
    pub fn genesis() -> Self {
        Block::new(0, GENESIS_PREVIOUS_HASH, Vec::new())
    }

    /// Calculates the SHA-256 hash of the block's canonical encoding.
    ///
    /// The pre-image serializes transactions exactly as
    /// [`Transaction::canonical_bytes`] does, so a transaction has one byte
    /// representation whether it is being signed or mined.
    pub fn hash(&self) -> Hash {
        #[derive(Serialize)]
        struct Preimage<'a> {
            previous_hash: String,
            transactions: &'a [Transaction],
            nonce: u64,
        }

        let preimage = Preimage {
            previous_hash: hex::encode(self.previous_hash),
            transactions: &self.transactions,
            nonce: self.nonce,
        };

        let encoded = serde_json::to_vec(&preimage).expect("block serialization is infallible");

        sha256(&encoded)
    }

    /// Renders the block hash as a lowercase hexadecimal string.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash())
    }
}
