use serde::{Deserialize, Serialize};

use super::crypto::{sha256, Address, Hash};

/// A value transfer between two addresses.
///
/// Transactions are immutable once constructed and carry no identifier:
/// they are content-addressed through the digest of their canonical
/// encoding. Signatures are supplied alongside a transaction at submission
/// time, never stored inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender's address
    pub sender: Address,

    /// Recipient's address
    pub recipient: Address,

    /// Amount being transferred
    pub amount: f64,
}

impl Transaction {
    /// Creates a new transaction
    pub fn new(sender: Address, recipient: Address, amount: f64) -> Self {
        Transaction {
            sender,
            recipient,
            amount,
        }
    }

    /// Returns the canonical byte encoding of the transaction.
    ///
    /// This is the one encoding used for hashing and signing. Field order
    /// is fixed by the struct declaration; identical logical content always
    /// yields identical bytes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("transaction serialization is infallible")
    }

    /// Computes the SHA-256 digest of the canonical encoding.
    ///
    /// This digest is the signing pre-image: signatures are made over it,
    /// never over individual fields.
    pub fn digest(&self) -> Hash {
        sha256(&self.canonical_bytes())
    }
}
