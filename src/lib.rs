//! A minimal single-node proof-of-work ledger.
//!
//! The crate keeps an append-only chain of blocks in memory, each holding a
//! pool of signed value transfers, and admits new blocks only after a nonce
//! satisfying the difficulty target is found. A wallet component derives a
//! checksummed base58 address and ECDSA signatures from a secp256k1 keypair.

pub mod ledger;

pub use ledger::{
    Address, Block, CancelToken, ChainConfig, CryptoError, Hash, Ledger, LedgerError, ProofOfWork,
    SearchOutcome, Signature, Transaction, Wallet,
};
