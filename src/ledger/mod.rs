// Ledger module
//
// This module contains the core ledger implementation including:
// - Block structure and canonical hashing
// - Ledger (chain + transaction pool) structure
// - Transaction structure
// - Cryptography utilities (keys, signatures, addresses)
// - Proof of work engine
// - Chain configuration

pub mod block;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod pow;
pub mod transaction;

// Re-export main components for easier access
pub use block::Block;
pub use chain::{Ledger, LedgerError};
pub use config::ChainConfig;
pub use crypto::{verify, Address, CryptoError, Hash, Signature, Wallet};
pub use pow::{validate, CancelToken, ProofOfWork, SearchOutcome};
pub use transaction::Transaction;
