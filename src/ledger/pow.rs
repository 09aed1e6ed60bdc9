use log::debug;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::block::Block;
use super::crypto::Hash;
use super::transaction::Transaction;

/// Thread-safe flag used to signal a running nonce search to stop.
///
/// Once cancelled the token stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a fresh, un-cancelled token.
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    /// Signals the search loop holding this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns whether the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a nonce search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The first nonce whose candidate block satisfies the difficulty target
    Found(u64),

    /// The search was cancelled before a nonce was found
    Cancelled,

    /// The configured attempt bound was reached without a hit
    Exhausted { attempts: u64 },
}

/// Checks whether a nonce satisfies the difficulty target.
///
/// Builds the candidate block from exactly the given nonce, previous hash
/// and transaction set, and requires the first `difficulty` characters of
/// the hex-rendered block hash to be `'0'`. Pure: identical inputs always
/// produce the identical answer.
pub fn validate(
    nonce: u64,
    previous_hash: &Hash,
    transactions: &[Transaction],
    difficulty: usize,
) -> bool {
    let target = "0".repeat(difficulty);
    let candidate = Block::new(nonce, *previous_hash, transactions.to_vec());

    candidate.hash_hex().starts_with(&target)
}

/// Brute-force nonce search against a fixed difficulty target.
#[derive(Debug, Clone)]
pub struct ProofOfWork {
    difficulty: usize,
    max_attempts: Option<u64>,
}

impl ProofOfWork {
    /// Creates a search engine for the given difficulty.
    ///
    /// `max_attempts` bounds the search; `None` reproduces the reference
    /// behavior of searching until a nonce is found.
    pub fn new(difficulty: usize, max_attempts: Option<u64>) -> Self {
        ProofOfWork {
            difficulty,
            max_attempts,
        }
    }

    /// Gets the difficulty target
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Searches for the first nonce satisfying the difficulty target.
    ///
    /// Starts at zero and increments by exactly one per attempt. The loop is
    /// CPU-bound and blocking; the cancellation token is checked once per
    /// attempt. Expected work is on the order of `16^difficulty` hash
    /// evaluations.
    pub fn search(
        &self,
        previous_hash: &Hash,
        transactions: &[Transaction],
        cancel: &CancelToken,
    ) -> SearchOutcome {
        let mut nonce: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                debug!("nonce search cancelled after {} attempts", nonce);
                return SearchOutcome::Cancelled;
            }

            if let Some(max) = self.max_attempts {
                if nonce >= max {
                    debug!("nonce search exhausted after {} attempts", nonce);
                    return SearchOutcome::Exhausted { attempts: nonce };
                }
            }

            if validate(nonce, previous_hash, transactions, self.difficulty) {
                debug!("found nonce {} at difficulty {}", nonce, self.difficulty);
                return SearchOutcome::Found(nonce);
            }

            nonce += 1;
        }
    }
}
