use log::{info, warn};
use secp256k1::PublicKey;
use thiserror::Error;

use std::sync::Mutex;

use super::block::Block;
use super::config::ChainConfig;
use super::crypto::{verify, Address, Signature};
use super::pow::{CancelToken, ProofOfWork, SearchOutcome};
use super::transaction::Transaction;

/// Errors that can occur during mining
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Nonce search was cancelled")]
    SearchCancelled,

    #[error("Nonce search exhausted after {attempts} attempts")]
    SearchExhausted { attempts: u64 },
}

/// Chain and pool live under one lock: submission, pool snapshot and block
/// append must serialize as a single critical section, so a transaction
/// submitted mid-search can neither land in a block whose hash is already
/// fixed nor be dropped.
#[derive(Debug)]
struct LedgerState {
    chain: Vec<Block>,
    pool: Vec<Transaction>,
}

/// The ledger: an append-only chain of mined blocks plus the staging pool
/// of not-yet-mined transactions.
#[derive(Debug)]
pub struct Ledger {
    state: Mutex<LedgerState>,
    owner: Address,
    config: ChainConfig,
    pow: ProofOfWork,
}

impl Ledger {
    /// Creates a new ledger with the reference configuration.
    ///
    /// # Arguments
    ///
    /// * `owner` - The address mining rewards are paid to
    pub fn new(owner: Address) -> Self {
        Self::with_config(owner, ChainConfig::default())
    }

    /// Creates a new ledger with an explicit configuration.
    pub fn with_config(owner: Address, config: ChainConfig) -> Self {
        let pow = ProofOfWork::new(config.difficulty, config.max_attempts);

        Ledger {
            state: Mutex::new(LedgerState {
                chain: vec![Block::genesis()],
                pool: Vec::new(),
            }),
            owner,
            config,
            pow,
        }
    }

    /// Gets the address mining rewards are paid to
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Gets the last block in the chain
    pub fn last_block(&self) -> Block {
        let state = self.state.lock().unwrap();
        state.chain.last().unwrap().clone()
    }

    /// Gets a copy of the whole chain
    pub fn blocks(&self) -> Vec<Block> {
        self.state.lock().unwrap().chain.clone()
    }

    /// Returns an independent copy of the pending-transaction pool.
    ///
    /// The copy shares nothing with the live pool, so a caller can hold it
    /// across later submissions.
    pub fn snapshot_pool(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().pool.clone()
    }

    /// Submits a transfer to the pending-transaction pool.
    ///
    /// Rejects self-transfers. The configured coinbase sender bypasses
    /// signature verification and is always admitted; any other sender must
    /// supply a public key and a signature over the digest of the
    /// transaction's canonical encoding. With `enforce_balance` enabled the
    /// sender's replayed balance, minus amounts already pending in the pool,
    /// must cover the transfer.
    ///
    /// Returns whether the transaction was admitted; on rejection the pool
    /// is left unchanged.
    pub fn submit(
        &self,
        sender: &Address,
        recipient: &Address,
        amount: f64,
        sender_public_key: Option<&PublicKey>,
        signature: Option<&Signature>,
    ) -> bool {
        if sender == recipient {
            warn!("rejected transfer: sender and recipient are the same address");
            return false;
        }

        let transaction = Transaction::new(sender.clone(), recipient.clone(), amount);
        let mut state = self.state.lock().unwrap();

        if *sender == self.config.coinbase_sender {
            state.pool.push(transaction);
            return true;
        }

        let (public_key, signature) = match (sender_public_key, signature) {
            (Some(public_key), Some(signature)) => (public_key, signature),
            _ => {
                warn!("rejected transfer from {}: missing public key or signature", sender);
                return false;
            }
        };

        if !verify(public_key, &transaction.digest(), signature) {
            warn!("rejected transfer from {}: signature verification failed", sender);
            return false;
        }

        if self.config.enforce_balance {
            let pending_debits: f64 = state
                .pool
                .iter()
                .filter(|t| t.sender == *sender)
                .map(|t| t.amount)
                .sum();
            let available = replay_balance(&state.chain, sender) - pending_debits;

            if available < amount {
                warn!(
                    "rejected transfer from {}: insufficient balance (required {}, available {})",
                    sender, amount, available
                );
                return false;
            }
        }

        state.pool.push(transaction);
        true
    }

    /// Mines the pending transactions into a new block.
    ///
    /// Returns whether a block was appended; see [`Ledger::mine_with`] for
    /// the fallible variant.
    pub fn mine(&self) -> bool {
        match self.mine_with(&CancelToken::new()) {
            Ok(block) => {
                info!(
                    "mined block {} with {} transactions",
                    block.hash_hex(),
                    block.transactions.len()
                );
                true
            }
            Err(err) => {
                warn!("mining failed: {}", err);
                false
            }
        }
    }

    /// Mines the pending transactions into a new block, honoring the
    /// cancellation token and the configured attempt bound.
    ///
    /// The whole sequence (admit the reward transaction, snapshot the pool,
    /// search for a nonce, append the block, clear the pool) runs under the
    /// ledger lock as one atomic unit. On a cancelled or exhausted search
    /// nothing is appended and the pool is left as it was before the call.
    pub fn mine_with(&self, cancel: &CancelToken) -> Result<Block, LedgerError> {
        let mut state = self.state.lock().unwrap();

        // Reward transaction goes through the coinbase bypass.
        state.pool.push(Transaction::new(
            self.config.coinbase_sender.clone(),
            self.owner.clone(),
            self.config.mining_reward,
        ));

        let transactions = state.pool.clone();
        let previous_hash = state.chain.last().unwrap().hash();

        match self.pow.search(&previous_hash, &transactions, cancel) {
            SearchOutcome::Found(nonce) => {
                let block = Block::new(nonce, previous_hash, transactions);
                state.chain.push(block.clone());
                state.pool.clear();
                Ok(block)
            }
            outcome => {
                // Take the reward transaction back out so a failed search
                // leaves the pool exactly as submitted.
                state.pool.pop();

                match outcome {
                    SearchOutcome::Cancelled => Err(LedgerError::SearchCancelled),
                    SearchOutcome::Exhausted { attempts } => {
                        Err(LedgerError::SearchExhausted { attempts })
                    }
                    SearchOutcome::Found(_) => unreachable!(),
                }
            }
        }
    }

    /// Computes an address's balance by replaying the entire chain.
    ///
    /// Every transaction credits its recipient and debits its sender; no
    /// running index is kept, so this is O(total transactions) per call.
    pub fn balance_of(&self, address: &Address) -> f64 {
        let state = self.state.lock().unwrap();
        replay_balance(&state.chain, address)
    }

    /// Validates the chain: every non-genesis block must link to its
    /// predecessor's hash and satisfy the configured difficulty.
    pub fn is_valid(&self) -> bool {
        let state = self.state.lock().unwrap();
        let target = "0".repeat(self.pow.difficulty());

        for i in 1..state.chain.len() {
            let current = &state.chain[i];
            let previous = &state.chain[i - 1];

            if current.previous_hash != previous.hash() {
                return false;
            }

            if !current.hash_hex().starts_with(&target) {
                return false;
            }
        }

        true
    }
}

fn replay_balance(chain: &[Block], address: &Address) -> f64 {
    let mut total = 0.0;

    for block in chain {
        for transaction in &block.transactions {
            if transaction.recipient == *address {
                total += transaction.amount;
            }
            if transaction.sender == *address {
                total -= transaction.amount;
            }
        }
    }

    total
}
