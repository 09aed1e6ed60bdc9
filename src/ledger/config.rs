use super::crypto::Address;

/// Configuration for a ledger instance.
///
/// The reference values live here instead of process-wide globals so that
/// two ledgers in one process can run with different policies.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Number of leading zero hex characters required in a block hash
    pub difficulty: usize,

    /// Reward paid to the ledger owner per mined block
    pub mining_reward: f64,

    /// Distinguished sender identifier that bypasses signature verification.
    /// Only the mining-reward transaction uses it.
    pub coinbase_sender: Address,

    /// Reject transfers whose sender balance cannot cover the amount.
    /// Off by default: the reference admits overdrafts.
    pub enforce_balance: bool,

    /// Upper bound on nonce attempts per search; `None` searches until found
    pub max_attempts: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            difficulty: 3,
            mining_reward: 1.0,
            coinbase_sender: Address("THE BLOCKCHAIN".to_string()),
            enforce_balance: false,
            max_attempts: None,
        }
    }
}
