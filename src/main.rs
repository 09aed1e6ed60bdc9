use anyhow::Result;
use log::info;

use miniledger::{ChainConfig, Ledger, Transaction, Wallet};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Two transacting wallets plus the miner that owns the ledger.
    let alice = Wallet::new()?;
    let bob = Wallet::new()?;
    let miner = Wallet::new()?;

    info!("alice address: {}", alice.address());
    info!("bob address:   {}", bob.address());
    info!("miner address: {}", miner.address());

    let ledger = Ledger::with_config(miner.address().clone(), ChainConfig::default());

    // Check the destination before paying into it.
    anyhow::ensure!(
        bob.address().verify_checksum(),
        "recipient address failed its checksum"
    );

    // Alice signs the digest of the canonical transaction encoding.
    let transfer = Transaction::new(alice.address().clone(), bob.address().clone(), 10.0);
    let signature = alice.sign(&transfer.digest())?;

    let admitted = ledger.submit(
        alice.address(),
        bob.address(),
        10.0,
        Some(alice.public_key()),
        Some(&signature),
    );
    info!("transfer admitted: {}", admitted);
    info!("pending transactions: {}", ledger.snapshot_pool().len());

    if ledger.mine() {
        info!("chain length: {}", ledger.blocks().len());
    }

    // Second round: bob pays some of it back.
    let transfer = Transaction::new(bob.address().clone(), alice.address().clone(), 4.0);
    let signature = bob.sign(&transfer.digest())?;
    ledger.submit(
        bob.address(),
        alice.address(),
        4.0,
        Some(bob.public_key()),
        Some(&signature),
    );

    if ledger.mine() {
        info!("chain length: {}", ledger.blocks().len());
    }

    info!("chain valid: {}", ledger.is_valid());
    info!("alice balance: {}", ledger.balance_of(alice.address()));
    info!("bob balance:   {}", ledger.balance_of(bob.address()));
    info!("miner balance: {}", ledger.balance_of(miner.address()));

    Ok(())
}
