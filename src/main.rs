//! LYRA Blockchain Node
//!
//! Main entry point for running a LYRA node: loads the stored chain,
//! rebuilds the Proof-of-Loyalty ledger from it, serves the JSON-RPC
//! query surface, and optionally runs a devnet block producer that
//! embeds a miner tag in each coinbase.

use clap::Parser;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::sleep;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lyra_core::consensus::{Block, BlockHeader, Script, Transaction, TxOutput};
use lyra_core::constants::TAG_PREFIX;
use lyra_core::crypto::hash_bytes;
use lyra_core::loyalty::{
    allowed_subsidy, rebuild_from_chain, LoyaltyLedger, MinerTag, PolParams,
};
use lyra_core::node::{create_genesis_block, genesis_chain_id};
use lyra_core::rpc::{start_rpc_server, RpcState};
use lyra_core::storage::{ChainDb, ChainState};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "LYRA node")]
struct Settings {
    #[arg(long, env = "LYRA_DB_PATH", default_value = "./data/lyra")]
    db_path: String,
    #[arg(long, env = "LYRA_RPC_PORT", default_value_t = 8645)]
    rpc_port: u16,
    /// Height at which PoL tag tracking begins
    #[arg(long, env = "POL_START_HEIGHT", default_value_t = 1)]
    pol_start_height: i64,
    /// Height at which the allowed-subsidy rule is enforced
    #[arg(long, env = "POL_ENFORCE_HEIGHT", default_value_t = 1)]
    pol_enforce_height: i64,
    /// PoL month length in blocks
    #[arg(long, env = "POL_MONTH_BLOCKS", default_value_t = 4320)]
    pol_month_blocks: i64,
    /// Stratum extranonce1 size in bytes (informational, clamped to [0,16])
    #[arg(long, env = "POL_EXTRANONCE1_SIZE", default_value_t = 4)]
    pol_extranonce1_size: i64,
    /// Devnet producer: embed this tag (hex, 4/8/12 bytes) in coinbases
    #[arg(long, env = "LYRA_MINE_TAG")]
    mine_tag: Option<String>,
    /// Devnet producer block interval in seconds
    #[arg(long, env = "LYRA_MINE_INTERVAL_SECS", default_value_t = 5)]
    mine_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = PolParams::new(
        settings.pol_start_height,
        settings.pol_enforce_height,
        settings.pol_month_blocks,
        settings.pol_extranonce1_size,
    );

    info!(chain_id = %genesis_chain_id(), "starting LYRA node");

    let db = ChainDb::open(&settings.db_path)?;

    // Restore the chain from disk, or bootstrap from genesis
    let mut chain = ChainState::new();
    let stored = db.load_blocks()?;
    if stored.is_empty() {
        let genesis = create_genesis_block();
        info!(hash = %genesis.hash(), "bootstrapping from genesis");
        db.save_block(0, &genesis)?;
        chain.restore_block(0, genesis);
    } else {
        for (height, block) in stored {
            chain.restore_block(height, block);
        }
    }
    info!(tip = chain.tip_height(), blocks = chain.len(), "chain loaded");

    // Old blocks are not re-connected on restart, so the ledger must be
    // rebuilt from storage before anything queries it. The chain is not
    // yet shared here, which gives the rebuild its exclusive scan.
    let ledger = Arc::new(LoyaltyLedger::new(params));
    rebuild_from_chain(&ledger, &chain);

    let chain_state = Arc::new(Mutex::new(chain));

    if let Some(tag_hex) = settings.mine_tag.clone() {
        let tag = MinerTag::from_hex(&tag_hex)?;
        spawn_devnet_producer(
            chain_state.clone(),
            ledger.clone(),
            db.clone(),
            tag,
            settings.mine_interval_secs,
        );
    }

    let rpc_state = Arc::new(RpcState {
        chain_state,
        ledger,
    });

    tokio::select! {
        res = start_rpc_server(rpc_state, settings.rpc_port) => res?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping node");
        }
    }

    Ok(())
}

/// Produce one tagged block per interval and feed it through the live
/// connect path (devnet stand-in for the mining loop; no PoW)
fn spawn_devnet_producer(
    chain_state: Arc<Mutex<ChainState>>,
    ledger: Arc<LoyaltyLedger>,
    db: ChainDb,
    tag: MinerTag,
    interval_secs: u64,
) {
    info!(tag = %tag, interval_secs, "devnet block producer enabled");

    tokio::spawn(async move {
        loop {
            sleep(Duration::from_secs(interval_secs)).await;

            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);

            // Lock order: chain state first, ledger second
            let mut chain = chain_state.lock().unwrap();
            let height = chain.tip_height() + 1;
            let block = assemble_tagged_block(&ledger, &tag, chain.tip_hash(), height, now);

            chain.connect_block(block.clone());
            if let Err(e) = db.save_block(height, &block) {
                error!(height, error = %e, "failed to persist block");
            }
            ledger.on_block_connected(&block, height, now as i64);
            drop(chain);

            info!(height, tag = %tag, "connected devnet block");
        }
    });
}

/// Build a block whose coinbase carries the marker plus a payout output
fn assemble_tagged_block(
    ledger: &LoyaltyLedger,
    tag: &MinerTag,
    prev_hash: lyra_core::crypto::Hash,
    height: i64,
    timestamp: u64,
) -> Block {
    let mut payload = TAG_PREFIX.to_vec();
    payload.extend_from_slice(tag.as_bytes());

    let payout_value = allowed_subsidy(ledger, tag, height);
    let coinbase = Transaction::coinbase(vec![
        TxOutput {
            value: 0,
            script_pubkey: Script::op_return_push(&payload),
        },
        TxOutput {
            value: payout_value,
            script_pubkey: Script::pay_to_pubkey_hash(&hash_bytes(tag.as_bytes())),
        },
    ]);

    let merkle_root = coinbase.hash();
    let header = BlockHeader::new(1, prev_hash, merkle_root, timestamp, 0x1e00ffff, 0);
    Block::new(header, vec![coinbase])
}
