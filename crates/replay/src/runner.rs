//! Drives a [`Script`] through the auction service and collects the outcome.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use alloy::primitives::Address;
use serde::Serialize;

use feeauction_common::config::AuctionConfig;
use feeauction_common::error::AuctionError;
use feeauction_common::types::{AuctionState, DecodedEvent, ResourceId};
use feeauction_decoders::DecoderRegistry;
use feeauction_engine::{
    AuctionEngine, AuctionHandle, AuctionService, BidOutcome, ConstantFee, FeeDecision, LedgerCustodian,
    Liquidation, Settlement, StrategyRegistry,
};

use crate::script::{Call, Script};

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub calls: Vec<CallRecord>,
    pub resources: Vec<ResourceReport>,
    pub wallets: Vec<WalletBalance>,
    pub events: Vec<DecodedEvent>,
}

impl ReplayReport {
    pub fn failed(&self) -> usize {
        self.calls.iter().filter(|c| c.error.is_some()).count()
    }
}

#[derive(Debug, Serialize)]
pub struct CallRecord {
    pub index: usize,
    pub at: u64,
    pub call: &'static str,
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CallResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Return value of an accepted call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallResult {
    /// New collateral balance after a deposit or withdrawal.
    Balance(u128),
    Bid(BidOutcome),
    Liquidation(Liquidation),
    Fee(FeeDecision),
    Settlement(Settlement),
}

#[derive(Debug, Serialize)]
pub struct ResourceReport {
    pub name: String,
    pub id: ResourceId,
    pub state: AuctionState,
    pub deposits: Vec<DepositBalance>,
}

#[derive(Debug, Serialize)]
pub struct DepositBalance {
    pub bidder: Address,
    pub balance: u128,
}

#[derive(Debug, Serialize)]
pub struct WalletBalance {
    pub owner: Address,
    pub currency: Address,
    pub balance: u128,
}

/// Replay `script` against a fresh engine.
///
/// Rejected calls are recorded and skipped; only script-level problems
/// (a resource that fails to register, a stopped service) abort the run.
pub async fn run(script: &Script, config: AuctionConfig) -> anyhow::Result<ReplayReport> {
    script.validate()?;
    config.validate()?;

    let mut custodian = LedgerCustodian::new();
    for balance in &script.balances {
        custodian.fund(balance.owner, balance.currency, balance.amount);
    }

    let mut strategies = StrategyRegistry::new();
    for entry in &script.strategies {
        strategies.register(entry.address, Arc::new(ConstantFee::new(entry.fee)));
    }

    let engine = AuctionEngine::new(script.engine, config, custodian).with_strategies(strategies);
    let (handle, task) = AuctionService::spawn(engine);

    let mut ids = HashMap::new();
    for resource in &script.resources {
        let id = handle.initialize(resource.config(), resource.at).await?;
        ids.insert(resource.name.clone(), id);
    }

    let mut bidders: HashMap<&str, BTreeSet<Address>> = HashMap::new();
    let mut calls = Vec::with_capacity(script.calls.len());

    for (index, entry) in script.calls.iter().enumerate() {
        let name = entry.call.resource();
        let id = ids
            .get(name)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("unknown resource '{name}'"))?;
        if let Some(bidder) = entry.call.bidder() {
            bidders.entry(name).or_default().insert(bidder);
        }

        let outcome = dispatch(&handle, id, &entry.call, entry.at).await;
        let record = match outcome {
            Ok(result) => CallRecord {
                index,
                at: entry.at,
                call: entry.call.name(),
                resource: name.to_string(),
                result: Some(result),
                error: None,
            },
            Err(AuctionError::ServiceUnavailable) => {
                anyhow::bail!("auction service stopped at call #{index}")
            }
            Err(e) => {
                tracing::warn!(index, at = entry.at, call = entry.call.name(), error = %e, "Call failed, skipping");
                CallRecord {
                    index,
                    at: entry.at,
                    call: entry.call.name(),
                    resource: name.to_string(),
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        };
        calls.push(record);
    }

    let mut resources = Vec::with_capacity(script.resources.len());
    for resource in &script.resources {
        let id = ids
            .get(&resource.name)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("unknown resource '{}'", resource.name))?;
        let mut deposits = Vec::new();
        for bidder in bidders.get(resource.name.as_str()).into_iter().flatten() {
            let balance = handle.get_deposit(id, *bidder).await?;
            deposits.push(DepositBalance {
                bidder: *bidder,
                balance,
            });
        }
        resources.push(ResourceReport {
            name: resource.name.clone(),
            id,
            state: handle.get_auction_state(id).await?,
            deposits,
        });
    }

    let journal = handle.journal().await?;
    let events = DecoderRegistry::new().decode_all(&journal);

    drop(handle);
    let engine = task.await?;
    let wallets = script
        .balances
        .iter()
        .map(|b| WalletBalance {
            owner: b.owner,
            currency: b.currency,
            balance: engine.custodian().balance_of(b.owner, b.currency),
        })
        .collect();

    let report = ReplayReport {
        calls,
        resources,
        wallets,
        events,
    };
    tracing::info!(
        calls = report.calls.len(),
        failed = report.failed(),
        events = report.events.len(),
        "Replay finished"
    );
    Ok(report)
}

async fn dispatch(
    handle: &AuctionHandle,
    id: ResourceId,
    call: &Call,
    now: u64,
) -> Result<CallResult, AuctionError> {
    let result = match call {
        Call::Deposit { bidder, amount, .. } => {
            CallResult::Balance(handle.deposit(id, *bidder, *amount, now).await?)
        }
        Call::Withdraw { bidder, amount, .. } => {
            CallResult::Balance(handle.withdraw(id, *bidder, *amount, now).await?)
        }
        Call::ModifyBid { bidder, bid, .. } => CallResult::Bid(handle.modify_bid(id, *bidder, *bid, now).await?),
        Call::Liquidate { .. } => CallResult::Liquidation(handle.liquidate(id, now).await?),
        Call::Swap { trade, .. } => CallResult::Fee(handle.before_swap(id, *trade, now).await?),
        Call::AddLiquidity { .. } => CallResult::Settlement(handle.before_add_liquidity(id, now).await?),
        Call::RemoveLiquidity { .. } => CallResult::Settlement(handle.before_remove_liquidity(id, now).await?),
    };
    Ok(result)
}
