//! Continuous rent auction for the right to set and collect a resource's
//! trading fee.
//!
//! - `ledger`: collateral deposits and withdrawals
//! - `rent`: per-time-unit rent accrual and settlement
//! - `bid`: bid admission, usurpation premium and cooldown
//! - `liquidation`: permissionless eviction below the runway buffer
//! - `fee`: strategy-priced fees redirected to the holder's recipient
//! - `hooks`: resource registration and liquidity-change triggers
//! - `service`: one-call-at-a-time execution over an async queue

pub mod bid;
pub mod custodian;
pub mod engine;
pub mod fee;
pub mod hooks;
pub mod ledger;
pub mod liquidation;
pub mod rent;
pub mod service;
pub mod strategy;

pub use bid::BidOutcome;
pub use custodian::{Custodian, LedgerCustodian, Transfer};
pub use engine::AuctionEngine;
pub use fee::FeeDecision;
pub use liquidation::Liquidation;
pub use rent::Settlement;
pub use service::{AuctionHandle, AuctionService};
pub use strategy::{ConstantFee, FeeStrategy, StrategyRegistry};

#[cfg(test)]
pub(crate) mod testkit;
