use alloy::primitives::Address;
use thiserror::Error;

use crate::types::{Currency, ResourceId};

/// Failures of an auction call. Every variant aborts the call atomically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("Insufficient collateral: balance {balance}, required {required}")]
    InsufficientCollateral { balance: u128, required: u128 },

    #[error("Rent too low: offered {offered}, usurpation requires {required}")]
    RentTooLow { offered: u128, required: u128 },

    #[error("Rent cannot be lowered during cooldown (ends at {cooldown_ends})")]
    RentTooLowDuringCooldown { cooldown_ends: u64 },

    #[error("Not liquidatable: balance {balance} exceeds buffer {buffer}")]
    NotLiquidatable { balance: u128, buffer: u128 },

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Resource must support variable fees (fee = {fee:#x})")]
    ResourceMustSupportVariableFee { fee: u32 },

    #[error("Resource not initialized: {0}")]
    ResourceNotInitialized(ResourceId),

    #[error("Resource already initialized: {0}")]
    ResourceAlreadyInitialized(ResourceId),

    #[error("Amount must be non-zero")]
    ZeroAmount,

    #[error("Invalid fee: {fee} pips")]
    InvalidFee { fee: u32 },

    #[error("Strategy failed: {0}")]
    StrategyFailed(#[from] StrategyError),

    #[error("Clock regression: now {now} is before last settlement {last_settled_at}")]
    ClockRegression { now: u64, last_settled_at: u64 },

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Auction service unavailable")]
    ServiceUnavailable,
}

/// Failures raised by a fee strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("strategy {0} is not registered")]
    NotRegistered(Address),

    #[error("strategy {strategy} reverted: {reason}")]
    Reverted { strategy: Address, reason: String },
}

/// Failures raised by the custodian while executing a transfer batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    #[error("{owner} holds {available} of {currency}, needs {required}")]
    InsufficientFunds {
        owner: Address,
        currency: Currency,
        available: u128,
        required: u128,
    },

    #[error("custody holds {available} of {currency}, needs {required}")]
    InsufficientCustody {
        currency: Currency,
        available: u128,
        required: u128,
    },

    #[error("balance overflow for {currency}")]
    Overflow { currency: Currency },
}
