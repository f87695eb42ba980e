//! Fee delegation: prices each trade with the holder's strategy and sends
//! the fee to the holder's recipient instead of the LP fee pool.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use feeauction_common::error::{AuctionError, StrategyError};
use feeauction_common::events::FeeRedirected;
use feeauction_common::types::{Currency, MAX_FEE_PIPS, ResourceId, TradeParams};

use crate::custodian::{Custodian, Transfer};
use crate::engine::AuctionEngine;

/// How the custodian must charge a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeDecision {
    /// No strategy attached: apply `lp_fee` (pips) as the pool's normal fee.
    Pool { lp_fee: u32 },
    /// Strategy fee carved from the specified side and paid to `recipient`;
    /// the pool's own LP fee is overridden to zero.
    Delegated {
        recipient: Address,
        currency: Currency,
        amount: u128,
    },
}

impl FeeDecision {
    /// LP fee the custodian applies for this trade.
    pub fn lp_fee(&self) -> u32 {
        match self {
            FeeDecision::Pool { lp_fee } => *lp_fee,
            FeeDecision::Delegated { .. } => 0,
        }
    }
}

/// `amount * fee / 1e6`, rounded down, without an intermediate overflow.
pub fn fee_amount(amount: u128, fee: u32) -> Result<u128, AuctionError> {
    if fee > MAX_FEE_PIPS {
        return Err(AuctionError::InvalidFee { fee });
    }
    let pips = u128::from(MAX_FEE_PIPS);
    let fee = u128::from(fee);
    Ok((amount / pips) * fee + (amount % pips) * fee / pips)
}

impl<C: Custodian> AuctionEngine<C> {
    /// Trade hook: settle rent, then decide who collects the fee on `trade`.
    pub fn before_swap(
        &mut self,
        resource: ResourceId,
        trade: &TradeParams,
        now: u64,
    ) -> Result<FeeDecision, AuctionError> {
        self.transact(resource, now, |tx, strategies| {
            let Some(strategy_address) = tx.state.strategy else {
                return Ok(FeeDecision::Pool {
                    lp_fee: tx.config.default_fee,
                });
            };

            let rate = strategies
                .get(&strategy_address)?
                .compute_fee(tx.resource, trade)?;
            let amount = fee_amount(trade.specified_amount(), rate)?;
            let currency = trade.specified_currency(&tx.config.key);
            let recipient = tx
                .state
                .fee_recipient
                .or(tx.state.holder)
                .ok_or(StrategyError::Reverted {
                    strategy: strategy_address,
                    reason: "no fee recipient".to_string(),
                })?;

            if amount > 0 {
                tx.stage(Transfer::PayFee {
                    to: recipient,
                    currency,
                    amount,
                });
                tx.emit(&FeeRedirected {
                    resource: tx.resource,
                    recipient,
                    currency,
                    amount,
                });
            }

            tracing::debug!(
                resource = %tx.resource,
                strategy = %strategy_address,
                rate,
                amount,
                recipient = %recipient,
                "Trade fee delegated"
            );

            Ok(FeeDecision::Delegated {
                recipient,
                currency,
                amount,
            })
        })
    }
}
