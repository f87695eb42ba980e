//! Liquidation trigger: permissionless eviction of an under-collateralized holder.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use feeauction_common::error::AuctionError;
use feeauction_common::events::Evicted;
use feeauction_common::types::{EvictionReason, ResourceId};

use crate::custodian::Custodian;
use crate::engine::{AuctionEngine, Tx};
use crate::rent::pending_rent;

/// How a successful `liquidate` call removed the holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liquidation {
    /// The holder was solvent at settlement but below the runway buffer.
    Liquidated { holder: Address },
    /// The settlement opening this call already evicted the holder.
    EvictedBySettlement { holder: Address },
}

/// Reset the working copy to the vacant state.
///
/// `last_acquired_at` restarts at `now` so the vacancy gets a fresh cooldown clock.
pub(crate) fn evict(tx: &mut Tx<'_>, reason: EvictionReason) {
    let holder = tx.state.holder.take();
    tx.state.strategy = None;
    tx.state.fee_recipient = None;
    tx.state.rent_rate = 0;
    tx.state.last_acquired_at = tx.now;

    if let Some(holder) = holder {
        tx.emit(&Evicted {
            resource: tx.resource,
            holder,
            reason: reason.code(),
        });
        tracing::info!(
            resource = %tx.resource,
            holder = %holder,
            reason = %reason,
            "Holder evicted"
        );
    }
}

/// Runway buffer below which a holder may be liquidated.
fn liquidation_buffer(rent_rate: u128, window: u64) -> Result<u128, AuctionError> {
    rent_rate
        .checked_mul(u128::from(window))
        .ok_or(AuctionError::ArithmeticOverflow)
}

impl<C: Custodian> AuctionEngine<C> {
    /// Evict the holder of `resource` if its collateral is at or below
    /// `rent_rate * liquidation_window`. Callable by anyone.
    pub fn liquidate(&mut self, resource: ResourceId, now: u64) -> Result<Liquidation, AuctionError> {
        self.transact(resource, now, |tx, _| {
            if let Some(holder) = tx.settlement.evicted {
                return Ok(Liquidation::EvictedBySettlement { holder });
            }

            let Some(holder) = tx.state.holder else {
                return Err(AuctionError::NotLiquidatable {
                    balance: 0,
                    buffer: 0,
                });
            };

            let buffer = liquidation_buffer(tx.state.rent_rate, tx.params.liquidation_window)?;
            let balance = tx.balance(holder);
            if balance > buffer {
                return Err(AuctionError::NotLiquidatable { balance, buffer });
            }

            evict(tx, EvictionReason::Liquidation);
            Ok(Liquidation::Liquidated { holder })
        })
    }

    /// Whether `liquidate(resource)` at `now` would succeed. No state changes.
    pub fn is_liquidatable(&self, resource: ResourceId, now: u64) -> Result<bool, AuctionError> {
        let state = self.get_auction_state(resource);
        let Some(holder) = state.holder else {
            return Ok(false);
        };

        let owed = pending_rent(&state, now)?;
        let balance = self.get_deposit(resource, holder);
        let Some(remaining) = balance.checked_sub(owed) else {
            return Ok(true);
        };
        let buffer = liquidation_buffer(state.rent_rate, self.params.liquidation_window)?;
        Ok(remaining <= buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;

    #[test]
    fn test_well_funded_holder_not_liquidatable() {
        let (mut engine, id) = setup();
        holder_with_rent(&mut engine, id, ALICE, 1_000, 200_000, 0);

        let err = engine.liquidate(id, 10).unwrap_err();
        assert_eq!(
            err,
            AuctionError::NotLiquidatable {
                balance: 190_000,
                buffer: 20_000
            }
        );
        // the failed call rolled its settlement back too
        assert_eq!(engine.get_deposit(id, ALICE), 200_000);
        assert_eq!(engine.get_auction_state(id).last_settled_at, 0);
    }

    #[test]
    fn test_liquidate_at_buffer_boundary() {
        let (mut engine, id) = setup();
        holder_with_rent(&mut engine, id, ALICE, 1_000, 100_000, 0);

        // after 79 units 21_000 remain: one unit above the buffer
        assert!(!engine.is_liquidatable(id, 79).unwrap());
        assert!(engine.liquidate(id, 79).is_err());

        // after 80 units exactly 20_000 remain
        assert!(engine.is_liquidatable(id, 80).unwrap());
        let outcome = engine.liquidate(id, 80).unwrap();
        assert_eq!(outcome, Liquidation::Liquidated { holder: ALICE });

        let state = engine.get_auction_state(id);
        assert!(state.is_vacant());
        assert_eq!(state.rent_rate, 0);
        assert_eq!(state.last_acquired_at, 80);
        // the holder keeps the remaining collateral and may withdraw it
        assert_eq!(engine.get_deposit(id, ALICE), 20_000);
        engine.withdraw(id, ALICE, 20_000, 81).unwrap();
    }

    #[test]
    fn test_liquidate_after_settlement_eviction_commits() {
        let (mut engine, id) = setup();
        holder_with_rent(&mut engine, id, ALICE, 1_000, 100_000, 0);

        assert!(engine.is_liquidatable(id, 500).unwrap());
        let outcome = engine.liquidate(id, 500).unwrap();
        assert_eq!(outcome, Liquidation::EvictedBySettlement { holder: ALICE });
        assert!(engine.get_auction_state(id).is_vacant());
        assert_eq!(engine.get_deposit(id, ALICE), 0);
    }

    #[test]
    fn test_vacant_resource_not_liquidatable() {
        let (mut engine, id) = setup();
        assert!(!engine.is_liquidatable(id, 5).unwrap());
        assert!(matches!(
            engine.liquidate(id, 5),
            Err(AuctionError::NotLiquidatable { .. })
        ));
    }

    #[test]
    fn test_anyone_may_liquidate_zero_rent_holder_without_collateral() {
        let (mut engine, id) = setup();
        engine
            .modify_bid(id, ALICE, bid(0, ALICE), 0)
            .unwrap();
        // buffer is zero and so is the balance
        assert_eq!(
            engine.liquidate(id, 1).unwrap(),
            Liquidation::Liquidated { holder: ALICE }
        );
    }
}
