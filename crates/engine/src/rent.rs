//! Rent accrual: streams the holder's rent to the resource's LPs.
//!
//! Settlement charges `rent_rate * elapsed` against the holder's collateral,
//! truncated to what the holder actually has. A shortfall evicts the holder in
//! the same step; it is never a failed call.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use feeauction_common::error::AuctionError;
use feeauction_common::events::RentSettled;
use feeauction_common::types::{AuctionState, EvictionReason, ResourceId};

use crate::custodian::{Custodian, Transfer};
use crate::engine::{AuctionEngine, Tx};
use crate::liquidation::evict;

/// Result of one settlement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Rent accrued since the previous settlement.
    pub owed: u128,
    /// Rent actually taken from the holder (`<= owed`).
    pub paid: u128,
    /// Holder evicted for failing to pay in full.
    pub evicted: Option<Address>,
}

/// Rent the next settlement of `state` at `now` would owe.
pub fn pending_rent(state: &AuctionState, now: u64) -> Result<u128, AuctionError> {
    let elapsed = now
        .checked_sub(state.last_settled_at)
        .ok_or(AuctionError::ClockRegression {
            now,
            last_settled_at: state.last_settled_at,
        })?;
    if elapsed == 0 || state.rent_rate == 0 {
        return Ok(0);
    }
    state
        .rent_rate
        .checked_mul(u128::from(elapsed))
        .ok_or(AuctionError::ArithmeticOverflow)
}

/// Settle the working copy's outstanding rent. Idempotent at a fixed `now`.
pub(crate) fn settle(tx: &mut Tx<'_>) -> Result<Settlement, AuctionError> {
    let owed = pending_rent(&tx.state, tx.now)?;
    let holder = match tx.state.holder {
        Some(holder) if owed > 0 => holder,
        _ => {
            tx.state.last_settled_at = tx.now;
            return Ok(Settlement::default());
        }
    };

    let available = tx.balance(holder);
    let paid = owed.min(available);
    tx.set_balance(holder, available - paid);
    if paid > 0 {
        let currency = tx.rent_currency();
        tx.stage(Transfer::Distribute {
            currency,
            amount: paid,
        });
    }
    tx.state.last_settled_at = tx.now;

    tx.emit(&RentSettled {
        resource: tx.resource,
        holder,
        owed,
        paid,
        settledAt: tx.now,
    });

    tracing::debug!(
        resource = %tx.resource,
        holder = %holder,
        owed,
        paid,
        "Rent settled"
    );

    let evicted = if paid < owed {
        evict(tx, EvictionReason::RentShortfall);
        Some(holder)
    } else {
        None
    };

    Ok(Settlement {
        owed,
        paid,
        evicted,
    })
}

impl<C: Custodian> AuctionEngine<C> {
    /// Force settlement of `resource` without any other effect.
    pub fn poke(&mut self, resource: ResourceId, now: u64) -> Result<Settlement, AuctionError> {
        self.transact(resource, now, |tx, _| Ok(tx.settlement))
    }

    /// Rent the next settlement of `resource` at `now` would owe.
    pub fn pending_rent(&self, resource: ResourceId, now: u64) -> Result<u128, AuctionError> {
        pending_rent(&self.get_auction_state(resource), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;

    #[test]
    fn test_pending_rent_is_rate_times_elapsed() {
        let state = AuctionState {
            holder: Some(ALICE),
            rent_rate: 7,
            last_settled_at: 10,
            ..AuctionState::default()
        };
        assert_eq!(pending_rent(&state, 10).unwrap(), 0);
        assert_eq!(pending_rent(&state, 13).unwrap(), 21);
    }

    #[test]
    fn test_pending_rent_overflow_is_fatal() {
        let state = AuctionState {
            holder: Some(ALICE),
            rent_rate: u128::MAX,
            last_settled_at: 0,
            ..AuctionState::default()
        };
        assert_eq!(
            pending_rent(&state, 2),
            Err(AuctionError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_poke_charges_exact_rent() {
        let (mut engine, id) = setup();
        holder_with_rent(&mut engine, id, ALICE, 1_000, 200_000, 0);

        let settlement = engine.poke(id, 120).unwrap();
        assert_eq!(settlement.owed, 120_000);
        assert_eq!(settlement.paid, 120_000);
        assert_eq!(settlement.evicted, None);
        assert_eq!(engine.get_deposit(id, ALICE), 80_000);
        assert_eq!(engine.get_auction_state(id).holder, Some(ALICE));
        assert_eq!(engine.custodian().distributed_to_lps(id, TOKEN0), 120_000);
    }

    #[test]
    fn test_second_poke_at_same_time_is_noop() {
        let (mut engine, id) = setup();
        holder_with_rent(&mut engine, id, ALICE, 1_000, 200_000, 0);

        engine.poke(id, 50).unwrap();
        let journal_len = engine.journal().len();
        let settlement = engine.poke(id, 50).unwrap();

        assert_eq!(settlement, Settlement::default());
        assert_eq!(engine.get_deposit(id, ALICE), 150_000);
        assert_eq!(engine.journal().len(), journal_len);
    }

    #[test]
    fn test_shortfall_evicts_and_takes_only_balance() {
        let (mut engine, id) = setup();
        // exactly enough collateral for the reserve window
        holder_with_rent(&mut engine, id, ALICE, 1_000, 100_000, 0);

        let settlement = engine.poke(id, 150).unwrap();
        assert_eq!(settlement.owed, 150_000);
        assert_eq!(settlement.paid, 100_000);
        assert_eq!(settlement.evicted, Some(ALICE));

        let state = engine.get_auction_state(id);
        assert!(state.is_vacant());
        assert_eq!(state.rent_rate, 0);
        assert_eq!(state.strategy, None);
        assert_eq!(state.fee_recipient, None);
        assert_eq!(state.last_acquired_at, 150);
        assert_eq!(engine.get_deposit(id, ALICE), 0);
        assert_eq!(engine.custodian().distributed_to_lps(id, TOKEN0), 100_000);
    }

    #[test]
    fn test_vacant_resource_accrues_nothing() {
        let (mut engine, id) = setup();
        let settlement = engine.poke(id, 1_000).unwrap();
        assert_eq!(settlement, Settlement::default());
        assert_eq!(engine.get_auction_state(id).last_settled_at, 1_000);
    }
}
