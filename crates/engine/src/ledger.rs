//! Collateral ledger: per-(resource, bidder) balances of the rent asset.
//!
//! Only the bidder credits or debits its own account through deposit and
//! withdraw; rent settlement is the only other debit.

use alloy::primitives::Address;

use feeauction_common::error::AuctionError;
use feeauction_common::events::{Deposited, Withdrawn};
use feeauction_common::types::{AuctionState, ResourceId};

use crate::bid::min_collateral;
use crate::custodian::{Custodian, Transfer};
use crate::engine::AuctionEngine;

/// Collateral `bidder` must leave behind when withdrawing.
///
/// Only the sitting holder carries a reserve; other bidders may withdraw
/// everything.
pub fn min_reserve(
    state: &AuctionState,
    bidder: Address,
    reserve_window: u64,
) -> Result<u128, AuctionError> {
    if state.is_held_by(bidder) {
        min_collateral(state.rent_rate, reserve_window)
    } else {
        Ok(0)
    }
}

impl<C: Custodian> AuctionEngine<C> {
    /// Credit `amount` of the rent asset to `bidder`'s collateral on `resource`.
    /// Returns the new balance.
    pub fn deposit(
        &mut self,
        resource: ResourceId,
        bidder: Address,
        amount: u128,
        now: u64,
    ) -> Result<u128, AuctionError> {
        if amount == 0 {
            return Err(AuctionError::ZeroAmount);
        }

        self.transact(resource, now, |tx, _| {
            let balance = tx
                .balance(bidder)
                .checked_add(amount)
                .ok_or(AuctionError::ArithmeticOverflow)?;
            tx.set_balance(bidder, balance);

            let currency = tx.rent_currency();
            tx.stage(Transfer::Collect {
                from: bidder,
                currency,
                amount,
            });
            tx.emit(&Deposited {
                resource: tx.resource,
                bidder,
                amount,
                balance,
            });

            tracing::debug!(resource = %tx.resource, bidder = %bidder, amount, balance, "Collateral deposited");
            Ok(balance)
        })
    }

    /// Release `amount` of `bidder`'s collateral on `resource`, keeping the
    /// holder's reserve intact. Returns the new balance.
    pub fn withdraw(
        &mut self,
        resource: ResourceId,
        bidder: Address,
        amount: u128,
        now: u64,
    ) -> Result<u128, AuctionError> {
        if amount == 0 {
            return Err(AuctionError::ZeroAmount);
        }

        self.transact(resource, now, |tx, _| {
            let reserve = min_reserve(&tx.state, bidder, tx.params.min_reserve_window)?;
            let required = amount
                .checked_add(reserve)
                .ok_or(AuctionError::ArithmeticOverflow)?;
            let balance = tx.balance(bidder);
            if balance < required {
                return Err(AuctionError::InsufficientCollateral { balance, required });
            }

            let balance = balance - amount;
            tx.set_balance(bidder, balance);

            let currency = tx.rent_currency();
            tx.stage(Transfer::Release {
                to: bidder,
                currency,
                amount,
            });
            tx.emit(&Withdrawn {
                resource: tx.resource,
                bidder,
                amount,
                balance,
            });

            tracing::debug!(resource = %tx.resource, bidder = %bidder, amount, balance, "Collateral withdrawn");
            Ok(balance)
        })
    }
}
