//! Bid validator: admits bids, enforces the usurpation premium and the cooldown.
//!
//! Competing bids are ordered by the caller's serialization; a losing bid
//! simply fails the premium or cooldown check against the updated state.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use feeauction_common::config::BPS_DENOMINATOR;
use feeauction_common::error::AuctionError;
use feeauction_common::events::{BidModified, HolderChanged};
use feeauction_common::types::{Bid, ResourceId};

use crate::custodian::Custodian;
use crate::engine::AuctionEngine;

/// What a successful `modify_bid` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidOutcome {
    /// The sitting holder changed its own terms.
    Modified,
    /// The bidder took the resource from `previous` (or from vacancy).
    Acquired { previous: Option<Address> },
}

/// Minimum rent a challenger must offer to displace `incumbent_rent`,
/// rounded toward zero.
pub fn usurp_threshold(incumbent_rent: u128, factor_bps: u32) -> Result<u128, AuctionError> {
    incumbent_rent
        .checked_mul(u128::from(factor_bps))
        .map(|scaled| scaled / BPS_DENOMINATOR)
        .ok_or(AuctionError::ArithmeticOverflow)
}

/// Collateral a bidder must hold to offer `rent`.
pub fn min_collateral(rent: u128, reserve_window: u64) -> Result<u128, AuctionError> {
    rent.checked_mul(u128::from(reserve_window))
        .ok_or(AuctionError::ArithmeticOverflow)
}

impl<C: Custodian> AuctionEngine<C> {
    /// Place or modify a bid for `resource`.
    ///
    /// The holder may change its terms at any time, except lowering its rent
    /// within `cooldown` of acquiring. Anyone else must offer at least
    /// `min_usurp_factor_bps` of the current rent and becomes holder at `now`.
    pub fn modify_bid(
        &mut self,
        resource: ResourceId,
        bidder: Address,
        bid: Bid,
        now: u64,
    ) -> Result<BidOutcome, AuctionError> {
        self.transact(resource, now, |tx, _| {
            let required = min_collateral(bid.rent, tx.params.min_reserve_window)?;
            let balance = tx.balance(bidder);
            if balance < required {
                return Err(AuctionError::InsufficientCollateral { balance, required });
            }

            let outcome = if tx.state.is_held_by(bidder) {
                if bid.rent < tx.state.rent_rate {
                    let cooldown_ends = tx
                        .state
                        .last_acquired_at
                        .checked_add(tx.params.cooldown)
                        .ok_or(AuctionError::ArithmeticOverflow)?;
                    if tx.now <= cooldown_ends {
                        return Err(AuctionError::RentTooLowDuringCooldown { cooldown_ends });
                    }
                }
                BidOutcome::Modified
            } else {
                let required =
                    usurp_threshold(tx.state.rent_rate, tx.params.min_usurp_factor_bps)?;
                if bid.rent < required {
                    return Err(AuctionError::RentTooLow {
                        offered: bid.rent,
                        required,
                    });
                }
                let previous = tx.state.holder.replace(bidder);
                tx.state.last_acquired_at = tx.now;
                BidOutcome::Acquired { previous }
            };

            tx.state.rent_rate = bid.rent;
            tx.state.strategy = bid.strategy;
            tx.state.fee_recipient = Some(bid.fee_recipient);

            if let BidOutcome::Acquired { previous } = outcome {
                tx.emit(&HolderChanged {
                    resource: tx.resource,
                    previous: previous.unwrap_or(Address::ZERO),
                    next: bidder,
                    rent: bid.rent,
                });
                tracing::info!(
                    resource = %tx.resource,
                    previous = ?previous,
                    holder = %bidder,
                    rent = bid.rent,
                    "Holder changed"
                );
            }
            tx.emit(&BidModified {
                resource: tx.resource,
                holder: bidder,
                rent: bid.rent,
                strategy: bid.strategy.unwrap_or(Address::ZERO),
                feeRecipient: bid.fee_recipient,
            });

            Ok(outcome)
        })
    }
}
