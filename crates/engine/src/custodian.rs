//! Custodian seam: the exchange that holds funds on the engine's behalf.
//!
//! The engine never moves funds directly. Each call stages a list of
//! [`Transfer`]s and hands them to the custodian as one batch once every
//! precondition has passed; a batch either executes completely or not at all.

use std::collections::HashMap;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use feeauction_common::error::CustodyError;
use feeauction_common::types::{Currency, ResourceId};

/// A single fund movement requested by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transfer {
    /// Move collateral from a bidder into engine custody.
    Collect {
        from: Address,
        currency: Currency,
        amount: u128,
    },
    /// Return collateral from engine custody to a bidder.
    Release {
        to: Address,
        currency: Currency,
        amount: u128,
    },
    /// Route rent from engine custody to the resource's liquidity providers,
    /// pro rata to their liquidity.
    Distribute { currency: Currency, amount: u128 },
    /// Pay a trade fee, carved out of the trade itself, to the holder's recipient.
    PayFee {
        to: Address,
        currency: Currency,
        amount: u128,
    },
}

/// Asset custody primitives consumed by the engine.
pub trait Custodian: Send {
    /// Execute a batch of transfers for `resource` atomically.
    fn execute(&mut self, resource: ResourceId, transfers: &[Transfer]) -> Result<(), CustodyError>;
}

/// In-memory custodian with per-owner balances.
///
/// Used by tests and the replay tool. Tracks what each owner holds, what the
/// engine holds in custody, and what each resource's LPs have received.
#[derive(Debug, Clone, Default)]
pub struct LedgerCustodian {
    balances: HashMap<(Address, Currency), u128>,
    custody: HashMap<Currency, u128>,
    distributed: HashMap<(ResourceId, Currency), u128>,
}

impl LedgerCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an owner with funds from outside the system (opening balances).
    pub fn fund(&mut self, owner: Address, currency: Currency, amount: u128) {
        let balance = self.balances.entry((owner, currency)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, owner: Address, currency: Currency) -> u128 {
        self.balances.get(&(owner, currency)).copied().unwrap_or(0)
    }

    pub fn custody_of(&self, currency: Currency) -> u128 {
        self.custody.get(&currency).copied().unwrap_or(0)
    }

    /// Total rent routed to the liquidity providers of `resource`.
    pub fn distributed_to_lps(&self, resource: ResourceId, currency: Currency) -> u128 {
        self.distributed
            .get(&(resource, currency))
            .copied()
            .unwrap_or(0)
    }
}

/// Working copy of the entries a batch touches.
#[derive(Default)]
struct Staged {
    balances: HashMap<(Address, Currency), u128>,
    custody: HashMap<Currency, u128>,
    distributed: HashMap<(ResourceId, Currency), u128>,
}

impl Custodian for LedgerCustodian {
    fn execute(&mut self, resource: ResourceId, transfers: &[Transfer]) -> Result<(), CustodyError> {
        let mut staged = Staged::default();

        for transfer in transfers {
            match *transfer {
                Transfer::Collect {
                    from,
                    currency,
                    amount,
                } => {
                    let available = *staged
                        .balances
                        .entry((from, currency))
                        .or_insert_with(|| self.balance_of(from, currency));
                    let remaining =
                        available
                            .checked_sub(amount)
                            .ok_or(CustodyError::InsufficientFunds {
                                owner: from,
                                currency,
                                available,
                                required: amount,
                            })?;
                    staged.balances.insert((from, currency), remaining);
                    let held = staged
                        .custody
                        .entry(currency)
                        .or_insert_with(|| self.custody_of(currency));
                    *held = held
                        .checked_add(amount)
                        .ok_or(CustodyError::Overflow { currency })?;
                }
                Transfer::Release {
                    to,
                    currency,
                    amount,
                } => {
                    debit_custody(self, &mut staged, currency, amount)?;
                    let balance = staged
                        .balances
                        .entry((to, currency))
                        .or_insert_with(|| self.balance_of(to, currency));
                    *balance = balance
                        .checked_add(amount)
                        .ok_or(CustodyError::Overflow { currency })?;
                }
                Transfer::Distribute { currency, amount } => {
                    debit_custody(self, &mut staged, currency, amount)?;
                    let total = staged
                        .distributed
                        .entry((resource, currency))
                        .or_insert_with(|| self.distributed_to_lps(resource, currency));
                    *total = total
                        .checked_add(amount)
                        .ok_or(CustodyError::Overflow { currency })?;
                }
                Transfer::PayFee {
                    to,
                    currency,
                    amount,
                } => {
                    let balance = staged
                        .balances
                        .entry((to, currency))
                        .or_insert_with(|| self.balance_of(to, currency));
                    *balance = balance
                        .checked_add(amount)
                        .ok_or(CustodyError::Overflow { currency })?;
                }
            }
        }

        self.balances.extend(staged.balances);
        self.custody.extend(staged.custody);
        self.distributed.extend(staged.distributed);
        Ok(())
    }
}

fn debit_custody(
    custodian: &LedgerCustodian,
    staged: &mut Staged,
    currency: Currency,
    amount: u128,
) -> Result<(), CustodyError> {
    let held = staged
        .custody
        .entry(currency)
        .or_insert_with(|| custodian.custody_of(currency));
    *held = held
        .checked_sub(amount)
        .ok_or(CustodyError::InsufficientCustody {
            currency,
            available: *held,
            required: amount,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    const TOKEN: Address = Address::repeat_byte(0x10);
    const ALICE: Address = Address::repeat_byte(0xA1);
    const RESOURCE: B256 = B256::repeat_byte(0x77);

    #[test]
    fn test_collect_then_distribute() {
        let mut custodian = LedgerCustodian::new();
        custodian.fund(ALICE, TOKEN, 1_000);

        custodian
            .execute(
                RESOURCE,
                &[
                    Transfer::Collect {
                        from: ALICE,
                        currency: TOKEN,
                        amount: 600,
                    },
                    Transfer::Distribute {
                        currency: TOKEN,
                        amount: 250,
                    },
                ],
            )
            .unwrap();

        assert_eq!(custodian.balance_of(ALICE, TOKEN), 400);
        assert_eq!(custodian.custody_of(TOKEN), 350);
        assert_eq!(custodian.distributed_to_lps(RESOURCE, TOKEN), 250);
    }

    #[test]
    fn test_failed_batch_changes_nothing() {
        let mut custodian = LedgerCustodian::new();
        custodian.fund(ALICE, TOKEN, 100);

        let err = custodian
            .execute(
                RESOURCE,
                &[
                    Transfer::Collect {
                        from: ALICE,
                        currency: TOKEN,
                        amount: 100,
                    },
                    Transfer::Release {
                        to: ALICE,
                        currency: TOKEN,
                        amount: 101,
                    },
                ],
            )
            .unwrap_err();

        assert!(matches!(err, CustodyError::InsufficientCustody { .. }));
        assert_eq!(custodian.balance_of(ALICE, TOKEN), 100);
        assert_eq!(custodian.custody_of(TOKEN), 0);
    }

    #[test]
    fn test_collect_beyond_balance_fails() {
        let mut custodian = LedgerCustodian::new();
        let err = custodian
            .execute(
                RESOURCE,
                &[Transfer::Collect {
                    from: ALICE,
                    currency: TOKEN,
                    amount: 1,
                }],
            )
            .unwrap_err();
        assert_eq!(
            err,
            CustodyError::InsufficientFunds {
                owner: ALICE,
                currency: TOKEN,
                available: 0,
                required: 1,
            }
        );
    }
}
