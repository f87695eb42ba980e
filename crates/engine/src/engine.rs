//! Auction engine: per-resource arena and the atomic call wrapper.
//!
//! Every mutating entry point runs through [`AuctionEngine::transact`]:
//! 1. Reject a clock that moved backwards
//! 2. Copy the resource's auction state; collateral is copied on first touch
//! 3. Settle outstanding rent on the copy
//! 4. Run the operation body, staging transfers and journal entries
//! 5. Hand the staged transfers to the custodian as one batch
//! 6. Commit the copy and the journal entries
//!
//! A failure anywhere before step 6 leaves the engine and the custodian untouched.

use std::collections::HashMap;

use alloy::primitives::{Address, Log, LogData};
use alloy::sol_types::SolEvent;

use feeauction_common::config::AuctionConfig;
use feeauction_common::error::AuctionError;
use feeauction_common::types::{AuctionState, Currency, ResourceConfig, ResourceId};

use crate::custodian::{Custodian, Transfer};
use crate::rent::{self, Settlement};
use crate::strategy::StrategyRegistry;

/// A registered resource: its fixed configuration and its live auction state.
#[derive(Debug, Clone)]
pub(crate) struct Resource {
    pub(crate) config: ResourceConfig,
    pub(crate) state: AuctionState,
}

/// The auction engine. Single writer; callers serialize access (see `service`).
pub struct AuctionEngine<C> {
    address: Address,
    pub(crate) params: AuctionConfig,
    custodian: C,
    strategies: StrategyRegistry,
    pub(crate) resources: HashMap<ResourceId, Resource>,
    deposits: HashMap<(ResourceId, Address), u128>,
    journal: Vec<Log>,
}

impl<C: Custodian> AuctionEngine<C> {
    /// `address` is the identity the engine emits journal entries under.
    pub fn new(address: Address, params: AuctionConfig, custodian: C) -> Self {
        Self {
            address,
            params,
            custodian,
            strategies: StrategyRegistry::new(),
            resources: HashMap::new(),
            deposits: HashMap::new(),
            journal: Vec::new(),
        }
    }

    pub fn with_strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn params(&self) -> &AuctionConfig {
        &self.params
    }

    pub fn custodian(&self) -> &C {
        &self.custodian
    }

    pub fn custodian_mut(&mut self) -> &mut C {
        &mut self.custodian
    }

    pub fn strategies_mut(&mut self) -> &mut StrategyRegistry {
        &mut self.strategies
    }

    /// Committed journal entries, oldest first.
    pub fn journal(&self) -> &[Log] {
        &self.journal
    }

    pub fn resource_config(&self, resource: ResourceId) -> Option<&ResourceConfig> {
        self.resources.get(&resource).map(|r| &r.config)
    }

    /// Collateral balance of `bidder` on `resource` (zero if never deposited).
    pub fn get_deposit(&self, resource: ResourceId, bidder: Address) -> u128 {
        self.deposits
            .get(&(resource, bidder))
            .copied()
            .unwrap_or(0)
    }

    /// Auction state of `resource`; the vacant default if never registered.
    pub fn get_auction_state(&self, resource: ResourceId) -> AuctionState {
        self.resources
            .get(&resource)
            .map(|r| r.state.clone())
            .unwrap_or_default()
    }

    pub(crate) fn emit_committed(&mut self, data: LogData) {
        self.journal.push(Log {
            address: self.address,
            data,
        });
    }

    /// Run `body` against a settled working copy of `resource`, committing
    /// only if the body and the custodian batch both succeed.
    pub(crate) fn transact<T>(
        &mut self,
        resource: ResourceId,
        now: u64,
        body: impl FnOnce(&mut Tx<'_>, &StrategyRegistry) -> Result<T, AuctionError>,
    ) -> Result<T, AuctionError> {
        let entry = self
            .resources
            .get(&resource)
            .ok_or(AuctionError::ResourceNotInitialized(resource))?;

        if now < entry.state.last_settled_at {
            return Err(AuctionError::ClockRegression {
                now,
                last_settled_at: entry.state.last_settled_at,
            });
        }

        let mut tx = Tx {
            resource,
            config: &entry.config,
            params: &self.params,
            now,
            state: entry.state.clone(),
            settlement: Settlement::default(),
            committed: &self.deposits,
            balances: HashMap::new(),
            transfers: Vec::new(),
            logs: Vec::new(),
        };

        tx.settlement = rent::settle(&mut tx)?;
        let output = body(&mut tx, &self.strategies)?;

        let Tx {
            state,
            balances,
            transfers,
            logs,
            ..
        } = tx;

        self.custodian.execute(resource, &transfers)?;

        if let Some(entry) = self.resources.get_mut(&resource) {
            entry.state = state;
        }
        for (bidder, balance) in balances {
            self.deposits.insert((resource, bidder), balance);
        }
        for data in logs {
            self.emit_committed(data);
        }

        Ok(output)
    }
}

/// Working copy of one resource for the duration of a call.
pub(crate) struct Tx<'a> {
    pub(crate) resource: ResourceId,
    pub(crate) config: &'a ResourceConfig,
    pub(crate) params: &'a AuctionConfig,
    pub(crate) now: u64,
    pub(crate) state: AuctionState,
    /// Outcome of the settlement that opened this call.
    pub(crate) settlement: Settlement,
    committed: &'a HashMap<(ResourceId, Address), u128>,
    balances: HashMap<Address, u128>,
    transfers: Vec<Transfer>,
    logs: Vec<LogData>,
}

impl Tx<'_> {
    pub(crate) fn balance(&self, bidder: Address) -> u128 {
        match self.balances.get(&bidder) {
            Some(balance) => *balance,
            None => self
                .committed
                .get(&(self.resource, bidder))
                .copied()
                .unwrap_or(0),
        }
    }

    pub(crate) fn set_balance(&mut self, bidder: Address, balance: u128) {
        self.balances.insert(bidder, balance);
    }

    pub(crate) fn rent_currency(&self) -> Currency {
        self.config.rent_currency()
    }

    pub(crate) fn stage(&mut self, transfer: Transfer) {
        self.transfers.push(transfer);
    }

    pub(crate) fn emit<E: SolEvent>(&mut self, event: &E) {
        self.logs.push(event.encode_log_data());
    }
}
