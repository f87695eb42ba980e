//! Fee strategy seam.
//!
//! A holder attaches a strategy by address; the engine resolves the address
//! through a [`StrategyRegistry`] on every trade.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;

use feeauction_common::error::StrategyError;
use feeauction_common::types::{ResourceId, TradeParams};

/// Trait that all pluggable fee strategies must implement.
pub trait FeeStrategy: Send + Sync {
    /// Fee rate in pips charged on the specified side of `trade`.
    fn compute_fee(&self, resource: ResourceId, trade: &TradeParams) -> Result<u32, StrategyError>;
}

/// Registry of deployed strategies, keyed by address.
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<Address, Arc<dyn FeeStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the strategy deployed at `address`.
    pub fn register(&mut self, address: Address, strategy: Arc<dyn FeeStrategy>) {
        tracing::debug!(strategy = %address, "Strategy registered");
        self.strategies.insert(address, strategy);
    }

    pub fn get(&self, address: &Address) -> Result<&Arc<dyn FeeStrategy>, StrategyError> {
        self.strategies
            .get(address)
            .ok_or(StrategyError::NotRegistered(*address))
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Charges the same rate on every trade.
#[derive(Debug, Clone, Copy)]
pub struct ConstantFee {
    pub fee: u32,
}

impl ConstantFee {
    pub fn new(fee: u32) -> Self {
        Self { fee }
    }
}

impl FeeStrategy for ConstantFee {
    fn compute_fee(&self, _resource: ResourceId, _trade: &TradeParams) -> Result<u32, StrategyError> {
        Ok(self.fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    #[test]
    fn test_unregistered_strategy() {
        let registry = StrategyRegistry::new();
        let address = Address::repeat_byte(0x55);
        assert_eq!(
            registry.get(&address).err(),
            Some(StrategyError::NotRegistered(address))
        );
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = StrategyRegistry::new();
        let address = Address::repeat_byte(0x55);
        registry.register(address, Arc::new(ConstantFee::new(3_000)));
        assert_eq!(registry.len(), 1);

        let trade = TradeParams {
            sender: Address::ZERO,
            zero_for_one: true,
            amount_specified: -1_000,
        };
        let fee = registry
            .get(&address)
            .unwrap()
            .compute_fee(B256::ZERO, &trade)
            .unwrap();
        assert_eq!(fee, 3_000);
    }
}
