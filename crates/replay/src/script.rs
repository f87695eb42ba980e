//! Replay script format.
//!
//! ```json
//! {
//!   "engine": "0xeeee…",
//!   "resources": [{ "name": "usdc-weth", "key": { … }, "rent_asset": "currency1", "default_fee": 3000 }],
//!   "strategies": [{ "address": "0x5555…", "fee": 10000 }],
//!   "balances": [{ "owner": "0xa1a1…", "currency": "0x0202…", "amount": 1000000 }],
//!   "calls": [{ "at": 0, "call": { "deposit": { "resource": "usdc-weth", "bidder": "0xa1a1…", "amount": 200000 } } }]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, bail, ensure};
use serde::{Deserialize, Serialize};

use feeauction_common::types::{Bid, Currency, PoolKey, RentAsset, ResourceConfig, TradeParams};

/// Engine address used when the script does not name one.
pub const DEFAULT_ENGINE: Address = Address::repeat_byte(0xEE);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    #[serde(default = "default_engine")]
    pub engine: Address,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    #[serde(default)]
    pub strategies: Vec<StrategyEntry>,
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
    #[serde(default)]
    pub calls: Vec<TimedCall>,
}

fn default_engine() -> Address {
    DEFAULT_ENGINE
}

/// A resource to register before the calls run, addressed by `name` in calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    pub key: PoolKey,
    #[serde(default)]
    pub rent_asset: RentAsset,
    pub default_fee: u32,
    #[serde(default)]
    pub at: u64,
}

impl ResourceEntry {
    pub fn config(&self) -> ResourceConfig {
        ResourceConfig {
            key: self.key,
            rent_asset: self.rent_asset,
            default_fee: self.default_fee,
        }
    }
}

/// A constant-fee strategy registered under `address`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrategyEntry {
    pub address: Address,
    pub fee: u32,
}

/// Opening custodian balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub owner: Address,
    pub currency: Currency,
    pub amount: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedCall {
    pub at: u64,
    pub call: Call,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    Deposit {
        resource: String,
        bidder: Address,
        amount: u128,
    },
    Withdraw {
        resource: String,
        bidder: Address,
        amount: u128,
    },
    ModifyBid {
        resource: String,
        bidder: Address,
        bid: Bid,
    },
    Liquidate {
        resource: String,
    },
    Swap {
        resource: String,
        trade: TradeParams,
    },
    AddLiquidity {
        resource: String,
    },
    RemoveLiquidity {
        resource: String,
    },
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::Deposit { .. } => "deposit",
            Call::Withdraw { .. } => "withdraw",
            Call::ModifyBid { .. } => "modify_bid",
            Call::Liquidate { .. } => "liquidate",
            Call::Swap { .. } => "swap",
            Call::AddLiquidity { .. } => "add_liquidity",
            Call::RemoveLiquidity { .. } => "remove_liquidity",
        }
    }

    pub fn resource(&self) -> &str {
        match self {
            Call::Deposit { resource, .. }
            | Call::Withdraw { resource, .. }
            | Call::ModifyBid { resource, .. }
            | Call::Liquidate { resource }
            | Call::Swap { resource, .. }
            | Call::AddLiquidity { resource }
            | Call::RemoveLiquidity { resource } => resource,
        }
    }

    /// The bidder whose collateral account the call touches, if any.
    pub fn bidder(&self) -> Option<Address> {
        match self {
            Call::Deposit { bidder, .. } | Call::Withdraw { bidder, .. } | Call::ModifyBid { bidder, .. } => {
                Some(*bidder)
            }
            _ => None,
        }
    }
}

impl Script {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        let script: Script =
            serde_json::from_str(&raw).with_context(|| format!("failed to parse script {}", path.display()))?;
        script.validate()?;
        Ok(script)
    }

    /// Structural checks only; engine rules are left to the engine.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut names = HashSet::new();
        for resource in &self.resources {
            ensure!(
                names.insert(resource.name.as_str()),
                "duplicate resource name '{}'",
                resource.name
            );
        }

        let mut last_at = 0;
        for (index, entry) in self.calls.iter().enumerate() {
            if entry.at < last_at {
                bail!(
                    "call #{index} at {} is earlier than the previous call at {last_at}",
                    entry.at
                );
            }
            last_at = entry.at;

            let resource = entry.call.resource();
            ensure!(
                names.contains(resource),
                "call #{index} references unknown resource '{resource}'"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> Script {
        serde_json::from_value(json).unwrap()
    }

    fn resource_json() -> serde_json::Value {
        serde_json::json!({
            "name": "pool",
            "key": {
                "currency0": "0x0101010101010101010101010101010101010101",
                "currency1": "0x0202020202020202020202020202020202020202",
                "fee": 8388608,
                "tick_spacing": 60,
                "hooks": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
            },
            "default_fee": 3000
        })
    }

    #[test]
    fn test_parse_minimal_script() {
        let script = parse(serde_json::json!({
            "resources": [resource_json()],
            "calls": [
                { "at": 0, "call": { "deposit": {
                    "resource": "pool",
                    "bidder": "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1",
                    "amount": 200000
                } } },
                { "at": 5, "call": { "liquidate": { "resource": "pool" } } }
            ]
        }));

        assert_eq!(script.engine, DEFAULT_ENGINE);
        assert_eq!(script.resources[0].rent_asset, RentAsset::Currency0);
        assert_eq!(script.calls.len(), 2);
        assert_eq!(script.calls[0].call.name(), "deposit");
        assert_eq!(script.calls[0].call.bidder(), Some(Address::repeat_byte(0xA1)));
        assert_eq!(script.calls[1].call.bidder(), None);
        script.validate().unwrap();
    }

    #[test]
    fn test_parse_modify_bid_without_strategy() {
        let script = parse(serde_json::json!({
            "resources": [resource_json()],
            "calls": [{ "at": 1, "call": { "modify_bid": {
                "resource": "pool",
                "bidder": "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1",
                "bid": {
                    "strategy": null,
                    "fee_recipient": "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1",
                    "rent": 1000
                }
            } } }]
        }));

        match &script.calls[0].call {
            Call::ModifyBid { bid, .. } => {
                assert_eq!(bid.rent, 1000);
                assert_eq!(bid.strategy, None);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_time_going_backwards() {
        let script = parse(serde_json::json!({
            "resources": [resource_json()],
            "calls": [
                { "at": 10, "call": { "add_liquidity": { "resource": "pool" } } },
                { "at": 9, "call": { "remove_liquidity": { "resource": "pool" } } }
            ]
        }));
        let err = script.validate().unwrap_err();
        assert!(err.to_string().contains("earlier than the previous call"));
    }

    #[test]
    fn test_validate_rejects_unknown_resource() {
        let script = parse(serde_json::json!({
            "resources": [resource_json()],
            "calls": [{ "at": 0, "call": { "liquidate": { "resource": "missing" } } }]
        }));
        assert!(script.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let script = parse(serde_json::json!({
            "resources": [resource_json(), resource_json()]
        }));
        assert!(script.validate().is_err());
    }
}
