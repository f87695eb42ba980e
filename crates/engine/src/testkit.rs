//! Shared fixtures for the engine's unit tests.

use alloy::primitives::Address;

use feeauction_common::config::AuctionConfig;
use feeauction_common::types::{Bid, DYNAMIC_FEE_FLAG, PoolKey, RentAsset, ResourceConfig, ResourceId};

use crate::custodian::LedgerCustodian;
use crate::engine::AuctionEngine;

pub type TestEngine = AuctionEngine<LedgerCustodian>;

pub const ENGINE: Address = Address::repeat_byte(0xEE);
pub const TOKEN0: Address = Address::repeat_byte(0x01);
pub const TOKEN1: Address = Address::repeat_byte(0x02);
pub const ALICE: Address = Address::repeat_byte(0xA1);
pub const BOB: Address = Address::repeat_byte(0xB0);
pub const CAROL: Address = Address::repeat_byte(0xC0);
pub const STRATEGY: Address = Address::repeat_byte(0x5E);

pub const DEFAULT_FEE: u32 = 3_000;
pub const FUNDING: u128 = 10_000_000;

pub fn resource_config() -> ResourceConfig {
    ResourceConfig {
        key: PoolKey {
            currency0: TOKEN0,
            currency1: TOKEN1,
            fee: DYNAMIC_FEE_FLAG,
            tick_spacing: 60,
            hooks: ENGINE,
        },
        rent_asset: RentAsset::Currency0,
        default_fee: DEFAULT_FEE,
    }
}

/// Engine with default policy and one resource registered at time 0.
pub fn setup() -> (TestEngine, ResourceId) {
    let mut engine = AuctionEngine::new(ENGINE, AuctionConfig::default(), LedgerCustodian::new());
    let id = engine.initialize(resource_config(), 0).unwrap();
    (engine, id)
}

pub fn bid(rent: u128, recipient: Address) -> Bid {
    Bid {
        strategy: None,
        fee_recipient: recipient,
        rent,
    }
}

pub fn fund_and_deposit(engine: &mut TestEngine, id: ResourceId, who: Address, amount: u128, at: u64) {
    engine.custodian_mut().fund(who, TOKEN0, FUNDING);
    engine.deposit(id, who, amount, at).unwrap();
}

/// Make `who` the holder of `id` at `rent`, backed by `collateral`.
pub fn holder_with_rent(
    engine: &mut TestEngine,
    id: ResourceId,
    who: Address,
    rent: u128,
    collateral: u128,
    at: u64,
) {
    fund_and_deposit(engine, id, who, collateral, at);
    engine.modify_bid(id, who, bid(rent, who), at).unwrap();
}
