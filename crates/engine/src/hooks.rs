//! Trigger hooks fired by the custodian before its own logic runs.
//!
//! Initialization registers a resource; liquidity changes only force rent
//! settlement. The trade hook lives in `fee`.

use alloy::sol_types::SolEvent;

use feeauction_common::error::AuctionError;
use feeauction_common::events::Initialized;
use feeauction_common::types::{AuctionState, MAX_FEE_PIPS, ResourceConfig, ResourceId};

use crate::custodian::Custodian;
use crate::engine::{AuctionEngine, Resource};
use crate::rent::Settlement;

impl<C: Custodian> AuctionEngine<C> {
    /// Register a resource. Only variable-fee resources may be auctioned.
    pub fn initialize(&mut self, config: ResourceConfig, now: u64) -> Result<ResourceId, AuctionError> {
        if !config.key.supports_dynamic_fee() {
            return Err(AuctionError::ResourceMustSupportVariableFee {
                fee: config.key.fee,
            });
        }
        if config.default_fee > MAX_FEE_PIPS {
            return Err(AuctionError::InvalidFee {
                fee: config.default_fee,
            });
        }

        let id = config.id();
        if self.resources.contains_key(&id) {
            return Err(AuctionError::ResourceAlreadyInitialized(id));
        }

        self.resources.insert(
            id,
            Resource {
                config,
                state: AuctionState::vacant(config.rent_asset, now),
            },
        );
        self.emit_committed(
            Initialized {
                resource: id,
                currency0: config.key.currency0,
                currency1: config.key.currency1,
                rentAsset: config.rent_asset.index(),
                defaultFee: config.default_fee,
            }
            .encode_log_data(),
        );

        tracing::info!(
            resource = %id,
            rent_asset = %config.rent_asset,
            default_fee = config.default_fee,
            "Resource initialized"
        );
        Ok(id)
    }

    pub fn before_add_liquidity(&mut self, resource: ResourceId, now: u64) -> Result<Settlement, AuctionError> {
        self.poke(resource, now)
    }

    pub fn before_remove_liquidity(
        &mut self,
        resource: ResourceId,
        now: u64,
    ) -> Result<Settlement, AuctionError> {
        self.poke(resource, now)
    }
}
