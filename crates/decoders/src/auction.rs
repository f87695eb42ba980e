use alloy::primitives::{B256, Log};
use alloy::sol_types::SolEvent;
use feeauction_common::events::{BidModified, Evicted, HolderChanged, Initialized, RentSettled};
use feeauction_common::types::{DecodedEvent, EventType, EvictionReason, RentAsset};
use serde_json::json;

use crate::{EventDecoder, optional_address};

/// Auction lifecycle event decoder.
///
/// Handles registration, bids, holder changes, rent settlement and evictions.
pub struct AuctionDecoder;

impl AuctionDecoder {
    pub fn new() -> Self {
        Self
    }

    fn event(log: &Log, resource: B256, event_type: EventType, data: serde_json::Value) -> DecodedEvent {
        DecodedEvent {
            emitter: log.address,
            resource,
            event_type,
            decoded_data: data,
        }
    }
}

impl Default for AuctionDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDecoder for AuctionDecoder {
    fn event_signatures(&self) -> Vec<B256> {
        vec![
            Initialized::SIGNATURE_HASH,
            BidModified::SIGNATURE_HASH,
            HolderChanged::SIGNATURE_HASH,
            RentSettled::SIGNATURE_HASH,
            Evicted::SIGNATURE_HASH,
        ]
    }

    fn decode(&self, log: &Log) -> Option<DecodedEvent> {
        let topic0 = *log.topics().first()?;

        if topic0 == Initialized::SIGNATURE_HASH {
            let e = Initialized::decode_log_data(&log.data).ok()?;
            let rent_asset = match e.rentAsset {
                0 => RentAsset::Currency0,
                _ => RentAsset::Currency1,
            };
            Some(Self::event(
                log,
                e.resource,
                EventType::Initialized,
                json!({
                    "currency0": format!("{:#x}", e.currency0),
                    "currency1": format!("{:#x}", e.currency1),
                    "rent_asset": rent_asset.to_string(),
                    "default_fee": e.defaultFee,
                }),
            ))
        } else if topic0 == BidModified::SIGNATURE_HASH {
            let e = BidModified::decode_log_data(&log.data).ok()?;
            Some(Self::event(
                log,
                e.resource,
                EventType::BidModified,
                json!({
                    "holder": format!("{:#x}", e.holder),
                    "rent": e.rent.to_string(),
                    "strategy": optional_address(e.strategy),
                    "fee_recipient": format!("{:#x}", e.feeRecipient),
                }),
            ))
        } else if topic0 == HolderChanged::SIGNATURE_HASH {
            let e = HolderChanged::decode_log_data(&log.data).ok()?;
            Some(Self::event(
                log,
                e.resource,
                EventType::HolderChanged,
                json!({
                    "previous": optional_address(e.previous),
                    "next": format!("{:#x}", e.next),
                    "rent": e.rent.to_string(),
                }),
            ))
        } else if topic0 == RentSettled::SIGNATURE_HASH {
            let e = RentSettled::decode_log_data(&log.data).ok()?;
            Some(Self::event(
                log,
                e.resource,
                EventType::RentSettled,
                json!({
                    "holder": format!("{:#x}", e.holder),
                    "owed": e.owed.to_string(),
                    "paid": e.paid.to_string(),
                    "settled_at": e.settledAt,
                }),
            ))
        } else if topic0 == Evicted::SIGNATURE_HASH {
            let e = Evicted::decode_log_data(&log.data).ok()?;
            let reason = EvictionReason::from_code(e.reason)?;
            Some(Self::event(
                log,
                e.resource,
                EventType::Evicted,
                json!({
                    "holder": format!("{:#x}", e.holder),
                    "reason": reason.to_string(),
                }),
            ))
        } else {
            None
        }
    }

    fn name(&self) -> &'static str {
        "Auction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_signatures() {
        let decoder = AuctionDecoder::new();
        assert_eq!(decoder.event_signatures().len(), 5);
    }
}
