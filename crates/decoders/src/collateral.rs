use alloy::primitives::{B256, Log};
use alloy::sol_types::SolEvent;
use feeauction_common::events::{Deposited, Withdrawn};
use feeauction_common::types::{DecodedEvent, EventType};
use serde_json::json;

use crate::EventDecoder;

/// Collateral ledger event decoder.
///
/// Handles:
/// - `Deposited(bytes32 resource, address bidder, uint128 amount, uint128 balance)`
/// - `Withdrawn(bytes32 resource, address bidder, uint128 amount, uint128 balance)`
pub struct CollateralDecoder;

impl CollateralDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CollateralDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDecoder for CollateralDecoder {
    fn event_signatures(&self) -> Vec<B256> {
        vec![Deposited::SIGNATURE_HASH, Withdrawn::SIGNATURE_HASH]
    }

    fn decode(&self, log: &Log) -> Option<DecodedEvent> {
        let topic0 = *log.topics().first()?;

        if topic0 == Deposited::SIGNATURE_HASH {
            let event = Deposited::decode_log_data(&log.data).ok()?;
            Some(DecodedEvent {
                emitter: log.address,
                resource: event.resource,
                event_type: EventType::Deposited,
                decoded_data: json!({
                    "bidder": format!("{:#x}", event.bidder),
                    "amount": event.amount.to_string(),
                    "balance": event.balance.to_string(),
                }),
            })
        } else if topic0 == Withdrawn::SIGNATURE_HASH {
            let event = Withdrawn::decode_log_data(&log.data).ok()?;
            Some(DecodedEvent {
                emitter: log.address,
                resource: event.resource,
                event_type: EventType::Withdrawn,
                decoded_data: json!({
                    "bidder": format!("{:#x}", event.bidder),
                    "amount": event.amount.to_string(),
                    "balance": event.balance.to_string(),
                }),
            })
        } else {
            None
        }
    }

    fn name(&self) -> &'static str {
        "Collateral"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_signatures() {
        let decoder = CollateralDecoder::new();
        assert_eq!(decoder.event_signatures().len(), 2);
    }
}
