use alloy::primitives::{B256, Log};
use alloy::sol_types::SolEvent;
use feeauction_common::events::FeeRedirected;
use feeauction_common::types::{DecodedEvent, EventType};
use serde_json::json;

use crate::EventDecoder;

/// Fee delegation event decoder.
///
/// Handles `FeeRedirected(bytes32 resource, address recipient, address currency, uint128 amount)`.
pub struct FeeDecoder;

impl FeeDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FeeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDecoder for FeeDecoder {
    fn event_signatures(&self) -> Vec<B256> {
        vec![FeeRedirected::SIGNATURE_HASH]
    }

    fn decode(&self, log: &Log) -> Option<DecodedEvent> {
        if *log.topics().first()? != FeeRedirected::SIGNATURE_HASH {
            return None;
        }
        let event = FeeRedirected::decode_log_data(&log.data).ok()?;

        Some(DecodedEvent {
            emitter: log.address,
            resource: event.resource,
            event_type: EventType::FeeRedirected,
            decoded_data: json!({
                "recipient": format!("{:#x}", event.recipient),
                "currency": format!("{:#x}", event.currency),
                "amount": event.amount.to_string(),
            }),
        })
    }

    fn name(&self) -> &'static str {
        "Fee"
    }
}
