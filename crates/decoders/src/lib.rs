pub mod auction;
pub mod collateral;
pub mod fee;


use alloy::primitives::{B256, Log};
use feeauction_common::types::DecodedEvent;

/// Trait that all journal decoders must implement.
pub trait EventDecoder: Send + Sync {
    /// Returns the event topic signatures this decoder handles.
    fn event_signatures(&self) -> Vec<B256>;

    /// Attempt to decode a journal entry into a `DecodedEvent`.
    /// Returns `None` if this decoder doesn't handle the log's topic.
    fn decode(&self, log: &Log) -> Option<DecodedEvent>;

    /// Human-readable name for this decoder (e.g., "Collateral").
    fn name(&self) -> &'static str;
}

/// Registry of all available decoders.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn EventDecoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self {
            decoders: vec![
                Box::new(collateral::CollateralDecoder::new()),
                Box::new(auction::AuctionDecoder::new()),
                Box::new(fee::FeeDecoder::new()),
            ],
        }
    }

    /// Try to decode a log using all registered decoders.
    /// Returns the first successful decode, or `None`.
    pub fn decode(&self, log: &Log) -> Option<DecodedEvent> {
        for decoder in &self.decoders {
            if let Some(event) = decoder.decode(log) {
                tracing::debug!(
                    decoder = decoder.name(),
                    event_type = %event.event_type,
                    "Decoded event"
                );
                return Some(event);
            }
        }
        None
    }

    /// Decode a whole journal, skipping entries no decoder recognises.
    pub fn decode_all(&self, logs: &[Log]) -> Vec<DecodedEvent> {
        logs.iter().filter_map(|log| self.decode(log)).collect()
    }

    /// Get all event signatures across all registered decoders.
    pub fn all_signatures(&self) -> Vec<B256> {
        self.decoders
            .iter()
            .flat_map(|d| d.event_signatures())
            .collect()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Optional addresses are journaled as the zero address.
pub(crate) fn optional_address(address: alloy::primitives::Address) -> Option<String> {
    (!address.is_zero()).then(|| format!("{:#x}", address))
}
