use alloy::primitives::{Address, B256, U256, keccak256};
use serde::{Deserialize, Serialize};

/// Unique identifier of an auctioned resource: `keccak256(abi.encode(PoolKey))`.
pub type ResourceId = B256;

/// An asset is identified by its token address.
pub type Currency = Address;

/// Fee value marking a pool whose LP fee is set per trade by its hook.
pub const DYNAMIC_FEE_FLAG: u32 = 0x80_0000;

/// Fees are expressed in pips: hundredths of a basis point.
pub const MAX_FEE_PIPS: u32 = 1_000_000;

/// The pair of assets plus configuration a resource governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub currency0: Currency,
    pub currency1: Currency,
    pub fee: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

impl PoolKey {
    /// Resource ID derived from the ABI encoding of the key (five static words).
    pub fn id(&self) -> ResourceId {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(self.currency0.into_word().as_slice());
        encoded.extend_from_slice(self.currency1.into_word().as_slice());
        encoded.extend_from_slice(&U256::from(self.fee).to_be_bytes::<32>());
        encoded.extend_from_slice(&signed_word(self.tick_spacing));
        encoded.extend_from_slice(self.hooks.into_word().as_slice());
        keccak256(encoded)
    }

    pub fn supports_dynamic_fee(&self) -> bool {
        self.fee == DYNAMIC_FEE_FLAG
    }

    pub fn currency(&self, side: RentAsset) -> Currency {
        match side {
            RentAsset::Currency0 => self.currency0,
            RentAsset::Currency1 => self.currency1,
        }
    }
}

/// Sign-extended 32-byte big-endian word, as `int24` encodes in the ABI.
fn signed_word(value: i32) -> [u8; 32] {
    let mut word = if value < 0 { [0xff; 32] } else { [0; 32] };
    word[28..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Which of the resource's two assets rent is denominated in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentAsset {
    #[default]
    Currency0,
    Currency1,
}

impl RentAsset {
    pub fn index(&self) -> u8 {
        match self {
            RentAsset::Currency0 => 0,
            RentAsset::Currency1 => 1,
        }
    }
}

impl std::fmt::Display for RentAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RentAsset::Currency0 => write!(f, "currency0"),
            RentAsset::Currency1 => write!(f, "currency1"),
        }
    }
}

/// Registration-time configuration of a resource. Fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub key: PoolKey,
    pub rent_asset: RentAsset,
    /// LP fee (pips) applied to trades while no strategy is attached.
    pub default_fee: u32,
}

impl ResourceConfig {
    pub fn id(&self) -> ResourceId {
        self.key.id()
    }

    pub fn rent_currency(&self) -> Currency {
        self.key.currency(self.rent_asset)
    }
}

/// Per-resource auction record.
///
/// The vacant state is `holder == None && rent_rate == 0`; strategy and fee
/// recipient are cleared together with the holder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionState {
    pub holder: Option<Address>,
    pub strategy: Option<Address>,
    pub fee_recipient: Option<Address>,
    /// Rent owed per time unit.
    pub rent_rate: u128,
    pub last_settled_at: u64,
    pub last_acquired_at: u64,
    pub rent_asset: RentAsset,
}

impl AuctionState {
    pub fn vacant(rent_asset: RentAsset, now: u64) -> Self {
        Self {
            holder: None,
            strategy: None,
            fee_recipient: None,
            rent_rate: 0,
            last_settled_at: now,
            last_acquired_at: now,
            rent_asset,
        }
    }

    pub fn is_vacant(&self) -> bool {
        self.holder.is_none()
    }

    pub fn is_held_by(&self, who: Address) -> bool {
        self.holder == Some(who)
    }
}

/// A bid as submitted to `modify_bid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Fee strategy to attach; `None` keeps the resource's default fee.
    pub strategy: Option<Address>,
    pub fee_recipient: Address,
    /// Offered rent per time unit.
    pub rent: u128,
}

/// Parameters of a trade passed to the fee hook.
///
/// `amount_specified < 0` is an exact-input trade; otherwise exact output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeParams {
    pub sender: Address,
    pub zero_for_one: bool,
    pub amount_specified: i128,
}

impl TradeParams {
    pub fn is_exact_input(&self) -> bool {
        self.amount_specified < 0
    }

    /// Currency of the specified side: the one sold for exact input, the one
    /// bought for exact output.
    pub fn specified_currency(&self, key: &PoolKey) -> Currency {
        match (self.zero_for_one, self.is_exact_input()) {
            (true, true) | (false, false) => key.currency0,
            (true, false) | (false, true) => key.currency1,
        }
    }

    pub fn specified_amount(&self) -> u128 {
        self.amount_specified.unsigned_abs()
    }
}

/// Why a holder lost the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// Accrued rent exceeded the holder's collateral at settlement.
    RentShortfall,
    /// A caller liquidated a holder below the safety buffer.
    Liquidation,
}

impl EvictionReason {
    pub fn code(&self) -> u8 {
        match self {
            EvictionReason::RentShortfall => 0,
            EvictionReason::Liquidation => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EvictionReason::RentShortfall),
            1 => Some(EvictionReason::Liquidation),
            _ => None,
        }
    }
}

impl std::fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionReason::RentShortfall => write!(f, "rent_shortfall"),
            EvictionReason::Liquidation => write!(f, "liquidation"),
        }
    }
}

/// Types of events the engine journals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Initialized,
    Deposited,
    Withdrawn,
    BidModified,
    HolderChanged,
    RentSettled,
    Evicted,
    FeeRedirected,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Initialized => write!(f, "initialized"),
            EventType::Deposited => write!(f, "deposited"),
            EventType::Withdrawn => write!(f, "withdrawn"),
            EventType::BidModified => write!(f, "bid_modified"),
            EventType::HolderChanged => write!(f, "holder_changed"),
            EventType::RentSettled => write!(f, "rent_settled"),
            EventType::Evicted => write!(f, "evicted"),
            EventType::FeeRedirected => write!(f, "fee_redirected"),
        }
    }
}

/// A decoded journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedEvent {
    /// Engine address that emitted the log.
    pub emitter: Address,
    pub resource: ResourceId,
    pub event_type: EventType,
    pub decoded_data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(fee: u32) -> PoolKey {
        PoolKey {
            currency0: Address::repeat_byte(0x01),
            currency1: Address::repeat_byte(0x02),
            fee,
            tick_spacing: 60,
            hooks: Address::repeat_byte(0xAA),
        }
    }

    #[test]
    fn test_resource_id_depends_on_every_field() {
        let base = key(DYNAMIC_FEE_FLAG);
        let mut other = base;
        other.tick_spacing = -60;
        assert_ne!(base.id(), other.id());
        assert_ne!(base.id(), key(3000).id());
        assert_eq!(base.id(), key(DYNAMIC_FEE_FLAG).id());
    }

    #[test]
    fn test_signed_word_sign_extends() {
        let word = signed_word(-1);
        assert!(word.iter().all(|b| *b == 0xff));
        let word = signed_word(60);
        assert_eq!(word[31], 60);
        assert!(word[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_dynamic_fee_detection() {
        assert!(key(DYNAMIC_FEE_FLAG).supports_dynamic_fee());
        assert!(!key(3000).supports_dynamic_fee());
    }

    #[test]
    fn test_specified_currency_follows_trade_direction() {
        let key = key(DYNAMIC_FEE_FLAG);
        let trade = |zero_for_one, amount_specified| TradeParams {
            sender: Address::ZERO,
            zero_for_one,
            amount_specified,
        };
        // exact input sells the input side
        assert_eq!(trade(true, -100).specified_currency(&key), key.currency0);
        assert_eq!(trade(false, -100).specified_currency(&key), key.currency1);
        // exact output buys the output side
        assert_eq!(trade(true, 100).specified_currency(&key), key.currency1);
        assert_eq!(trade(false, 100).specified_currency(&key), key.currency0);
    }

    #[test]
    fn test_eviction_reason_codes() {
        for reason in [EvictionReason::RentShortfall, EvictionReason::Liquidation] {
            assert_eq!(EvictionReason::from_code(reason.code()), Some(reason));
        }
        assert_eq!(EvictionReason::from_code(7), None);
    }
}
