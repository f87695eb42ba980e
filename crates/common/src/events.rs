//! ABI of the events the auction engine journals.
//!
//! Encoded with `SolEvent::encode_log_data` by the engine and decoded back by
//! `feeauction-decoders`. Optional addresses are encoded as `address(0)`.

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event Initialized(bytes32 indexed resource, address currency0, address currency1, uint8 rentAsset, uint32 defaultFee);

    #[derive(Debug, PartialEq, Eq)]
    event Deposited(bytes32 indexed resource, address indexed bidder, uint128 amount, uint128 balance);

    #[derive(Debug, PartialEq, Eq)]
    event Withdrawn(bytes32 indexed resource, address indexed bidder, uint128 amount, uint128 balance);

    #[derive(Debug, PartialEq, Eq)]
    event BidModified(bytes32 indexed resource, address indexed holder, uint128 rent, address strategy, address feeRecipient);

    #[derive(Debug, PartialEq, Eq)]
    event HolderChanged(bytes32 indexed resource, address indexed previous, address indexed next, uint128 rent);

    #[derive(Debug, PartialEq, Eq)]
    event RentSettled(bytes32 indexed resource, address indexed holder, uint128 owed, uint128 paid, uint64 settledAt);

    #[derive(Debug, PartialEq, Eq)]
    event Evicted(bytes32 indexed resource, address indexed holder, uint8 reason);

    #[derive(Debug, PartialEq, Eq)]
    event FeeRedirected(bytes32 indexed resource, address indexed recipient, address currency, uint128 amount);
}
