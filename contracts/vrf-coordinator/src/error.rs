use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("beacon for round {round} already exists")]
    BeaconAlreadyExists { round: u64 },

    #[error("BLS verification failed: {reason}")]
    VerificationFailed { reason: String },

    #[error("invalid hex input: {field}")]
    InvalidHex { field: String },

    #[error("beacon not found for round {round}")]
    BeaconNotFound { round: u64 },

    #[error("request is bound to drand round {expected}, got {round}")]
    WrongBeaconRound { round: u64, expected: u64 },

    #[error("invalid pubkey length: expected 96 bytes, got {got}")]
    InvalidPubkeyLength { got: usize },

    #[error("subscription {subscription_id} not found")]
    SubscriptionNotFound { subscription_id: u64 },

    #[error("{consumer} is not a consumer of subscription {subscription_id}")]
    InvalidConsumer {
        subscription_id: u64,
        consumer: String,
    },

    #[error("subscription {subscription_id} already has the maximum of {max} consumers")]
    TooManyConsumers { subscription_id: u64, max: usize },

    #[error("request {request_id} not found")]
    RequestNotFound { request_id: u64 },

    #[error("num_words {num_words} out of range (1..={max})")]
    InvalidNumWords { num_words: u32, max: u32 },

    #[error("callback gas limit {have} above maximum {want}")]
    GasLimitTooBig { have: u64, want: u64 },

    #[error("request {request_id} needs confirmations: fulfillable at height {ready_at_height}")]
    TooEarly { request_id: u64, ready_at_height: u64 },

    #[error("fulfilling with supplied words is disabled")]
    OverrideDisabled,

    #[error("expected {expected} random words, got {got}")]
    WordCountMismatch { expected: u32, got: usize },

    #[error("unknown reply id {id}")]
    UnknownReplyId { id: u64 },
}
