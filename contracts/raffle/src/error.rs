use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("insufficient entrance fee: sent {sent}, required {required}")]
    InsufficientFee { sent: Uint128, required: Uint128 },

    #[error("must send exactly one coin")]
    InvalidFunds,

    #[error("must send {expected} denom, got {denom}")]
    WrongDenom { denom: String, expected: String },

    #[error("raffle round is not open")]
    RoundNotOpen,

    #[error("upkeep not needed: state={state}, participants={participant_count}, pool={pool}, elapsed={elapsed_seconds}s")]
    UpkeepNotNeeded {
        state: String,
        participant_count: u32,
        pool: Uint128,
        elapsed_seconds: u64,
    },

    #[error("unknown randomness request {request_id}")]
    UnknownRequest { request_id: u64 },

    #[error("a randomness request is already live for draw epoch {epoch}")]
    DuplicateRequest { epoch: u64 },

    /// The only failure that leaves the round degraded: stuck in Calculating
    /// with the pool retained.
    #[error("payout transfer failed: {reason}")]
    TransferFailed { reason: String },

    #[error("participant index {index} out of range (count {count})")]
    IndexOutOfRange { index: u32, count: u32 },

    #[error("randomness provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },

    #[error("only coordinator can fulfill: have {have}, want {want}")]
    OnlyCoordinatorCanFulfill { have: String, want: String },

    #[error("randomness callback carried no random words")]
    NoRandomWords,

    #[error("no payout in flight")]
    NoPendingPayout,

    #[error("unknown reply id {id}")]
    UnknownReplyId { id: u64 },
}
