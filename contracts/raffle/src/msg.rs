use chance_raffle_common::types::RaffleState;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128, Uint256};

use crate::state::{DrawRecord, PayoutFailure, RaffleConfig, RandomnessRequest};

#[cw_serde]
pub struct InstantiateMsg {
    pub entrance_fee: Uint128,
    pub denom: String,
    pub draw_interval_seconds: u64,
    pub vrf_coordinator: String,
    /// Gas lane / routing key passed through to the coordinator
    pub key_hash: String,
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Buy one entry. Send at least the entrance fee in `denom`.
    EnterRaffle {},
    /// Start a draw. Anyone may call; eligibility is re-checked.
    PerformUpkeep {},
    /// Randomness callback. Only the configured coordinator may call.
    RawFulfillRandomWords {
        request_id: u64,
        random_words: Vec<Uint256>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(RaffleConfig)]
    Config {},
    #[returns(RoundResponse)]
    Round {},
    #[returns(CheckUpkeepResponse)]
    CheckUpkeep {},
    #[returns(Addr)]
    Participant { index: u32 },
    #[returns(ParticipantsResponse)]
    Participants {
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(u32)]
    NumberOfParticipants {},
    #[returns(Option<Addr>)]
    RecentWinner {},
    #[returns(Timestamp)]
    LatestTimestamp {},
    #[returns(Option<RandomnessRequest>)]
    OutstandingRequest {},
    #[returns(Option<PayoutFailure>)]
    PayoutFailure {},
    #[returns(Option<DrawRecord>)]
    Draw { round_id: u64 },
    #[returns(DrawHistoryResponse)]
    DrawHistory {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct RoundResponse {
    pub state: RaffleState,
    pub round_id: u64,
    pub participant_count: u32,
    pub pool: Uint128,
    pub last_draw_timestamp: Timestamp,
    pub draw_epoch: u64,
    pub outstanding_request_id: Option<u64>,
}

#[cw_serde]
pub struct CheckUpkeepResponse {
    pub upkeep_needed: bool,
    pub perform_data: Binary,
}

/// Data returned by a successful `PerformUpkeep`.
#[cw_serde]
pub struct PerformUpkeepResponse {
    pub request_id: u64,
}

#[cw_serde]
pub struct ParticipantEntry {
    pub index: u32,
    pub participant: Addr,
}

#[cw_serde]
pub struct ParticipantsResponse {
    pub round_id: u64,
    pub participants: Vec<ParticipantEntry>,
}

#[cw_serde]
pub struct DrawHistoryResponse {
    pub draws: Vec<DrawRecord>,
}
