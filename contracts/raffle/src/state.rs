use chance_raffle_common::types::RaffleState;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128, Uint256};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<RaffleConfig> = Item::new("config");
pub const ROUND: Item<Round> = Item::new("round");
/// Entry slots keyed by (round_id, slot). A reset moves the ledger to a fresh
/// round id, so earlier rounds' slots are never read again.
pub const PARTICIPANTS: Map<(u64, u32), Addr> = Map::new("participants");
/// The single outstanding randomness request, if any.
pub const PENDING_REQUEST: Item<RandomnessRequest> = Item::new("pending_request");
/// Payout dispatched by the randomness callback and awaiting its reply.
pub const PENDING_PAYOUT: Item<PendingPayout> = Item::new("pending_payout");
/// Set when a payout failed; cleared by the next successful payout.
pub const PAYOUT_FAILURE: Item<PayoutFailure> = Item::new("payout_failure");
pub const DRAWS: Map<u64, DrawRecord> = Map::new("draws");
pub const RECENT_WINNER: Item<Addr> = Item::new("recent_winner");

#[cw_serde]
pub struct RaffleConfig {
    pub admin: Addr,
    /// Minimum amount one entry must pay
    pub entrance_fee: Uint128,
    pub denom: String,
    /// Minimum seconds between the last draw and the next one
    pub draw_interval_seconds: u64,
    pub vrf_coordinator: Addr,
    /// Gas lane (key hash) the coordinator fulfils with
    pub key_hash: String,
    pub subscription_id: u64,
    pub request_confirmations: u16,
    /// Gas budget for the randomness callback
    pub callback_gas_limit: u64,
}

/// The raffle's one long-lived round, reset in place after every payout.
#[cw_serde]
pub struct Round {
    pub state: RaffleState,
    /// Advances on every reset; namespaces the participant slots.
    pub round_id: u64,
    pub participant_count: u32,
    pub pool: Uint128,
    pub last_draw_timestamp: Timestamp,
    /// Advances on every draw start; distinguishes randomness requests.
    pub draw_epoch: u64,
    pub outstanding_request_id: Option<u64>,
}

#[cw_serde]
pub struct RandomnessRequest {
    pub request_id: u64,
    pub epoch: u64,
    pub round_id: u64,
    /// Participant count frozen at draw start.
    pub participant_count: u32,
    pub requested_at: Timestamp,
}

#[cw_serde]
pub struct PendingPayout {
    pub round_id: u64,
    pub request_id: u64,
    pub random_word: Uint256,
    pub winner_index: u32,
    pub winner: Addr,
    pub amount: Uint128,
}

#[cw_serde]
pub struct PayoutFailure {
    pub round_id: u64,
    pub request_id: u64,
    pub winner: Addr,
    pub amount: Uint128,
    pub reason: String,
    pub failed_at: Timestamp,
}

#[cw_serde]
pub struct DrawRecord {
    pub round_id: u64,
    pub request_id: u64,
    pub random_word: Uint256,
    pub winner_index: u32,
    pub winner: Addr,
    pub payout_amount: Uint128,
    pub participant_count: u32,
    pub completed_at: Timestamp,
}
