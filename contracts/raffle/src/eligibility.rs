use chance_raffle_common::types::RaffleState;
use cosmwasm_std::{Timestamp, Uint128};

use crate::state::Round;

/// Whether a draw may start.
///
/// Pure: open, interval elapsed, at least one participant, non-zero pool.
pub fn upkeep_needed(
    state: RaffleState,
    participant_count: u32,
    pool: Uint128,
    elapsed_seconds: u64,
    draw_interval_seconds: u64,
) -> bool {
    state == RaffleState::Open
        && elapsed_seconds >= draw_interval_seconds
        && participant_count > 0
        && !pool.is_zero()
}

/// Seconds since the last draw, saturating at zero if `now` is behind.
pub fn elapsed_since_last_draw(round: &Round, now: Timestamp) -> u64 {
    now.seconds().saturating_sub(round.last_draw_timestamp.seconds())
}

pub fn check_upkeep(round: &Round, draw_interval_seconds: u64, now: Timestamp) -> bool {
    upkeep_needed(
        round.state,
        round.participant_count,
        round.pool,
        elapsed_since_last_draw(round, now),
        draw_interval_seconds,
    )
}
