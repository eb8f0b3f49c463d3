//! Entry ledger: participants and pooled funds of the active round.

use chance_raffle_common::types::RaffleState;
use cosmwasm_std::{Addr, Order, StdError, StdResult, Storage, Uint128};
use cw_storage_plus::Bound;

use crate::error::ContractError;
use crate::state::{RaffleConfig, Round, PARTICIPANTS};

const DEFAULT_PAGE_LIMIT: u32 = 30;
const MAX_PAGE_LIMIT: u32 = 100;

/// Record one entry for `participant` paying `amount`.
///
/// Validates before mutating: a rejected entry leaves storage and `round`
/// untouched. Returns the slot index the entry was stored at.
pub fn enter(
    storage: &mut dyn Storage,
    config: &RaffleConfig,
    round: &mut Round,
    participant: &Addr,
    amount: Uint128,
) -> Result<u32, ContractError> {
    if amount < config.entrance_fee {
        return Err(ContractError::InsufficientFee {
            sent: amount,
            required: config.entrance_fee,
        });
    }
    if round.state != RaffleState::Open {
        return Err(ContractError::RoundNotOpen);
    }

    let slot = round.participant_count;
    let next_count = slot
        .checked_add(1)
        .ok_or_else(|| StdError::generic_err("participant count overflow"))?;
    let next_pool = round.pool.checked_add(amount).map_err(StdError::from)?;

    PARTICIPANTS.save(storage, (round.round_id, slot), participant)?;
    round.participant_count = next_count;
    round.pool = next_pool;

    Ok(slot)
}

/// Empty the ledger for the next round.
///
/// Slots live under the round id, so moving to a new id clears them in O(1).
pub fn reset(round: &mut Round) {
    round.round_id += 1;
    round.participant_count = 0;
    round.pool = Uint128::zero();
}

pub fn participant_at(
    storage: &dyn Storage,
    round: &Round,
    index: u32,
) -> Result<Addr, ContractError> {
    if index >= round.participant_count {
        return Err(ContractError::IndexOutOfRange {
            index,
            count: round.participant_count,
        });
    }
    Ok(PARTICIPANTS.load(storage, (round.round_id, index))?)
}

pub fn participants(
    storage: &dyn Storage,
    round: &Round,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<Vec<(u32, Addr)>> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    PARTICIPANTS
        .prefix(round.round_id)
        .range(storage, start, None, Order::Ascending)
        .take(limit)
        .collect()
}
