use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::Bound;

use crate::eligibility;
use crate::ledger;
use crate::msg::{
    CheckUpkeepResponse, DrawHistoryResponse, ParticipantEntry, ParticipantsResponse,
    RoundResponse,
};
use crate::state::{CONFIG, DRAWS, PAYOUT_FAILURE, RECENT_WINNER, ROUND};
use crate::tracker;

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_round(deps: Deps) -> StdResult<Binary> {
    let round = ROUND.load(deps.storage)?;
    to_json_binary(&RoundResponse {
        state: round.state,
        round_id: round.round_id,
        participant_count: round.participant_count,
        pool: round.pool,
        last_draw_timestamp: round.last_draw_timestamp,
        draw_epoch: round.draw_epoch,
        outstanding_request_id: round.outstanding_request_id,
    })
}

/// Read-only eligibility check polled by the automation service.
pub fn query_check_upkeep(deps: Deps, env: Env) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let round = ROUND.load(deps.storage)?;
    let upkeep_needed =
        eligibility::check_upkeep(&round, config.draw_interval_seconds, env.block.time);
    to_json_binary(&CheckUpkeepResponse {
        upkeep_needed,
        perform_data: Binary::default(),
    })
}

pub fn query_participant(deps: Deps, index: u32) -> StdResult<Binary> {
    let round = ROUND.load(deps.storage)?;
    let participant = ledger::participant_at(deps.storage, &round, index)
        .map_err(|e| StdError::generic_err(e.to_string()))?;
    to_json_binary(&participant)
}

pub fn query_participants(
    deps: Deps,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let round = ROUND.load(deps.storage)?;
    let participants = ledger::participants(deps.storage, &round, start_after, limit)?
        .into_iter()
        .map(|(index, participant)| ParticipantEntry { index, participant })
        .collect();
    to_json_binary(&ParticipantsResponse {
        round_id: round.round_id,
        participants,
    })
}

pub fn query_number_of_participants(deps: Deps) -> StdResult<Binary> {
    let round = ROUND.load(deps.storage)?;
    to_json_binary(&round.participant_count)
}

pub fn query_recent_winner(deps: Deps) -> StdResult<Binary> {
    let winner = RECENT_WINNER.may_load(deps.storage)?;
    to_json_binary(&winner)
}

pub fn query_latest_timestamp(deps: Deps) -> StdResult<Binary> {
    let round = ROUND.load(deps.storage)?;
    to_json_binary(&round.last_draw_timestamp)
}

pub fn query_outstanding_request(deps: Deps) -> StdResult<Binary> {
    let request = tracker::outstanding(deps.storage)?;
    to_json_binary(&request)
}

pub fn query_payout_failure(deps: Deps) -> StdResult<Binary> {
    let failure = PAYOUT_FAILURE.may_load(deps.storage)?;
    to_json_binary(&failure)
}

pub fn query_draw(deps: Deps, round_id: u64) -> StdResult<Binary> {
    let draw = DRAWS.may_load(deps.storage, round_id)?;
    to_json_binary(&draw)
}

pub fn query_draw_history(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let draws: Vec<_> = DRAWS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, draw)| draw)
        .collect();

    to_json_binary(&DrawHistoryResponse { draws })
}
