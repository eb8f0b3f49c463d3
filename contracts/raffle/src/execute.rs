//! Draw coordination: entries, draw start, randomness callback and payout.
//!
//! A draw is two handlers joined by stored state. `perform_upkeep` moves the
//! round to Calculating and asks the coordinator for randomness; the request
//! id comes back in the reply and is tracked. `raw_fulfill_random_words`
//! matches the callback to that request, picks the winner and dispatches the
//! payout; the reset to Open happens only once the payout reply confirms.

use chance_raffle_common::randomness::word_hex;
use chance_raffle_common::types::RaffleState;
use chance_raffle_common::vrf::{parse_request_id, VrfCoordinatorMsg};
use cosmwasm_std::{
    to_json_binary, DepsMut, Env, Event, MessageInfo, Response, StdError, Storage, SubMsg,
    SubMsgResult, Uint128, Uint256, WasmMsg,
};

use crate::eligibility;
use crate::error::ContractError;
use crate::ledger;
use crate::msg::PerformUpkeepResponse;
use crate::payout;
use crate::state::{
    DrawRecord, PayoutFailure, PendingPayout, RandomnessRequest, CONFIG, DRAWS, PAYOUT_FAILURE,
    PENDING_PAYOUT, RECENT_WINNER, ROUND,
};
use crate::tracker;

pub const REQUEST_RANDOMNESS_REPLY_ID: u64 = 1;

/// Each draw consumes a single random word.
const NUM_WORDS: u32 = 1;

/// Buy one entry into the current round.
pub fn enter_raffle(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let amount = match info.funds.as_slice() {
        [] => Uint128::zero(),
        [coin] if coin.denom == config.denom => coin.amount,
        [coin] => {
            return Err(ContractError::WrongDenom {
                denom: coin.denom.clone(),
                expected: config.denom,
            })
        }
        _ => return Err(ContractError::InvalidFunds),
    };

    let mut round = ROUND.load(deps.storage)?;
    let slot = ledger::enter(deps.storage, &config, &mut round, &info.sender, amount)?;
    ROUND.save(deps.storage, &round)?;

    Ok(Response::new()
        .add_attribute("action", "enter_raffle")
        .add_attribute("participant", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("chance_raffle_enter")
                .add_attribute("participant", info.sender.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("round_id", round.round_id.to_string())
                .add_attribute("slot", slot.to_string())
                .add_attribute("participant_count", round.participant_count.to_string())
                .add_attribute("pool", round.pool.to_string()),
        ))
}

/// Start a draw. Anyone may call; eligibility is re-evaluated here rather than
/// trusted from the caller's last `CheckUpkeep`.
pub fn perform_upkeep(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut round = ROUND.load(deps.storage)?;

    if !eligibility::check_upkeep(&round, config.draw_interval_seconds, env.block.time) {
        return Err(ContractError::UpkeepNotNeeded {
            state: round.state.to_string(),
            participant_count: round.participant_count,
            pool: round.pool,
            elapsed_seconds: eligibility::elapsed_since_last_draw(&round, env.block.time),
        });
    }

    round.state = RaffleState::Calculating;
    round.draw_epoch += 1;
    ROUND.save(deps.storage, &round)?;

    let request = WasmMsg::Execute {
        contract_addr: config.vrf_coordinator.to_string(),
        msg: to_json_binary(&VrfCoordinatorMsg::RequestRandomWords {
            key_hash: config.key_hash,
            subscription_id: config.subscription_id,
            request_confirmations: config.request_confirmations,
            callback_gas_limit: config.callback_gas_limit,
            num_words: NUM_WORDS,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_submessage(SubMsg::reply_always(request, REQUEST_RANDOMNESS_REPLY_ID))
        .add_attribute("action", "perform_upkeep")
        .add_attribute("caller", info.sender.to_string())
        .add_attribute("draw_epoch", round.draw_epoch.to_string()))
}

/// Reply to the randomness request: track the id the coordinator assigned.
///
/// Any failure here reverts the whole draw start, so the round is Open again.
pub fn on_randomness_requested(
    deps: DepsMut,
    env: Env,
    result: SubMsgResult,
) -> Result<Response, ContractError> {
    let response = match result {
        SubMsgResult::Ok(response) => response,
        SubMsgResult::Err(reason) => return Err(ContractError::ProviderUnavailable { reason }),
    };
    let request_id =
        parse_request_id(&response.events).ok_or_else(|| ContractError::ProviderUnavailable {
            reason: "coordinator response carried no request id".to_string(),
        })?;

    let mut round = ROUND.load(deps.storage)?;
    let request = RandomnessRequest {
        request_id,
        epoch: round.draw_epoch,
        round_id: round.round_id,
        participant_count: round.participant_count,
        requested_at: env.block.time,
    };
    tracker::record(deps.storage, &request)?;

    round.outstanding_request_id = Some(request_id);
    ROUND.save(deps.storage, &round)?;

    Ok(Response::new()
        .set_data(to_json_binary(&PerformUpkeepResponse { request_id })?)
        .add_attribute("action", "draw_requested")
        .add_attribute("request_id", request_id.to_string())
        .add_event(
            Event::new("chance_draw_requested")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("round_id", round.round_id.to_string())
                .add_attribute("epoch", round.draw_epoch.to_string())
                .add_attribute("participant_count", round.participant_count.to_string())
                .add_attribute("pool", round.pool.to_string()),
        ))
}

/// Randomness callback from the coordinator.
///
/// A request that does not match the outstanding one is rejected with no state
/// change. A matching request is consumed even if the payout cannot be made:
/// the round then stays Calculating with its pool and the failure is recorded.
pub fn raw_fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    random_words: Vec<Uint256>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.vrf_coordinator {
        return Err(ContractError::OnlyCoordinatorCanFulfill {
            have: info.sender.to_string(),
            want: config.vrf_coordinator.to_string(),
        });
    }

    let random_word = *random_words.first().ok_or(ContractError::NoRandomWords)?;
    let request = tracker::matching(deps.storage, request_id)?;

    let mut round = ROUND.load(deps.storage)?;
    let winner_index = winner_index(random_word, request.participant_count)?;
    let winner = ledger::participant_at(deps.storage, &round, winner_index)?;
    let amount = round.pool;

    tracker::resolve(deps.storage, request_id)?;

    round.outstanding_request_id = None;
    ROUND.save(deps.storage, &round)?;

    match payout::transfer(
        &deps.querier,
        &env.contract.address,
        &winner,
        amount,
        &config.denom,
    ) {
        Ok(send) => {
            PENDING_PAYOUT.save(
                deps.storage,
                &PendingPayout {
                    round_id: round.round_id,
                    request_id,
                    random_word,
                    winner_index,
                    winner: winner.clone(),
                    amount,
                },
            )?;

            Ok(Response::new()
                .add_submessage(send)
                .add_attribute("action", "fulfill_random_words")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("random_word", word_hex(&random_word))
                .add_attribute("winner_index", winner_index.to_string())
                .add_attribute("winner", winner.to_string()))
        }
        Err(ContractError::TransferFailed { reason }) => {
            let failure = PayoutFailure {
                round_id: round.round_id,
                request_id,
                winner,
                amount,
                reason,
                failed_at: env.block.time,
            };
            Ok(record_payout_failure(deps.storage, failure)?
                .add_attribute("action", "fulfill_random_words"))
        }
        Err(err) => Err(err),
    }
}

/// Reply to the payout transfer: finish the round or mark it degraded.
pub fn on_payout(
    deps: DepsMut,
    env: Env,
    result: SubMsgResult,
) -> Result<Response, ContractError> {
    let pending = PENDING_PAYOUT
        .may_load(deps.storage)?
        .ok_or(ContractError::NoPendingPayout)?;
    PENDING_PAYOUT.remove(deps.storage);

    match payout::confirm(result) {
        Ok(()) => {
            let mut round = ROUND.load(deps.storage)?;
            let participant_count = round.participant_count;

            ledger::reset(&mut round);
            round.last_draw_timestamp = env.block.time;
            round.state = RaffleState::Open;
            ROUND.save(deps.storage, &round)?;

            DRAWS.save(
                deps.storage,
                pending.round_id,
                &DrawRecord {
                    round_id: pending.round_id,
                    request_id: pending.request_id,
                    random_word: pending.random_word,
                    winner_index: pending.winner_index,
                    winner: pending.winner.clone(),
                    payout_amount: pending.amount,
                    participant_count,
                    completed_at: env.block.time,
                },
            )?;
            RECENT_WINNER.save(deps.storage, &pending.winner)?;
            PAYOUT_FAILURE.remove(deps.storage);

            Ok(Response::new()
                .add_attribute("action", "winner_picked")
                .add_attribute("winner", pending.winner.to_string())
                .add_attribute("payout_amount", pending.amount.to_string())
                .add_event(
                    Event::new("chance_winner_picked")
                        .add_attribute("round_id", pending.round_id.to_string())
                        .add_attribute("request_id", pending.request_id.to_string())
                        .add_attribute("winner", pending.winner.to_string())
                        .add_attribute("winner_index", pending.winner_index.to_string())
                        .add_attribute("payout_amount", pending.amount.to_string())
                        .add_attribute("timestamp", env.block.time.seconds().to_string()),
                ))
        }
        Err(ContractError::TransferFailed { reason }) => {
            let failure = PayoutFailure {
                round_id: pending.round_id,
                request_id: pending.request_id,
                winner: pending.winner,
                amount: pending.amount,
                reason,
                failed_at: env.block.time,
            };
            record_payout_failure(deps.storage, failure)
        }
        Err(err) => Err(err),
    }
}

/// `random_word mod participant_count`.
fn winner_index(random_word: Uint256, participant_count: u32) -> Result<u32, ContractError> {
    let index = random_word
        .checked_rem(Uint256::from(participant_count))
        .map_err(StdError::from)?;
    // index < participant_count, so only the low four bytes can be set
    let bytes = index.to_be_bytes();
    Ok(u32::from_be_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]))
}

/// Store the failure and leave the round in Calculating with its pool.
///
/// The request is already consumed, so no further callback can complete this
/// round; the stored failure and the event are how operators find out.
fn record_payout_failure(
    storage: &mut dyn Storage,
    failure: PayoutFailure,
) -> Result<Response, ContractError> {
    PAYOUT_FAILURE.save(storage, &failure)?;

    let error = ContractError::TransferFailed {
        reason: failure.reason.clone(),
    };

    Ok(Response::new()
        .add_attribute("payout_status", "failed")
        .add_attribute("error", error.to_string())
        .add_event(
            Event::new("chance_payout_failed")
                .add_attribute("round_id", failure.round_id.to_string())
                .add_attribute("request_id", failure.request_id.to_string())
                .add_attribute("winner", failure.winner.to_string())
                .add_attribute("amount", failure.amount.to_string())
                .add_attribute("reason", failure.reason),
        ))
}
