use chance_raffle_common::types::RaffleState;
use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdResult, Uint128,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute::{self, REQUEST_RANDOMNESS_REPLY_ID};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::payout::PAYOUT_REPLY_ID;
use crate::query;
use crate::state::{RaffleConfig, Round, CONFIG, ROUND};

const CONTRACT_NAME: &str = "crates.io:chance-raffle";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.entrance_fee.is_zero() {
        return Err(ContractError::InvalidConfig {
            reason: "entrance_fee must be positive".to_string(),
        });
    }
    if msg.draw_interval_seconds == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "draw_interval_seconds must be positive".to_string(),
        });
    }
    if msg.callback_gas_limit == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "callback_gas_limit must be positive".to_string(),
        });
    }
    if msg.denom.is_empty() || msg.key_hash.is_empty() {
        return Err(ContractError::InvalidConfig {
            reason: "denom and key_hash must be set".to_string(),
        });
    }

    let config = RaffleConfig {
        admin: info.sender.clone(),
        entrance_fee: msg.entrance_fee,
        denom: msg.denom,
        draw_interval_seconds: msg.draw_interval_seconds,
        vrf_coordinator: deps.api.addr_validate(&msg.vrf_coordinator)?,
        key_hash: msg.key_hash,
        subscription_id: msg.subscription_id,
        request_confirmations: msg.request_confirmations,
        callback_gas_limit: msg.callback_gas_limit,
    };
    CONFIG.save(deps.storage, &config)?;

    let round = Round {
        state: RaffleState::Open,
        round_id: 1,
        participant_count: 0,
        pool: Uint128::zero(),
        last_draw_timestamp: env.block.time,
        draw_epoch: 0,
        outstanding_request_id: None,
    };
    ROUND.save(deps.storage, &round)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "raffle")
        .add_attribute("admin", info.sender.to_string())
        .add_attribute("entrance_fee", config.entrance_fee.to_string())
        .add_attribute("draw_interval_seconds", config.draw_interval_seconds.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::EnterRaffle {} => execute::enter_raffle(deps, env, info),
        ExecuteMsg::PerformUpkeep {} => execute::perform_upkeep(deps, env, info),
        ExecuteMsg::RawFulfillRandomWords {
            request_id,
            random_words,
        } => execute::raw_fulfill_random_words(deps, env, info, request_id, random_words),
    }
}

#[entry_point]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        REQUEST_RANDOMNESS_REPLY_ID => execute::on_randomness_requested(deps, env, msg.result),
        PAYOUT_REPLY_ID => execute::on_payout(deps, env, msg.result),
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Round {} => query::query_round(deps),
        QueryMsg::CheckUpkeep {} => query::query_check_upkeep(deps, env),
        QueryMsg::Participant { index } => query::query_participant(deps, index),
        QueryMsg::Participants { start_after, limit } => {
            query::query_participants(deps, start_after, limit)
        }
        QueryMsg::NumberOfParticipants {} => query::query_number_of_participants(deps),
        QueryMsg::RecentWinner {} => query::query_recent_winner(deps),
        QueryMsg::LatestTimestamp {} => query::query_latest_timestamp(deps),
        QueryMsg::OutstandingRequest {} => query::query_outstanding_request(deps),
        QueryMsg::PayoutFailure {} => query::query_payout_failure(deps),
        QueryMsg::Draw { round_id } => query::query_draw(deps, round_id),
        QueryMsg::DrawHistory { start_after, limit } => {
            query::query_draw_history(deps, start_after, limit)
        }
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
