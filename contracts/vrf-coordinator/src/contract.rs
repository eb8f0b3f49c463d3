use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdResult,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute::{self, FULFILL_REPLY_ID};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query;
use crate::state::{
    CoordinatorConfig, CONFIG, LATEST_ROUND, NEXT_REQUEST_ID, NEXT_SUBSCRIPTION_ID,
};

const CONTRACT_NAME: &str = "crates.io:chance-vrf-coordinator";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let pubkey_bytes = hex::decode(&msg.quicknet_pubkey_hex).map_err(|_| {
        ContractError::InvalidHex {
            field: "quicknet_pubkey_hex".to_string(),
        }
    })?;
    if pubkey_bytes.len() != 96 {
        return Err(ContractError::InvalidPubkeyLength {
            got: pubkey_bytes.len(),
        });
    }
    let chain_hash = hex::decode(&msg.chain_hash).map_err(|_| ContractError::InvalidHex {
        field: "chain_hash".to_string(),
    })?;
    if chain_hash.len() != 32 {
        return Err(ContractError::InvalidConfig {
            reason: "chain_hash must be 32 bytes".to_string(),
        });
    }
    if msg.period_seconds == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "period_seconds must be positive".to_string(),
        });
    }

    let mut operators = Vec::new();
    for op in &msg.operators {
        operators.push(deps.api.addr_validate(op)?);
    }

    let config = CoordinatorConfig {
        admin: info.sender.clone(),
        operators,
        quicknet_pubkey: pubkey_bytes,
        chain_hash: msg.chain_hash,
        genesis_time: msg.genesis_time,
        period_seconds: msg.period_seconds,
        allow_override: msg.allow_override,
    };

    CONFIG.save(deps.storage, &config)?;
    LATEST_ROUND.save(deps.storage, &0u64)?;
    NEXT_SUBSCRIPTION_ID.save(deps.storage, &1u64)?;
    NEXT_REQUEST_ID.save(deps.storage, &1u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "vrf-coordinator")
        .add_attribute("admin", info.sender.to_string())
        .add_attribute("chain_hash", config.chain_hash)
        .add_attribute("allow_override", config.allow_override.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::SubmitBeacon {
            round,
            signature_hex,
        } => execute::submit_beacon(deps, env, info, round, signature_hex),
        ExecuteMsg::UpdateOperators { add, remove } => {
            execute::update_operators(deps, info, add, remove)
        }
        ExecuteMsg::CreateSubscription {} => execute::create_subscription(deps, env, info),
        ExecuteMsg::AddConsumer {
            subscription_id,
            consumer,
        } => execute::add_consumer(deps, info, subscription_id, consumer),
        ExecuteMsg::RemoveConsumer {
            subscription_id,
            consumer,
        } => execute::remove_consumer(deps, info, subscription_id, consumer),
        ExecuteMsg::RequestRandomWords {
            key_hash,
            subscription_id,
            request_confirmations,
            callback_gas_limit,
            num_words,
        } => execute::request_random_words(
            deps,
            env,
            info,
            key_hash,
            subscription_id,
            request_confirmations,
            callback_gas_limit,
            num_words,
        ),
        ExecuteMsg::FulfillRandomWords {
            request_id,
            drand_round,
        } => execute::fulfill_random_words(deps, env, info, request_id, drand_round),
        ExecuteMsg::FulfillRandomWordsWithOverride {
            request_id,
            random_words,
        } => execute::fulfill_random_words_with_override(deps, info, request_id, random_words),
    }
}

#[entry_point]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        FULFILL_REPLY_ID => execute::on_fulfilled(deps, msg.result),
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Beacon { round } => query::query_beacon(deps, round),
        QueryMsg::LatestRound {} => query::query_latest_round(deps),
        QueryMsg::Subscription { subscription_id } => {
            query::query_subscription(deps, subscription_id)
        }
        QueryMsg::Request { request_id } => query::query_request(deps, request_id),
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
