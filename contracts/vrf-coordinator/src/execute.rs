use chance_raffle_common::randomness::{derive_random_words, word_hex};
use chance_raffle_common::vrf::{
    RequestRandomWordsResponse, VrfConsumerMsg, MAX_CALLBACK_GAS_LIMIT, MAX_NUM_WORDS,
    RANDOMNESS_REQUESTED_EVENT, REQUEST_ID_ATTR,
};
use cosmwasm_std::{
    to_json_binary, DepsMut, Env, Event, MessageInfo, Response, Storage, SubMsg, SubMsgResult,
    Uint256, WasmMsg,
};

use crate::beacon::{round_at, verify_beacon};
use crate::error::ContractError;
use crate::state::{
    CoordinatorConfig, RandomWordsRequest, StoredBeacon, Subscription, BEACONS, CONFIG,
    FULFILLING, LATEST_ROUND, NEXT_REQUEST_ID, NEXT_SUBSCRIPTION_ID, REQUESTS, SUBSCRIPTIONS,
};

pub const FULFILL_REPLY_ID: u64 = 1;
pub const MAX_CONSUMERS: usize = 100;

/// Submit a drand beacon. Only operators can call this.
pub fn submit_beacon(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    round: u64,
    signature_hex: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info, "only operators can submit beacons")?;

    if BEACONS.has(deps.storage, round) {
        return Err(ContractError::BeaconAlreadyExists { round });
    }

    let signature = hex::decode(&signature_hex).map_err(|_| ContractError::InvalidHex {
        field: "signature_hex".to_string(),
    })?;

    let randomness = verify_beacon(&config.quicknet_pubkey, round, &signature).map_err(|e| {
        ContractError::VerificationFailed {
            reason: e.to_string(),
        }
    })?;

    let beacon = StoredBeacon {
        round,
        randomness: randomness.to_vec(),
        signature,
        submitted_at: env.block.time,
        submitted_by: info.sender.clone(),
    };
    BEACONS.save(deps.storage, round, &beacon)?;

    LATEST_ROUND.update(deps.storage, |latest| -> Result<_, ContractError> {
        Ok(latest.max(round))
    })?;

    Ok(Response::new()
        .add_attribute("action", "submit_beacon")
        .add_attribute("round", round.to_string())
        .add_attribute("submitted_by", info.sender.to_string())
        .add_event(
            Event::new("chance_beacon_submitted")
                .add_attribute("chain_hash", config.chain_hash.clone())
                .add_attribute("round", round.to_string())
                .add_attribute("randomness", hex::encode(randomness))
                .add_attribute("submitted_by", info.sender.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// Update the operator list. Admin only.
pub fn update_operators(
    deps: DepsMut,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update operators".to_string(),
        });
    }

    for addr_str in &remove {
        let addr = deps.api.addr_validate(addr_str)?;
        config.operators.retain(|a| *a != addr);
    }
    for addr_str in &add {
        let addr = deps.api.addr_validate(addr_str)?;
        if !config.operators.contains(&addr) {
            config.operators.push(addr);
        }
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_operators")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}

pub fn create_subscription(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let id = NEXT_SUBSCRIPTION_ID.load(deps.storage)?;
    NEXT_SUBSCRIPTION_ID.save(deps.storage, &(id + 1))?;

    let subscription = Subscription {
        id,
        owner: info.sender.clone(),
        consumers: vec![],
        request_count: 0,
        created_at: env.block.time,
    };
    SUBSCRIPTIONS.save(deps.storage, id, &subscription)?;

    Ok(Response::new()
        .add_attribute("action", "create_subscription")
        .add_attribute("subscription_id", id.to_string())
        .add_attribute("owner", info.sender.to_string())
        .add_event(
            Event::new("chance_subscription_created")
                .add_attribute("subscription_id", id.to_string())
                .add_attribute("owner", info.sender.to_string()),
        ))
}

pub fn add_consumer(
    deps: DepsMut,
    info: MessageInfo,
    subscription_id: u64,
    consumer: String,
) -> Result<Response, ContractError> {
    let mut subscription = load_owned_subscription(deps.storage, &info, subscription_id)?;
    let consumer = deps.api.addr_validate(&consumer)?;

    // Adding an existing consumer is a no-op.
    if !subscription.consumers.contains(&consumer) {
        if subscription.consumers.len() >= MAX_CONSUMERS {
            return Err(ContractError::TooManyConsumers {
                subscription_id,
                max: MAX_CONSUMERS,
            });
        }
        subscription.consumers.push(consumer.clone());
        SUBSCRIPTIONS.save(deps.storage, subscription_id, &subscription)?;
    }

    Ok(Response::new()
        .add_attribute("action", "add_consumer")
        .add_attribute("subscription_id", subscription_id.to_string())
        .add_attribute("consumer", consumer.to_string())
        .add_event(
            Event::new("chance_consumer_added")
                .add_attribute("subscription_id", subscription_id.to_string())
                .add_attribute("consumer", consumer.to_string()),
        ))
}

pub fn remove_consumer(
    deps: DepsMut,
    info: MessageInfo,
    subscription_id: u64,
    consumer: String,
) -> Result<Response, ContractError> {
    let mut subscription = load_owned_subscription(deps.storage, &info, subscription_id)?;
    let consumer = deps.api.addr_validate(&consumer)?;

    if !subscription.consumers.contains(&consumer) {
        return Err(ContractError::InvalidConsumer {
            subscription_id,
            consumer: consumer.to_string(),
        });
    }
    subscription.consumers.retain(|c| *c != consumer);
    SUBSCRIPTIONS.save(deps.storage, subscription_id, &subscription)?;

    Ok(Response::new()
        .add_attribute("action", "remove_consumer")
        .add_attribute("subscription_id", subscription_id.to_string())
        .add_attribute("consumer", consumer.to_string())
        .add_event(
            Event::new("chance_consumer_removed")
                .add_attribute("subscription_id", subscription_id.to_string())
                .add_attribute("consumer", consumer.to_string()),
        ))
}

/// Register a request for random words on behalf of a subscription consumer.
///
/// The request id is returned both as transaction data and as the
/// `request_id` attribute of a `chance_randomness_requested` event.
#[allow(clippy::too_many_arguments)]
pub fn request_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    key_hash: String,
    subscription_id: u64,
    request_confirmations: u16,
    callback_gas_limit: u64,
    num_words: u32,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let mut subscription = SUBSCRIPTIONS
        .may_load(deps.storage, subscription_id)?
        .ok_or(ContractError::SubscriptionNotFound { subscription_id })?;
    if !subscription.consumers.contains(&info.sender) {
        return Err(ContractError::InvalidConsumer {
            subscription_id,
            consumer: info.sender.to_string(),
        });
    }
    if num_words == 0 || num_words > MAX_NUM_WORDS {
        return Err(ContractError::InvalidNumWords {
            num_words,
            max: MAX_NUM_WORDS,
        });
    }
    if callback_gas_limit > MAX_CALLBACK_GAS_LIMIT {
        return Err(ContractError::GasLimitTooBig {
            have: callback_gas_limit,
            want: MAX_CALLBACK_GAS_LIMIT,
        });
    }

    let request_id = NEXT_REQUEST_ID.load(deps.storage)?;
    NEXT_REQUEST_ID.save(deps.storage, &(request_id + 1))?;

    let bound_round =
        round_at(config.genesis_time, config.period_seconds, env.block.time.seconds()) + 1;

    let request = RandomWordsRequest {
        request_id,
        subscription_id,
        consumer: info.sender.clone(),
        key_hash,
        request_confirmations,
        callback_gas_limit,
        num_words,
        requested_at: env.block.time,
        requested_height: env.block.height,
        bound_round,
    };
    REQUESTS.save(deps.storage, request_id, &request)?;

    subscription.request_count += 1;
    SUBSCRIPTIONS.save(deps.storage, subscription_id, &subscription)?;

    Ok(Response::new()
        .set_data(to_json_binary(&RequestRandomWordsResponse { request_id })?)
        .add_attribute("action", "request_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("consumer", info.sender.to_string())
        .add_event(
            Event::new(RANDOMNESS_REQUESTED_EVENT)
                .add_attribute(REQUEST_ID_ATTR, request_id.to_string())
                .add_attribute("subscription_id", subscription_id.to_string())
                .add_attribute("consumer", info.sender.to_string())
                .add_attribute("key_hash", request.key_hash.clone())
                .add_attribute("num_words", num_words.to_string())
                .add_attribute("bound_round", bound_round.to_string()),
        ))
}

/// Fulfil a request from the beacon of the one drand round it is bound to.
/// Operator only.
pub fn fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    drand_round: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info, "only operators can fulfil requests")?;

    let request = load_request(deps.storage, request_id)?;

    let ready_at_height = request.requested_height + u64::from(request.request_confirmations);
    if env.block.height < ready_at_height {
        return Err(ContractError::TooEarly {
            request_id,
            ready_at_height,
        });
    }
    if drand_round != request.bound_round {
        return Err(ContractError::WrongBeaconRound {
            round: drand_round,
            expected: request.bound_round,
        });
    }
    let beacon = BEACONS
        .may_load(deps.storage, drand_round)?
        .ok_or(ContractError::BeaconNotFound { round: drand_round })?;

    let words = derive_random_words(&beacon.randomness, request_id, request.num_words);
    dispatch(deps.storage, request, words, Some(drand_round))
}

/// Fulfil a request with caller-supplied words. Operator only, and only on
/// coordinators instantiated with `allow_override`.
pub fn fulfill_random_words_with_override(
    deps: DepsMut,
    info: MessageInfo,
    request_id: u64,
    random_words: Vec<Uint256>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info, "only operators can fulfil requests")?;
    if !config.allow_override {
        return Err(ContractError::OverrideDisabled);
    }

    let request = load_request(deps.storage, request_id)?;
    if random_words.len() != request.num_words as usize {
        return Err(ContractError::WordCountMismatch {
            expected: request.num_words,
            got: random_words.len(),
        });
    }

    dispatch(deps.storage, request, random_words, None)
}

/// Handle the consumer callback's result. A failing consumer does not revert
/// the fulfilment; the request stays consumed.
pub fn on_fulfilled(deps: DepsMut, result: SubMsgResult) -> Result<Response, ContractError> {
    let request_id = FULFILLING.load(deps.storage)?;
    FULFILLING.remove(deps.storage);

    let (success, error) = match result {
        SubMsgResult::Ok(_) => (true, String::new()),
        SubMsgResult::Err(err) => (false, err),
    };

    Ok(Response::new()
        .add_attribute("action", "fulfilled")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("success", success.to_string())
        .add_event(
            Event::new("chance_random_words_fulfilled")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("success", success.to_string())
                .add_attribute("error", error),
        ))
}

/// Consume `request` and send its words to the consumer.
fn dispatch(
    storage: &mut dyn Storage,
    request: RandomWordsRequest,
    words: Vec<Uint256>,
    drand_round: Option<u64>,
) -> Result<Response, ContractError> {
    REQUESTS.remove(storage, request.request_id);
    FULFILLING.save(storage, &request.request_id)?;

    let first_word = words.first().map(word_hex).unwrap_or_default();
    let callback = WasmMsg::Execute {
        contract_addr: request.consumer.to_string(),
        msg: to_json_binary(&VrfConsumerMsg::RawFulfillRandomWords {
            request_id: request.request_id,
            random_words: words,
        })?,
        funds: vec![],
    };
    let sub_msg = SubMsg::reply_always(callback, FULFILL_REPLY_ID)
        .with_gas_limit(request.callback_gas_limit);

    let mut event = Event::new("chance_random_words_dispatched")
        .add_attribute("request_id", request.request_id.to_string())
        .add_attribute("consumer", request.consumer.to_string())
        .add_attribute("first_word", first_word);
    if let Some(round) = drand_round {
        event = event.add_attribute("drand_round", round.to_string());
    } else {
        event = event.add_attribute("override", "true");
    }

    Ok(Response::new()
        .add_submessage(sub_msg)
        .add_attribute("action", "fulfill_random_words")
        .add_attribute("request_id", request.request_id.to_string())
        .add_event(event))
}

fn ensure_operator(
    config: &CoordinatorConfig,
    info: &MessageInfo,
    reason: &str,
) -> Result<(), ContractError> {
    if !config.operators.contains(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: reason.to_string(),
        });
    }
    Ok(())
}

fn load_owned_subscription(
    storage: &dyn Storage,
    info: &MessageInfo,
    subscription_id: u64,
) -> Result<Subscription, ContractError> {
    let subscription = SUBSCRIPTIONS
        .may_load(storage, subscription_id)?
        .ok_or(ContractError::SubscriptionNotFound { subscription_id })?;
    if subscription.owner != info.sender {
        return Err(ContractError::Unauthorized {
            reason: "only the subscription owner can manage consumers".to_string(),
        });
    }
    Ok(subscription)
}

fn load_request(storage: &dyn Storage, request_id: u64) -> Result<RandomWordsRequest, ContractError> {
    REQUESTS
        .may_load(storage, request_id)?
        .ok_or(ContractError::RequestNotFound { request_id })
}
