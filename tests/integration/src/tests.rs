//! End-to-end tests for the raffle and its VRF coordinator.
//!
//! Both contracts run on `cosmwasm_std::testing` mocks. [`Chain`] stands in
//! for the runtime: it delivers submessages between the two contracts, feeds
//! replies back, moves bank balances and rolls a contract's storage back when
//! its part of a transaction fails.
//!
//! Run:
//! ```bash
//! cargo test -p chance-raffle-integration-tests
//! ```

use chance_raffle::execute::REQUEST_RANDOMNESS_REPLY_ID;
use chance_raffle::msg::{
    CheckUpkeepResponse, DrawHistoryResponse, ExecuteMsg as RaffleExecuteMsg,
    InstantiateMsg as RaffleInstantiateMsg, ParticipantsResponse, PerformUpkeepResponse,
    QueryMsg as RaffleQueryMsg, RoundResponse,
};
use chance_raffle::state::{DrawRecord, PayoutFailure, RandomnessRequest};
use chance_raffle_common::randomness::derive_random_words;
use chance_raffle_common::types::RaffleState;
use chance_vrf_coordinator::beacon::QUICKNET_PK_HEX;
use chance_vrf_coordinator::execute::FULFILL_REPLY_ID;
use chance_vrf_coordinator::msg::{
    ExecuteMsg as CoordinatorExecuteMsg, InstantiateMsg as CoordinatorInstantiateMsg,
    QueryMsg as CoordinatorQueryMsg,
};
use chance_vrf_coordinator::state::RandomWordsRequest;
use cosmwasm_std::testing::{
    message_info, mock_dependencies, mock_env, MockApi, MockQuerier, MockStorage,
};
use cosmwasm_std::{
    coins, from_json, Addr, BankMsg, Binary, Coin, CosmosMsg, Env, Event, Order, OwnedDeps,
    Reply, Response, Storage, SubMsg, SubMsgResponse, SubMsgResult, Timestamp, Uint128, Uint256,
    WasmMsg,
};
use serde::de::DeserializeOwned;

// ─── Constants ───

/// Real quicknet test vector: round 1000
const TEST_ROUND: u64 = 1000;
const TEST_SIG_HEX: &str = "b44679b9a59af2ec876b1a6b1ad52ea9b1615fc3982b19576350f93447cb1125e342b73a8dd2bacbe47e4b6b63ed5e39";
const TEST_RANDOMNESS_HEX: &str =
    "fe290beca10872ef2fb164d2aa4442de4566183ec51c56ff3cd603d930e54fdd";

const GENESIS: u64 = 1692803367;

const DENOM: &str = "inj";
/// 0.01 INJ
const FEE: u128 = 10_000_000_000_000_000;
const INTERVAL: u64 = 30;
const CONFIRMATIONS: u16 = 3;
const CALLBACK_GAS: u64 = 500_000;

type TestDeps = OwnedDeps<MockStorage, MockApi, MockQuerier>;

// ─── Runtime helpers ───

fn snapshot(storage: &MockStorage) -> MockStorage {
    let mut copy = MockStorage::new();
    for (key, value) in storage.range(None, None, Order::Ascending) {
        copy.set(&key, &value);
    }
    copy
}

/// Events as the caller's reply sees them: custom events gain a `wasm-` prefix.
fn as_wasm_events(events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .map(|e| Event::new(format!("wasm-{}", e.ty)).add_attributes(e.attributes))
        .collect()
}

#[allow(deprecated)]
fn reply_for(id: u64, result: Result<Response, String>) -> Reply {
    let result = match result {
        Ok(res) => SubMsgResult::Ok(SubMsgResponse {
            events: as_wasm_events(res.events),
            data: res.data,
            msg_responses: vec![],
        }),
        Err(err) => SubMsgResult::Err(err),
    };
    Reply {
        id,
        payload: Binary::default(),
        gas_used: 0,
        result,
    }
}

fn single_wasm_execute(res: &Response) -> (SubMsg, String, Binary) {
    assert_eq!(res.messages.len(), 1, "expected one submessage");
    let sub = res.messages[0].clone();
    match &sub.msg {
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr, msg, ..
        }) => {
            let (addr, msg) = (contract_addr.clone(), msg.clone());
            (sub, addr, msg)
        }
        other => panic!("unexpected message {:?}", other),
    }
}

fn has_event(res: &Response, ty: &str, key: &str, value: &str) -> bool {
    res.events
        .iter()
        .filter(|e| e.ty == ty)
        .flat_map(|e| e.attributes.iter())
        .any(|a| a.key == key && a.value == value)
}

/// Two contracts, one bank, one clock.
struct Chain {
    raffle: TestDeps,
    coordinator: TestDeps,
    raffle_addr: Addr,
    coordinator_addr: Addr,
    operator: Addr,
    owner: Addr,
    block_time: Timestamp,
    block_height: u64,
    /// Make the bank reject every send.
    fail_bank_sends: bool,
}

impl Chain {
    fn new(allow_override: bool) -> Self {
        let api = MockApi::default();
        let env = mock_env();
        let mut chain = Chain {
            raffle: mock_dependencies(),
            coordinator: mock_dependencies(),
            raffle_addr: api.addr_make("raffle"),
            coordinator_addr: api.addr_make("vrf_coordinator"),
            operator: api.addr_make("operator"),
            owner: api.addr_make("owner"),
            block_time: env.block.time,
            block_height: env.block.height,
            fail_bank_sends: false,
        };

        let admin = api.addr_make("admin");
        let env = chain.coordinator_env();
        chance_vrf_coordinator::contract::instantiate(
            chain.coordinator.as_mut(),
            env,
            message_info(&admin, &[]),
            CoordinatorInstantiateMsg {
                operators: vec![chain.operator.to_string()],
                quicknet_pubkey_hex: QUICKNET_PK_HEX.to_string(),
                chain_hash: "52db9ba70e0cc0f6eaf7803dd07447a1f5477735fd3f661792ba94600c84e971"
                    .to_string(),
                genesis_time: GENESIS,
                period_seconds: 3,
                allow_override,
            },
        )
        .unwrap();

        let owner = chain.owner.clone();
        chain
            .execute_coordinator(&owner, CoordinatorExecuteMsg::CreateSubscription {})
            .unwrap();
        chain.add_consumer();

        let env = chain.raffle_env();
        chance_raffle::contract::instantiate(
            chain.raffle.as_mut(),
            env,
            message_info(&admin, &[]),
            RaffleInstantiateMsg {
                entrance_fee: Uint128::new(FEE),
                denom: DENOM.to_string(),
                draw_interval_seconds: INTERVAL,
                vrf_coordinator: chain.coordinator_addr.to_string(),
                key_hash: "quicknet".to_string(),
                subscription_id: 1,
                request_confirmations: CONFIRMATIONS,
                callback_gas_limit: CALLBACK_GAS,
            },
        )
        .unwrap();

        chain
    }

    fn env_of(&self, contract: &Addr) -> Env {
        let mut env = mock_env();
        env.block.time = self.block_time;
        env.block.height = self.block_height;
        env.contract.address = contract.clone();
        env
    }

    fn raffle_env(&self) -> Env {
        self.env_of(&self.raffle_addr)
    }

    fn coordinator_env(&self) -> Env {
        self.env_of(&self.coordinator_addr)
    }

    fn advance(&mut self, seconds: u64, blocks: u64) {
        self.block_time = self.block_time.plus_seconds(seconds);
        self.block_height += blocks;
    }

    fn advance_past_interval(&mut self) {
        self.advance(INTERVAL + 1, 5);
    }

    fn add_consumer(&mut self) {
        let (owner, consumer) = (self.owner.clone(), self.raffle_addr.to_string());
        self.execute_coordinator(
            &owner,
            CoordinatorExecuteMsg::AddConsumer {
                subscription_id: 1,
                consumer,
            },
        )
        .unwrap();
    }

    fn remove_consumer(&mut self) {
        let (owner, consumer) = (self.owner.clone(), self.raffle_addr.to_string());
        self.execute_coordinator(
            &owner,
            CoordinatorExecuteMsg::RemoveConsumer {
                subscription_id: 1,
                consumer,
            },
        )
        .unwrap();
    }

    // ── Bank ──

    fn balance(&self, addr: &Addr) -> u128 {
        self.raffle
            .as_ref()
            .querier
            .query_balance(addr, DENOM)
            .unwrap()
            .amount
            .u128()
    }

    fn set_balance(&mut self, addr: &Addr, amount: u128) {
        self.raffle
            .querier
            .bank
            .update_balance(addr, vec![Coin::new(amount, DENOM)]);
    }

    fn bank_send(&mut self, to_address: &str, amount: &[Coin]) -> Result<(), String> {
        if self.fail_bank_sends {
            return Err("bank send disabled".to_string());
        }
        let from = self.raffle_addr.clone();
        let to = Addr::unchecked(to_address);
        for coin in amount {
            let value = coin.amount.u128();
            let available = self.balance(&from);
            if available < value {
                return Err(format!("insufficient funds: {} < {}", available, value));
            }
            let received = self.balance(&to);
            self.set_balance(&from, available - value);
            self.set_balance(&to, received + value);
        }
        Ok(())
    }

    // ── Transactions ──

    fn execute_coordinator(
        &mut self,
        sender: &Addr,
        msg: CoordinatorExecuteMsg,
    ) -> Result<Response, chance_vrf_coordinator::ContractError> {
        let saved = snapshot(&self.coordinator.storage);
        let env = self.coordinator_env();
        let result = chance_vrf_coordinator::contract::execute(
            self.coordinator.as_mut(),
            env,
            message_info(sender, &[]),
            msg,
        );
        if result.is_err() {
            self.coordinator.storage = saved;
        }
        result
    }

    fn enter(&mut self, name: &str) -> Addr {
        let player = self.raffle.api.addr_make(name);
        self.try_enter(&player).unwrap();
        player
    }

    fn try_enter(&mut self, player: &Addr) -> Result<Response, chance_raffle::ContractError> {
        let env = self.raffle_env();
        let res = chance_raffle::contract::execute(
            self.raffle.as_mut(),
            env,
            message_info(player, &coins(FEE, DENOM)),
            RaffleExecuteMsg::EnterRaffle {},
        )?;
        let raffle_addr = self.raffle_addr.clone();
        let held = self.balance(&raffle_addr);
        self.set_balance(&raffle_addr, held + FEE);
        Ok(res)
    }

    /// Keeper-triggered draw start, including the nested coordinator request.
    fn perform_upkeep(&mut self) -> Result<Response, chance_raffle::ContractError> {
        let saved_raffle = snapshot(&self.raffle.storage);
        let saved_coordinator = snapshot(&self.coordinator.storage);
        let result = self.perform_upkeep_inner();
        if result.is_err() {
            self.raffle.storage = saved_raffle;
            self.coordinator.storage = saved_coordinator;
        }
        result
    }

    fn perform_upkeep_inner(&mut self) -> Result<Response, chance_raffle::ContractError> {
        let keeper = self.raffle.api.addr_make("keeper");
        let env = self.raffle_env();
        let res = chance_raffle::contract::execute(
            self.raffle.as_mut(),
            env.clone(),
            message_info(&keeper, &[]),
            RaffleExecuteMsg::PerformUpkeep {},
        )?;

        let (sub, contract_addr, msg) = single_wasm_execute(&res);
        assert_eq!(sub.id, REQUEST_RANDOMNESS_REPLY_ID);
        assert_eq!(contract_addr, self.coordinator_addr.to_string());

        let raffle_addr = self.raffle_addr.clone();
        let requested = self
            .execute_coordinator(&raffle_addr, from_json(msg).unwrap())
            .map_err(|e| e.to_string());

        chance_raffle::contract::reply(
            self.raffle.as_mut(),
            env,
            reply_for(sub.id, requested),
        )
    }

    /// Operator fulfilment, including the nested consumer callback and its
    /// payout. Returns the coordinator's reply to the callback.
    fn fulfill(
        &mut self,
        msg: CoordinatorExecuteMsg,
    ) -> Result<Response, chance_vrf_coordinator::ContractError> {
        let operator = self.operator.clone();
        let res = self.execute_coordinator(&operator, msg)?;

        let (sub, contract_addr, msg) = single_wasm_execute(&res);
        assert_eq!(sub.id, FULFILL_REPLY_ID);
        assert_eq!(sub.gas_limit, Some(CALLBACK_GAS));
        assert_eq!(contract_addr, self.raffle_addr.to_string());

        let coordinator_addr = self.coordinator_addr.clone();
        let callback = self.deliver_to_raffle(&coordinator_addr, from_json(msg).unwrap());

        let env = self.coordinator_env();
        chance_vrf_coordinator::contract::reply(
            self.coordinator.as_mut(),
            env,
            reply_for(sub.id, callback),
        )
    }

    fn fulfill_with(
        &mut self,
        request_id: u64,
        word: u64,
    ) -> Result<Response, chance_vrf_coordinator::ContractError> {
        self.fulfill(CoordinatorExecuteMsg::FulfillRandomWordsWithOverride {
            request_id,
            random_words: vec![Uint256::from(word)],
        })
    }

    /// Execute on the raffle and settle its bank submessages, reverting the
    /// raffle's storage if any step fails.
    fn deliver_to_raffle(
        &mut self,
        sender: &Addr,
        msg: RaffleExecuteMsg,
    ) -> Result<Response, String> {
        let saved = snapshot(&self.raffle.storage);
        let result = self.deliver_to_raffle_inner(sender, msg);
        if result.is_err() {
            self.raffle.storage = saved;
        }
        result
    }

    fn deliver_to_raffle_inner(
        &mut self,
        sender: &Addr,
        msg: RaffleExecuteMsg,
    ) -> Result<Response, String> {
        let env = self.raffle_env();
        let mut res = chance_raffle::contract::execute(
            self.raffle.as_mut(),
            env.clone(),
            message_info(sender, &[]),
            msg,
        )
        .map_err(|e| e.to_string())?;

        for sub in res.messages.clone() {
            let outcome = match &sub.msg {
                CosmosMsg::Bank(BankMsg::Send { to_address, amount }) => {
                    self.bank_send(to_address, amount)
                }
                other => panic!("unexpected raffle message {:?}", other),
            };
            let replied = chance_raffle::contract::reply(
                self.raffle.as_mut(),
                env.clone(),
                reply_for(sub.id, outcome.map(|_| Response::new())),
            )
            .map_err(|e| e.to_string())?;
            res = res.add_events(replied.events);
        }
        Ok(res)
    }

    // ── Queries ──

    fn query_raffle<T: DeserializeOwned>(&self, msg: RaffleQueryMsg) -> T {
        let env = self.raffle_env();
        from_json(chance_raffle::contract::query(self.raffle.as_ref(), env, msg).unwrap()).unwrap()
    }

    fn query_coordinator<T: DeserializeOwned>(&self, msg: CoordinatorQueryMsg) -> T {
        let env = self.coordinator_env();
        from_json(
            chance_vrf_coordinator::contract::query(self.coordinator.as_ref(), env, msg).unwrap(),
        )
        .unwrap()
    }

    fn round(&self) -> RoundResponse {
        self.query_raffle(RaffleQueryMsg::Round {})
    }

    fn coordinator_request(&self, request_id: u64) -> Option<RandomWordsRequest> {
        self.query_coordinator(CoordinatorQueryMsg::Request { request_id })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_single_participant_wins_whole_pool() {
    let mut chain = Chain::new(true);
    let alice = chain.enter("alice");
    chain.advance_past_interval();

    let res = chain.perform_upkeep().unwrap();
    let data: PerformUpkeepResponse = from_json(res.data.unwrap()).unwrap();
    assert_eq!(data.request_id, 1);
    assert_eq!(chain.round().state, RaffleState::Calculating);
    assert!(chain.coordinator_request(1).is_some());

    let res = chain.fulfill_with(1, 7).unwrap();
    assert!(has_event(&res, "chance_random_words_fulfilled", "success", "true"));

    // 7 mod 1 = 0
    let round = chain.round();
    assert_eq!(round.state, RaffleState::Open);
    assert_eq!(round.round_id, 2);
    assert_eq!(round.participant_count, 0);
    assert_eq!(round.pool, Uint128::zero());
    assert_eq!(round.last_draw_timestamp, chain.block_time);

    let winner: Option<Addr> = chain.query_raffle(RaffleQueryMsg::RecentWinner {});
    assert_eq!(winner, Some(alice.clone()));
    assert_eq!(chain.balance(&alice), FEE);
    let raffle_addr = chain.raffle_addr.clone();
    assert_eq!(chain.balance(&raffle_addr), 0);

    let participants: ParticipantsResponse = chain.query_raffle(RaffleQueryMsg::Participants {
        start_after: None,
        limit: None,
    });
    assert_eq!(participants.round_id, 2);
    assert!(participants.participants.is_empty());

    let latest: Timestamp = chain.query_raffle(RaffleQueryMsg::LatestTimestamp {});
    assert_eq!(latest, chain.block_time);
    assert!(chain.coordinator_request(1).is_none());
}

#[test]
fn test_four_participants_index_by_modulo() {
    let mut chain = Chain::new(true);
    let players: Vec<Addr> = ["alice", "bob", "carol", "dave"]
        .iter()
        .map(|name| chain.enter(name))
        .collect();
    chain.advance_past_interval();

    chain.perform_upkeep().unwrap();
    chain.fulfill_with(1, 42).unwrap();

    // 42 mod 4 = 2
    let record: Option<DrawRecord> = chain.query_raffle(RaffleQueryMsg::Draw { round_id: 1 });
    let record = record.unwrap();
    assert_eq!(record.winner_index, 2);
    assert_eq!(record.winner, players[2]);
    assert_eq!(record.participant_count, 4);
    assert_eq!(record.payout_amount, Uint128::new(4 * FEE));
    assert_eq!(record.random_word, Uint256::from(42u64));

    assert_eq!(chain.balance(&players[2]), 4 * FEE);
    for (i, player) in players.iter().enumerate() {
        if i != 2 {
            assert_eq!(chain.balance(player), 0);
        }
    }
}

#[test]
fn test_no_participants_means_no_draw() {
    let mut chain = Chain::new(true);
    chain.advance_past_interval();

    let check: CheckUpkeepResponse = chain.query_raffle(RaffleQueryMsg::CheckUpkeep {});
    assert!(!check.upkeep_needed);

    let err = chain.perform_upkeep().unwrap_err();
    assert!(matches!(
        err,
        chance_raffle::ContractError::UpkeepNotNeeded {
            participant_count: 0,
            ..
        }
    ));
    assert_eq!(chain.round().state, RaffleState::Open);
    assert!(chain.coordinator_request(1).is_none());
}

#[test]
fn test_payout_failure_keeps_round_calculating() {
    let mut chain = Chain::new(true);
    chain.enter("alice");
    chain.enter("bob");
    chain.advance_past_interval();
    chain.perform_upkeep().unwrap();

    // Funds gone before the callback lands
    let raffle_addr = chain.raffle_addr.clone();
    chain.set_balance(&raffle_addr, 0);

    let res = chain.fulfill_with(1, 5).unwrap();
    // The callback itself succeeded; the failure is recorded by the raffle
    assert!(has_event(&res, "chance_random_words_fulfilled", "success", "true"));

    let round = chain.round();
    assert_eq!(round.state, RaffleState::Calculating);
    assert_eq!(round.round_id, 1);
    assert_eq!(round.participant_count, 2);
    assert_eq!(round.pool, Uint128::new(2 * FEE));
    assert_eq!(round.outstanding_request_id, None);

    let outstanding: Option<RandomnessRequest> =
        chain.query_raffle(RaffleQueryMsg::OutstandingRequest {});
    assert!(outstanding.is_none());

    let failure: Option<PayoutFailure> = chain.query_raffle(RaffleQueryMsg::PayoutFailure {});
    let failure = failure.unwrap();
    assert_eq!(failure.request_id, 1);
    assert_eq!(failure.amount, Uint128::new(2 * FEE));
    assert_eq!(failure.winner, chain.raffle.api.addr_make("bob"));

    // The request was consumed and the round cannot be redrawn
    let err = chain.fulfill_with(1, 5).unwrap_err();
    assert!(matches!(
        err,
        chance_vrf_coordinator::ContractError::RequestNotFound { request_id: 1 }
    ));
    let err = chain.perform_upkeep().unwrap_err();
    assert!(matches!(
        err,
        chance_raffle::ContractError::UpkeepNotNeeded { .. }
    ));
}

#[test]
fn test_rejected_bank_send_is_recorded() {
    let mut chain = Chain::new(true);
    let alice = chain.enter("alice");
    chain.advance_past_interval();
    chain.perform_upkeep().unwrap();

    chain.fail_bank_sends = true;
    chain.fulfill_with(1, 0).unwrap();

    let round = chain.round();
    assert_eq!(round.state, RaffleState::Calculating);
    assert_eq!(round.pool, Uint128::new(FEE));
    assert_eq!(chain.balance(&alice), 0);

    let failure: Option<PayoutFailure> = chain.query_raffle(RaffleQueryMsg::PayoutFailure {});
    assert_eq!(failure.unwrap().reason, "bank send disabled");
    let winner: Option<Addr> = chain.query_raffle(RaffleQueryMsg::RecentWinner {});
    assert!(winner.is_none());
}

#[test]
fn test_full_draw_with_drand_beacon() {
    let mut chain = Chain::new(false);
    let players: Vec<Addr> = ["alice", "bob", "carol"]
        .iter()
        .map(|name| chain.enter(name))
        .collect();
    // Round TEST_ROUND - 1 is the latest published, so the draw binds to TEST_ROUND
    chain.block_time = Timestamp::from_seconds(GENESIS + 3 * (TEST_ROUND - 2));
    chain.perform_upkeep().unwrap();
    let request = chain.coordinator_request(1).unwrap();
    assert_eq!(request.bound_round, TEST_ROUND);

    let operator = chain.operator.clone();
    chain
        .execute_coordinator(
            &operator,
            CoordinatorExecuteMsg::SubmitBeacon {
                round: TEST_ROUND,
                signature_hex: TEST_SIG_HEX.to_string(),
            },
        )
        .unwrap();

    let fulfil = CoordinatorExecuteMsg::FulfillRandomWords {
        request_id: 1,
        drand_round: TEST_ROUND,
    };

    // Confirmations pending
    let err = chain.fulfill(fulfil.clone()).unwrap_err();
    assert!(matches!(
        err,
        chance_vrf_coordinator::ContractError::TooEarly { request_id: 1, .. }
    ));
    assert_eq!(chain.round().state, RaffleState::Calculating);

    chain.advance(3, u64::from(CONFIRMATIONS));
    // A different round cannot be chosen
    let err = chain
        .fulfill(CoordinatorExecuteMsg::FulfillRandomWords {
            request_id: 1,
            drand_round: TEST_ROUND + 1,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        chance_vrf_coordinator::ContractError::WrongBeaconRound { .. }
    ));

    chain.fulfill(fulfil).unwrap();

    let randomness = hex::decode(TEST_RANDOMNESS_HEX).unwrap();
    let word = derive_random_words(&randomness, 1, 1)[0];

    let record: Option<DrawRecord> = chain.query_raffle(RaffleQueryMsg::Draw { round_id: 1 });
    let record = record.unwrap();
    assert_eq!(record.random_word, word);
    assert_eq!(
        Uint256::from(record.winner_index),
        word % Uint256::from(3u32)
    );
    assert_eq!(record.winner, players[record.winner_index as usize]);
    assert_eq!(chain.balance(&record.winner), 3 * FEE);
    assert_eq!(chain.round().state, RaffleState::Open);
}

#[test]
fn test_coordinator_rejection_reverts_draw_start() {
    let mut chain = Chain::new(true);
    chain.enter("alice");
    chain.advance_past_interval();

    chain.remove_consumer();
    let err = chain.perform_upkeep().unwrap_err();
    assert!(matches!(
        err,
        chance_raffle::ContractError::ProviderUnavailable { .. }
    ));

    // Nothing of the failed transaction survives
    let round = chain.round();
    assert_eq!(round.state, RaffleState::Open);
    assert_eq!(round.draw_epoch, 0);
    assert_eq!(round.outstanding_request_id, None);

    chain.add_consumer();
    let res = chain.perform_upkeep().unwrap();
    let data: PerformUpkeepResponse = from_json(res.data.unwrap()).unwrap();
    assert_eq!(data.request_id, 1);
}

#[test]
fn test_forged_or_unknown_fulfilment_rejected() {
    let mut chain = Chain::new(true);
    chain.enter("alice");
    chain.advance_past_interval();
    chain.perform_upkeep().unwrap();

    let mallory = chain.raffle.api.addr_make("mallory");
    let err = chain
        .deliver_to_raffle(
            &mallory,
            RaffleExecuteMsg::RawFulfillRandomWords {
                request_id: 1,
                random_words: vec![Uint256::zero()],
            },
        )
        .unwrap_err();
    assert!(err.contains("only coordinator can fulfill"), "{}", err);

    let coordinator_addr = chain.coordinator_addr.clone();
    let err = chain
        .deliver_to_raffle(
            &coordinator_addr,
            RaffleExecuteMsg::RawFulfillRandomWords {
                request_id: 99,
                random_words: vec![Uint256::zero()],
            },
        )
        .unwrap_err();
    assert!(err.contains("99"), "{}", err);

    let round = chain.round();
    assert_eq!(round.state, RaffleState::Calculating);
    assert_eq!(round.outstanding_request_id, Some(1));
}

#[test]
fn test_entry_and_second_draw_rejected_while_calculating() {
    let mut chain = Chain::new(true);
    chain.enter("alice");
    chain.advance_past_interval();
    chain.perform_upkeep().unwrap();

    let bob = chain.raffle.api.addr_make("bob");
    let err = chain.try_enter(&bob).unwrap_err();
    assert!(matches!(err, chance_raffle::ContractError::RoundNotOpen));

    let err = chain.perform_upkeep().unwrap_err();
    assert!(matches!(
        err,
        chance_raffle::ContractError::UpkeepNotNeeded { .. }
    ));
    assert!(chain.coordinator_request(2).is_none());
}

#[test]
fn test_consecutive_rounds_build_history() {
    let mut chain = Chain::new(true);

    chain.enter("alice");
    chain.enter("bob");
    chain.advance_past_interval();
    chain.perform_upkeep().unwrap();
    chain.fulfill_with(1, 1).unwrap();

    // Interval restarts from the completed draw
    chain.enter("carol");
    let check: CheckUpkeepResponse = chain.query_raffle(RaffleQueryMsg::CheckUpkeep {});
    assert!(!check.upkeep_needed);

    chain.advance_past_interval();
    let res = chain.perform_upkeep().unwrap();
    let data: PerformUpkeepResponse = from_json(res.data.unwrap()).unwrap();
    assert_eq!(data.request_id, 2);
    chain.fulfill_with(2, 9).unwrap();

    let history: DrawHistoryResponse = chain.query_raffle(RaffleQueryMsg::DrawHistory {
        start_after: None,
        limit: None,
    });
    assert_eq!(history.draws.len(), 2);
    assert_eq!(history.draws[0].winner, chain.raffle.api.addr_make("bob"));
    assert_eq!(history.draws[1].winner, chain.raffle.api.addr_make("carol"));
    assert_eq!(history.draws[1].participant_count, 1);

    let round = chain.round();
    assert_eq!(round.round_id, 3);
    assert_eq!(round.draw_epoch, 2);
}
