//! Wire protocol between a randomness consumer and the VRF coordinator.
//!
//! A consumer sends [`VrfCoordinatorMsg::RequestRandomWords`] and learns the
//! request id from the coordinator's [`RANDOMNESS_REQUESTED_EVENT`]. Later the
//! coordinator calls back exactly once with [`VrfConsumerMsg::RawFulfillRandomWords`].

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Event, Uint256};

/// Event emitted by the coordinator when it accepts a request.
pub const RANDOMNESS_REQUESTED_EVENT: &str = "chance_randomness_requested";
/// Attribute on [`RANDOMNESS_REQUESTED_EVENT`] carrying the new request id.
pub const REQUEST_ID_ATTR: &str = "request_id";

/// Upper bound on words per request.
pub const MAX_NUM_WORDS: u32 = 500;
/// Upper bound on the gas a consumer may ask the callback to receive.
pub const MAX_CALLBACK_GAS_LIMIT: u64 = 2_500_000;

/// Subset of the coordinator's execute interface used by consumers.
#[cw_serde]
pub enum VrfCoordinatorMsg {
    RequestRandomWords {
        /// Gas lane identifying the price tier / key to fulfil with.
        key_hash: String,
        subscription_id: u64,
        /// Blocks the coordinator waits before it may fulfil.
        request_confirmations: u16,
        /// Gas limit applied to the consumer callback.
        callback_gas_limit: u64,
        num_words: u32,
    },
}

/// Callback every consumer must accept from its coordinator.
#[cw_serde]
pub enum VrfConsumerMsg {
    RawFulfillRandomWords {
        request_id: u64,
        random_words: Vec<Uint256>,
    },
}

/// Returned as transaction data by the coordinator's `RequestRandomWords`.
#[cw_serde]
pub struct RequestRandomWordsResponse {
    pub request_id: u64,
}

/// Find the request id in the events of a coordinator response.
///
/// Events emitted by a contract reach the caller prefixed with `wasm-`, so
/// both the bare and the prefixed type are accepted.
pub fn parse_request_id(events: &[Event]) -> Option<u64> {
    events
        .iter()
        .filter(|e| e.ty.strip_prefix("wasm-").unwrap_or(&e.ty) == RANDOMNESS_REQUESTED_EVENT)
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == REQUEST_ID_ATTR)
        .and_then(|a| a.value.parse().ok())
}
