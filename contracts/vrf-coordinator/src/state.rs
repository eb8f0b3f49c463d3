use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<CoordinatorConfig> = Item::new("config");
pub const BEACONS: Map<u64, StoredBeacon> = Map::new("beacons");
pub const LATEST_ROUND: Item<u64> = Item::new("latest_round");
pub const SUBSCRIPTIONS: Map<u64, Subscription> = Map::new("subscriptions");
pub const NEXT_SUBSCRIPTION_ID: Item<u64> = Item::new("next_subscription_id");
/// Unfulfilled requests. An entry is removed before its callback is sent.
pub const REQUESTS: Map<u64, RandomWordsRequest> = Map::new("requests");
pub const NEXT_REQUEST_ID: Item<u64> = Item::new("next_request_id");
/// Request whose consumer callback is in flight, read back in the reply.
pub const FULFILLING: Item<u64> = Item::new("fulfilling");

#[cw_serde]
pub struct CoordinatorConfig {
    pub admin: Addr,
    pub operators: Vec<Addr>,
    /// Quicknet public key, 96 bytes (G2 point)
    pub quicknet_pubkey: Vec<u8>,
    /// Chain hash identifying the drand network, 32 bytes hex encoded
    pub chain_hash: String,
    /// Genesis time of the drand network (unix seconds)
    pub genesis_time: u64,
    /// Period between rounds in seconds (3 for quicknet)
    pub period_seconds: u64,
    /// Whether operators may fulfil with caller-supplied words
    pub allow_override: bool,
}

#[cw_serde]
pub struct StoredBeacon {
    pub round: u64,
    /// sha256(signature), 32 bytes
    pub randomness: Vec<u8>,
    /// BLS signature on G1, 48 bytes
    pub signature: Vec<u8>,
    pub submitted_at: Timestamp,
    pub submitted_by: Addr,
}

#[cw_serde]
pub struct Subscription {
    pub id: u64,
    pub owner: Addr,
    pub consumers: Vec<Addr>,
    pub request_count: u64,
    pub created_at: Timestamp,
}

#[cw_serde]
pub struct RandomWordsRequest {
    pub request_id: u64,
    pub subscription_id: u64,
    pub consumer: Addr,
    pub key_hash: String,
    pub request_confirmations: u16,
    pub callback_gas_limit: u64,
    pub num_words: u32,
    pub requested_at: Timestamp,
    pub requested_height: u64,
    /// The only drand round whose beacon may fulfil this request: the first
    /// round published after the request. Earlier rounds are already public.
    pub bound_round: u64,
}
