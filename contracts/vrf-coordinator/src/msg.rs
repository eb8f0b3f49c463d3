use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Uint256;

use crate::state::{CoordinatorConfig, RandomWordsRequest, StoredBeacon, Subscription};

#[cw_serde]
pub struct InstantiateMsg {
    pub operators: Vec<String>,
    /// Hex-encoded quicknet public key (96 bytes = 192 hex chars)
    pub quicknet_pubkey_hex: String,
    pub chain_hash: String,
    pub genesis_time: u64,
    pub period_seconds: u64,
    pub allow_override: bool,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Submit a drand beacon for verification and storage. Operator only.
    SubmitBeacon {
        round: u64,
        /// Hex-encoded BLS signature (48 bytes = 96 hex chars)
        signature_hex: String,
    },
    /// Update operator list. Admin only.
    UpdateOperators {
        add: Vec<String>,
        remove: Vec<String>,
    },
    /// Open a subscription owned by the sender.
    CreateSubscription {},
    /// Allow `consumer` to request against a subscription. Owner only.
    AddConsumer {
        subscription_id: u64,
        consumer: String,
    },
    /// Owner only.
    RemoveConsumer {
        subscription_id: u64,
        consumer: String,
    },
    /// Request random words. Sender must be a consumer of the subscription.
    /// Same wire shape as `chance_raffle_common::vrf::VrfCoordinatorMsg`.
    RequestRandomWords {
        key_hash: String,
        subscription_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u64,
        num_words: u32,
    },
    /// Fulfil a request from a stored beacon. Operator only.
    FulfillRandomWords { request_id: u64, drand_round: u64 },
    /// Fulfil a request with supplied words. Operator only, and only when
    /// `allow_override` is set.
    FulfillRandomWordsWithOverride {
        request_id: u64,
        random_words: Vec<Uint256>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(CoordinatorConfig)]
    Config {},

    #[returns(Option<StoredBeacon>)]
    Beacon { round: u64 },

    #[returns(u64)]
    LatestRound {},

    #[returns(Option<Subscription>)]
    Subscription { subscription_id: u64 },

    #[returns(Option<RandomWordsRequest>)]
    Request { request_id: u64 },
}
