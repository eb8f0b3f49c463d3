pub mod contract;
pub mod eligibility;
pub mod error;
pub mod execute;
pub mod ledger;
pub mod msg;
pub mod payout;
pub mod query;
pub mod state;
pub mod tracker;

pub use crate::error::ContractError;
