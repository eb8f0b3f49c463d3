//! Outstanding randomness request, kept so a callback can be matched.

use cosmwasm_std::{StdResult, Storage};

use crate::error::ContractError;
use crate::state::{RandomnessRequest, PENDING_REQUEST};

/// Track `request` as the outstanding one.
///
/// Replaces a leftover request from an earlier epoch; refuses a second request
/// for the same epoch.
pub fn record(storage: &mut dyn Storage, request: &RandomnessRequest) -> Result<(), ContractError> {
    if let Some(live) = PENDING_REQUEST.may_load(storage)? {
        if live.epoch == request.epoch {
            return Err(ContractError::DuplicateRequest { epoch: live.epoch });
        }
    }
    PENDING_REQUEST.save(storage, request)?;
    Ok(())
}

/// The outstanding request, if `request_id` names it. Leaves it in place.
pub fn matching(
    storage: &dyn Storage,
    request_id: u64,
) -> Result<RandomnessRequest, ContractError> {
    match PENDING_REQUEST.may_load(storage)? {
        Some(live) if live.request_id == request_id => Ok(live),
        _ => Err(ContractError::UnknownRequest { request_id }),
    }
}

/// Consume the outstanding request if `request_id` names it.
pub fn resolve(
    storage: &mut dyn Storage,
    request_id: u64,
) -> Result<RandomnessRequest, ContractError> {
    let live = matching(storage, request_id)?;
    PENDING_REQUEST.remove(storage);
    Ok(live)
}

pub fn outstanding(storage: &dyn Storage) -> StdResult<Option<RandomnessRequest>> {
    PENDING_REQUEST.may_load(storage)
}
