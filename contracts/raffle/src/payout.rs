use cosmwasm_std::{coins, Addr, BankMsg, QuerierWrapper, SubMsg, SubMsgResult, Uint128};

use crate::error::ContractError;

pub const PAYOUT_REPLY_ID: u64 = 2;

/// Build the transfer of `amount` to `recipient`.
///
/// The send runs as a reply-always sub-message so the outcome is confirmed in
/// the reply before the ledger is reset. The contract balance is checked
/// up front; the pool is tracked 1:1 with deposits, so a shortfall means the
/// books are wrong and the payout must not be attempted.
pub fn transfer(
    querier: &QuerierWrapper,
    contract: &Addr,
    recipient: &Addr,
    amount: Uint128,
    denom: &str,
) -> Result<SubMsg, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::TransferFailed {
            reason: "nothing to pay out".to_string(),
        });
    }

    let balance = querier.query_balance(contract, denom)?;
    if balance.amount < amount {
        return Err(ContractError::TransferFailed {
            reason: format!(
                "insufficient balance: need {}{}, have {}{}",
                amount, denom, balance.amount, denom
            ),
        });
    }

    let send = BankMsg::Send {
        to_address: recipient.to_string(),
        amount: coins(amount.u128(), denom),
    };
    Ok(SubMsg::reply_always(send, PAYOUT_REPLY_ID))
}

/// Interpret the reply of a transfer built by [`transfer`].
pub fn confirm(result: SubMsgResult) -> Result<(), ContractError> {
    match result {
        SubMsgResult::Ok(_) => Ok(()),
        SubMsgResult::Err(reason) => Err(ContractError::TransferFailed { reason }),
    }
}
