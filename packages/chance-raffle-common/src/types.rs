use cosmwasm_schema::cw_serde;

/// Lifecycle of the single raffle round.
#[cw_serde]
#[derive(Copy)]
pub enum RaffleState {
    /// Accepting entries; a draw may start.
    Open,
    /// A draw has started and the round waits for its randomness callback.
    Calculating,
}

impl RaffleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaffleState::Open => "open",
            RaffleState::Calculating => "calculating",
        }
    }
}

impl std::fmt::Display for RaffleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
