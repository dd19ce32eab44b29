use thiserror::Error;

/// Main error type for the battle arena
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Error related to catalog lookups
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    /// Error raised while placing a wager
    #[error("Wager error: {0}")]
    Wager(#[from] WagerError),
    /// Error reported by the payment rail
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
    /// Error reported by the wager store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    /// The room's loop is no longer running
    #[error("Room {0} has stopped")]
    RoomStopped(String),
}

/// Errors related to the static move, ability and species catalogs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The specified species was not found in the catalog
    #[error("Species not found: {0}")]
    SpeciesNotFound(String),
    /// A species references a move that is not in the catalog
    #[error("Move not found: {0}")]
    MoveNotFound(String),
    /// A species references an ability that is not in the catalog
    #[error("Ability not found: {0}")]
    AbilityNotFound(String),
    /// A team was requested with no members
    #[error("Team size must be at least 1")]
    EmptyTeam,
}

/// Errors produced by a move oracle. The selector always recovers from these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
    #[error("Oracle timed out after {0}ms")]
    Timeout(u64),
    #[error("Oracle returned an invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The source pool does not hold enough funds for the disbursement
    #[error("Insufficient funds in pool {pool}: requested {requested}, available {available}")]
    InsufficientFunds {
        pool: String,
        requested: u128,
        available: u128,
    },
    /// The rail refused or failed the transfer
    #[error("Transfer rejected: {0}")]
    Rejected(String),
    /// The deposit reference is unknown to the rail
    #[error("Unknown deposit: {0}")]
    UnknownDeposit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Duplicate settlement reference: {0}")]
    DuplicateTxRef(String),
    #[error("Wager not found: {0}")]
    NotFound(String),
    /// Status only ever leaves `pending` once
    #[error("Wager already settled: {0}")]
    AlreadySettled(String),
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Reasons a wager is refused. Converted into a rejected decision at the arena boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WagerError {
    #[error("Amount must be a positive integer, got '{0}'")]
    InvalidAmount(String),
    #[error("Unknown side: {0}")]
    InvalidSide(String),
    #[error("Unknown room: {0}")]
    UnknownRoom(String),
    #[error("User not found: {0}")]
    UnknownUser(String),
    #[error("Deposit {0} is not confirmed")]
    UnconfirmedDeposit(String),
    #[error("Settlement reference already used: {0}")]
    DuplicateTxRef(String),
    #[error("Payment rail error: {0}")]
    Payment(#[from] PaymentError),
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for WagerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateTxRef(tx_ref) => WagerError::DuplicateTxRef(tx_ref),
            other => WagerError::Store(other),
        }
    }
}

/// Type alias for Results using ArenaError
pub type ArenaResult<T> = Result<T, ArenaError>;

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Type alias for Results using WagerError
pub type WagerResult<T> = Result<T, WagerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_store_error_maps_to_duplicate_wager() {
        let err: WagerError = StoreError::DuplicateTxRef("0xabc".to_string()).into();
        assert_eq!(err, WagerError::DuplicateTxRef("0xabc".to_string()));

        let err: WagerError = StoreError::Backend("down".to_string()).into();
        assert_eq!(err, WagerError::Store(StoreError::Backend("down".to_string())));
    }

    #[test]
    fn test_error_messages() {
        let err = ArenaError::from(CatalogError::SpeciesNotFound("Mew".to_string()));
        assert_eq!(err.to_string(), "Catalog error: Species not found: Mew");
    }
}
