//! Wagers: the stored record, the store and user-directory collaborators, and the
//! placement checks that run before anything is stored.

use crate::errors::{StoreError, WagerError, WagerResult};
use crate::payments::{DepositStatus, PaymentRail};
use crate::player::Side;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Amounts are integer minor units, written as decimal strings so no JSON reader
/// truncates them.
pub mod amount_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WagerStatus {
    Pending,
    Won,
    Lost,
    Refunded,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Wager {
    pub id: Uuid,
    pub user_id: String,
    pub payout_address: String,
    pub room_id: String,
    /// The battle of the room this wager is settled against.
    pub battle_number: u32,
    pub side: Side,
    #[serde(with = "amount_string")]
    pub amount: u128,
    pub tx_ref: String,
    pub status: WagerStatus,
    pub payout_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Wager {
    pub fn new(
        user: &UserRecord,
        room_id: &str,
        battle_number: u32,
        side: Side,
        amount: u128,
        tx_ref: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user.id.clone(),
            payout_address: user.payout_address.clone(),
            room_id: room_id.to_string(),
            battle_number,
            side,
            amount,
            tx_ref: tx_ref.to_string(),
            status: WagerStatus::Pending,
            payout_ref: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub payout_address: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WagerStore: Send + Sync {
    /// Store a new wager. A second wager with the same `tx_ref` is rejected.
    async fn insert_wager(&self, wager: Wager) -> Result<(), StoreError>;
    async fn find_wager(&self, tx_ref: &str) -> Result<Option<Wager>, StoreError>;
    /// Pending wagers placed on one battle of a room, in insertion order.
    async fn find_pending_wagers_for_room(
        &self,
        room_id: &str,
        battle_number: u32,
    ) -> Result<Vec<Wager>, StoreError>;
    async fn update_wager_status(
        &self,
        id: Uuid,
        status: WagerStatus,
        payout_ref: Option<String>,
    ) -> Result<(), StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve_user(&self, user_id: &str) -> Option<UserRecord>;
}

#[derive(Debug, Default)]
pub struct InMemoryWagerStore {
    wagers: RwLock<Vec<Wager>>,
}

impl InMemoryWagerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Wager> {
        self.wagers.read().await.clone()
    }
}

#[async_trait]
impl WagerStore for InMemoryWagerStore {
    async fn insert_wager(&self, wager: Wager) -> Result<(), StoreError> {
        let mut wagers = self.wagers.write().await;
        if wagers.iter().any(|w| w.tx_ref == wager.tx_ref) {
            return Err(StoreError::DuplicateTxRef(wager.tx_ref));
        }
        wagers.push(wager);
        Ok(())
    }

    async fn find_wager(&self, tx_ref: &str) -> Result<Option<Wager>, StoreError> {
        let wagers = self.wagers.read().await;
        Ok(wagers.iter().find(|w| w.tx_ref == tx_ref).cloned())
    }

    async fn find_pending_wagers_for_room(
        &self,
        room_id: &str,
        battle_number: u32,
    ) -> Result<Vec<Wager>, StoreError> {
        let wagers = self.wagers.read().await;
        Ok(wagers
            .iter()
            .filter(|w| {
                w.room_id == room_id
                    && w.battle_number == battle_number
                    && w.status == WagerStatus::Pending
            })
            .cloned()
            .collect())
    }

    async fn update_wager_status(
        &self,
        id: Uuid,
        status: WagerStatus,
        payout_ref: Option<String>,
    ) -> Result<(), StoreError> {
        let mut wagers = self.wagers.write().await;
        let wager = wagers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if wager.status != WagerStatus::Pending {
            return Err(StoreError::AlreadySettled(id.to_string()));
        }
        wager.status = status;
        if payout_ref.is_some() {
            wager.payout_ref = payout_ref;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: DashMap<String, UserRecord>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user: UserRecord) {
        self.users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn resolve_user(&self, user_id: &str) -> Option<UserRecord> {
        self.users.get(user_id).map(|user| user.clone())
    }
}

/// Parse a stake. Only positive integers in minor units are accepted.
pub fn parse_amount(raw: &str) -> WagerResult<u128> {
    match raw.trim().parse::<u128>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(WagerError::InvalidAmount(raw.to_string())),
    }
}

/// A wager that passed every placement check and still needs its battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WagerTicket {
    user: UserRecord,
    room_id: String,
    side: Side,
    amount: u128,
    tx_ref: String,
}

impl WagerTicket {
    pub fn into_wager(self, battle_number: u32) -> Wager {
        Wager::new(
            &self.user,
            &self.room_id,
            battle_number,
            self.side,
            self.amount,
            &self.tx_ref,
        )
    }
}

/// Runs the placement checks and stores accepted wagers as pending.
pub struct WagerService {
    store: Arc<dyn WagerStore>,
    users: Arc<dyn UserDirectory>,
    payments: Arc<dyn PaymentRail>,
}

impl WagerService {
    pub fn new(
        store: Arc<dyn WagerStore>,
        users: Arc<dyn UserDirectory>,
        payments: Arc<dyn PaymentRail>,
    ) -> Self {
        Self {
            store,
            users,
            payments,
        }
    }

    /// Run the placement checks for a room already known to exist. Stores nothing.
    pub async fn check(
        &self,
        user_id: &str,
        room_id: &str,
        side: Side,
        amount: &str,
        tx_ref: &str,
    ) -> WagerResult<WagerTicket> {
        let amount = parse_amount(amount)?;

        let user = self
            .users
            .resolve_user(user_id)
            .await
            .ok_or_else(|| WagerError::UnknownUser(user_id.to_string()))?;

        match self.payments.confirm_deposit(tx_ref).await? {
            DepositStatus::Confirmed => {}
            DepositStatus::Pending | DepositStatus::Failed => {
                return Err(WagerError::UnconfirmedDeposit(tx_ref.to_string()))
            }
        }

        if self.store.find_wager(tx_ref).await?.is_some() {
            warn!(tx_ref, user_id, "Duplicate wager attempt");
            return Err(WagerError::DuplicateTxRef(tx_ref.to_string()));
        }

        Ok(WagerTicket {
            user,
            room_id: room_id.to_string(),
            side,
            amount,
            tx_ref: tx_ref.to_string(),
        })
    }

    /// Store a checked wager as pending on `battle_number`.
    pub async fn record(&self, ticket: WagerTicket, battle_number: u32) -> WagerResult<Uuid> {
        let wager = ticket.into_wager(battle_number);
        let wager_id = wager.id;
        let (room_id, side, amount) = (wager.room_id.clone(), wager.side, wager.amount);

        self.store.insert_wager(wager).await?;

        info!(
            wager_id = %wager_id,
            room_id = %room_id,
            battle_number,
            side = %side,
            amount = %amount,
            "Wager placed"
        );
        Ok(wager_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::{LedgerRail, MockPaymentRail};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn alice() -> UserRecord {
        UserRecord {
            id: "alice".to_string(),
            payout_address: "0xa11ce".to_string(),
        }
    }

    /// Check and record in one go, on battle 1.
    async fn place(
        service: &WagerService,
        user_id: &str,
        side: Side,
        amount: &str,
        tx_ref: &str,
    ) -> WagerResult<Uuid> {
        let ticket = service.check(user_id, "main", side, amount, tx_ref).await?;
        service.record(ticket, 1).await
    }

    fn service_with(
        store: Arc<InMemoryWagerStore>,
        rail: Arc<LedgerRail>,
    ) -> WagerService {
        let users = InMemoryUserDirectory::new();
        users.register(alice());
        WagerService::new(store, Arc::new(users), rail)
    }

    #[rstest]
    #[case("100", Some(100))]
    #[case(" 7 ", Some(7))]
    #[case("0", None)]
    #[case("-5", None)]
    #[case("1.5", None)]
    #[case("ten", None)]
    #[case("", None)]
    fn test_parse_amount(#[case] raw: &str, #[case] expected: Option<u128>) {
        assert_eq!(parse_amount(raw).ok(), expected);
    }

    #[test]
    fn test_amount_serializes_as_decimal_string() {
        let wager = Wager::new(&alice(), "main", 3, Side::A, 340_282_366_920_938_463_463, "0x01");
        let json = serde_json::to_value(&wager).unwrap();

        assert_eq!(json["amount"], "340282366920938463463");
        assert_eq!(json["side"], "sideA");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["battleNumber"], 3);

        let back: Wager = serde_json::from_value(json).unwrap();
        assert_eq!(back, wager);
    }

    #[tokio::test]
    async fn test_place_stores_pending_wager() {
        // Arrange
        let store = Arc::new(InMemoryWagerStore::new());
        let rail = Arc::new(LedgerRail::new());
        rail.record_deposit("0xbet", "0xa11ce", 100);
        let service = service_with(store.clone(), rail);

        // Act
        let wager_id = place(&service, "alice", Side::B, "100", "0xbet").await.unwrap();

        // Assert
        let stored = store.find_wager("0xbet").await.unwrap().unwrap();
        assert_eq!(stored.id, wager_id);
        assert_eq!(stored.status, WagerStatus::Pending);
        assert_eq!(stored.payout_address, "0xa11ce");
        assert_eq!(stored.side, Side::B);
        assert_eq!(stored.battle_number, 1);
    }

    #[tokio::test]
    async fn test_rejections_store_nothing() {
        let store = Arc::new(InMemoryWagerStore::new());
        let rail = Arc::new(LedgerRail::new());
        rail.record_deposit("0xbet", "0xa11ce", 100);
        rail.mark_deposit("0xpending", DepositStatus::Pending);
        let service = service_with(store.clone(), rail);

        assert_eq!(
            place(&service, "alice", Side::A, "1.5", "0xbet").await,
            Err(WagerError::InvalidAmount("1.5".to_string()))
        );
        assert_eq!(
            place(&service, "mallory", Side::A, "10", "0xbet").await,
            Err(WagerError::UnknownUser("mallory".to_string()))
        );
        assert_eq!(
            place(&service, "alice", Side::A, "10", "0xpending").await,
            Err(WagerError::UnconfirmedDeposit("0xpending".to_string()))
        );
        assert!(matches!(
            place(&service, "alice", Side::A, "10", "0xmissing").await,
            Err(WagerError::Payment(_))
        ));
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_tx_ref_is_rejected() {
        let store = Arc::new(InMemoryWagerStore::new());
        let rail = Arc::new(LedgerRail::new());
        rail.record_deposit("0xbet", "0xa11ce", 100);
        let service = service_with(store.clone(), rail);

        place(&service, "alice", Side::A, "100", "0xbet").await.unwrap();
        let second = place(&service, "alice", Side::B, "100", "0xbet").await;

        assert_eq!(second, Err(WagerError::DuplicateTxRef("0xbet".to_string())));
        assert_eq!(store.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_record_rejects_a_tx_ref_taken_after_the_check() {
        // Arrange: two checks for the same deposit pass before either is recorded
        let store = Arc::new(InMemoryWagerStore::new());
        let rail = Arc::new(LedgerRail::new());
        rail.record_deposit("0xbet", "0xa11ce", 100);
        let service = service_with(store.clone(), rail);
        let first = service.check("alice", "main", Side::A, "100", "0xbet").await.unwrap();
        let second = service.check("alice", "main", Side::B, "100", "0xbet").await.unwrap();

        // Act
        service.record(first, 1).await.unwrap();
        let result = service.record(second, 1).await;

        // Assert
        assert_eq!(result, Err(WagerError::DuplicateTxRef("0xbet".to_string())));
        assert_eq!(store.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_pending_lookup_is_scoped_to_one_battle() {
        let store = InMemoryWagerStore::new();
        for (battle_number, tx_ref) in [(1, "0x01"), (2, "0x02"), (1, "0x03")] {
            store
                .insert_wager(Wager::new(&alice(), "main", battle_number, Side::A, 10, tx_ref))
                .await
                .unwrap();
        }
        store
            .insert_wager(Wager::new(&alice(), "side-room", 1, Side::A, 10, "0x04"))
            .await
            .unwrap();

        let first_battle: Vec<String> = store
            .find_pending_wagers_for_room("main", 1)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.tx_ref)
            .collect();

        assert_eq!(first_battle, vec!["0x01", "0x03"]);
        assert_eq!(store.find_pending_wagers_for_room("main", 2).await.unwrap().len(), 1);
        assert!(store.find_pending_wagers_for_room("main", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rail_is_not_consulted_for_unknown_users() {
        let mut rail = MockPaymentRail::new();
        rail.expect_confirm_deposit().never();
        let service = WagerService::new(
            Arc::new(InMemoryWagerStore::new()),
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(rail),
        );

        let result = place(&service, "ghost", Side::A, "5", "0x01").await;
        assert_eq!(result, Err(WagerError::UnknownUser("ghost".to_string())));
    }

    #[tokio::test]
    async fn test_status_leaves_pending_once() {
        let store = InMemoryWagerStore::new();
        let wager = Wager::new(&alice(), "main", 1, Side::A, 10, "0x01");
        let id = wager.id;
        store.insert_wager(wager).await.unwrap();

        store
            .update_wager_status(id, WagerStatus::Won, Some("payout-1".to_string()))
            .await
            .unwrap();
        let again = store.update_wager_status(id, WagerStatus::Lost, None).await;

        assert_eq!(again, Err(StoreError::AlreadySettled(id.to_string())));
        let stored = store.find_wager("0x01").await.unwrap().unwrap();
        assert_eq!(stored.status, WagerStatus::Won);
        assert_eq!(stored.payout_ref.as_deref(), Some("payout-1"));
        assert!(store.find_pending_wagers_for_room("main", 1).await.unwrap().is_empty());
    }
}
