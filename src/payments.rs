//! The payment rail: where stakes are deposited and where payouts come from.
//!
//! Every user stake lives in a pool keyed by the user's payout address. Principal
//! is returned from the winner's own pool; profit is drawn from losers' pools.

use crate::errors::PaymentError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Confirmed,
    Pending,
    Failed,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRail: Send + Sync {
    /// Move `amount` out of `source_pool` to `recipient`. Returns the payout reference.
    async fn disburse(
        &self,
        source_pool: &str,
        amount: u128,
        recipient: &str,
    ) -> Result<String, PaymentError>;

    async fn confirm_deposit(&self, tx_ref: &str) -> Result<DepositStatus, PaymentError>;

    async fn pool_balance(&self, pool: &str) -> Result<u128, PaymentError>;
}

/// One successful transfer recorded by the ledger rail.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Disbursement {
    pub payout_ref: String,
    pub source_pool: String,
    pub recipient: String,
    #[serde(with = "crate::wagers::amount_string")]
    pub amount: u128,
}

/// In-process rail with a balance per pool and a journal of every disbursement.
#[derive(Debug, Default)]
pub struct LedgerRail {
    balances: DashMap<String, u128>,
    deposits: DashMap<String, DepositStatus>,
    blocked_recipients: DashMap<String, ()>,
    journal: Mutex<Vec<Disbursement>>,
}

impl LedgerRail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deposit under `tx_ref` and credit its pool.
    pub fn record_deposit(&self, tx_ref: &str, pool: &str, amount: u128) {
        self.deposits
            .insert(tx_ref.to_string(), DepositStatus::Confirmed);
        *self.balances.entry(pool.to_string()).or_insert(0) += amount;
        debug!(tx_ref, pool, amount = %amount, "Deposit recorded");
    }

    /// Mark a deposit that has not landed (or failed) without crediting anything.
    pub fn mark_deposit(&self, tx_ref: &str, status: DepositStatus) {
        self.deposits.insert(tx_ref.to_string(), status);
    }

    /// Refuse every transfer to `recipient` from now on.
    pub fn block_recipient(&self, recipient: &str) {
        self.blocked_recipients.insert(recipient.to_string(), ());
    }

    pub async fn journal(&self) -> Vec<Disbursement> {
        self.journal.lock().await.clone()
    }
}

#[async_trait]
impl PaymentRail for LedgerRail {
    async fn disburse(
        &self,
        source_pool: &str,
        amount: u128,
        recipient: &str,
    ) -> Result<String, PaymentError> {
        if self.blocked_recipients.contains_key(recipient) {
            return Err(PaymentError::Rejected(format!(
                "recipient {} refused the transfer",
                recipient
            )));
        }

        {
            let mut balance = self.balances.entry(source_pool.to_string()).or_insert(0);
            if *balance < amount {
                return Err(PaymentError::InsufficientFunds {
                    pool: source_pool.to_string(),
                    requested: amount,
                    available: *balance,
                });
            }
            *balance -= amount;
        }

        let payout_ref = format!("payout-{}", Uuid::new_v4());
        self.journal.lock().await.push(Disbursement {
            payout_ref: payout_ref.clone(),
            source_pool: source_pool.to_string(),
            recipient: recipient.to_string(),
            amount,
        });

        info!(source_pool, recipient, amount = %amount, payout_ref = %payout_ref, "Disbursed");
        Ok(payout_ref)
    }

    async fn confirm_deposit(&self, tx_ref: &str) -> Result<DepositStatus, PaymentError> {
        self.deposits
            .get(tx_ref)
            .map(|status| *status)
            .ok_or_else(|| PaymentError::UnknownDeposit(tx_ref.to_string()))
    }

    async fn pool_balance(&self, pool: &str) -> Result<u128, PaymentError> {
        Ok(self.balances.get(pool).map_or(0, |balance| *balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_disburse_moves_funds_out_of_the_pool() {
        let rail = LedgerRail::new();
        rail.record_deposit("0x01", "0xloser", 50);

        let payout_ref = rail.disburse("0xloser", 30, "0xwinner").await.unwrap();

        assert_eq!(rail.pool_balance("0xloser").await.unwrap(), 20);
        assert_eq!(rail.pool_balance("0xwinner").await.unwrap(), 0);
        let journal = rail.journal().await;
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].payout_ref, payout_ref);
        assert_eq!(journal[0].amount, 30);
    }

    #[tokio::test]
    async fn test_overdraft_is_refused() {
        let rail = LedgerRail::new();
        rail.record_deposit("0x01", "0xpool", 10);

        let err = rail.disburse("0xpool", 11, "0xwinner").await.unwrap_err();

        assert_eq!(
            err,
            PaymentError::InsufficientFunds {
                pool: "0xpool".to_string(),
                requested: 11,
                available: 10,
            }
        );
        assert_eq!(rail.pool_balance("0xpool").await.unwrap(), 10);
        assert!(rail.journal().await.is_empty());
    }

    #[tokio::test]
    async fn test_deposit_confirmation() {
        let rail = LedgerRail::new();
        rail.record_deposit("0xok", "0xpool", 1);
        rail.mark_deposit("0xslow", DepositStatus::Pending);

        assert_eq!(rail.confirm_deposit("0xok").await, Ok(DepositStatus::Confirmed));
        assert_eq!(rail.confirm_deposit("0xslow").await, Ok(DepositStatus::Pending));
        assert_eq!(
            rail.confirm_deposit("0xnope").await,
            Err(PaymentError::UnknownDeposit("0xnope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_blocked_recipient_is_rejected() {
        let rail = LedgerRail::new();
        rail.record_deposit("0x01", "0xpool", 100);
        rail.block_recipient("0xbad");

        assert!(matches!(
            rail.disburse("0xpool", 1, "0xbad").await,
            Err(PaymentError::Rejected(_))
        ));
        assert_eq!(rail.pool_balance("0xpool").await.unwrap(), 100);
    }
}
