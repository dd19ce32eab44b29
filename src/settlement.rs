//! Pari-mutuel settlement of a room's pending wagers once its battle is decided.
//!
//! Winners get their principal back from their own pool, plus a share of the losing
//! stakes proportional to their own stake. Profit is drawn from the losers' pools
//! oldest wager first.

use crate::errors::{PaymentError, StoreError};
use crate::payments::PaymentRail;
use crate::player::Side;
use crate::wagers::{Wager, WagerStatus, WagerStore};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub winners_paid: usize,
    pub winners_failed: usize,
    pub losers_marked: usize,
    #[serde(with = "crate::wagers::amount_string")]
    pub principal_returned: u128,
    #[serde(with = "crate::wagers::amount_string")]
    pub profit_paid: u128,
}

/// A loser's stake that can still fund profit payouts.
#[derive(Debug)]
struct FundSource {
    pool: String,
    remaining: u128,
}

/// `floor(stake * loser_pool / winner_pool)`, without overflowing on large pools.
pub fn profit_share(stake: u128, loser_pool: u128, winner_pool: u128) -> u128 {
    if winner_pool == 0 {
        return 0;
    }
    match stake.checked_mul(loser_pool) {
        Some(product) => product / winner_pool,
        None => {
            let whole = (stake / winner_pool).saturating_mul(loser_pool);
            let rest = (stake % winner_pool).saturating_mul(loser_pool) / winner_pool;
            whole.saturating_add(rest)
        }
    }
}

pub struct SettlementEngine {
    store: Arc<dyn WagerStore>,
    payments: Arc<dyn PaymentRail>,
}

impl SettlementEngine {
    pub fn new(store: Arc<dyn WagerStore>, payments: Arc<dyn PaymentRail>) -> Self {
        Self { store, payments }
    }

    /// Settle the pending wagers placed on battle `battle_number` of `room_id`,
    /// which `winner` won.
    ///
    /// A payout failure leaves that winner pending and moves on; losers are marked
    /// regardless. Wagers of other battles are never touched, so a failed winner is
    /// not picked up again by the room's next battle. Only a failure to load the
    /// wagers aborts the whole settlement.
    pub async fn settle(
        &self,
        room_id: &str,
        battle_number: u32,
        winner: Side,
    ) -> Result<SettlementReport, StoreError> {
        let wagers = self
            .store
            .find_pending_wagers_for_room(room_id, battle_number)
            .await?;
        let mut report = SettlementReport::default();
        if wagers.is_empty() {
            info!(room_id, battle_number, "No pending wagers to settle");
            return Ok(report);
        }

        let (winners, losers): (Vec<Wager>, Vec<Wager>) =
            wagers.into_iter().partition(|w| w.side == winner);

        let winner_pool: u128 = winners.iter().map(|w| w.amount).sum();
        let loser_pool: u128 = losers.iter().map(|w| w.amount).sum();
        info!(
            room_id,
            battle_number,
            winner = %winner,
            winners = winners.len(),
            losers = losers.len(),
            winner_pool = %winner_pool,
            loser_pool = %loser_pool,
            "Settling wagers"
        );

        let mut fund_sources: VecDeque<FundSource> = losers
            .iter()
            .map(|w| FundSource {
                pool: w.payout_address.clone(),
                remaining: w.amount,
            })
            .collect();

        for wager in &winners {
            let profit = profit_share(wager.amount, loser_pool, winner_pool);
            let payout_ref = match self
                .pay_winner(wager, profit, &mut fund_sources, &mut report)
                .await
            {
                Ok(payout_ref) => payout_ref,
                Err(err) => {
                    error!(wager_id = %wager.id, room_id, error = %err, "Payout failed, wager stays pending");
                    report.winners_failed += 1;
                    continue;
                }
            };

            match self
                .store
                .update_wager_status(wager.id, WagerStatus::Won, Some(payout_ref))
                .await
            {
                Ok(()) => report.winners_paid += 1,
                Err(err) => {
                    error!(wager_id = %wager.id, error = %err, "Paid wager could not be marked won");
                    report.winners_failed += 1;
                }
            }
        }

        for wager in &losers {
            match self
                .store
                .update_wager_status(wager.id, WagerStatus::Lost, None)
                .await
            {
                Ok(()) => report.losers_marked += 1,
                Err(err) => warn!(wager_id = %wager.id, error = %err, "Could not mark wager lost"),
            }
        }

        info!(room_id, battle_number, report = ?report, "Settlement complete");
        Ok(report)
    }

    /// Return the principal, then draw `profit` from the loser queue.
    /// A loser's portion is consumed only once its transfer succeeded.
    async fn pay_winner(
        &self,
        wager: &Wager,
        profit: u128,
        fund_sources: &mut VecDeque<FundSource>,
        report: &mut SettlementReport,
    ) -> Result<String, PaymentError> {
        let recipient = wager.payout_address.as_str();
        let mut payout_ref = self
            .payments
            .disburse(recipient, wager.amount, recipient)
            .await?;
        report.principal_returned += wager.amount;

        let mut outstanding = profit;
        while outstanding > 0 {
            let Some(source) = fund_sources.front_mut() else {
                warn!(wager_id = %wager.id, outstanding = %outstanding, "Loser funds exhausted before profit was paid");
                break;
            };

            let take = outstanding.min(source.remaining);
            payout_ref = self.payments.disburse(&source.pool, take, recipient).await?;

            source.remaining -= take;
            outstanding -= take;
            report.profit_paid += take;
            if source.remaining == 0 {
                fund_sources.pop_front();
            }
        }

        Ok(payout_ref)
    }
}
