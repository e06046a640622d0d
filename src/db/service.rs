//! Period-advance state, persisted in the `service` key/value table.
//!
//! The pending period moves through two states: open (`goto_next_date`
//! unset, readings still being entered) and ready (`save_reports` has
//! confirmed the batch). Rolling `next_date` forward is a separate,
//! explicit step driven by the front end; the engine never advances on
//! its own, and the date only ever moves forward.

use crate::db::Store;
use crate::error::StoreError;
use crate::period::Period;

impl Store {
    /// The pending period: the month whose readings are being entered.
    pub async fn next_date(&self) -> Result<Period, StoreError> {
        let stored: String = sqlx::query_scalar("SELECT value FROM service WHERE skey = 'next_date'")
            .fetch_one(self.pool())
            .await?;
        Period::from_stored(&stored)
    }

    /// Whether the pending period's readings are confirmed complete.
    pub async fn advance_ready(&self) -> Result<bool, StoreError> {
        let flag: String =
            sqlx::query_scalar("SELECT value FROM service WHERE skey = 'goto_next_date'")
                .fetch_one(self.pool())
                .await?;
        Ok(flag == "1")
    }

    pub(crate) async fn mark_advance_ready(&self) -> Result<(), StoreError> {
        sqlx::query("UPDATE service SET value = '1' WHERE skey = 'goto_next_date'")
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Rolls the pending period forward by one month and clears the
    /// ready flag, in one transaction. A no-op while the flag is
    /// unset. Returns the (possibly unchanged) pending period.
    pub async fn advance_period(&self) -> Result<Period, StoreError> {
        let mut tx = self.pool().begin().await?;
        let flag: String =
            sqlx::query_scalar("SELECT value FROM service WHERE skey = 'goto_next_date'")
                .fetch_one(&mut *tx)
                .await?;
        if flag == "1" {
            sqlx::query("UPDATE service SET value = date(value, '+1 month') WHERE skey = 'next_date'")
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE service SET value = '0' WHERE skey = 'goto_next_date'")
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        let period = self.next_date().await?;
        if flag == "1" {
            tracing::info!(period = %period, "billing period advanced");
        }
        Ok(period)
    }
}
