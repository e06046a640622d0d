//! Reading ledger and consumption reports.

use sqlx::{QueryBuilder, Sqlite};

use crate::db::Store;
use crate::domain::Report;
use crate::error::StoreError;
use crate::period::Period;

impl Store {
    /// Consumption report for one historical period, ordered by place
    /// name, meter id, zone. `diff`/`energy` are the values stored
    /// when the period was saved, not recomputed.
    pub async fn reports_for(&self, period: Period) -> Result<Vec<Report>, StoreError> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT meter_id, substation, eic, name, model, year, serial, digits, ratio,
                   zone, cur_kwh, pre_kwh,
                   ifnull(diff, 0)       AS diff,
                   ifnull(energy, 0)     AS energy,
                   ifnull(annotation, '') AS annotation
              FROM reports
             WHERE rdate = ?
             ORDER BY name, meter_id, zone
            "#,
        )
        .bind(period.date())
        .fetch_all(self.pool())
        .await?;
        Ok(reports)
    }

    /// The editable report for the pending period. `cur_kwh` defaults
    /// to the previous month's reading and `diff`/`energy` to zero
    /// until a value has been entered and saved.
    pub async fn pending_reports(&self) -> Result<Vec<Report>, StoreError> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT meter_id, substation, eic, name, model, year, serial, digits, ratio,
                   zone,
                   ifnull(cur_kwh, pre_kwh) AS cur_kwh,
                   pre_kwh,
                   ifnull(diff, 0)          AS diff,
                   ifnull(energy, 0)        AS energy,
                   ifnull(annotation, '')   AS annotation
              FROM next_reports
             ORDER BY name, meter_id, zone
            "#,
        )
        .fetch_all(self.pool())
        .await?;
        Ok(reports)
    }

    /// Persists a batch of pending-period rows. Each report is
    /// recomputed via [`Report::calculate`] before it is written, so a
    /// stale `energy` can never reach the store.
    ///
    /// The batch is deliberately not one transaction: a failure mid
    /// batch leaves the earlier rows saved. Callers re-read
    /// `pending_reports` and retry. After the last row the
    /// advance-ready flag is set.
    pub async fn save_reports(&self, reports: &mut [Report]) -> Result<(), StoreError> {
        let pending = self.next_date().await?;
        for report in reports.iter_mut() {
            let meter_id = report.meter.id().ok_or(StoreError::MissingMeter)?;
            report.calculate();
            let annotation = match report.annotation.as_str() {
                "" => None,
                a => Some(a),
            };
            sqlx::query(
                r#"
                INSERT INTO readings (rdate, meter_id, zone, kwh, diff, energy, annotation)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (rdate, meter_id, zone) DO UPDATE
                SET kwh = excluded.kwh,
                    diff = excluded.diff,
                    energy = excluded.energy,
                    annotation = excluded.annotation
                "#,
            )
            .bind(pending.date())
            .bind(meter_id)
            .bind(report.zone)
            .bind(report.cur_kwh)
            .bind(report.diff)
            .bind(report.energy)
            .bind(annotation)
            .execute(self.pool())
            .await?;
        }
        self.mark_advance_ready().await?;
        tracing::debug!(period = %pending, rows = reports.len(), "pending reports saved");
        Ok(())
    }

    /// Total energy over historical reports in `[from, to]` inclusive,
    /// optionally restricted to a set of place names (empty = all).
    /// Months with no rows contribute nothing.
    pub async fn total_energy(
        &self,
        from: Period,
        to: Period,
        places: &[&str],
    ) -> Result<i64, StoreError> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT total(energy) FROM reports WHERE rdate BETWEEN ");
        builder.push_bind(from.date());
        builder.push(" AND ");
        builder.push_bind(to.date());
        if !places.is_empty() {
            builder.push(" AND name IN (");
            let mut names = builder.separated(", ");
            for place in places {
                names.push_bind(*place);
            }
            builder.push(")");
        }

        let total: f64 = builder
            .build_query_scalar()
            .fetch_one(self.pool())
            .await?;
        Ok(total as i64)
    }

    /// Total energy of the pending period: the recomputed sum over the
    /// supplied report set, plus the stored energy of meters that were
    /// deactivated during the period but still have a reading dated at
    /// the pending date, so their last consumption stays in the total.
    pub async fn pending_total(&self, reports: &mut [Report]) -> Result<i64, StoreError> {
        let mut total = 0_i64;
        for report in reports.iter_mut() {
            report.calculate();
            total += report.energy;
        }

        let removed: f64 = sqlx::query_scalar(
            r#"
            SELECT total(energy)
              FROM reports JOIN meters USING (meter_id)
             WHERE rdate = (SELECT value FROM service WHERE skey = 'next_date')
               AND active = 0
            "#,
        )
        .fetch_one(self.pool())
        .await?;
        Ok(total + removed as i64)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::testing::seeded_store;
    use crate::domain::{Meter, Report};
    use crate::period::Period;

    #[tokio::test]
    async fn historical_report_reads_stored_values() {
        let (_dir, store) = seeded_store().await;
        let feb = Period::new(2022, 2).unwrap();
        let reports = store.reports_for(feb).await.unwrap();

        // Barn z1, Dairy z1, Office z1, Office z2
        assert_eq!(reports.len(), 4);

        assert_eq!(reports[0].meter.name, "Barn");
        assert_eq!(reports[0].cur_kwh, 64);
        assert_eq!(reports[0].pre_kwh, 52);
        assert_eq!(reports[0].diff, 12);
        assert_eq!(reports[0].energy, 480);

        assert_eq!(reports[1].meter.name, "Dairy");
        assert_eq!(reports[1].meter.serial, "E12345");
        assert_eq!(reports[1].diff, 26);
        assert_eq!(reports[1].energy, 1040);

        assert_eq!(reports[2].meter.name, "Office");
        assert_eq!(reports[2].zone, 1);
        assert_eq!(reports[3].zone, 2);
        assert_eq!(reports[3].energy, 100);
    }

    #[tokio::test]
    async fn seed_month_has_no_report_rows() {
        let (_dir, store) = seeded_store().await;
        let dec = Period::new(2021, 12).unwrap();
        assert!(store.reports_for(dec).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_reports_default_to_previous_readings() {
        let (_dir, store) = seeded_store().await;
        let reports = store.pending_reports().await.unwrap();

        // active meters only: Barn z1, Office z1+z2
        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert_eq!(report.cur_kwh, report.pre_kwh);
            assert_eq!(report.diff, 0);
            assert_eq!(report.energy, 0);
            assert_eq!(report.annotation, "");
        }
        assert_eq!(reports[0].meter.name, "Barn");
        assert_eq!(reports[0].pre_kwh, 64);
        assert_eq!(reports[1].pre_kwh, 1450);
        assert_eq!(reports[2].pre_kwh, 700);
    }

    #[tokio::test]
    async fn save_recomputes_and_persists_each_row() {
        let (_dir, store) = seeded_store().await;
        let mut reports = store.pending_reports().await.unwrap();
        for report in reports.iter_mut() {
            report.cur_kwh += 10;
            // stale derived values must not survive the save
            report.energy = 9999;
        }
        reports[0].annotation = "storm week".into();
        store.save_reports(&mut reports).await.unwrap();

        let march = store.reports_for(Period::new(2022, 3).unwrap()).await.unwrap();
        let barn = march.iter().find(|r| r.meter.name == "Barn").unwrap();
        assert_eq!(barn.cur_kwh, 74);
        assert_eq!(barn.pre_kwh, 64);
        assert_eq!(barn.diff, 10);
        assert_eq!(barn.energy, 400);
        assert_eq!(barn.annotation, "storm week");

        let office_z2 = march
            .iter()
            .find(|r| r.meter.name == "Office" && r.zone == 2)
            .unwrap();
        assert_eq!(office_z2.cur_kwh, 710);
        assert_eq!(office_z2.energy, 10);
    }

    #[tokio::test]
    async fn saved_values_become_the_baseline_after_advance() {
        let (_dir, store) = seeded_store().await;
        let mut reports = store.pending_reports().await.unwrap();
        for report in reports.iter_mut() {
            report.cur_kwh += 10;
        }
        store.save_reports(&mut reports).await.unwrap();
        store.advance_period().await.unwrap();

        let next = store.pending_reports().await.unwrap();
        assert_eq!(next.len(), 3);
        assert_eq!(next[0].pre_kwh, 74);
        assert_eq!(next[0].cur_kwh, 74);
        assert_eq!(next[0].energy, 0);
    }

    #[tokio::test]
    async fn total_energy_sums_the_range() {
        let (_dir, store) = seeded_store().await;
        let from = Period::new(2021, 12).unwrap();
        let to = Period::new(2022, 2).unwrap();

        let all = store.total_energy(from, to, &[]).await.unwrap();
        assert_eq!(all, 4850);

        let dairy = store.total_energy(from, to, &["Dairy"]).await.unwrap();
        assert_eq!(dairy, 3240);

        let two = store
            .total_energy(from, to, &["Dairy", "Office"])
            .await
            .unwrap();
        assert_eq!(two, 3240 + 650);

        let none = store
            .total_energy(from, to, &["No Such Place"])
            .await
            .unwrap();
        assert_eq!(none, 0);
    }

    #[tokio::test]
    async fn pending_total_includes_deactivated_meters() {
        let (_dir, store) = seeded_store().await;

        // the Dairy meter was deactivated during the pending period
        // but its last reading is already stored at the pending date
        assert_eq!(store.pending_total(&mut []).await.unwrap(), 4000);

        let mut report = Report {
            meter: Meter::new("Workshop", "0000", 4, 1),
            zone: 1,
            cur_kwh: 1100,
            pre_kwh: 100,
            diff: 0,
            energy: 0,
            annotation: String::new(),
        };
        let total = store
            .pending_total(std::slice::from_mut(&mut report))
            .await
            .unwrap();
        assert_eq!(total, 5000);
    }
}
