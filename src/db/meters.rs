//! Meter registry: lifecycle of metering points and meters.

use crate::db::Store;
use crate::domain::Meter;
use crate::error::StoreError;

impl Store {
    /// Active meters with their place fields, ordered by place name
    /// then meter id.
    pub async fn active_meters(&self) -> Result<Vec<Meter>, StoreError> {
        let meters = sqlx::query_as::<_, Meter>(
            r#"
            SELECT meter_id, substation, eic, name, model, year, serial, digits, ratio
              FROM meters JOIN places USING (place_id)
             WHERE active
             ORDER BY name, meter_id
            "#,
        )
        .fetch_all(self.pool())
        .await?;
        Ok(meters)
    }

    /// Registers a meter together with its initial readings, one per
    /// tariff zone (zone = slice position + 1), dated one month before
    /// the pending period.
    ///
    /// Place insert, meter insert and seed readings are one
    /// transaction; on any failure the transaction is dropped and
    /// rolled back, leaving no partial meter behind. On success the
    /// generated id is stored into `meter`.
    pub async fn add_meter(&self, meter: &mut Meter, initial_kwh: &[i64]) -> Result<(), StoreError> {
        if initial_kwh.is_empty() {
            return Err(StoreError::Validation(
                "at least one initial reading is required".into(),
            ));
        }

        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "INSERT INTO places (substation, eic, name) VALUES (?, ?, ?) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(meter.substation)
        .bind(&meter.eic)
        .bind(&meter.name)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO meters (place_id, active, model, year, serial, digits, ratio)
            VALUES ((SELECT place_id FROM places WHERE name = ?), 1, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&meter.name)
        .bind(&meter.model)
        .bind(meter.year)
        .bind(&meter.serial)
        .bind(meter.digits)
        .bind(meter.ratio)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        for (i, kwh) in initial_kwh.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO readings (rdate, meter_id, zone, kwh)
                VALUES (date((SELECT value FROM service WHERE skey = 'next_date'), '-1 month'), ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind((i + 1) as i64)
            .bind(*kwh)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        meter.set_id(id);
        tracing::debug!(meter_id = id, serial = %meter.serial, zones = initial_kwh.len(), "meter registered");
        Ok(())
    }

    /// Deactivates a meter. Historical readings stay queryable.
    ///
    /// Fails with `MissingMeter` when the handle carries no id; on
    /// success the id is cleared, so a second removal on the same
    /// handle fails without touching the store.
    pub async fn remove_meter(&self, meter: &mut Meter) -> Result<(), StoreError> {
        let id = meter.id().ok_or(StoreError::MissingMeter)?;
        sqlx::query("UPDATE meters SET active = 0 WHERE meter_id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        meter.clear_id();
        tracing::debug!(meter_id = id, "meter deactivated");
        Ok(())
    }

    /// Field-level meter updates are intentionally unfinished; the
    /// operation fails loudly rather than silently doing nothing.
    pub async fn update_meter(&self, _meter: &Meter) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented("meter update"))
    }
}
