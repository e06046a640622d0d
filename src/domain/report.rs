use serde::Serialize;

use crate::domain::Meter;

/// One meter/zone row of a monthly consumption report.
///
/// `diff` and `energy` are derived from the two readings by
/// [`Report::calculate`]; they are stale whenever `cur_kwh` has been
/// edited and must be recomputed before they are trusted or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Report {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meter: Meter,
    /// Tariff zone, 1-based.
    pub zone: i64,
    pub cur_kwh: i64,
    pub pre_kwh: i64,
    pub diff: i64,
    pub energy: i64,
    pub annotation: String,
}

impl Report {
    /// Recomputes `diff` and `energy` from the current readings.
    ///
    /// The difference is taken modulo 10^digits so a digit-wheel that
    /// wrapped past zero still yields the consumed amount: with four
    /// digits, `pre = 9999, cur = 1` gives `diff = 2`.
    pub fn calculate(&mut self) {
        let modulus = 10_i64.pow(self.meter.digits);
        self.diff = (self.cur_kwh - self.pre_kwh).rem_euclid(modulus);
        self.energy = self.diff * self.meter.ratio;
    }
}
