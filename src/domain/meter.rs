use serde::Serialize;

/// An energy meter together with the place it is installed at.
///
/// Place fields (`substation`, `eic`, `name`) are carried denormalized:
/// the registry joins them in on read and resolves `name` to a place
/// row on insert. The row id is private: `None` means the meter has
/// never been persisted, or has already been removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Meter {
    #[sqlx(rename = "meter_id")]
    #[serde(skip)]
    id: Option<i64>,
    pub substation: Option<i64>,
    pub eic: Option<String>,
    pub name: String,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub serial: String,
    /// Width of the digit-wheel display; the counter wraps at 10^digits.
    pub digits: u32,
    /// Multiplier converting a raw digit difference into kWh.
    pub ratio: i64,
}

impl Meter {
    pub fn new(
        name: impl Into<String>,
        serial: impl Into<String>,
        digits: u32,
        ratio: i64,
    ) -> Self {
        Self {
            id: None,
            substation: None,
            eic: None,
            name: name.into(),
            model: None,
            year: None,
            serial: serial.into(),
            digits,
            ratio,
        }
    }

    /// The stored row id, if the meter has been persisted.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }
}
