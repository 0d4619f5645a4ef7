use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discrete 1-5 satisfaction scale. Serialized as its integer value so the
/// persisted records stay readable as plain JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RatingLevel {
    VeryUnsatisfied,
    Unsatisfied,
    Neutral,
    Satisfied,
    Excellent,
}

impl RatingLevel {
    pub fn value(self) -> u8 {
        match self {
            RatingLevel::VeryUnsatisfied => 1,
            RatingLevel::Unsatisfied => 2,
            RatingLevel::Neutral => 3,
            RatingLevel::Satisfied => 4,
            RatingLevel::Excellent => 5,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            RatingLevel::VeryUnsatisfied => "😡",
            RatingLevel::Unsatisfied => "🙁",
            RatingLevel::Neutral => "😐",
            RatingLevel::Satisfied => "🙂",
            RatingLevel::Excellent => "🤩",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatingLevel::VeryUnsatisfied => "Péssimo",
            RatingLevel::Unsatisfied => "Ruim",
            RatingLevel::Neutral => "Regular",
            RatingLevel::Satisfied => "Bom",
            RatingLevel::Excellent => "Excelente",
        }
    }
}

impl TryFrom<u8> for RatingLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RatingLevel::VeryUnsatisfied),
            2 => Ok(RatingLevel::Unsatisfied),
            3 => Ok(RatingLevel::Neutral),
            4 => Ok(RatingLevel::Satisfied),
            5 => Ok(RatingLevel::Excellent),
            other => Err(format!("rating level out of range: {other}")),
        }
    }
}

impl From<RatingLevel> for u8 {
    fn from(level: RatingLevel) -> Self {
        level.value()
    }
}

/// One evaluated aspect of the stay. Immutable reference data, not user data.
#[derive(Clone, Debug, Serialize)]
pub struct EvaluationCategory {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Fixed category table. Order defines both presentation order and the
/// wizard's auto-advance order.
pub static CATEGORIES: Lazy<Vec<EvaluationCategory>> = Lazy::new(|| {
    vec![
        EvaluationCategory { id: "apartment", label: "Apartamento / Conforto", icon: "🏨" },
        EvaluationCategory { id: "room_cleaning", label: "Limpeza do Quarto", icon: "✨" },
        EvaluationCategory { id: "wifi", label: "Qualidade do Wi-Fi", icon: "📶" },
        EvaluationCategory { id: "reception", label: "Recepção / Check-in", icon: "🔑" },
        EvaluationCategory { id: "food", label: "Gastronomia / Bebidas", icon: "🍽️" },
        EvaluationCategory { id: "leisure", label: "Lazer / Piscinas", icon: "🏊" },
        EvaluationCategory { id: "staff", label: "Equipe / Atendimento", icon: "🤝" },
    ]
});

pub fn category_exists(id: &str) -> bool {
    CATEGORIES.iter().any(|c| c.id == id)
}

/// The category that auto-advance should scroll to after `id` is rated.
/// None when `id` is the last category (or unknown).
pub fn next_category_after(id: &str) -> Option<&'static str> {
    let idx = CATEGORIES.iter().position(|c| c.id == id)?;
    CATEGORIES.get(idx + 1).map(|c| c.id)
}

/// In-progress wizard record. Everything optional until the guards say
/// otherwise; discarded wholesale on reset.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDraft {
    pub overall: Option<RatingLevel>,
    pub categories: BTreeMap<String, RatingLevel>,
    pub comments: String,
    pub apartment_number: String,
}

impl FeedbackDraft {
    pub fn overall_step_complete(&self) -> bool {
        self.overall.is_some() && !self.apartment_number.trim().is_empty()
    }

    pub fn categories_step_complete(&self) -> bool {
        CATEGORIES.iter().all(|c| self.categories.contains_key(c.id))
    }
}

/// A submitted feedback record. Immutable once written, except the contact
/// fields which transition from absent to present exactly once during sync.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub overall: RatingLevel,
    pub categories: BTreeMap<String, RatingLevel>,
    pub comments: String,
    pub apartment_number: String,
    /// Epoch milliseconds, assigned once at finalize.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_phone: Option<String>,
}

impl FeedbackRecord {
    pub fn is_enriched(&self) -> bool {
        self.guest_name.is_some()
    }
}

/// Staff dashboard account. Clear-text password on a single device is a
/// deliberate simplification carried over from the source system.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminUser {
    pub name: String,
    pub sector: String,
    pub password: String,
}

/// Connection parameters for the external guest directory. Persisted on
/// explicit save, independent of the live connection state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: String,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub ssl: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: "5432".to_string(),
            database: "latorre_guests".to_string(),
            user: "admin".to_string(),
            password: String::new(),
            ssl: true,
        }
    }
}

impl PostgresConfig {
    /// Host, user, password and database are all required before a
    /// handshake is attempted.
    pub fn is_complete(&self) -> bool {
        !self.host.is_empty()
            && !self.user.is_empty()
            && !self.password.is_empty()
            && !self.database.is_empty()
    }
}

/// Live directory connection state. Session-scoped, never persisted; the
/// service always boots disconnected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Inclusive calendar-date range; an absent bound leaves that side open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}
