use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{CustomField, Gender, MaritalStatus, Spouse};
use uuid::Uuid;

/// Domain model for one person in a family tree.
///
/// `parent` and `children` are id references kept mutually consistent by the
/// member service; nothing below the service layer touches one side without
/// the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    /// May pack up to three "-"-separated sub-names: lineage name, legal
    /// name, home name. Stored packed; see [`Member::display_name`].
    pub name: String,
    pub gender: Gender,
    pub birthday: Option<NaiveDate>,
    pub marital_status: MaritalStatus,
    pub is_alive: bool,
    pub death_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<String>,
    /// Embedded spouse records; only populated while married.
    pub spouse: Vec<Spouse>,
    /// Which spouse of the parent this member descends from (0-based).
    pub spouse_index: u32,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub view_code: Option<String>,
    pub created_by: String,
    pub custom_fields: Vec<CustomField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Generate a unique member id.
    pub fn generate_id() -> String {
        format!("member::{}", Uuid::new_v4().simple())
    }

    /// Display form of a packed name: lineage name, plus the home name when
    /// a third part is present ("Van-Nguyen Van A-Ti" renders "Van-Ti").
    pub fn display_name(&self) -> String {
        if !self.name.contains('-') {
            return self.name.clone();
        }
        let parts: Vec<&str> = self.name.split('-').collect();
        match parts.get(2) {
            Some(home) if !home.is_empty() => format!("{}-{}", parts[0], home),
            _ => parts[0].to_string(),
        }
    }
}
