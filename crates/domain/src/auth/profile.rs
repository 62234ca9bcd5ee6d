//! Operator profile returned by `user/me/`

use serde::{Deserialize, Serialize};

/// Profile of the authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user id
    pub id: u64,
    /// Email address
    pub email: String,
    /// Login name
    pub username: String,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Phone number, if recorded
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Linked RADIUSdesk account
    #[serde(default)]
    pub radiusdesk_username: Option<String>,
    /// SIM identity
    #[serde(default)]
    pub imsi: Option<String>,
    /// Data product id
    #[serde(default)]
    pub product_id_data: Option<String>,
    /// Cents product id
    #[serde(default)]
    pub product_id_cents: Option<String>,
    /// Account enabled
    #[serde(default)]
    pub is_active: bool,
    /// Staff flag
    #[serde(default)]
    pub is_staff: bool,
    /// Superuser flag
    #[serde(default)]
    pub is_superuser: bool,
}

impl UserProfile {
    /// "First Last", falling back to the username when both are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
