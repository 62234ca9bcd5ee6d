//! Clock port

use chrono::{DateTime, Utc};

/// Source of the current time, used to compute and check token expiry.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
