//! Authentication domain types

mod credentials;
mod profile;
mod wire;

pub use credentials::{Credentials, token_preview};
pub use profile::UserProfile;
pub use wire::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
