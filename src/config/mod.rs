//! User config (theme, onboarding, session) and cloud endpoint settings

mod cloud;
mod models;
mod storage;

pub use cloud::{CloudSettings, OAuthSettings};
pub use models::*;
pub use storage::ConfigStore;
