pub mod config;
pub mod delete;
pub mod list;
pub mod pull;
pub mod show;
