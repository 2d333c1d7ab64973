mod auth;
mod config;
mod notes;
mod window;

pub use auth::*;
pub use config::*;
pub use notes::*;
pub use window::*;

type CommandResult<T> = Result<T, String>;
