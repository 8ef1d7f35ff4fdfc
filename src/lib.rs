pub mod adapter;
mod config;
pub mod css;
pub mod error;
mod files;
pub mod host;
pub mod options;
pub mod registry;
#[cfg(feature = "server")]
pub mod server;
mod service;

pub use adapter::{COMMAND_ID, CommandAdapter, Outcome, ProviderAdapter, evaluate};
pub use error::{Location, TransformError};
pub use service::Formatter;

pub mod conf {
    pub use super::config::{CONFIG_FILE, Config, Formatting, Server};
}
