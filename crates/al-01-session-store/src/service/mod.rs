pub mod config;
mod provider;
mod request;
mod state;

pub use config::{
    ProviderConfig, ProviderOption, DEFAULT_QUERY_TIMEOUT, DEFAULT_REQUEST_BUFFER_SIZE,
    DEFAULT_UPDATE_BUFFER_SIZE,
};
pub use provider::{Provider, UpdateSender};
pub use state::ProviderState;
