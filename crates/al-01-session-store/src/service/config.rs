//! # Provider Configuration
//!
//! Buffer sizes and the query timeout, set either through builder methods
//! or an options list applied in order (later options win).

use shared_bus::DEFAULT_EVENT_BUFFER_SIZE;
use std::time::Duration;

/// How long a read query waits for the control loop.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Capacity of the mutation channel.
pub const DEFAULT_UPDATE_BUFFER_SIZE: usize = 10_000;

/// Capacity of the internal query channel.
pub const DEFAULT_REQUEST_BUFFER_SIZE: usize = 10;

/// One construction option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOption {
    QueryTimeout(Duration),
    UpdateBufferSize(usize),
    /// Per-subscriber queue size of both hubs.
    EventBufferSize(usize),
    RequestBufferSize(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub query_timeout: Duration,
    pub update_buffer_size: usize,
    pub event_buffer_size: usize,
    pub request_buffer_size: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            update_buffer_size: DEFAULT_UPDATE_BUFFER_SIZE,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            request_buffer_size: DEFAULT_REQUEST_BUFFER_SIZE,
        }
    }
}

impl ProviderConfig {
    /// Defaults with `options` applied in order.
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ProviderOption>,
    {
        options
            .into_iter()
            .fold(Self::default(), |config, option| config.apply(option))
    }

    #[must_use]
    pub fn apply(self, option: ProviderOption) -> Self {
        match option {
            ProviderOption::QueryTimeout(timeout) => self.with_query_timeout(timeout),
            ProviderOption::UpdateBufferSize(size) => self.with_update_buffer_size(size),
            ProviderOption::EventBufferSize(size) => self.with_event_buffer_size(size),
            ProviderOption::RequestBufferSize(size) => self.with_request_buffer_size(size),
        }
    }

    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_update_buffer_size(mut self, size: usize) -> Self {
        self.update_buffer_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_request_buffer_size(mut self, size: usize) -> Self {
        self.request_buffer_size = size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.query_timeout, Duration::from_secs(5));
        assert_eq!(config.update_buffer_size, 10_000);
        assert_eq!(config.event_buffer_size, 10_000);
        assert_eq!(config.request_buffer_size, 10);
    }

    #[test]
    fn test_options_apply_in_order() {
        let config = ProviderConfig::from_options([
            ProviderOption::QueryTimeout(Duration::from_millis(10)),
            ProviderOption::UpdateBufferSize(5),
            ProviderOption::UpdateBufferSize(6),
            ProviderOption::EventBufferSize(7),
            ProviderOption::RequestBufferSize(8),
        ]);
        assert_eq!(config.query_timeout, Duration::from_millis(10));
        assert_eq!(config.update_buffer_size, 6);
        assert_eq!(config.event_buffer_size, 7);
        assert_eq!(config.request_buffer_size, 8);
    }

    #[test]
    fn test_zero_sizes_are_clamped() {
        let config = ProviderConfig::default()
            .with_update_buffer_size(0)
            .with_request_buffer_size(0);
        assert_eq!(config.update_buffer_size, 1);
        assert_eq!(config.request_buffer_size, 1);
    }
}
