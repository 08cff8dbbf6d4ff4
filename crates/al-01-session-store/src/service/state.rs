use std::fmt;

/// Lifecycle of the store provider.
///
/// ```text
/// Created ──serve()──→ Running ──stop()──→ Stopping ──loop exits──→ Stopped
///    └──────────────────────stop()────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderState {
    Created,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderState::Created => "created",
            ProviderState::Running => "running",
            ProviderState::Stopping => "stopping",
            ProviderState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
