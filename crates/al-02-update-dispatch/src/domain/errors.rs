use shared_types::{Direction, PayloadKind};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Two handlers claimed the same message in the same direction.
    #[error("Duplicate {direction} handler for {kind}")]
    DuplicateRegistration {
        direction: Direction,
        kind: PayloadKind,
    },
}
