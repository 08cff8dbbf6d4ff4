pub mod errors;
pub mod lifecycle;
pub mod streams;
pub mod validation;

pub use errors::*;
pub use lifecycle::{AddStream, RemoveStream};
pub use streams::Streams;
pub use validation::validate_entity_update;
