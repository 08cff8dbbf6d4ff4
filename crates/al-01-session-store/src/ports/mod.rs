pub mod api;
pub mod update;

pub use api::StoreQueries;
pub use update::{BoxedUpdate, Events, Update, UpdateFailure, UpdateResult};
