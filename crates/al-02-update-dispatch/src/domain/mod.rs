pub mod convert;
pub mod errors;
pub mod reference;
pub mod registry;

pub use errors::DispatchError;
pub use reference::{ActionInfo, BnpcInfo, BnpcTables, ReferenceData, StatusInfo};
pub use registry::{Registry, RegistryBuilder, UpdateFactory};
