//! Message handlers, one module per concern.
//!
//! Each module contributes factories to the registry through its
//! `register` function and defines the updates those factories build.

mod chat;
mod combat;
mod crafting;
mod movement;
mod spawn;
mod status;
mod zone;

pub use chat::RecordChat;
pub use combat::{ChangeClass, RecordAction, SetCasting, SetHpMp, SetLockonMarker};
pub use crafting::SetCraftingInfo;
pub use movement::{SetLocation, SetTarget};
pub use spawn::{RemoveEntity, SpawnEntity};
pub use status::{ApplyEffects, ReplaceStatuses};
pub use zone::{ChangeZone, EnmityChange, SetEnmity, SetStats};

use crate::domain::{DispatchError, Registry, RegistryBuilder};

/// Add every built-in handler to `builder`.
pub fn register_all(builder: &mut RegistryBuilder) {
    spawn::register(builder);
    zone::register(builder);
    movement::register(builder);
    combat::register(builder);
    status::register(builder);
    crafting::register(builder);
    chat::register(builder);
}

/// Registry holding every built-in handler.
pub fn default_registry() -> Result<Registry, DispatchError> {
    let mut builder = Registry::builder();
    register_all(&mut builder);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Direction, PayloadKind};

    #[test]
    fn test_default_registry_builds() {
        let registry = default_registry().expect("no duplicate registrations");
        assert!(registry.handles(Direction::Ingress, PayloadKind::PlayerSpawn));
        assert!(registry.handles(Direction::Ingress, PayloadKind::ActorControlSelf));
        assert!(registry.handles(Direction::Egress, PayloadKind::EgressMovement));
        assert!(registry.handles(Direction::Egress, PayloadKind::ChatTo));
        assert!(!registry.handles(Direction::Egress, PayloadKind::PlayerSpawn));
        assert!(!registry.handles(Direction::Ingress, PayloadKind::ClientTrigger));
    }

    #[test]
    fn test_registering_twice_is_rejected() {
        let mut builder = Registry::builder();
        register_all(&mut builder);
        zone::register(&mut builder);
        assert!(matches!(
            builder.build(),
            Err(DispatchError::DuplicateRegistration {
                direction: Direction::Ingress,
                kind: PayloadKind::InitZone,
            })
        ));
    }
}
