use bevy::ecs::schedule::{IntoSystemDescriptor, StateData};
use bevy::prelude::*;

/// Shorthands for `SystemSet`s running on a given state.
pub trait StateSystems {
    fn on_update<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet;
    fn on_enter<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet;
    fn on_exit<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet;
}
impl<St: StateData> StateSystems for St {
    fn on_update<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet {
        SystemSet::on_update(self).with_system(system)
    }
    fn on_enter<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet {
        SystemSet::on_enter(self).with_system(system)
    }
    fn on_exit<Params>(self, system: impl IntoSystemDescriptor<Params>) -> SystemSet {
        SystemSet::on_exit(self).with_system(system)
    }
}

/// Despawn every entity marked with `T` along with their children.
pub fn cleanup_marked<T: Component>(mut cmds: Commands, marked: Query<Entity, With<T>>) {
    for entity in marked.iter() {
        cmds.entity(entity).despawn_recursive();
    }
}
