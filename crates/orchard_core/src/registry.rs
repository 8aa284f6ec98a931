//! Entity lifecycle registry.
//!
//! Components live in a `hecs::World`, but callers only ever see
//! [`EntityId`]s and cloned component values: fetch a copy, mutate it, write
//! it back with [`EntityRegistry::update_component`]. Destroying an entity
//! runs each component's [`Component::release`] so physics handles and
//! collision entries disappear in the same call.

use crate::collision::CollisionRegistry;
use crate::events::Subscribers;
use crate::physics::PhysicsSpace;
use crate::world::SimulationWorld;
use orchard_data::{
    AreaPhysicsComponent, CreatureComponent, EntityId, FruitComponent, TreeComponent,
};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Plain data attached to one entity.
pub trait Component: Clone + Send + Sync + 'static {
    const NAME: &'static str;

    fn entity_id(&self) -> EntityId;

    fn set_entity_id(&mut self, id: EntityId);

    /// Frees whatever this component owns outside the registry.
    fn release(&self, _space: &mut PhysicsSpace, _collisions: &mut CollisionRegistry) {}
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid entity id {0}")]
    InvalidEntity(EntityId),

    #[error("Entity {0} does not exist")]
    NoSuchEntity(EntityId),

    #[error("Entity {entity} already has a {component}; use update_component")]
    DuplicateComponent {
        entity: EntityId,
        component: &'static str,
    },

    #[error("Entity {entity} has no {component}; use add_component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    EntityCreated(EntityId),
    ComponentAdded {
        entity: EntityId,
        component: &'static str,
    },
    ComponentRemoved {
        entity: EntityId,
        component: &'static str,
    },
    EntityDestroyed(EntityId),
}

type ReleaseHook =
    fn(&hecs::World, hecs::Entity, &mut PhysicsSpace, &mut CollisionRegistry) -> Option<&'static str>;

fn release_hook<T: Component>(
    ecs: &hecs::World,
    entity: hecs::Entity,
    space: &mut PhysicsSpace,
    collisions: &mut CollisionRegistry,
) -> Option<&'static str> {
    let component = ecs.get::<&T>(entity).ok()?;
    component.release(space, collisions);
    Some(T::NAME)
}

pub struct EntityRegistry {
    ecs: hecs::World,
    handles: HashMap<EntityId, hecs::Entity>,
    next_id: u64,
    destroyed: HashSet<EntityId>,
    release_hooks: Vec<(TypeId, ReleaseHook)>,
    lifecycle: Subscribers<LifecycleEvent>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entities", &self.handles.len())
            .field("next_id", &self.next_id)
            .field("destroyed", &self.destroyed.len())
            .finish()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            ecs: hecs::World::new(),
            handles: HashMap::new(),
            next_id: 1,
            destroyed: HashSet::new(),
            release_hooks: Vec::new(),
            lifecycle: Subscribers::default(),
        }
    }

    /// Registers a handler for lifecycle events. Handlers run synchronously.
    pub fn on_lifecycle<F>(&mut self, handler: F)
    where
        F: FnMut(&LifecycleEvent) + 'static,
    {
        self.lifecycle.subscribe(handler);
    }

    pub fn create_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let entity = self.ecs.spawn((id,));
        self.handles.insert(id, entity);
        self.lifecycle.notify(&LifecycleEvent::EntityCreated(id));
        id
    }

    /// Removes every component of `id`, releasing their physics handles.
    ///
    /// Returns false, without side effects, if `id` is not alive.
    pub fn destroy_entity(&mut self, id: EntityId, world: &mut SimulationWorld) -> bool {
        let Some(entity) = self.handles.remove(&id) else {
            tracing::debug!(entity = %id, "Destroy on an entity that is not alive");
            return false;
        };

        let mut removed = Vec::new();
        for (_, hook) in &self.release_hooks {
            if let Some(name) = hook(&self.ecs, entity, &mut world.space, &mut world.collisions) {
                removed.push(name);
            }
        }
        if self.ecs.despawn(entity).is_err() {
            tracing::error!(entity = %id, "Entity handle was stale on destroy");
        }
        self.destroyed.insert(id);

        for component in removed {
            self.lifecycle
                .notify(&LifecycleEvent::ComponentRemoved { entity: id, component });
        }
        self.lifecycle.notify(&LifecycleEvent::EntityDestroyed(id));
        true
    }

    fn handle(&self, id: EntityId) -> Result<hecs::Entity, RegistryError> {
        if !id.is_valid() {
            return Err(RegistryError::InvalidEntity(id));
        }
        self.handles
            .get(&id)
            .copied()
            .ok_or(RegistryError::NoSuchEntity(id))
    }

    fn register_hook<T: Component>(&mut self) {
        let type_id = TypeId::of::<T>();
        if !self.release_hooks.iter().any(|(t, _)| *t == type_id) {
            self.release_hooks.push((type_id, release_hook::<T>));
        }
    }

    pub fn add_component<T: Component>(
        &mut self,
        id: EntityId,
        mut component: T,
    ) -> Result<(), RegistryError> {
        let entity = self.handle(id)?;
        if self.has_component::<T>(id) {
            return Err(RegistryError::DuplicateComponent {
                entity: id,
                component: T::NAME,
            });
        }
        component.set_entity_id(id);
        self.register_hook::<T>();
        self.ecs
            .insert_one(entity, component)
            .map_err(|_| RegistryError::NoSuchEntity(id))?;
        self.lifecycle.notify(&LifecycleEvent::ComponentAdded {
            entity: id,
            component: T::NAME,
        });
        Ok(())
    }

    /// Writes back a component previously read from the registry.
    pub fn update_component<T: Component>(&mut self, component: T) -> Result<(), RegistryError> {
        let id = component.entity_id();
        let entity = self.handle(id)?;
        let mut slot = self
            .ecs
            .get::<&mut T>(entity)
            .map_err(|_| RegistryError::MissingComponent {
                entity: id,
                component: T::NAME,
            })?;
        *slot = component;
        Ok(())
    }

    pub fn remove_component<T: Component>(
        &mut self,
        id: EntityId,
        world: &mut SimulationWorld,
    ) -> Option<T> {
        let entity = self.handle(id).ok()?;
        let component = self.ecs.remove_one::<T>(entity).ok()?;
        component.release(&mut world.space, &mut world.collisions);
        self.lifecycle.notify(&LifecycleEvent::ComponentRemoved {
            entity: id,
            component: T::NAME,
        });
        Some(component)
    }

    /// A copy of the component, if present.
    pub fn try_get_component<T: Component>(&self, id: EntityId) -> Option<T> {
        let entity = self.handle(id).ok()?;
        self.ecs.get::<&T>(entity).ok().map(|c| (*c).clone())
    }

    /// Like [`Self::try_get_component`], but logs and reports a missing component.
    pub fn get_component<T: Component>(&self, id: EntityId) -> Result<T, RegistryError> {
        self.try_get_component::<T>(id).ok_or_else(|| {
            tracing::warn!(entity = %id, component = T::NAME, "Component lookup failed");
            if self.handles.contains_key(&id) {
                RegistryError::MissingComponent {
                    entity: id,
                    component: T::NAME,
                }
            } else {
                RegistryError::NoSuchEntity(id)
            }
        })
    }

    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.handles
            .get(&id)
            .and_then(|&e| self.ecs.entity(e).ok())
            .is_some_and(|e| e.has::<T>())
    }

    /// Snapshot of every `T`, ordered by entity id.
    pub fn components<T: Component>(&self) -> Vec<T> {
        let mut snapshot: Vec<T> = self
            .ecs
            .query::<&T>()
            .iter()
            .map(|(_, c)| c.clone())
            .collect();
        snapshot.sort_by_key(|c| c.entity_id());
        snapshot
    }

    pub fn count<T: Component>(&self) -> usize {
        self.ecs.query::<&T>().iter().count()
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.handles.contains_key(&id)
    }

    /// True once `destroy_entity` has succeeded for `id`.
    pub fn was_destroyed(&self, id: EntityId) -> bool {
        self.destroyed.contains(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.handles.len()
    }

    /// Number of ids handed out so far.
    pub fn created_count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Component for CreatureComponent {
    const NAME: &'static str = "CreatureComponent";

    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn set_entity_id(&mut self, id: EntityId) {
        self.entity_id = id;
    }
}

impl Component for TreeComponent {
    const NAME: &'static str = "TreeComponent";

    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn set_entity_id(&mut self, id: EntityId) {
        self.entity_id = id;
    }
}

impl Component for FruitComponent {
    const NAME: &'static str = "FruitComponent";

    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn set_entity_id(&mut self, id: EntityId) {
        self.entity_id = id;
    }

    fn release(&self, space: &mut PhysicsSpace, collisions: &mut CollisionRegistry) {
        collisions.unregister_body(self.body);
        space.free(self.body);
    }
}

impl Component for AreaPhysicsComponent {
    const NAME: &'static str = "AreaPhysicsComponent";

    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn set_entity_id(&mut self, id: EntityId) {
        self.entity_id = id;
    }

    fn release(&self, space: &mut PhysicsSpace, collisions: &mut CollisionRegistry) {
        collisions.unregister_body(self.body);
        space.free(self.body);
        if let Some(awareness) = self.awareness {
            space.free(awareness);
        }
    }
}
