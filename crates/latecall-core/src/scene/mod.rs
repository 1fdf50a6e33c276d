//! Object graph calls execute against.
//!
//! The core only ever talks to `ObjectGraph`; `Scene` is the in-crate
//! implementation used by the stock types, the app and the tests.

pub mod stock;

use std::any::Any;
use std::collections::HashMap;

use crate::error::ExecError;
use crate::runtime::value::{ComponentRef, EntityRef, ObjectRef};

/// Qualified type name of every entity.
pub const ENTITY_TYPE: &str = "scene::Entity";

// ─── Graph interface ──────────────────────────────────────────────────────────

/// Externally owned entities and components. References into it may dangle
/// at any time; every query answers `None`/`false` for a dead reference.
pub trait ObjectGraph {
    fn is_alive(&self, entity: EntityRef) -> bool;

    /// Entity the component is attached to, `None` once detached or destroyed.
    fn owner_of(&self, component: ComponentRef) -> Option<EntityRef>;

    /// Components attached to `entity`, in attachment order.
    fn components_of(&self, entity: EntityRef) -> Vec<ComponentRef>;

    /// Qualified type name of a live object.
    fn type_of(&self, object: &ObjectRef) -> Option<&str>;

    fn object_mut(&mut self, object: &ObjectRef) -> Option<&mut dyn Any>;

    /// First component of `type_name` on `entity`.
    fn find_component(&self, entity: EntityRef, type_name: &str) -> Option<ComponentRef> {
        self.components_of(entity)
            .into_iter()
            .find(|c| self.type_of(&ObjectRef::Component(*c)) == Some(type_name))
    }
}

// ─── Scene ────────────────────────────────────────────────────────────────────

/// Data every entity carries.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityData {
    pub name:   String,
    pub active: bool,
    pub layer:  u32,
}

/// Marker for types that can be attached to an entity.
pub trait Component: Any {
    const TYPE_NAME: &'static str;
}

/// What a component receiver is: the shared enabled flag plus the concrete data.
pub struct ComponentCell {
    pub enabled: bool,
    pub data:    Box<dyn Any>,
}

struct ComponentSlot {
    owner:     EntityRef,
    type_name: &'static str,
    cell:      ComponentCell,
}

struct EntitySlot {
    generation: u32,
    data:       Option<EntityData>,
    components: Vec<ComponentRef>,
}

#[derive(Default)]
pub struct Scene {
    entities:       Vec<EntitySlot>,
    free:           Vec<u32>,
    components:     HashMap<ComponentRef, ComponentSlot>,
    next_component: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, name: impl Into<String>) -> EntityRef {
        let data = EntityData { name: name.into(), active: true, layer: 0 };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.entities[index as usize];
            slot.data = Some(data);
            return EntityRef { index, generation: slot.generation };
        }
        let index = self.entities.len() as u32;
        self.entities.push(EntitySlot { generation: 0, data: Some(data), components: Vec::new() });
        EntityRef { index, generation: 0 }
    }

    /// Destroy an entity and its components. Outstanding refs go stale.
    pub fn despawn(&mut self, entity: EntityRef) -> bool {
        let Some(slot) = self.live_slot_mut(entity) else { return false };
        slot.data = None;
        slot.generation = slot.generation.wrapping_add(1);
        let owned = std::mem::take(&mut slot.components);
        for c in owned {
            self.components.remove(&c);
        }
        self.free.push(entity.index);
        true
    }

    pub fn attach<C: Component>(&mut self, entity: EntityRef, component: C) -> Option<ComponentRef> {
        let id = ComponentRef { id: self.next_component };
        let slot = self.live_slot_mut(entity)?;
        slot.components.push(id);
        self.next_component += 1;
        self.components.insert(id, ComponentSlot {
            owner:     entity,
            type_name: C::TYPE_NAME,
            cell:      ComponentCell { enabled: true, data: Box::new(component) },
        });
        Some(id)
    }

    pub fn detach(&mut self, component: ComponentRef) -> bool {
        let Some(slot) = self.components.remove(&component) else { return false };
        if let Some(owner) = self.live_slot_mut(slot.owner) {
            owner.components.retain(|c| *c != component);
        }
        true
    }

    pub fn entity(&self, entity: EntityRef) -> Option<&EntityData> {
        self.live_slot(entity)?.data.as_ref()
    }

    pub fn entity_mut(&mut self, entity: EntityRef) -> Option<&mut EntityData> {
        self.live_slot_mut(entity)?.data.as_mut()
    }

    pub fn component<C: Component>(&self, component: ComponentRef) -> Option<&C> {
        self.components.get(&component)?.cell.data.downcast_ref::<C>()
    }

    pub fn component_mut<C: Component>(&mut self, component: ComponentRef) -> Option<&mut C> {
        self.components.get_mut(&component)?.cell.data.downcast_mut::<C>()
    }

    pub fn is_enabled(&self, component: ComponentRef) -> Option<bool> {
        self.components.get(&component).map(|s| s.cell.enabled)
    }

    /// Entity by name, first match in index order.
    pub fn find(&self, name: &str) -> Option<EntityRef> {
        self.entities.iter().enumerate().find_map(|(i, slot)| {
            let data = slot.data.as_ref()?;
            (data.name == name).then_some(EntityRef { index: i as u32, generation: slot.generation })
        })
    }

    fn live_slot(&self, entity: EntityRef) -> Option<&EntitySlot> {
        self.entities.get(entity.index as usize)
            .filter(|s| s.generation == entity.generation && s.data.is_some())
    }

    fn live_slot_mut(&mut self, entity: EntityRef) -> Option<&mut EntitySlot> {
        self.entities.get_mut(entity.index as usize)
            .filter(|s| s.generation == entity.generation && s.data.is_some())
    }
}

impl ObjectGraph for Scene {
    fn is_alive(&self, entity: EntityRef) -> bool {
        self.live_slot(entity).is_some()
    }

    fn owner_of(&self, component: ComponentRef) -> Option<EntityRef> {
        self.components.get(&component).map(|s| s.owner)
    }

    fn components_of(&self, entity: EntityRef) -> Vec<ComponentRef> {
        self.live_slot(entity).map(|s| s.components.clone()).unwrap_or_default()
    }

    fn type_of(&self, object: &ObjectRef) -> Option<&str> {
        match object {
            ObjectRef::Entity(e)    => self.is_alive(*e).then_some(ENTITY_TYPE),
            ObjectRef::Component(c) => self.components.get(c).map(|s| s.type_name),
            ObjectRef::Asset(_)     => None,
        }
    }

    fn object_mut(&mut self, object: &ObjectRef) -> Option<&mut dyn Any> {
        match object {
            ObjectRef::Entity(e) => {
                let data = self.entity_mut(*e)?;
                Some(data as &mut dyn Any)
            }
            ObjectRef::Component(c) => {
                let slot = self.components.get_mut(c)?;
                Some(&mut slot.cell as &mut dyn Any)
            }
            ObjectRef::Asset(_) => None,
        }
    }
}

/// Downcast a component receiver to its concrete data.
pub fn component_receiver<C: Component>(recv: &mut dyn Any) -> Result<&mut C, ExecError> {
    recv.downcast_mut::<ComponentCell>()
        .and_then(|cell| cell.data.downcast_mut::<C>())
        .ok_or_else(|| ExecError::Receiver(C::TYPE_NAME.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(u32);
    impl Component for Probe { const TYPE_NAME: &'static str = "test::Probe"; }

    #[test]
    fn despawn_invalidates_refs_and_components() {
        let mut scene = Scene::new();
        let e = scene.spawn("a");
        let c = scene.attach(e, Probe(1)).unwrap();
        assert!(scene.despawn(e));
        assert!(!scene.is_alive(e));
        assert_eq!(scene.owner_of(c), None);
        assert!(scene.object_mut(&ObjectRef::Entity(e)).is_none());
    }

    #[test]
    fn reused_slot_does_not_revive_old_ref() {
        let mut scene = Scene::new();
        let old = scene.spawn("old");
        scene.despawn(old);
        let new = scene.spawn("new");
        assert_eq!(new.index, old.index);
        assert_ne!(new.generation, old.generation);
        assert!(scene.entity(old).is_none());
        assert_eq!(scene.entity(new).map(|d| d.name.as_str()), Some("new"));
    }

    #[test]
    fn find_component_by_type() {
        let mut scene = Scene::new();
        let e = scene.spawn("a");
        let c = scene.attach(e, Probe(7)).unwrap();
        assert_eq!(scene.find_component(e, "test::Probe"), Some(c));
        assert_eq!(scene.find_component(e, "test::Other"), None);
        assert_eq!(scene.component::<Probe>(c).map(|p| p.0), Some(7));
    }

    #[test]
    fn detach_removes_from_owner() {
        let mut scene = Scene::new();
        let e = scene.spawn("a");
        let c = scene.attach(e, Probe(1)).unwrap();
        assert!(scene.detach(c));
        assert!(scene.components_of(e).is_empty());
        assert!(!scene.detach(c));
    }

    #[test]
    fn component_receiver_checks_type() {
        let mut scene = Scene::new();
        let e = scene.spawn("a");
        let c = scene.attach(e, Probe(3)).unwrap();
        let recv = scene.object_mut(&ObjectRef::Component(c)).unwrap();
        assert_eq!(component_receiver::<Probe>(recv).map(|p| p.0), Ok(3));
    }
}
