use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::runtime::value::{ComponentRef, EntityRef, ObjectRef};
use crate::scene::ObjectGraph;

/// The object a call executes on: a root entity, optionally narrowed to one
/// of its components.
///
/// Invariant: a set `sub_component` is attached to `root`. Every mutator
/// re-establishes it eagerly; `resolve_object` re-checks it against the live
/// graph because the graph can change underneath a stored binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBinding {
    #[serde(default)]
    root: Option<EntityRef>,
    #[serde(default)]
    sub_component: Option<ComponentRef>,
    /// Type of `sub_component`, kept so a new root can supply an equivalent one.
    #[serde(default)]
    sub_component_type: Option<String>,
}

impl TargetBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<EntityRef> { self.root }
    pub fn sub_component(&self) -> Option<ComponentRef> { self.sub_component }
    pub fn sub_component_type(&self) -> Option<&str> { self.sub_component_type.as_deref() }

    /// Change the root. A sub-component the new root does not own is replaced
    /// by the new root's component of the same type, or cleared.
    pub fn bind_root<G: ObjectGraph + ?Sized>(&mut self, graph: &G, root: Option<EntityRef>) {
        self.root = root;
        let Some(root) = root else {
            self.clear_sub_component();
            return;
        };
        if self.sub_component.is_some_and(|c| graph.owner_of(c) == Some(root)) {
            return;
        }
        let refetched = self.sub_component_type.as_deref()
            .and_then(|ty| graph.find_component(root, ty));
        match refetched {
            Some(c) => {
                tracing::debug!(target: "latecall", component = c.id, "sub-component re-fetched from new root");
                self.sub_component = Some(c);
            }
            None => {
                if self.sub_component.is_some() {
                    tracing::debug!(target: "latecall", "sub-component cleared; new root has no equivalent");
                }
                self.clear_sub_component();
            }
        }
    }

    /// Narrow to the first component of `type_name` on the root. Stores and
    /// returns `None` when there is no root or no such component.
    pub fn bind_sub_component<G: ObjectGraph + ?Sized>(&mut self, graph: &G, type_name: &str) -> Option<ComponentRef> {
        let found = self.root.and_then(|root| graph.find_component(root, type_name));
        match found {
            Some(c) => {
                self.sub_component = Some(c);
                self.sub_component_type = Some(type_name.to_string());
            }
            None => self.clear_sub_component(),
        }
        found
    }

    /// Narrow to a specific component. One not attached to the current root
    /// is rejected and leaves the binding without a sub-component.
    pub fn set_sub_component<G: ObjectGraph + ?Sized>(
        &mut self,
        graph: &G,
        component: Option<ComponentRef>,
    ) -> Result<(), ResolveError> {
        let Some(c) = component else {
            self.clear_sub_component();
            return Ok(());
        };
        let owned = self.root.is_some() && graph.owner_of(c) == self.root;
        let ty = graph.type_of(&ObjectRef::Component(c)).map(str::to_string);
        match (owned, ty) {
            (true, Some(ty)) => {
                self.sub_component = Some(c);
                self.sub_component_type = Some(ty);
                Ok(())
            }
            _ => {
                self.clear_sub_component();
                Err(ResolveError::TargetMissing(format!(
                    "component #{} is not attached to the root entity", c.id
                )))
            }
        }
    }

    pub fn clear_sub_component(&mut self) {
        self.sub_component = None;
        self.sub_component_type = None;
    }

    /// The object to execute on: the sub-component if set, else the root.
    /// A set but dangling reference is an error, never a fallback to the root.
    pub fn resolve_object<G: ObjectGraph + ?Sized>(&self, graph: &G) -> Result<ObjectRef, ResolveError> {
        match (self.root, self.sub_component) {
            (_, Some(c)) => match graph.owner_of(c) {
                Some(owner) if Some(owner) == self.root && graph.is_alive(owner) => Ok(c.into()),
                Some(_) => Err(ResolveError::TargetMissing(format!(
                    "component #{} is not attached to the root entity", c.id
                ))),
                None => Err(ResolveError::TargetMissing(format!("component #{} was destroyed", c.id))),
            },
            (Some(e), None) if graph.is_alive(e) => Ok(e.into()),
            (Some(e), None) => Err(ResolveError::TargetMissing(format!(
                "entity #{}v{} was destroyed", e.index, e.generation
            ))),
            (None, None) => Err(ResolveError::TargetMissing("no target entity".to_string())),
        }
    }
}
