//! Candidate methods for a root entity, and assigning one to a call.

use crate::error::ResolveError;
use crate::runtime::value::{ComponentRef, EntityRef, ObjectRef};
use crate::scene::ObjectGraph;
use crate::types::registry::{MethodCatalog, MethodDesc, TypeDesc};
use super::descriptor::MethodDescriptor;
use super::{CallKind, CallVariant};

/// One method a call on `root` could be assigned.
#[derive(Debug, Clone)]
pub struct Candidate<'c> {
    pub root:           EntityRef,
    /// Component the method runs on; `None` targets the root itself.
    pub component:      Option<ComponentRef>,
    /// Type that declares the method, possibly a base of the object's type.
    pub declaring_type: &'c TypeDesc,
    pub method:         &'c MethodDesc,
    /// `Light/SetIntensity (intensity: float)`, named after the object's type.
    pub menu_path:      String,
}

pub type MethodFilter<'f> = &'f dyn Fn(&TypeDesc, &MethodDesc) -> bool;

/// Default filter per call kind: actions take anything, predicates need a
/// bool return.
pub fn supported_for(kind: CallKind) -> impl Fn(&TypeDesc, &MethodDesc) -> bool {
    move |_, m| kind == CallKind::Action || m.returns_bool()
}

/// Methods callable on `root` and its components.
///
/// The root's own type comes first, then its components by type name. Within
/// an object, methods are sorted by name with inherited ones included; a
/// derived method hides a base method of the same name and parameter
/// types, whatever the parameters are called.
pub fn candidates<'c, C, G>(
    catalog: &'c C,
    graph:   &G,
    root:    EntityRef,
    filter:  MethodFilter<'_>,
) -> Vec<Candidate<'c>>
where
    C: MethodCatalog + ?Sized,
    G: ObjectGraph + ?Sized,
{
    if !graph.is_alive(root) {
        return Vec::new();
    }

    let mut objects: Vec<(Option<ComponentRef>, &str)> = Vec::new();
    if let Some(ty) = graph.type_of(&ObjectRef::Entity(root)) {
        objects.push((None, ty));
    }
    let mut components: Vec<(Option<ComponentRef>, &str)> = graph.components_of(root)
        .into_iter()
        .filter_map(|c| graph.type_of(&ObjectRef::Component(c)).map(|ty| (Some(c), ty)))
        .collect();
    components.sort_by(|a, b| a.1.cmp(b.1));
    objects.extend(components);

    let mut out = Vec::new();
    for (component, object_type) in objects {
        let chain = catalog.type_chain(object_type);
        let Some(own) = chain.first() else {
            tracing::debug!(target: "latecall", object_type, "no catalog entry; skipped in candidates");
            continue;
        };

        let mut found: Vec<(&'c TypeDesc, &'c MethodDesc)> = Vec::new();
        for &desc in &chain {
            for m in &desc.methods {
                let hidden = found.iter().any(|(_, seen)| {
                    seen.name == m.name
                        && seen.params.len() == m.params.len()
                        && seen.params.iter().zip(&m.params).all(|(a, b)| a.ty == b.ty)
                });
                if !hidden && filter(desc, m) {
                    found.push((desc, m));
                }
            }
        }
        found.sort_by(|a, b| a.1.name.cmp(b.1.name));

        out.extend(found.into_iter().map(|(declaring_type, method)| Candidate {
            root,
            component,
            declaring_type,
            method,
            menu_path: format!("{}/{}", own.short_name(), method.nice_signature()),
        }));
    }
    out
}

impl CallVariant {
    /// Assign `candidate` to this call: bind its target and capture its
    /// descriptor. Arguments are left as they are; slots that no longer fit
    /// read as defaults. A candidate whose component is gone leaves the call
    /// unchanged.
    pub fn select<G>(&mut self, candidate: &Candidate<'_>, graph: &G) -> Result<(), ResolveError>
    where
        G: ObjectGraph + ?Sized,
    {
        let mut binding = self.binding.clone();
        if binding.root() != Some(candidate.root) {
            binding.bind_root(graph, Some(candidate.root));
        }
        binding.set_sub_component(graph, candidate.component)?;
        self.binding = binding;
        self.descriptor = MethodDescriptor::capture(candidate.declaring_type, candidate.method);
        tracing::debug!(target: "latecall", call = %self.descriptor.label(), "method selected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use crate::scene::stock::{Light, Timer, Transform};
    use crate::runtime::value::Value;
    use crate::types::identity::ValueType;
    use crate::types::registry::{ParamDesc, TypeRegistry};

    fn scene() -> (Scene, EntityRef) {
        let mut scene = Scene::new();
        let e = scene.spawn("lamp");
        scene.attach(e, Transform::default());
        scene.attach(e, Light::default());
        (scene, e)
    }

    #[test]
    fn root_first_then_components_by_type_name() {
        let reg = TypeRegistry::standard();
        let (scene, e) = scene();
        let all = candidates(&reg, &scene, e, &supported_for(CallKind::Action));
        let owners: Vec<&str> = all.iter()
            .map(|c| c.menu_path.split('/').next().unwrap_or_default())
            .collect();
        let first_light = owners.iter().position(|o| *o == "Light").unwrap();
        let first_transform = owners.iter().position(|o| *o == "Transform").unwrap();
        assert_eq!(owners[0], "Entity");
        assert!(first_light < first_transform);
        assert_eq!(all[0].menu_path, "Entity/IsActive ()");
    }

    #[test]
    fn inherited_methods_are_listed_under_the_object_type() {
        let reg = TypeRegistry::standard();
        let (scene, e) = scene();
        let all = candidates(&reg, &scene, e, &supported_for(CallKind::Action));
        let enabled = all.iter()
            .find(|c| c.menu_path == "Light/SetEnabled (value: bool)")
            .unwrap();
        assert_eq!(enabled.declaring_type.name, "scene::Component");
        assert!(enabled.component.is_some());
    }

    #[test]
    fn predicate_filter_keeps_bool_returns_only() {
        let reg = TypeRegistry::standard();
        let mut scene = Scene::new();
        let e = scene.spawn("clock");
        scene.attach(e, Timer::default());
        let preds = candidates(&reg, &scene, e, &supported_for(CallKind::Predicate));
        assert!(!preds.is_empty());
        assert!(preds.iter().all(|c| c.method.returns_bool()));
        assert!(preds.iter().any(|c| c.menu_path == "Timer/IsReady ()"));
    }

    #[test]
    fn dead_root_has_no_candidates() {
        let reg = TypeRegistry::standard();
        let (mut scene, e) = scene();
        scene.despawn(e);
        assert!(candidates(&reg, &scene, e, &supported_for(CallKind::Action)).is_empty());
    }

    fn noop(_: &mut dyn std::any::Any, _: &[Value]) -> Result<Option<Value>, crate::error::ExecError> {
        Ok(None)
    }

    #[test]
    fn override_with_renamed_parameter_hides_base() {
        struct Door;
        impl crate::scene::Component for Door { const TYPE_NAME: &'static str = "test::Door"; }

        let mut reg = TypeRegistry::standard();
        reg.register(TypeDesc {
            name:    "test::Door",
            base:    Some("scene::Component"),
            methods: vec![MethodDesc {
                name:   "SetEnabled",
                params: vec![ParamDesc { name: "open", ty: ValueType::Bool }],
                ret:    None,
                call:   noop,
            }],
        });
        let mut scene = Scene::new();
        let e = scene.spawn("door");
        scene.attach(e, Door);

        let all = candidates(&reg, &scene, e, &supported_for(CallKind::Action));
        let set_enabled: Vec<&Candidate<'_>> = all.iter()
            .filter(|c| c.component.is_some() && c.method.name == "SetEnabled")
            .collect();
        assert_eq!(set_enabled.len(), 1);
        assert_eq!(set_enabled[0].declaring_type.name, "test::Door");
        assert_eq!(set_enabled[0].menu_path, "Door/SetEnabled (open: bool)");
    }

    #[test]
    fn rejected_candidate_leaves_call_untouched() {
        let reg = TypeRegistry::standard();
        let (mut scene, a) = scene();
        let b = scene.spawn("other");
        scene.attach(b, Light::default());

        let on_a = candidates(&reg, &scene, a, &supported_for(CallKind::Action));
        let first = on_a.iter().find(|c| c.menu_path == "Transform/Translate (delta: vec3)").unwrap();
        let mut call = CallVariant::action();
        call.select(first, &scene).unwrap();
        let before = call.clone();

        let on_b = candidates(&reg, &scene, b, &supported_for(CallKind::Action));
        let stale = on_b.iter().find(|c| c.menu_path == "Light/SetIntensity (intensity: float)").unwrap().clone();
        scene.detach(stale.component.unwrap());

        let err = call.select(&stale, &scene).unwrap_err();
        assert!(matches!(err, ResolveError::TargetMissing(_)));
        assert_eq!(call, before);
        assert_eq!(call.binding.root(), Some(a));
    }

    #[test]
    fn select_binds_component_and_captures_declaring_type() {
        let reg = TypeRegistry::standard();
        let (scene, e) = scene();
        let all = candidates(&reg, &scene, e, &supported_for(CallKind::Action));
        let pick = all.iter().find(|c| c.menu_path == "Light/SetEnabled (value: bool)").unwrap();

        let mut call = CallVariant::action();
        call.arguments.set("value", 3_i64);
        call.select(pick, &scene).unwrap();

        assert_eq!(call.binding.root(), Some(e));
        assert_eq!(call.binding.sub_component(), pick.component);
        assert_eq!(call.descriptor.owner_type, "scene::Component");
        assert_eq!(call.descriptor.parameter_types, ["bool"]);
        assert_eq!(call.arguments.slot("value"), Some(&Value::Int(3)));
    }
}
