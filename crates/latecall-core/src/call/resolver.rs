//! Descriptor + bound object type → invocable method handle.
//!
//! Matching is strict: the owner must still exist, every stored parameter
//! identity must still resolve, and the owner or a type between it and the
//! object's type must declare a method with that name and exactly those
//! parameter types in that order. The declaration nearest the object wins. There is no cache;
//! callers resolve again on every invocation so live signature changes are
//! seen immediately.

use std::any::Any;

use crate::call::CallKind;
use crate::call::descriptor::MethodDescriptor;
use crate::error::{ExecError, ResolveError};
use crate::runtime::value::Value;
use crate::types::identity::ValueType;
use crate::types::registry::{MethodCatalog, MethodDesc, ParamDesc, TypeDesc};

/// A resolved method, borrowed from the catalog.
#[derive(Debug, Clone, Copy)]
pub struct MethodHandle<'c> {
    owner:  &'c TypeDesc,
    method: &'c MethodDesc,
}

impl<'c> MethodHandle<'c> {
    pub fn owner(&self) -> &'c TypeDesc { self.owner }
    pub fn method(&self) -> &'c MethodDesc { self.method }
    pub fn name(&self) -> &'static str { self.method.name }

    /// Parameters in declaration order.
    pub fn params(&self) -> &'c [ParamDesc] { &self.method.params }

    pub fn ret(&self) -> Option<&'c ValueType> { self.method.ret.as_ref() }

    pub fn is_predicate(&self) -> bool { self.method.returns_bool() }

    pub fn call(&self, recv: &mut dyn Any, args: &[Value]) -> Result<Option<Value>, ExecError> {
        (self.method.call)(recv, args)
    }
}

/// Resolve `descriptor` for an object whose live type is `object_type`.
pub fn resolve<'c, C>(
    catalog:     &'c C,
    descriptor:  &MethodDescriptor,
    object_type: &str,
    kind:        CallKind,
) -> Result<MethodHandle<'c>, ResolveError>
where
    C: MethodCatalog + ?Sized,
{
    if !descriptor.is_assigned() {
        return Err(ResolveError::Unassigned);
    }

    let owner = catalog.lookup_type(&descriptor.owner_type)
        .ok_or_else(|| ResolveError::TypeNotFound(descriptor.owner_type.clone()))?;

    let params = descriptor.parameter_types.iter()
        .map(|id| catalog.resolve_type(id).ok_or_else(|| ResolveError::ParameterTypeNotFound {
            method: descriptor.qualified_signature(),
            ty:     id.clone(),
        }))
        .collect::<Result<Vec<_>, _>>()?;

    // The owner has to be the object's own type or one of its bases.
    let chain = catalog.type_chain(object_type);
    if chain.is_empty() {
        return Err(ResolveError::TypeNotFound(object_type.to_string()));
    }
    let Some(owner_at) = chain.iter().position(|d| d.name == owner.name) else {
        return Err(ResolveError::MethodNotFound(format!(
            "{} on `{object_type}`", descriptor.qualified_signature()
        )));
    };

    // Nearest declaration wins, so an override on the object's type runs
    // instead of the owner's.
    let (owner, method) = chain[..=owner_at].iter()
        .find_map(|&d| d.method(&descriptor.method_name, &params).map(|m| (d, m)))
        .ok_or_else(|| ResolveError::MethodNotFound(descriptor.qualified_signature()))?;

    if kind == CallKind::Predicate && !method.returns_bool() {
        return Err(ResolveError::NotAPredicate {
            method: descriptor.qualified_signature(),
            found:  method.ret.as_ref().map_or_else(|| "nothing".to_string(), ValueType::identity),
        });
    }

    tracing::trace!(target: "latecall", method = %descriptor.qualified_signature(), object_type, "resolved");
    Ok(MethodHandle { owner, method })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::registry::TypeRegistry;

    fn descriptor(owner: &str, name: &str, params: &[&str]) -> MethodDescriptor {
        MethodDescriptor {
            owner_type:      owner.to_string(),
            method_name:     name.to_string(),
            parameter_types: params.iter().map(|s| s.to_string()).collect(),
            display_name:    String::new(),
        }
    }

    #[test]
    fn resolves_declared_method() {
        let reg = TypeRegistry::standard();
        let d = descriptor("scene::Light", "SetIntensity", &["float"]);
        let h = resolve(&reg, &d, "scene::Light", CallKind::Action).unwrap();
        assert_eq!(h.name(), "SetIntensity");
        assert_eq!(h.params()[0].name, "intensity");
        assert_eq!(h.ret(), None);
    }

    #[test]
    fn resolves_inherited_method_on_derived_object() {
        let reg = TypeRegistry::standard();
        let d = descriptor("scene::Component", "SetEnabled", &["bool"]);
        let h = resolve(&reg, &d, "scene::Timer", CallKind::Action).unwrap();
        assert_eq!(h.owner().name, "scene::Component");
    }

    #[test]
    fn override_on_object_type_wins_over_owner() {
        fn noop(_: &mut dyn Any, _: &[Value]) -> Result<Option<Value>, ExecError> { Ok(None) }
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
        let d = descriptor("scene::Component", "SetEnabled", &["bool"]);
        let h = resolve(&reg, &d, "test::Door", CallKind::Action).unwrap();
        assert_eq!(h.owner().name, "test::Door");
        assert_eq!(h.params()[0].name, "open");

        // Types above the owner are never searched.
        let d = descriptor("test::Door", "IsEnabled", &[]);
        assert!(matches!(
            resolve(&reg, &d, "test::Door", CallKind::Action).unwrap_err(),
            ResolveError::MethodNotFound(_)
        ));
    }

    #[test]
    fn resolution_is_deterministic() {
        let reg = TypeRegistry::standard();
        let d = descriptor("scene::Light", "SetMode", &["enum:scene::LightMode"]);
        let a = resolve(&reg, &d, "scene::Light", CallKind::Action).unwrap();
        let b = resolve(&reg, &d, "scene::Light", CallKind::Action).unwrap();
        assert_eq!(a.params(), b.params());
        assert_eq!(a.ret(), b.ret());
        assert!(std::ptr::eq(a.method(), b.method()));
    }

    #[test]
    fn no_widening_between_int_and_float() {
        let reg = TypeRegistry::standard();
        let d = descriptor("scene::Light", "SetIntensity", &["int"]);
        let err = resolve(&reg, &d, "scene::Light", CallKind::Action).unwrap_err();
        assert!(matches!(err, ResolveError::MethodNotFound(_)), "{err:?}");
    }

    #[test]
    fn unknown_owner_is_type_not_found() {
        let reg = TypeRegistry::standard();
        let d = descriptor("scene::Gone", "Anything", &[]);
        assert_eq!(
            resolve(&reg, &d, "scene::Light", CallKind::Action).unwrap_err(),
            ResolveError::TypeNotFound("scene::Gone".into()),
        );
    }

    #[test]
    fn unknown_parameter_type_is_reported_by_identity() {
        let reg = TypeRegistry::standard();
        let d = descriptor("scene::Light", "SetMode", &["enum:scene::RenamedMode"]);
        let err = resolve(&reg, &d, "scene::Light", CallKind::Action).unwrap_err();
        assert!(matches!(err, ResolveError::ParameterTypeNotFound { ref ty, .. } if ty == "enum:scene::RenamedMode"));
    }

    #[test]
    fn owner_outside_object_chain_is_method_not_found() {
        let reg = TypeRegistry::standard();
        let d = descriptor("scene::Light", "SetIntensity", &["float"]);
        let err = resolve(&reg, &d, "scene::Transform", CallKind::Action).unwrap_err();
        assert!(matches!(err, ResolveError::MethodNotFound(_)));
    }

    #[test]
    fn predicate_needs_bool_return() {
        let reg = TypeRegistry::standard();
        let d = descriptor("scene::Timer", "Start", &["float"]);
        let err = resolve(&reg, &d, "scene::Timer", CallKind::Predicate).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::R005);

        let d = descriptor("scene::Timer", "IsReady", &[]);
        assert!(resolve(&reg, &d, "scene::Timer", CallKind::Predicate).unwrap().is_predicate());
    }

    #[test]
    fn unassigned_descriptor() {
        let reg = TypeRegistry::standard();
        let err = resolve(&reg, &MethodDescriptor::unassigned(), "scene::Entity", CallKind::Action).unwrap_err();
        assert_eq!(err, ResolveError::Unassigned);
    }
}
