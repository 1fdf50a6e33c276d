//! Type descriptor registry: the live method surface calls resolve against.
//!
//! Consumed by:
//!   • The resolver: owner/parameter type lookup and exact signature matching
//!   • The invoker:  the `call` pointer of the resolved method
//!   • Selection:    candidate enumeration for a root entity
//!
//! Adding a target type = registering one TypeDesc here.
//! Nothing in the resolver or invoker knows concrete types.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use crate::error::ExecError;
use crate::runtime::value::{ObjectRef, Value};
use crate::types::identity::{ValueType, short_name};

// ─── Function pointer aliases ─────────────────────────────────────────────────

/// Run a method on its receiver with arguments already in declaration order.
/// Returns `None` for methods without a return value.
pub type MethodFn = fn(&mut dyn Any, &[Value]) -> Result<Option<Value>, ExecError>;

// ─── Descriptors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDesc {
    pub name: &'static str,
    pub ty:   ValueType,
}

pub struct MethodDesc {
    pub name:   &'static str,
    /// Parameters in declaration order.
    pub params: Vec<ParamDesc>,
    /// Return type, `None` for void.
    pub ret:    Option<ValueType>,
    pub call:   MethodFn,
}

impl MethodDesc {
    pub fn param_identities(&self) -> Vec<String> {
        self.params.iter().map(|p| p.ty.identity()).collect()
    }

    /// Exact, ordered parameter type match. No widening.
    pub fn accepts(&self, types: &[ValueType]) -> bool {
        self.params.len() == types.len()
            && self.params.iter().zip(types).all(|(p, t)| &p.ty == t)
    }

    pub fn returns_bool(&self) -> bool {
        self.ret == Some(ValueType::Bool)
    }

    /// `name (a: float, b: Entity)`, as shown in display names and menu paths.
    pub fn nice_signature(&self) -> String {
        let params: Vec<String> = self.params.iter()
            .map(|p| format!("{}: {}", p.name, p.ty.label()))
            .collect();
        format!("{} ({})", self.name, params.join(", "))
    }
}

impl std::fmt::Debug for MethodDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDesc")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct TypeDesc {
    /// Qualified name, also the owner identity in descriptors.
    pub name:    &'static str,
    /// Type whose methods this one inherits.
    pub base:    Option<&'static str>,
    pub methods: Vec<MethodDesc>,
}

impl TypeDesc {
    /// The declared method named `name` whose parameters are exactly `params`.
    pub fn method(&self, name: &str, params: &[ValueType]) -> Option<&MethodDesc> {
        self.methods.iter().find(|m| m.name == name && m.accepts(params))
    }

    pub fn short_name(&self) -> &'static str {
        short_name(self.name)
    }
}

#[derive(Debug, Clone)]
pub struct EnumDesc {
    pub name:     &'static str,
    pub variants: Vec<&'static str>,
}

impl EnumDesc {
    pub fn variant(&self, index: u32) -> Option<&'static str> {
        self.variants.get(index as usize).copied()
    }
}

// ─── Catalog interface ────────────────────────────────────────────────────────

/// What resolution needs from the host's reflective facility.
/// `TypeRegistry` is the in-crate implementation; hosts may provide their own.
pub trait MethodCatalog {
    fn lookup_type(&self, name: &str) -> Option<&TypeDesc>;
    fn lookup_enum(&self, name: &str) -> Option<&EnumDesc>;

    /// Reference-only types (assets) that declare no methods.
    fn is_opaque(&self, _name: &str) -> bool { false }

    /// Parse `identity` and check that any enum/reference type it names is known.
    fn resolve_type(&self, identity: &str) -> Option<ValueType> {
        let ty = ValueType::parse(identity)?;
        let known = match &ty {
            ValueType::Enum(name) => self.lookup_enum(name).is_some(),
            ValueType::Ref(name)  => self.lookup_type(name).is_some() || self.is_opaque(name),
            _ => true,
        };
        known.then_some(ty)
    }

    /// `name` followed by its bases, nearest first. Unknown or repeated bases end the chain.
    fn type_chain(&self, name: &str) -> Vec<&TypeDesc> {
        let mut chain: Vec<&TypeDesc> = Vec::new();
        let mut next = self.lookup_type(name);
        while let Some(desc) = next {
            if chain.iter().any(|d| d.name == desc.name) {
                break;
            }
            chain.push(desc);
            next = desc.base.and_then(|b| self.lookup_type(b));
        }
        chain
    }
}

// ─── Registry ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TypeRegistry {
    types:  HashMap<&'static str, TypeDesc>,
    enums:  HashMap<&'static str, EnumDesc>,
    opaque: HashSet<&'static str>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stock scene types installed.
    pub fn standard() -> Self {
        let mut r = Self::new();
        crate::scene::stock::register(&mut r);
        r
    }

    /// Insert or replace a type. Replacing is how live signature changes reach resolution.
    pub fn register(&mut self, desc: TypeDesc) {
        self.types.insert(desc.name, desc);
    }

    pub fn register_enum(&mut self, desc: EnumDesc) {
        self.enums.insert(desc.name, desc);
    }

    pub fn register_opaque(&mut self, name: &'static str) {
        self.opaque.insert(name);
    }

    pub fn unregister(&mut self, name: &str) -> Option<TypeDesc> {
        self.types.remove(name)
    }

    pub fn type_mut(&mut self, name: &str) -> Option<&mut TypeDesc> {
        self.types.get_mut(name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl MethodCatalog for TypeRegistry {
    fn lookup_type(&self, name: &str) -> Option<&TypeDesc> {
        self.types.get(name)
    }

    fn lookup_enum(&self, name: &str) -> Option<&EnumDesc> {
        self.enums.get(name)
    }

    fn is_opaque(&self, name: &str) -> bool {
        self.opaque.contains(name)
    }
}

// ─── Method implementation helpers ────────────────────────────────────────────

/// Downcast a receiver. Fails instead of panicking when the graph hands over
/// an object of another type.
pub fn receiver<'a, T: Any>(recv: &'a mut dyn Any, ty: &str) -> Result<&'a mut T, ExecError> {
    recv.downcast_mut::<T>().ok_or_else(|| ExecError::Receiver(ty.to_string()))
}

fn arg<'a>(args: &'a [Value], i: usize, expected: &str) -> Result<&'a Value, ExecError> {
    args.get(i).ok_or_else(|| ExecError::Argument { index: i, expected: expected.to_string() })
}

fn mismatch(i: usize, expected: &str) -> ExecError {
    ExecError::Argument { index: i, expected: expected.to_string() }
}

pub fn arg_float(args: &[Value], i: usize) -> Result<f64, ExecError> {
    arg(args, i, "float")?.as_float().ok_or_else(|| mismatch(i, "float"))
}

pub fn arg_int(args: &[Value], i: usize) -> Result<i64, ExecError> {
    arg(args, i, "int")?.as_int().ok_or_else(|| mismatch(i, "int"))
}

pub fn arg_bool(args: &[Value], i: usize) -> Result<bool, ExecError> {
    arg(args, i, "bool")?.as_bool().ok_or_else(|| mismatch(i, "bool"))
}

pub fn arg_text(args: &[Value], i: usize) -> Result<&str, ExecError> {
    arg(args, i, "string")?.as_str().ok_or_else(|| mismatch(i, "string"))
}

pub fn arg_vec3(args: &[Value], i: usize) -> Result<(f64, f64, f64), ExecError> {
    match arg(args, i, "vec3")? {
        Value::Vec3(x, y, z) => Ok((*x, *y, *z)),
        _ => Err(mismatch(i, "vec3")),
    }
}

pub fn arg_color(args: &[Value], i: usize) -> Result<[f64; 4], ExecError> {
    match arg(args, i, "color")? {
        Value::Color { r, g, b, a } => Ok([*r, *g, *b, *a]),
        _ => Err(mismatch(i, "color")),
    }
}

pub fn arg_enum(args: &[Value], i: usize) -> Result<u32, ExecError> {
    match arg(args, i, "enum")? {
        Value::Enum { index, .. } => Ok(*index),
        _ => Err(mismatch(i, "enum")),
    }
}

pub fn arg_mask(args: &[Value], i: usize) -> Result<u32, ExecError> {
    match arg(args, i, "mask")? {
        Value::Mask(bits) => Ok(*bits),
        _ => Err(mismatch(i, "mask")),
    }
}

/// The reference target, `None` for a null reference.
pub fn arg_ref(args: &[Value], i: usize) -> Result<Option<&ObjectRef>, ExecError> {
    match arg(args, i, "ref")? {
        Value::Ref(r) => Ok(r.target.as_ref()),
        _ => Err(mismatch(i, "ref")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut dyn Any, _: &[Value]) -> Result<Option<Value>, ExecError> { Ok(None) }

    fn registry() -> TypeRegistry {
        let mut r = TypeRegistry::new();
        r.register(TypeDesc { name: "t::Base", base: None, methods: vec![] });
        r.register(TypeDesc {
            name: "t::Child",
            base: Some("t::Base"),
            methods: vec![MethodDesc {
                name: "Go",
                params: vec![ParamDesc { name: "n", ty: ValueType::Int }],
                ret: None,
                call: noop,
            }],
        });
        r.register(TypeDesc { name: "t::LoopA", base: Some("t::LoopB"), methods: vec![] });
        r.register(TypeDesc { name: "t::LoopB", base: Some("t::LoopA"), methods: vec![] });
        r.register_enum(EnumDesc { name: "t::Mode", variants: vec!["Off", "On"] });
        r.register_opaque("asset::Texture");
        r
    }

    #[test]
    fn resolve_type_checks_named_types() {
        let r = registry();
        assert_eq!(r.resolve_type("enum:t::Mode"), Some(ValueType::Enum("t::Mode".into())));
        assert_eq!(r.resolve_type("enum:t::Gone"), None);
        assert_eq!(r.resolve_type("ref:t::Child"), Some(ValueType::Ref("t::Child".into())));
        assert_eq!(r.resolve_type("ref:asset::Texture"), Some(ValueType::Ref("asset::Texture".into())));
        assert_eq!(r.resolve_type("ref:asset::Mesh"), None);
        assert_eq!(r.resolve_type("float"), Some(ValueType::Float));
    }

    #[test]
    fn type_chain_walks_bases_and_stops_on_cycles() {
        let r = registry();
        let names: Vec<_> = r.type_chain("t::Child").iter().map(|d| d.name).collect();
        assert_eq!(names, ["t::Child", "t::Base"]);
        assert_eq!(r.type_chain("t::LoopA").len(), 2);
        assert!(r.type_chain("t::Nope").is_empty());
    }

    #[test]
    fn method_lookup_is_exact() {
        let r = registry();
        let child = r.lookup_type("t::Child").unwrap();
        assert!(child.method("Go", &[ValueType::Int]).is_some());
        assert!(child.method("Go", &[ValueType::Float]).is_none());
        assert!(child.method("Go", &[ValueType::Int, ValueType::Int]).is_none());
        assert!(child.method("Go", &[]).is_none());
    }

    #[test]
    fn arg_helpers_report_position() {
        let args = [Value::Float(1.0), Value::Text("x".into())];
        assert_eq!(arg_float(&args, 0), Ok(1.0));
        assert_eq!(arg_text(&args, 1), Ok("x"));
        assert_eq!(arg_bool(&args, 1), Err(ExecError::Argument { index: 1, expected: "bool".into() }));
        assert!(arg_int(&args, 5).is_err());
    }
}
