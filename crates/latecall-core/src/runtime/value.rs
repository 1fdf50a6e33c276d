use serde::{Deserialize, Serialize};

use crate::types::identity::ValueType;

// ─── Object references ────────────────────────────────────────────────────────

/// Generational handle to an entity in an external object graph.
/// A handle whose generation no longer matches its slot refers to a destroyed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub index:      u32,
    pub generation: u32,
}

/// Handle to a component. Ids are never reused by a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentRef {
    pub id: u64,
}

/// Anything a call can execute on or receive as an argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ref", rename_all = "snake_case")]
pub enum ObjectRef {
    Entity(EntityRef),
    Component(ComponentRef),
    /// Asset path; assets are resolved by the host, never by the core.
    Asset(String),
}

impl From<EntityRef> for ObjectRef {
    fn from(e: EntityRef) -> Self { Self::Entity(e) }
}

impl From<ComponentRef> for ObjectRef {
    fn from(c: ComponentRef) -> Self { Self::Component(c) }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entity(e)    => write!(f, "entity #{}v{}", e.index, e.generation),
            Self::Component(c) => write!(f, "component #{}", c.id),
            Self::Asset(path)  => write!(f, "asset `{path}`"),
        }
    }
}

/// A typed, possibly null reference stored in an argument slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Qualified name of the referenced type, e.g. `scene::Entity`.
    pub ty:     String,
    pub target: Option<ObjectRef>,
}

// ─── Value ────────────────────────────────────────────────────────────────────

/// One argument slot. The slot's type is derived from the variant, never
/// declared separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Float(f64),
    Int(i64),
    Text(String),
    Bool(bool),
    /// Selection of an enumeration; `index` is the variant position.
    Enum { ty: String, index: u32 },
    Vec2(f64, f64),
    Vec3(f64, f64, f64),
    Vec4(f64, f64, f64, f64),
    Color { r: f64, g: f64, b: f64, a: f64 },
    /// Raw layer bits, bit `n` = layer `n`.
    Mask(u32),
    Ref(Reference),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Float(_)        => ValueType::Float,
            Value::Int(_)          => ValueType::Int,
            Value::Text(_)         => ValueType::Text,
            Value::Bool(_)         => ValueType::Bool,
            Value::Enum { ty, .. } => ValueType::Enum(ty.clone()),
            Value::Vec2(..)        => ValueType::Vec2,
            Value::Vec3(..)        => ValueType::Vec3,
            Value::Vec4(..)        => ValueType::Vec4,
            Value::Color { .. }    => ValueType::Color,
            Value::Mask(_)         => ValueType::Mask,
            Value::Ref(r)          => ValueType::Ref(r.ty.clone()),
        }
    }

    /// Like comparing `value_type()`, without allocating for named types.
    pub fn is_of(&self, ty: &ValueType) -> bool {
        match (self, ty) {
            (Value::Float(_), ValueType::Float)
            | (Value::Int(_), ValueType::Int)
            | (Value::Text(_), ValueType::Text)
            | (Value::Bool(_), ValueType::Bool)
            | (Value::Vec2(..), ValueType::Vec2)
            | (Value::Vec3(..), ValueType::Vec3)
            | (Value::Vec4(..), ValueType::Vec4)
            | (Value::Color { .. }, ValueType::Color)
            | (Value::Mask(_), ValueType::Mask) => true,
            (Value::Enum { ty: a, .. }, ValueType::Enum(b)) => a == b,
            (Value::Ref(r), ValueType::Ref(b))              => &r.ty == b,
            _ => false,
        }
    }

    pub fn reference(ty: impl Into<String>, target: impl Into<ObjectRef>) -> Self {
        Value::Ref(Reference { ty: ty.into(), target: Some(target.into()) })
    }

    pub fn color(r: f64, g: f64, b: f64, a: f64) -> Self {
        Value::Color { r, g, b, a }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self { Value::Float(x) => Some(*x), _ => None }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self { Value::Int(x) => Some(*x), _ => None }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self { Value::Bool(b) => Some(*b), _ => None }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self { Value::Text(s) => Some(s), _ => None }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self { Value::Float(x) }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self { Value::Int(x) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Text(s) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s.to_string()) }
}

impl From<(f64, f64, f64)> for Value {
    fn from((x, y, z): (f64, f64, f64)) -> Self { Value::Vec3(x, y, z) }
}
