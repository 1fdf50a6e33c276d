//! Stable type identities: the string form parameter types take in a
//! persisted descriptor.
//!
//! Scheme:
//!   • value kinds:  `float`, `int`, `string`, `bool`, `vec2`, `vec3`, `vec4`, `color`, `mask`
//!   • enumerations: `enum:<qualified name>`
//!   • references:   `ref:<qualified name>`
//!
//! Owner types are identified by their bare qualified name (`scene::Light`).
//! Parsing is purely syntactic; whether a named enum or reference type still
//! exists is the catalog's call.

use crate::runtime::value::{Reference, Value};

const ENUM_PREFIX: &str = "enum:";
const REF_PREFIX: &str = "ref:";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Float,
    Int,
    Text,
    Bool,
    Enum(String),
    Vec2,
    Vec3,
    Vec4,
    Color,
    Mask,
    Ref(String),
}

impl ValueType {
    pub fn parse(identity: &str) -> Option<Self> {
        let ty = match identity {
            "float"  => Self::Float,
            "int"    => Self::Int,
            "string" => Self::Text,
            "bool"   => Self::Bool,
            "vec2"   => Self::Vec2,
            "vec3"   => Self::Vec3,
            "vec4"   => Self::Vec4,
            "color"  => Self::Color,
            "mask"   => Self::Mask,
            other => {
                if let Some(name) = other.strip_prefix(ENUM_PREFIX) {
                    Self::Enum(non_empty(name)?.to_string())
                } else if let Some(name) = other.strip_prefix(REF_PREFIX) {
                    Self::Ref(non_empty(name)?.to_string())
                } else {
                    return None;
                }
            }
        };
        Some(ty)
    }

    pub fn identity(&self) -> String {
        match self {
            Self::Enum(name) => format!("{ENUM_PREFIX}{name}"),
            Self::Ref(name)  => format!("{REF_PREFIX}{name}"),
            other            => other.kind_name().to_string(),
        }
    }

    /// Short label for display: the kind, or the unqualified name of an enum/ref type.
    pub fn label(&self) -> &str {
        match self {
            Self::Enum(name) | Self::Ref(name) => short_name(name),
            other => other.kind_name(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Float    => "float",
            Self::Int      => "int",
            Self::Text     => "string",
            Self::Bool     => "bool",
            Self::Enum(_)  => "enum",
            Self::Vec2     => "vec2",
            Self::Vec3     => "vec3",
            Self::Vec4     => "vec4",
            Self::Color    => "color",
            Self::Mask     => "mask",
            Self::Ref(_)   => "ref",
        }
    }

    /// Zero value of the type. Used whenever a slot is absent or holds another type.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Float      => Value::Float(0.0),
            Self::Int        => Value::Int(0),
            Self::Text       => Value::Text(String::new()),
            Self::Bool       => Value::Bool(false),
            Self::Enum(name) => Value::Enum { ty: name.clone(), index: 0 },
            Self::Vec2       => Value::Vec2(0.0, 0.0),
            Self::Vec3       => Value::Vec3(0.0, 0.0, 0.0),
            Self::Vec4       => Value::Vec4(0.0, 0.0, 0.0, 0.0),
            Self::Color      => Value::color(0.0, 0.0, 0.0, 0.0),
            Self::Mask       => Value::Mask(0),
            Self::Ref(name)  => Value::Ref(Reference { ty: name.clone(), target: None }),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identity())
    }
}

/// `scene::Light` → `Light`.
pub fn short_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_are_stable() {
        for id in ["float", "int", "string", "bool", "vec2", "vec3", "vec4", "color", "mask",
                   "enum:scene::LightMode", "ref:scene::Entity"] {
            let ty = ValueType::parse(id).unwrap_or_else(|| panic!("`{id}` did not parse"));
            assert_eq!(ty.identity(), id);
        }
    }

    #[test]
    fn rejects_unknown_and_empty_names() {
        assert_eq!(ValueType::parse("double"), None);
        assert_eq!(ValueType::parse("enum:"), None);
        assert_eq!(ValueType::parse("ref:"), None);
        assert_eq!(ValueType::parse("System.Single"), None);
    }

    #[test]
    fn defaults_match_their_type() {
        for ty in [ValueType::Float, ValueType::Color, ValueType::Enum("a::B".into()), ValueType::Ref("a::C".into())] {
            assert!(ty.default_value().is_of(&ty), "{ty} default has wrong type");
        }
    }

    #[test]
    fn labels_drop_the_module() {
        assert_eq!(ValueType::Ref("scene::Transform".into()).label(), "Transform");
        assert_eq!(ValueType::Vec3.label(), "vec3");
        assert_eq!(short_name("Plain"), "Plain");
    }
}
