use serde::{Deserialize, Serialize};

use crate::types::registry::{MethodDesc, TypeDesc};

/// Persisted identity of a method. Pure data: it holds no live handle and is
/// re-resolved against the catalog on every invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Qualified name of the declaring type.
    pub owner_type: String,
    pub method_name: String,
    /// Parameter type identities in declaration order. Arity and order are
    /// the only overload signal that survives serialization.
    pub parameter_types: Vec<String>,
    /// Cached label for display. Never used for resolution.
    #[serde(default)]
    pub display_name: String,
}

impl MethodDescriptor {
    /// Descriptor of a call that has not been assigned a method yet.
    pub fn unassigned() -> Self {
        Self::default()
    }

    /// Capture `method` as declared on `owner`.
    pub fn capture(owner: &TypeDesc, method: &MethodDesc) -> Self {
        Self {
            owner_type:      owner.name.to_string(),
            method_name:     method.name.to_string(),
            parameter_types: method.param_identities(),
            display_name:    format!("{}/{}", owner.short_name(), method.nice_signature()),
        }
    }

    pub fn is_assigned(&self) -> bool {
        !self.owner_type.is_empty() && !self.method_name.is_empty()
    }

    /// `scene::Light.SetIntensity(float)`, the form used in error messages.
    pub fn qualified_signature(&self) -> String {
        format!("{}.{}({})", self.owner_type, self.method_name, self.parameter_types.join(", "))
    }

    /// Label for logs: the cached display name, falling back to the signature.
    pub fn label(&self) -> String {
        if !self.is_assigned() {
            "<unassigned>".to_string()
        } else if self.display_name.is_empty() {
            self.qualified_signature()
        } else {
            self.display_name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::registry::{MethodCatalog, TypeRegistry};

    #[test]
    fn capture_derives_identities_in_order() {
        let reg = TypeRegistry::standard();
        let transform = reg.lookup_type("scene::Transform").unwrap();
        let method = transform.methods.iter().find(|m| m.name == "SetParent").unwrap();
        let d = MethodDescriptor::capture(transform, method);
        assert_eq!(d.owner_type, "scene::Transform");
        assert_eq!(d.method_name, "SetParent");
        assert_eq!(d.parameter_types, ["ref:scene::Entity"]);
        assert_eq!(d.display_name, "Transform/SetParent (parent: Entity)");
        assert!(d.is_assigned());
    }

    #[test]
    fn unassigned_is_empty() {
        let d = MethodDescriptor::unassigned();
        assert!(!d.is_assigned());
        assert_eq!(d.label(), "<unassigned>");
    }

    #[test]
    fn qualified_signature_lists_identities() {
        let d = MethodDescriptor {
            owner_type: "a::Foo".into(),
            method_name: "Bar".into(),
            parameter_types: vec!["int".into(), "vec2".into()],
            display_name: String::new(),
        };
        assert_eq!(d.qualified_signature(), "a::Foo.Bar(int, vec2)");
        assert_eq!(d.label(), "a::Foo.Bar(int, vec2)");
    }
}
