//! Named-field access over a call's structure.
//!
//! The only channel an editing surface needs: it walks `fields()`, reads with
//! `get_field` and writes with `set_field`. Writes to the binding go through
//! `TargetBinding` so its invariants hold no matter who edits.
//!
//! Paths:
//!   root · sub_component · sub_component_type
//!   descriptor.owner_type · descriptor.method_name · descriptor.display_name
//!   descriptor.parameter_types · descriptor.parameter_types[<i>]
//!   arguments.<name>
//!   kind · last_error   (read-only)

use std::str::FromStr;

use crate::error::{FieldError, ResolveError};
use crate::runtime::value::{ComponentRef, EntityRef, Value};
use crate::scene::ObjectGraph;
use crate::types::registry::{MethodCatalog, ParamDesc};
use super::{CallKind, CallVariant, invoker};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Root,
    SubComponent,
    SubComponentType,
    OwnerType,
    MethodName,
    DisplayName,
    ParameterTypes,
    ParameterType(usize),
    Argument(String),
    Kind,
    LastError,
}

impl FieldPath {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Kind | Self::LastError)
    }
}

impl FromStr for FieldPath {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || FieldError::UnknownPath(s.to_string());
        let path = match s {
            "root"                        => Self::Root,
            "sub_component"               => Self::SubComponent,
            "sub_component_type"          => Self::SubComponentType,
            "descriptor.owner_type"       => Self::OwnerType,
            "descriptor.method_name"      => Self::MethodName,
            "descriptor.display_name"     => Self::DisplayName,
            "descriptor.parameter_types"  => Self::ParameterTypes,
            "kind"                        => Self::Kind,
            "last_error"                  => Self::LastError,
            other => {
                if let Some(name) = other.strip_prefix("arguments.") {
                    if name.is_empty() {
                        return Err(unknown());
                    }
                    Self::Argument(name.to_string())
                } else if let Some(rest) = other.strip_prefix("descriptor.parameter_types[") {
                    let index = rest.strip_suffix(']')
                        .and_then(|i| i.parse().ok())
                        .ok_or_else(unknown)?;
                    Self::ParameterType(index)
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(path)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root             => f.write_str("root"),
            Self::SubComponent     => f.write_str("sub_component"),
            Self::SubComponentType => f.write_str("sub_component_type"),
            Self::OwnerType        => f.write_str("descriptor.owner_type"),
            Self::MethodName       => f.write_str("descriptor.method_name"),
            Self::DisplayName      => f.write_str("descriptor.display_name"),
            Self::ParameterTypes   => f.write_str("descriptor.parameter_types"),
            Self::ParameterType(i) => write!(f, "descriptor.parameter_types[{i}]"),
            Self::Argument(name)   => write!(f, "arguments.{name}"),
            Self::Kind             => f.write_str("kind"),
            Self::LastError        => f.write_str("last_error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    TextList(Vec<String>),
    Entity(Option<EntityRef>),
    Component(Option<ComponentRef>),
    Value(Value),
    Kind(CallKind),
}

impl FieldValue {
    fn describe(&self) -> &'static str {
        match self {
            Self::Text(_)      => "text",
            Self::TextList(_)  => "text list",
            Self::Entity(_)    => "entity",
            Self::Component(_) => "component",
            Self::Value(_)     => "value",
            Self::Kind(_)      => "kind",
        }
    }
}

fn mismatch(path: &FieldPath, expected: &'static str) -> FieldError {
    FieldError::TypeMismatch { path: path.to_string(), expected }
}

impl CallVariant {
    /// Every readable path: the fixed structure, one entry per stored
    /// parameter type and one per argument slot.
    pub fn fields(&self) -> Vec<FieldPath> {
        let mut paths = vec![
            FieldPath::Kind,
            FieldPath::Root,
            FieldPath::SubComponent,
            FieldPath::SubComponentType,
            FieldPath::OwnerType,
            FieldPath::MethodName,
            FieldPath::DisplayName,
            FieldPath::ParameterTypes,
        ];
        paths.extend((0..self.descriptor.parameter_types.len()).map(FieldPath::ParameterType));
        paths.extend(self.arguments.iter().map(|(name, _)| FieldPath::Argument(name.to_string())));
        paths.push(FieldPath::LastError);
        paths
    }

    pub fn get_field(&self, path: &str) -> Result<FieldValue, FieldError> {
        self.get_path(&path.parse()?)
    }

    pub fn get_path(&self, path: &FieldPath) -> Result<FieldValue, FieldError> {
        let value = match path {
            FieldPath::Root             => FieldValue::Entity(self.binding.root()),
            FieldPath::SubComponent     => FieldValue::Component(self.binding.sub_component()),
            FieldPath::SubComponentType => {
                FieldValue::Text(self.binding.sub_component_type().unwrap_or_default().to_string())
            }
            FieldPath::OwnerType        => FieldValue::Text(self.descriptor.owner_type.clone()),
            FieldPath::MethodName       => FieldValue::Text(self.descriptor.method_name.clone()),
            FieldPath::DisplayName      => FieldValue::Text(self.descriptor.display_name.clone()),
            FieldPath::ParameterTypes   => FieldValue::TextList(self.descriptor.parameter_types.clone()),
            FieldPath::ParameterType(i) => {
                let list = &self.descriptor.parameter_types;
                let ty = list.get(*i).ok_or_else(|| FieldError::IndexOutOfRange {
                    path: path.to_string(), index: *i, len: list.len(),
                })?;
                FieldValue::Text(ty.clone())
            }
            FieldPath::Argument(name) => {
                let slot = self.arguments.slot(name)
                    .ok_or_else(|| FieldError::UnknownPath(path.to_string()))?;
                FieldValue::Value(slot.clone())
            }
            FieldPath::Kind      => FieldValue::Kind(self.kind()),
            FieldPath::LastError => FieldValue::Text(self.last_error().to_string()),
        };
        Ok(value)
    }

    pub fn set_field<G>(&mut self, graph: &G, path: &str, value: FieldValue) -> Result<(), FieldError>
    where
        G: ObjectGraph + ?Sized,
    {
        self.set_path(graph, &path.parse()?, value)
    }

    pub fn set_path<G>(&mut self, graph: &G, path: &FieldPath, value: FieldValue) -> Result<(), FieldError>
    where
        G: ObjectGraph + ?Sized,
    {
        if path.is_read_only() {
            return Err(FieldError::ReadOnly(path.to_string()));
        }
        match (path, value) {
            (FieldPath::Root, FieldValue::Entity(root)) => {
                self.binding.bind_root(graph, root);
            }
            (FieldPath::SubComponent, FieldValue::Component(c)) => {
                self.binding.set_sub_component(graph, c).map_err(|source| FieldError::Binding {
                    path: path.to_string(), source,
                })?;
            }
            (FieldPath::SubComponentType, FieldValue::Text(ty)) => {
                if ty.is_empty() {
                    self.binding.clear_sub_component();
                } else if self.binding.bind_sub_component(graph, &ty).is_none() {
                    return Err(FieldError::Binding {
                        path:   path.to_string(),
                        source: ResolveError::TargetMissing(format!("root has no `{ty}` component")),
                    });
                }
            }
            (FieldPath::OwnerType, FieldValue::Text(s))   => self.descriptor.owner_type = s,
            (FieldPath::MethodName, FieldValue::Text(s))  => self.descriptor.method_name = s,
            (FieldPath::DisplayName, FieldValue::Text(s)) => self.descriptor.display_name = s,
            (FieldPath::ParameterTypes, FieldValue::TextList(list)) => {
                self.descriptor.parameter_types = list;
            }
            (FieldPath::ParameterType(i), FieldValue::Text(s)) => {
                let len = self.descriptor.parameter_types.len();
                let slot = self.descriptor.parameter_types.get_mut(*i).ok_or_else(|| {
                    FieldError::IndexOutOfRange { path: path.to_string(), index: *i, len }
                })?;
                *slot = s;
            }
            (FieldPath::Argument(name), FieldValue::Value(v)) => self.arguments.set(name.clone(), v),
            (path, other) => {
                let expected = match path {
                    FieldPath::Root                  => "entity",
                    FieldPath::SubComponent          => "component",
                    FieldPath::ParameterTypes        => "text list",
                    FieldPath::Argument(_)           => "value",
                    _                                => "text",
                };
                tracing::debug!(target: "latecall", %path, got = other.describe(), "field write rejected");
                return Err(mismatch(path, expected));
            }
        }
        Ok(())
    }

    /// Each parameter of the resolved method with the value the invoker would
    /// pass for it, as an editor shows next to the method selector.
    pub fn parameter_values<'c, C, G>(
        &self,
        catalog: &'c C,
        graph:   &G,
    ) -> Result<Vec<(&'c ParamDesc, Value)>, ResolveError>
    where
        C: MethodCatalog + ?Sized,
        G: ObjectGraph + ?Sized,
    {
        let (_, handle) = invoker::prepare(self, catalog, graph)?;
        Ok(handle.params().iter()
            .map(|p| (p, self.arguments.get(p.name, &p.ty)))
            .collect())
    }
}
