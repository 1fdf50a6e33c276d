//! Serializable deferred calls.
//!
//! A `CallVariant` names a method by owner type, name and parameter type
//! identities, binds it to an entity (optionally narrowed to a component) and
//! carries named arguments. Nothing is resolved until invocation: every call
//! is looked up again against the live `MethodCatalog` and `ObjectGraph`, so
//! destroyed targets and drifted signatures are reported instead of crashing.

pub mod error;
pub mod runtime;
pub mod types;
pub mod call;
pub mod scene;
pub mod persist;

pub use call::{CallKind, CallList, CallStatus, CallVariant, Combine, Condition, InvocationResult, InvokeSummary, Outcome};
pub use call::binding::TargetBinding;
pub use call::descriptor::MethodDescriptor;
pub use call::fields::{FieldPath, FieldValue};
pub use call::resolver::{MethodHandle, resolve};
pub use call::select::{Candidate, candidates, supported_for};
pub use error::{ErrorCode, ExecError, FieldError, PersistError, ResolveError};
pub use persist::{CallSheet, SHEET_VERSION};
pub use runtime::args::ArgumentStore;
pub use runtime::value::{ComponentRef, EntityRef, ObjectRef, Reference, Value};
pub use scene::{ObjectGraph, Scene};
pub use types::identity::ValueType;
pub use types::registry::{EnumDesc, MethodCatalog, MethodDesc, ParamDesc, TypeDesc, TypeRegistry};
