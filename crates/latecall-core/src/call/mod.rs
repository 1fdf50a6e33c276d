//! Persisted deferred calls: what to call, on what, with which arguments.

pub mod binding;
pub mod descriptor;
pub mod fields;
pub mod invoker;
pub mod resolver;
pub mod select;

use serde::{Deserialize, Serialize};

use crate::error::{ExecError, ResolveError};
use crate::runtime::args::ArgumentStore;
use crate::scene::ObjectGraph;
use crate::types::registry::MethodCatalog;
use binding::TargetBinding;
use descriptor::MethodDescriptor;

// ─── Call shape ───────────────────────────────────────────────────────────────

/// Fire-and-forget actions vs bool-returning predicates used for branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Action,
    Predicate,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action    => "action",
            Self::Predicate => "predicate",
        }
    }
}

// ─── Results ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unit,
    Bool(bool),
}

/// What one invocation did. Never an error the caller has to propagate.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    Completed(Outcome),
    /// Could not resolve a target or method; nothing ran.
    Skipped(ResolveError),
    /// The method ran and failed.
    Failed(ExecError),
}

impl InvocationResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Branch value: only a completed predicate returning `true` is truthy.
    pub fn truthy(&self) -> bool {
        matches!(self, Self::Completed(Outcome::Bool(true)))
    }
}

/// Lazily computed state of a call against the live catalog and graph.
#[derive(Debug, Clone, PartialEq)]
pub enum CallStatus {
    Unassigned,
    Resolvable,
    /// Assigned, but the target or signature no longer matches.
    Stale(ResolveError),
}

// ─── CallVariant ──────────────────────────────────────────────────────────────

/// The unit that is persisted, edited and invoked.
///
/// Owns its descriptor and arguments; only references its target, which may
/// be destroyed independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallVariant {
    kind: CallKind,
    #[serde(default)]
    pub binding: TargetBinding,
    #[serde(default)]
    pub descriptor: MethodDescriptor,
    #[serde(default)]
    pub arguments: ArgumentStore,
    /// Sticky message of the last skipped or failed invocation. Empty = ok.
    #[serde(skip)]
    last_error: String,
}

impl CallVariant {
    pub fn new(kind: CallKind) -> Self {
        Self {
            kind,
            binding:    TargetBinding::new(),
            descriptor: MethodDescriptor::unassigned(),
            arguments:  ArgumentStore::new(),
            last_error: String::new(),
        }
    }

    pub fn action() -> Self { Self::new(CallKind::Action) }
    pub fn predicate() -> Self { Self::new(CallKind::Predicate) }

    pub fn kind(&self) -> CallKind { self.kind }

    pub fn last_error(&self) -> &str { &self.last_error }

    pub fn has_error(&self) -> bool { !self.last_error.is_empty() }

    pub fn is_assigned(&self) -> bool { self.descriptor.is_assigned() }

    pub fn status<C, G>(&self, catalog: &C, graph: &G) -> CallStatus
    where
        C: MethodCatalog + ?Sized,
        G: ObjectGraph + ?Sized,
    {
        if !self.is_assigned() {
            return CallStatus::Unassigned;
        }
        match invoker::prepare(self, catalog, graph) {
            Ok(_)  => CallStatus::Resolvable,
            Err(e) => CallStatus::Stale(e),
        }
    }
}

// ─── Groups ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvokeSummary {
    pub completed: usize,
    pub skipped:   usize,
    pub failed:    usize,
}

impl InvokeSummary {
    fn count(&mut self, result: &InvocationResult) {
        match result {
            InvocationResult::Completed(_) => self.completed += 1,
            InvocationResult::Skipped(_)   => self.skipped += 1,
            InvocationResult::Failed(_)    => self.failed += 1,
        }
    }

    pub fn all_completed(&self) -> bool {
        self.skipped == 0 && self.failed == 0
    }
}

/// Ordered calls fired together. One failing call never stops the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallList {
    calls: Vec<CallVariant>,
}

impl CallList {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, call: CallVariant) { self.calls.push(call); }

    pub fn len(&self) -> usize { self.calls.len() }
    pub fn is_empty(&self) -> bool { self.calls.is_empty() }

    pub fn get(&self, i: usize) -> Option<&CallVariant> { self.calls.get(i) }
    pub fn get_mut(&mut self, i: usize) -> Option<&mut CallVariant> { self.calls.get_mut(i) }

    pub fn iter(&self) -> impl Iterator<Item = &CallVariant> { self.calls.iter() }

    pub fn invoke_all<C, G>(&mut self, catalog: &C, graph: &mut G) -> InvokeSummary
    where
        C: MethodCatalog + ?Sized,
        G: ObjectGraph + ?Sized,
    {
        let mut summary = InvokeSummary::default();
        for call in &mut self.calls {
            summary.count(&call.invoke(catalog, graph));
        }
        summary
    }
}

impl From<Vec<CallVariant>> for CallList {
    fn from(calls: Vec<CallVariant>) -> Self { Self { calls } }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    #[default]
    All,
    Any,
}

/// Predicates combined into one branch decision. Evaluation short-circuits;
/// a skipped or failed predicate counts as `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub combine: Combine,
    pub predicates: Vec<CallVariant>,
}

impl Condition {
    pub fn new(combine: Combine) -> Self {
        Self { combine, predicates: Vec::new() }
    }

    pub fn with(mut self, predicate: CallVariant) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn evaluate<C, G>(&mut self, catalog: &C, graph: &mut G) -> bool
    where
        C: MethodCatalog + ?Sized,
        G: ObjectGraph + ?Sized,
    {
        match self.combine {
            Combine::All => self.predicates.iter_mut().all(|p| p.invoke(catalog, graph).truthy()),
            Combine::Any => self.predicates.iter_mut().any(|p| p.invoke(catalog, graph).truthy()),
        }
    }
}
