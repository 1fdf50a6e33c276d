//! Invocation protocol: resolve target and method, gather arguments in
//! parameter order, execute, and fold every failure into the result.
//!
//! Nothing here propagates an error or a panic to the caller. Skips and
//! failures are recorded in the call's sticky `last_error`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{ExecError, ResolveError};
use crate::runtime::value::{ObjectRef, Value};
use crate::scene::ObjectGraph;
use crate::types::registry::MethodCatalog;
use super::resolver::{MethodHandle, resolve};
use super::{CallKind, CallVariant, InvocationResult, Outcome};

/// Resolve the target object and the method handle for `call`.
pub(crate) fn prepare<'c, C, G>(
    call:    &CallVariant,
    catalog: &'c C,
    graph:   &G,
) -> Result<(ObjectRef, MethodHandle<'c>), ResolveError>
where
    C: MethodCatalog + ?Sized,
    G: ObjectGraph + ?Sized,
{
    if !call.descriptor.is_assigned() {
        return Err(ResolveError::Unassigned);
    }
    let object = call.binding.resolve_object(graph)?;
    let object_type = graph.type_of(&object)
        .ok_or_else(|| ResolveError::TargetMissing(format!("{object} has no live type")))?;
    let handle = resolve(catalog, &call.descriptor, object_type, call.kind)?;
    Ok((object, handle))
}

impl CallVariant {
    /// Run the call once. Always returns; never panics on a bad target or a
    /// failing method.
    pub fn invoke<C, G>(&mut self, catalog: &C, graph: &mut G) -> InvocationResult
    where
        C: MethodCatalog + ?Sized,
        G: ObjectGraph + ?Sized,
    {
        let result = self.execute(catalog, graph);
        self.record(&result);
        result
    }

    fn execute<C, G>(&self, catalog: &C, graph: &mut G) -> InvocationResult
    where
        C: MethodCatalog + ?Sized,
        G: ObjectGraph + ?Sized,
    {
        let (object, handle) = match prepare(self, catalog, &*graph) {
            Ok(prepared) => prepared,
            Err(e)       => return InvocationResult::Skipped(e),
        };

        // Values come out in the method's declaration order, not storage order.
        let args: Vec<Value> = handle.params().iter()
            .map(|p| self.arguments.get(p.name, &p.ty))
            .collect();

        let Some(recv) = graph.object_mut(&object) else {
            return InvocationResult::Skipped(ResolveError::TargetMissing(format!("{object} disappeared")));
        };

        let ran = panic::catch_unwind(AssertUnwindSafe(|| handle.call(recv, &args)));
        match (ran, self.kind) {
            (Ok(Ok(_)), CallKind::Action) => InvocationResult::Completed(Outcome::Unit),
            (Ok(Ok(Some(Value::Bool(b)))), CallKind::Predicate) => {
                InvocationResult::Completed(Outcome::Bool(b))
            }
            (Ok(Ok(other)), CallKind::Predicate) => {
                let got = other.map_or_else(|| "nothing".to_string(), |v| v.value_type().identity());
                InvocationResult::Failed(ExecError::msg(format!("predicate returned {got}")))
            }
            (Ok(Err(e)), _) => InvocationResult::Failed(e),
            (Err(payload), _) => {
                InvocationResult::Failed(ExecError::Panic(panic_message(payload.as_ref())))
            }
        }
    }

    fn record(&mut self, result: &InvocationResult) {
        let label = self.descriptor.label();
        match result {
            InvocationResult::Completed(outcome) => {
                tracing::debug!(target: "latecall", call = %label, ?outcome, "call completed");
                self.last_error.clear();
            }
            InvocationResult::Skipped(e) => {
                tracing::warn!(target: "latecall", call = %label, code = %e.code(), error = %e, "call skipped");
                self.last_error = format!("{label}: {e}");
            }
            InvocationResult::Failed(e) => {
                tracing::warn!(target: "latecall", call = %label, code = %e.code(), error = %e, "call failed");
                self.last_error = format!("{label}: {e}");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
