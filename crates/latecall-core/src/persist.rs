//! JSON call sheets: the persisted form of a set of actions and the
//! conditions that gate them.

use serde::{Deserialize, Serialize};

use crate::call::{CallList, Condition};
use crate::error::PersistError;

pub const SHEET_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSheet {
    pub version: u32,
    /// Fired when every condition holds.
    #[serde(default)]
    pub actions: CallList,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Default for CallSheet {
    fn default() -> Self {
        Self { version: SHEET_VERSION, actions: CallList::new(), conditions: Vec::new() }
    }
}

impl CallSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, PersistError> {
        let sheet: Self = serde_json::from_str(text)?;
        if sheet.version != SHEET_VERSION {
            return Err(PersistError::UnsupportedVersion { found: sheet.version, expected: SHEET_VERSION });
        }
        tracing::debug!(
            target: "latecall",
            actions = sheet.actions.len(),
            conditions = sheet.conditions.len(),
            "call sheet loaded",
        );
        Ok(sheet)
    }

    /// True when every condition holds; an empty list always holds.
    pub fn conditions_hold<C, G>(&mut self, catalog: &C, graph: &mut G) -> bool
    where
        C: crate::types::registry::MethodCatalog + ?Sized,
        G: crate::scene::ObjectGraph + ?Sized,
    {
        self.conditions.iter_mut().all(|c| c.evaluate(catalog, graph))
    }
}
