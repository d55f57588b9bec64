//! Logical structure resolution.
//!
//! A logical structure replaces a raw value with an alternate view, e.g. a
//! linked list's elements in place of its node fields. Resolution applies
//! the default structure for the current value repeatedly, never reusing a
//! structure id within one chain.

use crate::error::EngineError;
use crate::variables::value::{guarded, DebugValue, ValueError, ValueRef};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// A registered alternate view for values of some types.
pub trait LogicalStructureType: Send + Sync {
    /// Stable identifier; the cycle guard keys on it.
    fn id(&self) -> &str;

    fn description(&self) -> String {
        self.id().to_string()
    }

    fn provides_for(&self, value: &dyn DebugValue) -> bool;

    fn logical_value(&self, value: &ValueRef) -> Result<ValueRef, ValueError>;
}

pub type StructureRef = Arc<dyn LogicalStructureType>;

/// Lookup of applicable structure types and the default among them.
pub trait StructureProvider: Send + Sync {
    fn applicable_types(&self, value: &ValueRef) -> Vec<StructureRef>;

    fn default_of(&self, types: &[StructureRef]) -> Option<StructureRef>;
}

/// Outcome of a resolution chain.
#[derive(Debug)]
pub struct Resolution {
    /// Last value computed successfully; the raw value if nothing applied.
    pub value: ValueRef,
    /// Structure ids applied, in order.
    pub applied: Vec<String>,
    pub failure: Option<EngineError>,
}

/// Resolve `value` through its default logical structures.
///
/// Returns the raw value unchanged when `enabled` is false. A failing
/// transform ends the chain with the last good value.
pub fn resolve_logical_value(
    value: ValueRef,
    enabled: bool,
    provider: &dyn StructureProvider,
) -> Resolution {
    if !enabled {
        return Resolution {
            value,
            applied: Vec::new(),
            failure: None,
        };
    }
    resolve_step(value, provider, HashSet::new(), Vec::new())
}

fn resolve_step(
    value: ValueRef,
    provider: &dyn StructureProvider,
    mut visited: HashSet<String>,
    mut applied: Vec<String>,
) -> Resolution {
    let types = provider.applicable_types(&value);
    let next = provider
        .default_of(&types)
        .filter(|t| !visited.contains(t.id()));

    let Some(structure) = next else {
        return Resolution {
            value,
            applied,
            failure: None,
        };
    };

    let id = structure.id().to_string();
    match guarded(|| structure.logical_value(&value)) {
        Ok(transformed) => {
            debug!(
                structure = %id,
                from = value.type_name(),
                to = transformed.type_name(),
                "Applied logical structure"
            );
            visited.insert(id.clone());
            applied.push(id);
            resolve_step(transformed, provider, visited, applied)
        }
        Err(source) => {
            warn!(
                structure = %id,
                error = %source,
                "Logical structure failed; keeping last value"
            );
            Resolution {
                value,
                applied,
                failure: Some(EngineError::Transform { id, source }),
            }
        }
    }
}

/// Registered structure types with remembered default choices.
///
/// Defaults are keyed by the set of applicable ids, so a choice made for a
/// value with types `{a, b}` also holds for every other value with exactly
/// those types.
#[derive(Default)]
pub struct StructureRegistry {
    types: Vec<StructureRef>,
    defaults: RwLock<HashMap<String, String>>,
}

impl StructureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, structure: StructureRef) {
        self.types.push(structure);
    }

    pub fn with(mut self, structure: StructureRef) -> Self {
        self.register(structure);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Remember `id` as the default for values offering exactly `types`.
    /// `None` forgets the choice.
    pub fn set_default(&self, types: &[StructureRef], id: Option<&str>) {
        let key = key_of(types);
        let mut defaults = match self.defaults.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match id {
            Some(id) => {
                defaults.insert(key, id.to_string());
            }
            None => {
                defaults.remove(&key);
            }
        }
    }
}

impl StructureProvider for StructureRegistry {
    fn applicable_types(&self, value: &ValueRef) -> Vec<StructureRef> {
        self.types
            .iter()
            .filter(|t| t.provides_for(value.as_ref()))
            .cloned()
            .collect()
    }

    fn default_of(&self, types: &[StructureRef]) -> Option<StructureRef> {
        let chosen = {
            let defaults = match self.defaults.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            defaults.get(&key_of(types)).cloned()
        };
        match chosen {
            Some(id) => types.iter().find(|t| t.id() == id).cloned(),
            None => types.first().cloned(),
        }
    }
}

fn key_of(types: &[StructureRef]) -> String {
    let mut ids: Vec<&str> = types.iter().map(|t| t.id()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.join(",")
}
