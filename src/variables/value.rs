//! Debuggee values as seen by the partitioner.
//!
//! A [`DebugValue`] is any value a view can show; values backed by an
//! indexed collection also expose [`IndexedValue`]. Queries may hit a slow or
//! disconnected target and therefore return `Result`.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Failures reported by a value query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("target disconnected")]
    Disconnected,
    #[error("Value query failed: {0}")]
    Query(String),
    #[error("index {index} out of range [{start}..{end})")]
    IndexOutOfRange { index: u64, start: u64, end: u64 },
}

/// Run a value query, turning a panicking debug adapter into a query failure.
pub(crate) fn guarded<T>(query: impl FnOnce() -> Result<T, ValueError>) -> Result<T, ValueError> {
    catch_unwind(AssertUnwindSafe(query))
        .unwrap_or_else(|_| Err(ValueError::Query("debug adapter panicked".to_string())))
}

/// Shared handle to a value.
pub type ValueRef = Arc<dyn DebugValue>;

/// A value shown in a variables view.
pub trait DebugValue: Send + Sync + fmt::Debug {
    /// Type name used to look up logical structures.
    fn type_name(&self) -> &str;

    /// Short rendering of the value itself.
    fn value_string(&self) -> String {
        self.type_name().to_string()
    }

    /// The indexed view of this value, if it has one.
    fn as_indexed(&self) -> Option<&dyn IndexedValue> {
        None
    }
}

/// A value with random-access sub-elements.
///
/// Indices run from `initial_offset()` to `initial_offset() + size()`.
pub trait IndexedValue: Send + Sync {
    fn size(&self) -> Result<u64, ValueError>;

    fn initial_offset(&self) -> u64 {
        0
    }

    fn variable(&self, index: u64) -> Result<Variable, ValueError>;

    /// `length` consecutive elements starting at index `offset`.
    fn variables(&self, offset: u64, length: u64) -> Result<Vec<Variable>, ValueError> {
        (offset..offset.saturating_add(length))
            .map(|i| self.variable(i))
            .collect()
    }
}

/// A named child of a value.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub value: ValueRef,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: ValueRef) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Element named by its index, e.g. `[7]`.
    pub fn indexed(index: u64, value: ValueRef) -> Self {
        Self::new(format!("[{}]", index), value)
    }
}

/// A leaf value with a fixed rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarValue {
    type_name: String,
    text: String,
}

impl ScalarValue {
    pub fn new(type_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            text: text.into(),
        }
    }

    pub fn shared(type_name: impl Into<String>, text: impl Into<String>) -> ValueRef {
        Arc::new(Self::new(type_name, text))
    }
}

impl DebugValue for ScalarValue {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn value_string(&self) -> String {
        self.text.clone()
    }
}

/// An in-process indexed collection.
#[derive(Debug, Clone)]
pub struct ArrayValue {
    type_name: String,
    elements: Vec<ValueRef>,
    initial_offset: u64,
}

impl ArrayValue {
    pub fn new(type_name: impl Into<String>, elements: Vec<ValueRef>) -> Self {
        Self {
            type_name: type_name.into(),
            elements,
            initial_offset: 0,
        }
    }

    /// `count` integer elements rendered as their index.
    pub fn of_ints(type_name: impl Into<String>, count: u64) -> Self {
        let elements = (0..count)
            .map(|i| ScalarValue::shared("int", i.to_string()))
            .collect();
        Self::new(type_name, elements)
    }

    pub fn with_initial_offset(mut self, offset: u64) -> Self {
        self.initial_offset = offset;
        self
    }

    pub fn into_ref(self) -> ValueRef {
        Arc::new(self)
    }
}

impl DebugValue for ArrayValue {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn value_string(&self) -> String {
        format!("{}[{}]", self.type_name, self.elements.len())
    }

    fn as_indexed(&self) -> Option<&dyn IndexedValue> {
        Some(self)
    }
}

impl IndexedValue for ArrayValue {
    fn size(&self) -> Result<u64, ValueError> {
        Ok(self.elements.len() as u64)
    }

    fn initial_offset(&self) -> u64 {
        self.initial_offset
    }

    fn variable(&self, index: u64) -> Result<Variable, ValueError> {
        let end = self.initial_offset + self.elements.len() as u64;
        index
            .checked_sub(self.initial_offset)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.elements.get(i))
            .map(|v| Variable::indexed(index, Arc::clone(v)))
            .ok_or(ValueError::IndexOutOfRange {
                index,
                start: self.initial_offset,
                end,
            })
    }
}
