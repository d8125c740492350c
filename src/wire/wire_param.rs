use crate::wire::{TypeTag, ValidationError};
use serde::{Deserialize, Serialize};

/// The body of every invocation request and response: an ordered list of
/// params. Insertion order is transport order, not necessarily positional
/// order; `Param::order` carries the position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub params: Vec<Param>,
}

impl Payload {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// One argument or return value in its wire form.
///
/// `order` is 1-based: the parameter index (receiver excluded) for call
/// arguments, the return index for results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub order: usize,
    pub kind: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Param {
    pub fn new(order: usize, kind: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            order,
            kind: kind.into(),
            value,
        }
    }

    /// Checks this param's `kind` against the declared type at its position.
    ///
    /// Concrete types compare structural tags; interface types compare the
    /// interface's fully-qualified name.
    pub fn validate(&self, declared: &TypeTag) -> Result<(), ValidationError> {
        if declared.kind() == self.kind {
            return Ok(());
        }
        Err(ValidationError::invalid_kind(
            self.order,
            declared.kind(),
            self.kind.clone(),
            self.value.clone(),
        ))
    }
}
