use rioc::{Interface, RemoteTuple, TypeTag};

/// The declared shape of one exported method: its name, ordered parameter
/// and return types, and whether the last parameter is variadic.
///
/// Built once when a component is registered and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<TypeTag>,
    pub returns: Vec<TypeTag>,
    pub is_variadic: bool,
}

impl MethodDescriptor {
    pub fn new(
        name: impl Into<String>,
        params: Vec<TypeTag>,
        returns: Vec<TypeTag>,
        is_variadic: bool,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
            is_variadic,
        }
    }

    /// Derives a descriptor from a parameter tuple type and a return tuple type.
    pub fn of<P: RemoteTuple, R: RemoteTuple>(name: impl Into<String>) -> Self {
        Self::new(name, P::type_tags(), R::type_tags(), false)
    }

    /// Like [`MethodDescriptor::of`], with the last parameter marked variadic.
    pub fn variadic<P: RemoteTuple, R: RemoteTuple>(name: impl Into<String>) -> Self {
        Self::new(name, P::type_tags(), R::type_tags(), true)
    }

    /// Whether the last return slot is the error capability.
    pub fn returns_error(&self) -> bool {
        matches!(
            self.returns.last(),
            Some(TypeTag::Interface(Interface::Error))
        )
    }

    /// Reports why this descriptor cannot be served, if anything is wrong.
    pub fn problem(&self) -> Option<String> {
        if self.name.is_empty() {
            return Some("method name must not be empty".to_string());
        }
        if self.is_variadic && !matches!(self.params.last(), Some(TypeTag::Slice(_))) {
            return Some(format!(
                "method `{}` is variadic but its last parameter is not a slice",
                self.name
            ));
        }
        None
    }
}
