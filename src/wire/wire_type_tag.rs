use crate::constants::{CONTEXT_INTERFACE_NAME, ERROR_INTERFACE_NAME};
use crate::wire::{Context, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Width and signedness of an integer type, spelled the way it appears in
/// the wire `kind` vocabulary.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IntKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntKind::Int => "int",
            IntKind::Int8 => "int8",
            IntKind::Int16 => "int16",
            IntKind::Int32 => "int32",
            IntKind::Int64 => "int64",
            IntKind::Uint => "uint",
            IntKind::Uint8 => "uint8",
            IntKind::Uint16 => "uint16",
            IntKind::Uint32 => "uint32",
            IntKind::Uint64 => "uint64",
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IntKind::Int | IntKind::Int8 | IntKind::Int16 | IntKind::Int32 | IntKind::Int64
        )
    }

    /// Inclusive bounds of the kind, widened to `i128` so both signed and
    /// unsigned kinds fit.
    pub fn bounds(&self) -> (i128, i128) {
        match self {
            IntKind::Int | IntKind::Int64 => (i64::MIN as i128, i64::MAX as i128),
            IntKind::Int8 => (i8::MIN as i128, i8::MAX as i128),
            IntKind::Int16 => (i16::MIN as i128, i16::MAX as i128),
            IntKind::Int32 => (i32::MIN as i128, i32::MAX as i128),
            IntKind::Uint | IntKind::Uint64 => (0, u64::MAX as i128),
            IntKind::Uint8 => (0, u8::MAX as i128),
            IntKind::Uint16 => (0, u16::MAX as i128),
            IntKind::Uint32 => (0, u32::MAX as i128),
        }
    }
}

/// An interface-shaped (dynamic) declared type. Values of these types are
/// never marshaled structurally; the filter chain decides their wire form.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Interface {
    /// The generic error capability (`error`).
    Error,
    /// The execution-context capability (`context.Context`).
    Context,
    /// Any other interface, identified by its fully-qualified name.
    Custom(String),
}

impl Interface {
    pub fn name(&self) -> &str {
        match self {
            Interface::Error => ERROR_INTERFACE_NAME,
            Interface::Context => CONTEXT_INTERFACE_NAME,
            Interface::Custom(name) => name.as_str(),
        }
    }
}

/// A named struct field and the wire key it is marshaled under.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FieldTag {
    pub key: String,
    pub tag: TypeTag,
}

impl FieldTag {
    pub fn new(key: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            key: key.into(),
            tag,
        }
    }
}

/// The declared static type of a parameter or return slot.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum TypeTag {
    String,
    Int(IntKind),
    Float32,
    Float64,
    Bool,
    /// A point in time, marshaled as an RFC 3339 string under the `struct` kind.
    Timestamp,
    Struct {
        name: String,
        fields: Vec<FieldTag>,
    },
    Slice(Box<TypeTag>),
    Array {
        len: usize,
        elem: Box<TypeTag>,
    },
    Pointer(Box<TypeTag>),
    Interface(Interface),
}

impl TypeTag {
    /// The wire `kind` this type is tagged with.
    ///
    /// Concrete types report their structural tag; interface types report
    /// their fully-qualified name.
    pub fn kind(&self) -> &str {
        match self {
            TypeTag::String => "string",
            TypeTag::Int(int_kind) => int_kind.as_str(),
            TypeTag::Float32 => "float32",
            TypeTag::Float64 => "float64",
            TypeTag::Bool => "bool",
            TypeTag::Timestamp | TypeTag::Struct { .. } => "struct",
            TypeTag::Slice(_) => "slice",
            TypeTag::Array { .. } => "array",
            TypeTag::Pointer(_) => "pointer",
            TypeTag::Interface(interface) => interface.name(),
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, TypeTag::Interface(_))
    }

    pub fn slice_of(elem: TypeTag) -> Self {
        TypeTag::Slice(Box::new(elem))
    }

    pub fn pointer_to(elem: TypeTag) -> Self {
        TypeTag::Pointer(Box::new(elem))
    }

    pub fn array_of(len: usize, elem: TypeTag) -> Self {
        TypeTag::Array {
            len,
            elem: Box::new(elem),
        }
    }

    /// The value a slot of this type holds when the wire carries `null`.
    pub fn zero_value(&self) -> Value {
        match self {
            TypeTag::String => Value::String(String::new()),
            TypeTag::Int(int_kind) if int_kind.is_signed() => Value::Int(0),
            TypeTag::Int(_) => Value::Uint(0),
            TypeTag::Float32 | TypeTag::Float64 => Value::Float(0.0),
            TypeTag::Bool => Value::Bool(false),
            TypeTag::Timestamp => Value::Timestamp(chrono::DateTime::UNIX_EPOCH),
            TypeTag::Struct { fields, .. } => Value::Struct(
                fields
                    .iter()
                    .map(|field| (field.key.clone(), field.tag.zero_value()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            TypeTag::Slice(_) => Value::Slice(Vec::new()),
            TypeTag::Array { len, elem } => {
                Value::Array((0..*len).map(|_| elem.zero_value()).collect())
            }
            TypeTag::Pointer(_) => Value::Pointer(None),
            TypeTag::Interface(Interface::Error) => Value::Error(None),
            TypeTag::Interface(Interface::Context) => Value::Context(Context::background()),
            TypeTag::Interface(Interface::Custom(_)) => Value::Custom(serde_json::Value::Null),
        }
    }
}

/// Renders the type the way it shows up in conversion error paths,
/// e.g. `[]*Sub` or `[3]int`.
impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Timestamp => write!(f, "Timestamp"),
            TypeTag::Struct { name, .. } => write!(f, "{name}"),
            TypeTag::Slice(elem) => write!(f, "[]{elem}"),
            TypeTag::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeTag::Pointer(elem) => write!(f, "*{elem}"),
            other => write!(f, "{}", other.kind()),
        }
    }
}
