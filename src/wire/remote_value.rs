use crate::wire::{Context, IntKind, Interface, RemoteError, TypeTag, Value, WireError};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A Rust type that can be carried as a method parameter or return value.
///
/// Implementors name their declared [`TypeTag`] once and convert to and from
/// the tagged [`Value`] form the codec works with. Structs opt in through
/// [`remote_struct!`](crate::remote_struct).
pub trait RemoteValue: Sized {
    fn type_tag() -> TypeTag;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self, WireError>;
}

macro_rules! impl_remote_signed {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl RemoteValue for $ty {
                fn type_tag() -> TypeTag {
                    TypeTag::Int(IntKind::$kind)
                }

                fn into_value(self) -> Value {
                    Value::Int(self as i64)
                }

                fn from_value(value: Value) -> Result<Self, WireError> {
                    let converted = match value {
                        Value::Int(n) => <$ty>::try_from(n).ok(),
                        Value::Uint(n) => <$ty>::try_from(n).ok(),
                        ref other => return Err(WireError::mismatch(stringify!($ty), other)),
                    };
                    converted.ok_or_else(|| WireError::Mismatch {
                        expected: stringify!($ty).to_string(),
                        actual: "out of range integer".to_string(),
                    })
                }
            }
        )*
    };
}

macro_rules! impl_remote_unsigned {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl RemoteValue for $ty {
                fn type_tag() -> TypeTag {
                    TypeTag::Int(IntKind::$kind)
                }

                fn into_value(self) -> Value {
                    Value::Uint(self as u64)
                }

                fn from_value(value: Value) -> Result<Self, WireError> {
                    let converted = match value {
                        Value::Int(n) => <$ty>::try_from(n).ok(),
                        Value::Uint(n) => <$ty>::try_from(n).ok(),
                        ref other => return Err(WireError::mismatch(stringify!($ty), other)),
                    };
                    converted.ok_or_else(|| WireError::Mismatch {
                        expected: stringify!($ty).to_string(),
                        actual: "out of range integer".to_string(),
                    })
                }
            }
        )*
    };
}

impl_remote_signed!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int,
    isize => Int,
);

impl_remote_unsigned!(
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint,
    usize => Uint,
);

impl RemoteValue for String {
    fn type_tag() -> TypeTag {
        TypeTag::String
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(WireError::mismatch("string", &other)),
        }
    }
}

impl RemoteValue for bool {
    fn type_tag() -> TypeTag {
        TypeTag::Bool
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(WireError::mismatch("bool", &other)),
        }
    }
}

impl RemoteValue for f64 {
    fn type_tag() -> TypeTag {
        TypeTag::Float64
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(WireError::mismatch("float64", &other)),
        }
    }
}

impl RemoteValue for f32 {
    fn type_tag() -> TypeTag {
        TypeTag::Float32
    }

    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Float(f) => Ok(f as f32),
            other => Err(WireError::mismatch("float32", &other)),
        }
    }
}

impl RemoteValue for DateTime<Utc> {
    fn type_tag() -> TypeTag {
        TypeTag::Timestamp
    }

    fn into_value(self) -> Value {
        Value::Timestamp(self)
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Timestamp(t) => Ok(t),
            other => Err(WireError::mismatch("timestamp", &other)),
        }
    }
}

/// Durations travel as signed 64-bit nanosecond counts.
impl RemoteValue for Duration {
    fn type_tag() -> TypeTag {
        TypeTag::Int(IntKind::Int64)
    }

    fn into_value(self) -> Value {
        Value::Int(i64::try_from(self.as_nanos()).unwrap_or(i64::MAX))
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Int(n) if n >= 0 => Ok(Duration::from_nanos(n as u64)),
            Value::Uint(n) => Ok(Duration::from_nanos(n)),
            Value::Int(_) => Err(WireError::Mismatch {
                expected: "non-negative duration".to_string(),
                actual: "negative integer".to_string(),
            }),
            other => Err(WireError::mismatch("duration", &other)),
        }
    }
}

impl<T: RemoteValue> RemoteValue for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::slice_of(T::type_tag())
    }

    fn into_value(self) -> Value {
        Value::Slice(self.into_iter().map(RemoteValue::into_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Slice(items) | Value::Array(items) => {
                items.into_iter().map(T::from_value).collect()
            }
            other => Err(WireError::mismatch("slice", &other)),
        }
    }
}

impl<T: RemoteValue, const N: usize> RemoteValue for [T; N] {
    fn type_tag() -> TypeTag {
        TypeTag::array_of(N, T::type_tag())
    }

    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(RemoteValue::into_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        let items = match value {
            Value::Array(items) | Value::Slice(items) => items,
            other => return Err(WireError::mismatch("array", &other)),
        };
        let actual = items.len();
        let decoded = items
            .into_iter()
            .map(T::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        decoded
            .try_into()
            .map_err(|_| WireError::Arity {
                expected: N,
                actual,
            })
    }
}

/// `Option<T>` is a pointer to `T`; `None` is the nil pointer.
impl<T: RemoteValue> RemoteValue for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::pointer_to(T::type_tag())
    }

    fn into_value(self) -> Value {
        Value::Pointer(self.map(|inner| Box::new(inner.into_value())))
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Pointer(None) => Ok(None),
            Value::Pointer(Some(inner)) => T::from_value(*inner).map(Some),
            other => Err(WireError::mismatch("pointer", &other)),
        }
    }
}

impl<T: RemoteValue> RemoteValue for Box<T> {
    fn type_tag() -> TypeTag {
        T::type_tag()
    }

    fn into_value(self) -> Value {
        (*self).into_value()
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        T::from_value(value).map(Box::new)
    }
}

/// The error capability. `Ok(())` is the nil error.
impl RemoteValue for Result<(), RemoteError> {
    fn type_tag() -> TypeTag {
        TypeTag::Interface(Interface::Error)
    }

    fn into_value(self) -> Value {
        Value::Error(self.err())
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Error(None) => Ok(Ok(())),
            Value::Error(Some(error)) => Ok(Err(error)),
            other => Err(WireError::mismatch("error", &other)),
        }
    }
}

impl RemoteValue for Context {
    fn type_tag() -> TypeTag {
        TypeTag::Interface(Interface::Context)
    }

    fn into_value(self) -> Value {
        Value::Context(self)
    }

    fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Context(context) => Ok(context),
            other => Err(WireError::mismatch("context", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_widths_map_to_wire_kinds() {
        assert_eq!(i64::type_tag().kind(), "int");
        assert_eq!(i8::type_tag().kind(), "int8");
        assert_eq!(u64::type_tag().kind(), "uint");
        assert_eq!(u16::type_tag().kind(), "uint16");
        assert_eq!(Duration::type_tag().kind(), "int64");
    }

    #[test]
    fn narrow_integer_rejects_out_of_range_value() {
        assert!(i8::from_value(Value::Int(300)).is_err());
        assert_eq!(u8::from_value(Value::Int(200)).unwrap(), 200);
    }

    #[test]
    fn option_is_a_nullable_pointer() {
        assert_eq!(Option::<i64>::None.into_value(), Value::Pointer(None));
        assert_eq!(
            Option::<i64>::from_value(Value::pointer(Value::Int(4))).unwrap(),
            Some(4)
        );
        assert_eq!(Option::<String>::type_tag().to_string(), "*string");
    }

    #[test]
    fn fixed_array_requires_exact_length() {
        let value = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(
            <[i64; 3]>::from_value(value),
            Err(WireError::Arity {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn error_capability_maps_ok_to_nil() {
        let nil: Result<(), RemoteError> = Ok(());
        assert_eq!(nil.into_value(), Value::Error(None));

        let failed: Result<(), RemoteError> = Err(RemoteError::new("boom"));
        assert_eq!(
            failed.into_value(),
            Value::Error(Some(RemoteError::new("boom")))
        );
    }

    #[test]
    fn duration_travels_as_nanoseconds() {
        let value = Duration::from_millis(3).into_value();
        assert_eq!(value, Value::Int(3_000_000));
        assert!(Duration::from_value(Value::Int(-1)).is_err());
    }
}
