use crate::wire::{
    ConversionError, FilterChain, Interface, IntKind, Param, TypeTag, Value, WireError,
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

/// Converts between typed [`Value`]s and their wire [`Param`] form, guided by
/// the declared [`TypeTag`] of each slot.
///
/// Concrete types are marshaled structurally. Interface types are handed to
/// the [`FilterChain`], including interfaces nested inside structs, slices and
/// pointers.
#[derive(Debug, Clone, Default)]
pub struct WireCodec {
    filters: FilterChain,
}

impl WireCodec {
    pub fn new(filters: FilterChain) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    /// Encodes one value at the given 1-based `order`.
    pub fn encode(&self, order: usize, declared: &TypeTag, value: &Value) -> Result<Param, WireError> {
        let wire = self.encode_value(order, declared, value)?;
        Ok(Param::new(order, declared.kind(), wire))
    }

    /// Encodes a full positional list. Orders are assigned from 1.
    pub fn encode_all(&self, declared: &[TypeTag], values: &[Value]) -> Result<Vec<Param>, WireError> {
        if declared.len() != values.len() {
            return Err(WireError::Arity {
                expected: declared.len(),
                actual: values.len(),
            });
        }
        declared
            .iter()
            .zip(values)
            .enumerate()
            .map(|(index, (tag, value))| self.encode(index + 1, tag, value))
            .collect()
    }

    /// Decodes one param against the type declared at its position.
    ///
    /// The param's `kind` is not checked here; that is the dispatcher's
    /// validation step.
    pub fn decode(&self, param: &Param, declared: &TypeTag) -> Result<Value, WireError> {
        self.decode_value(param.order, declared, &param.value)
    }

    fn encode_value(
        &self,
        order: usize,
        declared: &TypeTag,
        value: &Value,
    ) -> Result<serde_json::Value, WireError> {
        let mismatch = || {
            conversion(
                order,
                declared,
                serde_json::Value::Null,
                format!("expected {declared} value, found {}", value.kind_name()),
            )
        };

        match (declared, value) {
            (TypeTag::Interface(interface), value) => {
                self.serialize_interface(order, declared, interface, value)
            }
            (TypeTag::Pointer(_), Value::Pointer(None)) => Ok(serde_json::Value::Null),
            (TypeTag::Pointer(elem), Value::Pointer(Some(inner))) => {
                self.encode_value(order, elem, inner)
            }
            (TypeTag::String, Value::String(s)) => Ok(serde_json::Value::String(s.clone())),
            (TypeTag::Int(kind), Value::Int(n)) => encode_int(order, declared, *kind, *n as i128),
            (TypeTag::Int(kind), Value::Uint(n)) => encode_int(order, declared, *kind, *n as i128),
            (TypeTag::Float32 | TypeTag::Float64, Value::Float(f)) => {
                serde_json::Number::from_f64(*f)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| {
                        conversion(order, declared, serde_json::Value::Null, "value is not a finite number")
                    })
            }
            (TypeTag::Bool, Value::Bool(b)) => Ok(serde_json::Value::Bool(*b)),
            (TypeTag::Timestamp, Value::Timestamp(t)) => Ok(serde_json::Value::String(
                t.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            )),
            (TypeTag::Struct { fields, .. }, Value::Struct(values)) => {
                let mut object = serde_json::Map::with_capacity(fields.len());
                for field in fields {
                    let wire = match values.get(&field.key) {
                        Some(inner) => self.encode_value(order, &field.tag, inner),
                        None => self.encode_value(order, &field.tag, &field.tag.zero_value()),
                    }
                    .map_err(nested(format!(".{}", field.key)))?;
                    object.insert(field.key.clone(), wire);
                }
                Ok(serde_json::Value::Object(object))
            }
            (TypeTag::Slice(elem), Value::Slice(items) | Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    self.encode_value(order, elem, item)
                        .map_err(nested(format!(".[]{elem}.${}", index + 1)))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),
            (TypeTag::Array { len, elem }, Value::Array(items) | Value::Slice(items)) => {
                if items.len() > *len {
                    return Err(conversion(
                        order,
                        declared,
                        serde_json::Value::Null,
                        "array index out of range",
                    ));
                }
                let mut wire = Vec::with_capacity(*len);
                for (index, item) in items.iter().enumerate() {
                    wire.push(
                        self.encode_value(order, elem, item)
                            .map_err(nested(format!(".[{len}]{elem}.${}", index + 1)))?,
                    );
                }
                let zero = elem.zero_value();
                for index in items.len()..*len {
                    wire.push(
                        self.encode_value(order, elem, &zero)
                            .map_err(nested(format!(".[{len}]{elem}.${}", index + 1)))?,
                    );
                }
                Ok(serde_json::Value::Array(wire))
            }
            _ => Err(mismatch()),
        }
    }

    fn serialize_interface(
        &self,
        order: usize,
        declared: &TypeTag,
        interface: &Interface,
        value: &Value,
    ) -> Result<serde_json::Value, WireError> {
        match self.filters.serialize(interface, value) {
            Ok(Some(wire)) => Ok(wire),
            Ok(None) => {
                tracing::trace!(order, kind = interface.name(), "No serialization filter matched");
                Err(WireError::UnsupportedInterface {
                    order,
                    kind: interface.name().to_string(),
                })
            }
            Err(err) => Err(conversion(
                order,
                declared,
                serde_json::Value::Null,
                err.to_string(),
            )),
        }
    }

    fn decode_value(
        &self,
        order: usize,
        declared: &TypeTag,
        raw: &serde_json::Value,
    ) -> Result<Value, WireError> {
        match declared {
            TypeTag::Interface(interface) => match self.filters.deserialize(interface, raw) {
                Ok(Some(value)) => Ok(value),
                Ok(None) => {
                    tracing::trace!(order, kind = interface.name(), "No deserialization filter matched");
                    Err(WireError::UnsupportedInterface {
                        order,
                        kind: interface.name().to_string(),
                    })
                }
                Err(err) => Err(conversion(order, declared, raw.clone(), err.to_string())),
            },
            _ if raw.is_null() => Ok(declared.zero_value()),
            TypeTag::Pointer(elem) => Ok(Value::pointer(self.decode_value(order, elem, raw)?)),
            TypeTag::String => raw
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| conversion(order, declared, raw.clone(), "value is not a string")),
            TypeTag::Int(kind) => decode_int(order, declared, *kind, raw),
            TypeTag::Float32 | TypeTag::Float64 => raw
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| conversion(order, declared, raw.clone(), "value is not a number")),
            TypeTag::Bool => raw
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| conversion(order, declared, raw.clone(), "value is not a boolean")),
            TypeTag::Timestamp => {
                let text = raw.as_str().ok_or_else(|| {
                    conversion(order, declared, raw.clone(), "value is not a string")
                })?;
                DateTime::parse_from_rfc3339(text)
                    .map(|t| Value::Timestamp(t.with_timezone(&Utc)))
                    .map_err(|err| {
                        conversion(
                            order,
                            declared,
                            raw.clone(),
                            format!("value is not an RFC 3339 timestamp: {err}"),
                        )
                    })
            }
            TypeTag::Struct { fields, .. } => {
                let object = raw.as_object().ok_or_else(|| {
                    conversion(order, declared, raw.clone(), "value is not an object")
                })?;
                let mut values = BTreeMap::new();
                for field in fields {
                    let value = match object.get(&field.key) {
                        Some(inner) => self
                            .decode_value(order, &field.tag, inner)
                            .map_err(nested(format!(".{}", field.key)))?,
                        None => field.tag.zero_value(),
                    };
                    values.insert(field.key.clone(), value);
                }
                Ok(Value::Struct(values))
            }
            TypeTag::Slice(elem) => {
                let items = raw.as_array().ok_or_else(|| {
                    conversion(order, declared, raw.clone(), "value is not an array")
                })?;
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        self.decode_value(order, elem, item)
                            .map_err(nested(format!(".[]{elem}.${}", index + 1)))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Slice)
            }
            TypeTag::Array { len, elem } => {
                let items = raw.as_array().ok_or_else(|| {
                    conversion(order, declared, raw.clone(), "value is not an array")
                })?;
                if items.len() > *len {
                    return Err(conversion(
                        order,
                        declared,
                        raw.clone(),
                        "array index out of range",
                    ));
                }
                let mut values = Vec::with_capacity(*len);
                for (index, item) in items.iter().enumerate() {
                    values.push(
                        self.decode_value(order, elem, item)
                            .map_err(nested(format!(".[{len}]{elem}.${}", index + 1)))?,
                    );
                }
                values.resize_with(*len, || elem.zero_value());
                Ok(Value::Array(values))
            }
        }
    }
}

fn conversion(
    order: usize,
    declared: &TypeTag,
    value: serde_json::Value,
    reason: impl Into<String>,
) -> WireError {
    WireError::Conversion(ConversionError {
        order,
        kind: declared.kind().to_string(),
        value,
        path: String::new(),
        reason: reason.into(),
    })
}

/// Prefixes a nested conversion error's path with the segment of the
/// enclosing container.
fn nested(segment: String) -> impl FnOnce(WireError) -> WireError {
    move |err| match err {
        WireError::Conversion(mut inner) => {
            inner.path = format!("{segment}{}", inner.path);
            WireError::Conversion(inner)
        }
        other => other,
    }
}

/// Integers are written as JSON integers rather than floating point, so
/// 64-bit values keep full precision. Peers that send floats still decode
/// through [`decode_int`].
fn encode_int(
    order: usize,
    declared: &TypeTag,
    kind: IntKind,
    n: i128,
) -> Result<serde_json::Value, WireError> {
    let (min, max) = kind.bounds();
    if n < min || n > max {
        return Err(conversion(
            order,
            declared,
            serde_json::Value::Null,
            format!("value {n} is out of range for {}", kind.as_str()),
        ));
    }
    Ok(if n < 0 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Value::from(n as u64)
    })
}

/// Integers accept any JSON number; fractional values truncate toward zero.
fn decode_int(
    order: usize,
    declared: &TypeTag,
    kind: IntKind,
    raw: &serde_json::Value,
) -> Result<Value, WireError> {
    let n: i128 = if let Some(n) = raw.as_i64() {
        n as i128
    } else if let Some(n) = raw.as_u64() {
        n as i128
    } else if let Some(f) = raw.as_f64().filter(|f| f.is_finite()) {
        f.trunc() as i128
    } else {
        return Err(conversion(order, declared, raw.clone(), "value is not a number"));
    };

    let (min, max) = kind.bounds();
    if n < min || n > max {
        return Err(conversion(
            order,
            declared,
            raw.clone(),
            format!("value is out of range for {}", kind.as_str()),
        ));
    }

    Ok(if kind.is_signed() {
        Value::Int(n as i64)
    } else {
        Value::Uint(n as u64)
    })
}
