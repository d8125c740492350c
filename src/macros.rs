/// Implements [`RemoteValue`](crate::RemoteValue) for a plain struct so it can
/// cross the wire as a field-keyed object.
///
/// Each field names the wire key it is marshaled under. Keys missing from an
/// incoming object decode to the field type's zero value.
///
/// ```rust
/// use rioc::{RemoteValue, TypeTag, remote_struct};
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Sub {
///     pub float: f64,
/// }
///
/// remote_struct!(Sub { float: f64 => "float" });
///
/// assert!(matches!(Sub::type_tag(), TypeTag::Struct { .. }));
/// ```
///
/// Self-referential structs are not supported; their type tag would never
/// finish building.
#[macro_export]
macro_rules! remote_struct {
    ($ty:ident { $($field:ident : $fty:ty => $key:literal),* $(,)? }) => {
        impl $crate::RemoteValue for $ty {
            fn type_tag() -> $crate::TypeTag {
                $crate::TypeTag::Struct {
                    name: ::std::string::String::from(stringify!($ty)),
                    fields: ::std::vec![
                        $($crate::FieldTag::new(
                            $key,
                            <$fty as $crate::RemoteValue>::type_tag(),
                        )),*
                    ],
                }
            }

            #[allow(unused_mut)]
            fn into_value(self) -> $crate::Value {
                let mut fields = ::std::collections::BTreeMap::new();
                $(
                    fields.insert(
                        ::std::string::String::from($key),
                        $crate::RemoteValue::into_value(self.$field),
                    );
                )*
                $crate::Value::Struct(fields)
            }

            #[allow(unused_mut, unused_variables)]
            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::WireError> {
                match value {
                    $crate::Value::Struct(mut fields) => Ok(Self {
                        $(
                            $field: <$fty as $crate::RemoteValue>::from_value(
                                fields.remove($key).unwrap_or_else(|| {
                                    <$fty as $crate::RemoteValue>::type_tag().zero_value()
                                }),
                            )?,
                        )*
                    }),
                    other => Err($crate::WireError::mismatch(stringify!($ty), &other)),
                }
            }
        }
    };
}
