use crate::wire::{RemoteValue, TypeTag, Value, WireError};

/// An ordered group of [`RemoteValue`]s: a method's parameter list or its
/// return list.
///
/// Positions are 0-based here; the codec shifts them to the 1-based wire
/// `order`.
pub trait RemoteTuple: Sized {
    const LEN: usize;

    fn type_tags() -> Vec<TypeTag>;

    fn into_values(self) -> Vec<Value>;

    fn from_values(values: Vec<Value>) -> Result<Self, WireError>;
}

macro_rules! impl_remote_tuple {
    ($len:expr; $($ty:ident $var:ident),*) => {
        impl<$($ty: RemoteValue),*> RemoteTuple for ($($ty,)*) {
            const LEN: usize = $len;

            fn type_tags() -> Vec<TypeTag> {
                vec![$($ty::type_tag()),*]
            }

            fn into_values(self) -> Vec<Value> {
                let ($($var,)*) = self;
                vec![$($var.into_value()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn from_values(values: Vec<Value>) -> Result<Self, WireError> {
                let actual = values.len();
                if actual != $len {
                    return Err(WireError::Arity {
                        expected: $len,
                        actual,
                    });
                }
                let mut values = values.into_iter();
                Ok(($(
                    $ty::from_value(values.next().ok_or(WireError::Arity {
                        expected: $len,
                        actual,
                    })?)?,
                )*))
            }
        }
    };
}

impl_remote_tuple!(0;);
impl_remote_tuple!(1; A a);
impl_remote_tuple!(2; A a, B b);
impl_remote_tuple!(3; A a, B b, C c);
impl_remote_tuple!(4; A a, B b, C c, D d);
impl_remote_tuple!(5; A a, B b, C c, D d, E e);
impl_remote_tuple!(6; A a, B b, C c, D d, E e, F f);
impl_remote_tuple!(7; A a, B b, C c, D d, E e, F f, G g);
impl_remote_tuple!(8; A a, B b, C c, D d, E e, F f, G g, H h);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::RemoteError;

    #[test]
    fn tuple_reports_ordered_type_tags() {
        let tags = <(String, Result<(), RemoteError>)>::type_tags();
        let kinds: Vec<&str> = tags.iter().map(TypeTag::kind).collect();
        assert_eq!(kinds, vec!["string", "error"]);
    }

    #[test]
    fn tuple_rejects_wrong_arity() {
        let err = <(i64, i64)>::from_values(vec![Value::Int(1)]).unwrap_err();
        assert_eq!(
            err,
            WireError::Arity {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn unit_tuple_is_empty() {
        assert_eq!(<()>::LEN, 0);
        assert!(().into_values().is_empty());
        assert!(<()>::from_values(Vec::new()).is_ok());
    }
}
