//! Record description trait and field value conversions.

use crate::predicate::SpecMethodTable;
use crate::spec::{EnumCellValue, EnumRecordShape, EnumValueKind, SpecFieldValue};

/// A type whose instances can be written as table rows.
///
/// Implementations describe their fields once ([`TableRecord::shape`]), hand
/// out field values by declaration index, and may expose named instance
/// predicates through [`TableRecord::methods`]:
///
/// ```
/// use axiomkit_io_xlsx_table::{
///     EnumRecordShape, IntoFieldValue, SpecFieldMeta, SpecFieldValue, SpecMethodTable,
///     TableRecord,
/// };
///
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// impl Person {
///     fn is_old(&self) -> bool {
///         self.age >= 75
///     }
/// }
///
/// impl TableRecord for Person {
///     fn shape() -> EnumRecordShape {
///         EnumRecordShape::Struct(vec![
///             SpecFieldMeta::tagged("Name", r#"excel:"氏名""#),
///             SpecFieldMeta::tagged("Age", r#"warn:"IsOld""#),
///         ])
///     }
///
///     fn field_value(&self, idx_field: usize) -> SpecFieldValue {
///         match idx_field {
///             0 => self.name.to_field_value(),
///             _ => self.age.to_field_value(),
///         }
///     }
///
///     fn methods() -> SpecMethodTable<Self> {
///         SpecMethodTable::new().with("IsOld", Person::is_old)
///     }
/// }
/// ```
pub trait TableRecord: Sized + 'static {
    /// Field layout in declaration order, or the scalar marker for non-aggregates.
    fn shape() -> EnumRecordShape;

    /// Value of the field at declaration index `idx_field`.
    fn field_value(&self, idx_field: usize) -> SpecFieldValue;

    /// Named instance predicates. Looked up before registry predicates.
    fn methods() -> SpecMethodTable<Self> {
        SpecMethodTable::new()
    }
}

/// Scalar types usable as record fields.
pub trait FieldScalar {
    /// Kind reported for this type.
    const KIND: EnumValueKind;

    /// Convert to a cell value.
    fn to_cell_value(&self) -> EnumCellValue;
}

/// Conversion of a field (`T` or `Option<T>`) into a [`SpecFieldValue`].
pub trait IntoFieldValue {
    /// Build the field value; optional fields record their presence.
    fn to_field_value(&self) -> SpecFieldValue;
}

macro_rules! impl_field_scalar {
    ($kind:expr, |$val:ident| $conv:expr, $($ty:ty),+ $(,)?) => {
        $(
            impl FieldScalar for $ty {
                const KIND: EnumValueKind = $kind;

                fn to_cell_value(&self) -> EnumCellValue {
                    let $val = self;
                    $conv
                }
            }

            impl IntoFieldValue for $ty {
                fn to_field_value(&self) -> SpecFieldValue {
                    SpecFieldValue {
                        kind: <$ty as FieldScalar>::KIND,
                        if_optional: false,
                        value: self.to_cell_value(),
                    }
                }
            }

            impl IntoFieldValue for Option<$ty> {
                fn to_field_value(&self) -> SpecFieldValue {
                    SpecFieldValue {
                        kind: <$ty as FieldScalar>::KIND,
                        if_optional: true,
                        value: self
                            .as_ref()
                            .map_or(EnumCellValue::None, FieldScalar::to_cell_value),
                    }
                }
            }

            impl TableRecord for $ty {
                fn shape() -> EnumRecordShape {
                    EnumRecordShape::Scalar(stringify!($ty))
                }

                fn field_value(&self, _idx_field: usize) -> SpecFieldValue {
                    self.to_field_value()
                }
            }
        )+
    };
}

impl_field_scalar!(EnumValueKind::Text, |val| EnumCellValue::String(val.clone()), String);
impl_field_scalar!(
    EnumValueKind::Integer,
    |val| EnumCellValue::Integer(i64::from(*val)),
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
);
impl_field_scalar!(
    EnumValueKind::Float,
    |val| EnumCellValue::Number(f64::from(*val)),
    f32,
    f64,
);
impl_field_scalar!(EnumValueKind::Boolean, |val| EnumCellValue::Boolean(*val), bool);

impl FieldScalar for &'static str {
    const KIND: EnumValueKind = EnumValueKind::Text;

    fn to_cell_value(&self) -> EnumCellValue {
        EnumCellValue::String((*self).to_string())
    }
}

impl IntoFieldValue for &'static str {
    fn to_field_value(&self) -> SpecFieldValue {
        SpecFieldValue {
            kind: EnumValueKind::Text,
            if_optional: false,
            value: self.to_cell_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_field_values() {
        let val = 17i32.to_field_value();
        assert_eq!(val.kind, EnumValueKind::Integer);
        assert!(!val.if_optional);
        assert_eq!(val.value, EnumCellValue::Integer(17));

        let val = "x".to_string().to_field_value();
        assert_eq!(val.value, EnumCellValue::String("x".to_string()));

        let val = 0.5f32.to_field_value();
        assert_eq!(val.value, EnumCellValue::Number(0.5));
    }

    #[test]
    fn test_optional_field_values_track_presence() {
        let val: Option<String> = None;
        let val = val.to_field_value();
        assert!(val.if_optional);
        assert!(val.is_nil());
        assert!(val.is_zero());
        assert_eq!(val.value_or_zero(), EnumCellValue::String(String::new()));

        let val = Some(String::new()).to_field_value();
        assert!(!val.is_nil());
        assert!(val.is_zero());

        let val = Some(3i64).to_field_value();
        assert!(!val.is_nil());
        assert!(!val.is_zero());
    }

    #[test]
    fn test_scalars_report_scalar_shape() {
        assert_eq!(i64::shape(), EnumRecordShape::Scalar("i64"));
        assert_eq!(String::shape(), EnumRecordShape::Scalar("String"));
    }
}
