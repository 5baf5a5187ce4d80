//! Named predicates: callable shapes, argument binding, and name resolution.
//!
//! A predicate is either a registered free function ([`SpecPredicate`]) or an
//! instance method of a record type ([`SpecMethod`]). Both come in two
//! arities: nullary (the field value is ignored) and unary (the field value is
//! converted to the declared argument type first).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::conf::C_TAG_SKIP;
use crate::error::{Result, TableError};
use crate::registry::PredicateRegistry;
use crate::spec::{EnumCellValue, EnumValueKind, SpecFieldValue};

////////////////////////////////////////////////////////////////////////////////
// #region ArgumentBinding

/// Field kinds a unary predicate accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumArgKind {
    /// Any field; the predicate receives the full field value.
    Any,
    /// Fields of this kind; absent optionals arrive as the kind's zero value.
    Value(EnumValueKind),
    /// Fields of this kind; absent optionals arrive as `None`.
    Optional(EnumValueKind),
}

impl EnumArgKind {
    /// Whether a field value can be bound to this argument.
    pub fn accepts(&self, field: &SpecFieldValue) -> bool {
        match self {
            Self::Any => true,
            Self::Value(kind) | Self::Optional(kind) => field.kind == *kind,
        }
    }
}

impl fmt::Display for EnumArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Value(kind) => write!(f, "{kind}"),
            Self::Optional(kind) => write!(f, "optional {kind}"),
        }
    }
}

/// Predicate argument types.
pub trait FromFieldValue: Sized {
    /// Field kinds this type can be bound from.
    fn arg_kind() -> EnumArgKind;

    /// Convert an accepted field value; `None` when it does not fit the type.
    fn from_field_value(field: &SpecFieldValue) -> Option<Self>;
}

impl FromFieldValue for SpecFieldValue {
    fn arg_kind() -> EnumArgKind {
        EnumArgKind::Any
    }

    fn from_field_value(field: &SpecFieldValue) -> Option<Self> {
        Some(field.clone())
    }
}

impl FromFieldValue for EnumCellValue {
    fn arg_kind() -> EnumArgKind {
        EnumArgKind::Any
    }

    fn from_field_value(field: &SpecFieldValue) -> Option<Self> {
        Some(field.value.clone())
    }
}

impl FromFieldValue for String {
    fn arg_kind() -> EnumArgKind {
        EnumArgKind::Value(EnumValueKind::Text)
    }

    fn from_field_value(field: &SpecFieldValue) -> Option<Self> {
        match field.value_or_zero() {
            EnumCellValue::String(val) => Some(val),
            _ => None,
        }
    }
}

macro_rules! impl_from_field_integer {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromFieldValue for $ty {
                fn arg_kind() -> EnumArgKind {
                    EnumArgKind::Value(EnumValueKind::Integer)
                }

                fn from_field_value(field: &SpecFieldValue) -> Option<Self> {
                    match field.value_or_zero() {
                        EnumCellValue::Integer(val) => <$ty>::try_from(val).ok(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_from_field_integer!(i8, i16, i32, i64, u8, u16, u32);

impl FromFieldValue for f64 {
    fn arg_kind() -> EnumArgKind {
        EnumArgKind::Value(EnumValueKind::Float)
    }

    fn from_field_value(field: &SpecFieldValue) -> Option<Self> {
        match field.value_or_zero() {
            EnumCellValue::Number(val) => Some(val),
            _ => None,
        }
    }
}

impl FromFieldValue for f32 {
    fn arg_kind() -> EnumArgKind {
        EnumArgKind::Value(EnumValueKind::Float)
    }

    fn from_field_value(field: &SpecFieldValue) -> Option<Self> {
        f64::from_field_value(field).map(|val| val as f32)
    }
}

impl FromFieldValue for bool {
    fn arg_kind() -> EnumArgKind {
        EnumArgKind::Value(EnumValueKind::Boolean)
    }

    fn from_field_value(field: &SpecFieldValue) -> Option<Self> {
        match field.value_or_zero() {
            EnumCellValue::Boolean(val) => Some(val),
            _ => None,
        }
    }
}

impl<T> FromFieldValue for Option<T>
where
    T: FromFieldValue,
{
    fn arg_kind() -> EnumArgKind {
        match T::arg_kind() {
            EnumArgKind::Value(kind) | EnumArgKind::Optional(kind) => EnumArgKind::Optional(kind),
            EnumArgKind::Any => EnumArgKind::Any,
        }
    }

    fn from_field_value(field: &SpecFieldValue) -> Option<Self> {
        match field.value {
            EnumCellValue::None => Some(None),
            _ => T::from_field_value(field).map(Some),
        }
    }
}

/// Declared arity of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumPredicateArity {
    /// Takes no argument.
    Nullary,
    /// Takes the field value as one argument of the given kind.
    Unary(EnumArgKind),
}

fn validate_arity(name: &str, arity: &EnumPredicateArity, field: &SpecFieldValue) -> Result<()> {
    match arity {
        EnumPredicateArity::Nullary => Ok(()),
        EnumPredicateArity::Unary(arg_kind) if arg_kind.accepts(field) => Ok(()),
        EnumPredicateArity::Unary(arg_kind) => Err(TableError::InvalidPredicate {
            name: name.to_string(),
            reason: format!(
                "expects {arg_kind} argument, field holds {}{}",
                if field.if_optional { "optional " } else { "" },
                field.kind
            ),
        }),
    }
}

fn derive_bound_result(name: &str, field: &SpecFieldValue, result: Option<bool>) -> Result<bool> {
    result.ok_or_else(|| TableError::InvalidPredicate {
        name: name.to_string(),
        reason: format!("{} {:?} does not fit the argument type", field.kind, field.value),
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RegisteredFunction

type TypePredicateFn = Arc<dyn Fn(&SpecFieldValue) -> Option<bool> + Send + Sync>;

/// Registered free-function predicate.
#[derive(Clone)]
pub struct SpecPredicate {
    arity: EnumPredicateArity,
    func: TypePredicateFn,
}

impl SpecPredicate {
    /// Wrap a nullary `Fn() -> bool` or unary `Fn(T) -> bool` closure.
    pub fn new<M>(pred: impl IntoPredicate<M>) -> Self {
        pred.into_predicate()
    }

    /// Declared arity.
    pub fn arity(&self) -> EnumPredicateArity {
        self.arity
    }

    /// Evaluate against `field`; `name` is only used for error reporting.
    pub fn call(&self, name: &str, field: &SpecFieldValue) -> Result<bool> {
        validate_arity(name, &self.arity, field)?;
        derive_bound_result(name, field, (self.func)(field))
    }
}

impl fmt::Debug for SpecPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecPredicate")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Closures convertible into a [`SpecPredicate`].
///
/// `M` is a marker distinguishing the nullary and unary forms.
pub trait IntoPredicate<M> {
    /// Perform the conversion.
    fn into_predicate(self) -> SpecPredicate;
}

impl<F> IntoPredicate<()> for F
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    fn into_predicate(self) -> SpecPredicate {
        SpecPredicate {
            arity: EnumPredicateArity::Nullary,
            func: Arc::new(move |_field: &SpecFieldValue| Some(self())),
        }
    }
}

impl<F, T> IntoPredicate<(T,)> for F
where
    F: Fn(T) -> bool + Send + Sync + 'static,
    T: FromFieldValue + 'static,
{
    fn into_predicate(self) -> SpecPredicate {
        SpecPredicate {
            arity: EnumPredicateArity::Unary(T::arg_kind()),
            func: Arc::new(move |field: &SpecFieldValue| T::from_field_value(field).map(&self)),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region InstanceMethod

type TypeMethodFn<R> = Arc<dyn Fn(&R, &SpecFieldValue) -> Option<bool> + Send + Sync>;

/// Instance predicate bound to a record at call time.
pub struct SpecMethod<R> {
    arity: EnumPredicateArity,
    func: TypeMethodFn<R>,
}

impl<R> SpecMethod<R> {
    /// Declared arity (the receiver is not counted).
    pub fn arity(&self) -> EnumPredicateArity {
        self.arity
    }

    /// Evaluate on `record` against `field`; `name` is only used for error reporting.
    pub fn call(&self, name: &str, record: &R, field: &SpecFieldValue) -> Result<bool> {
        validate_arity(name, &self.arity, field)?;
        derive_bound_result(name, field, (self.func)(record, field))
    }
}

impl<R> Clone for SpecMethod<R> {
    fn clone(&self) -> Self {
        Self {
            arity: self.arity,
            func: Arc::clone(&self.func),
        }
    }
}

impl<R> fmt::Debug for SpecMethod<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecMethod")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Functions convertible into a [`SpecMethod`]: `Fn(&R) -> bool` or `Fn(&R, T) -> bool`.
pub trait IntoMethod<R, M> {
    /// Perform the conversion.
    fn into_method(self) -> SpecMethod<R>;
}

impl<R, F> IntoMethod<R, ()> for F
where
    R: 'static,
    F: Fn(&R) -> bool + Send + Sync + 'static,
{
    fn into_method(self) -> SpecMethod<R> {
        SpecMethod {
            arity: EnumPredicateArity::Nullary,
            func: Arc::new(move |record: &R, _field: &SpecFieldValue| Some(self(record))),
        }
    }
}

impl<R, F, T> IntoMethod<R, (T,)> for F
where
    R: 'static,
    F: Fn(&R, T) -> bool + Send + Sync + 'static,
    T: FromFieldValue + 'static,
{
    fn into_method(self) -> SpecMethod<R> {
        SpecMethod {
            arity: EnumPredicateArity::Unary(T::arg_kind()),
            func: Arc::new(move |record: &R, field: &SpecFieldValue| {
                T::from_field_value(field).map(|arg| self(record, arg))
            }),
        }
    }
}

/// Instance predicates of one record type, by name.
pub struct SpecMethodTable<R> {
    dict_methods: BTreeMap<String, SpecMethod<R>>,
}

impl<R> SpecMethodTable<R> {
    /// Empty table.
    pub fn new() -> Self {
        Self {
            dict_methods: BTreeMap::new(),
        }
    }

    /// Builder-style [`Self::insert`].
    pub fn with<M>(mut self, name: impl Into<String>, method: impl IntoMethod<R, M>) -> Self {
        self.insert(name, method);
        self
    }

    /// Add or replace a method.
    pub fn insert<M>(&mut self, name: impl Into<String>, method: impl IntoMethod<R, M>) {
        self.dict_methods.insert(name.into(), method.into_method());
    }

    /// Method registered under `name`.
    pub fn get(&self, name: &str) -> Option<&SpecMethod<R>> {
        self.dict_methods.get(name)
    }

    /// Registered method names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.dict_methods.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.dict_methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict_methods.is_empty()
    }
}

impl<R> Default for SpecMethodTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for SpecMethodTable<R> {
    fn clone(&self) -> Self {
        Self {
            dict_methods: self.dict_methods.clone(),
        }
    }
}

impl<R> fmt::Debug for SpecMethodTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.dict_methods.keys()).finish()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Resolution

/// Predicate resolved from a name: instance method or registered function.
pub enum EnumResolvedPredicate<R> {
    /// Method of the record type.
    Method(SpecMethod<R>),
    /// Entry of the predicate registry.
    Function(SpecPredicate),
}

impl<R> EnumResolvedPredicate<R> {
    /// Evaluate on `record` against `field`.
    pub fn call(&self, name: &str, record: &R, field: &SpecFieldValue) -> Result<bool> {
        match self {
            Self::Method(method) => method.call(name, record, field),
            Self::Function(pred) => pred.call(name, field),
        }
    }

    /// Whether the predicate binds to the record instance.
    pub fn is_method(&self) -> bool {
        matches!(self, Self::Method(_))
    }
}

impl<R> Clone for EnumResolvedPredicate<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Method(method) => Self::Method(method.clone()),
            Self::Function(pred) => Self::Function(pred.clone()),
        }
    }
}

impl<R> fmt::Debug for EnumResolvedPredicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(method) => f.debug_tuple("Method").field(method).finish(),
            Self::Function(pred) => f.debug_tuple("Function").field(pred).finish(),
        }
    }
}

/// Whether `key` is an explicit opt-out (`""` or `"-"`).
pub fn is_opt_out_key(key: &str) -> bool {
    key.is_empty() || key == C_TAG_SKIP
}

/// Resolve `key`: instance method first, then registry.
///
/// Returns `Ok(None)` for opt-out keys and [`TableError::UnknownPredicate`]
/// when neither source knows the name.
pub fn resolve_predicate<R>(
    methods: &SpecMethodTable<R>,
    predicates: &PredicateRegistry,
    key: &str,
) -> Result<Option<EnumResolvedPredicate<R>>> {
    if is_opt_out_key(key) {
        return Ok(None);
    }
    if let Some(method) = methods.get(key) {
        return Ok(Some(EnumResolvedPredicate::Method(method.clone())));
    }
    if let Some(pred) = predicates.get(key) {
        return Ok(Some(EnumResolvedPredicate::Function(pred)));
    }
    Err(TableError::UnknownPredicate(key.to_string()))
}

/// Resolve `key` and evaluate it on `record` against `field`.
pub fn verify_by_pred<R>(
    methods: &SpecMethodTable<R>,
    predicates: &PredicateRegistry,
    record: &R,
    field: &SpecFieldValue,
    key: &str,
) -> Result<bool> {
    match resolve_predicate(methods, predicates, key)? {
        Some(pred) => pred.call(key, record, field),
        None => Ok(false),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
