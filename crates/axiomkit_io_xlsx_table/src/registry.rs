//! Rule and predicate registries.
//!
//! Both registries are shared catalogs guarded by a mutex held for the whole
//! read-modify-write of every access. [`Registry`] bundles one of each behind
//! `Arc`s so files and sheets can keep a cheap handle to the same catalog.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;
use once_cell::sync::Lazy;

use crate::conf::{
    C_PRED_ALWAYS, C_PRED_NEVER, C_PRED_NIL, C_PRED_NOT_NIL, C_PRED_NOT_ZERO, C_PRED_ZERO,
    derive_default_rules,
};
use crate::predicate::{IntoPredicate, SpecPredicate};
use crate::spec::{SpecCellStyle, SpecFieldValue, SpecRule};

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

////////////////////////////////////////////////////////////////////////////////
// #region RuleRegistry

/// Ordered rule list, sorted by priority ascending (stable).
#[derive(Debug, Default)]
pub struct RuleRegistry {
    l_rules: Mutex<Vec<SpecRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule and re-sort. Tags need not be unique.
    pub fn register(&self, priority: i64, tag: impl Into<String>, style: SpecCellStyle) {
        let tag = tag.into();
        debug!("register rule: priority={priority} tag={tag}");

        let mut l_rules = lock_ignoring_poison(&self.l_rules);
        l_rules.push(SpecRule {
            priority,
            tag,
            style,
        });
        l_rules.sort_by_key(|rule| rule.priority);
    }

    /// Remove all rules.
    pub fn clear(&self) {
        lock_ignoring_poison(&self.l_rules).clear();
    }

    /// Atomic copy of the current rule list, in evaluation order.
    pub fn snapshot(&self) -> Vec<SpecRule> {
        lock_ignoring_poison(&self.l_rules).clone()
    }

    pub fn len(&self) -> usize {
        lock_ignoring_poison(&self.l_rules).len()
    }

    pub fn is_empty(&self) -> bool {
        lock_ignoring_poison(&self.l_rules).is_empty()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PredicateRegistry

/// Predicate catalog keyed by name; the last registration for a name wins.
#[derive(Debug, Default)]
pub struct PredicateRegistry {
    dict_predicates: Mutex<BTreeMap<String, SpecPredicate>>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a nullary `Fn() -> bool` or unary `Fn(T) -> bool` under `name`:
    ///
    /// ```
    /// use axiomkit_io_xlsx_table::PredicateRegistry;
    ///
    /// let predicates = PredicateRegistry::new();
    /// predicates.register("isAlice", |name: String| name == "Alice");
    /// assert!(predicates.contains("isAlice"));
    /// ```
    pub fn register<M>(&self, name: impl Into<String>, pred: impl IntoPredicate<M>) {
        self.insert(name, pred.into_predicate());
    }

    /// Register an already wrapped predicate.
    pub fn insert(&self, name: impl Into<String>, pred: SpecPredicate) {
        let name = name.into();
        debug!("register predicate: {name} ({:?})", pred.arity());
        lock_ignoring_poison(&self.dict_predicates).insert(name, pred);
    }

    /// Predicate registered under `name`.
    pub fn get(&self, name: &str) -> Option<SpecPredicate> {
        lock_ignoring_poison(&self.dict_predicates).get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        lock_ignoring_poison(&self.dict_predicates).contains_key(name)
    }

    /// Remove all predicates.
    pub fn clear(&self) {
        lock_ignoring_poison(&self.dict_predicates).clear();
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        lock_ignoring_poison(&self.dict_predicates)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        lock_ignoring_poison(&self.dict_predicates).len()
    }

    pub fn is_empty(&self) -> bool {
        lock_ignoring_poison(&self.dict_predicates).is_empty()
    }
}

/// Build the built-in predicates: `always`, `never`, `zero`, `notZero`, `nil`, `notNil`.
pub fn derive_default_predicates() -> Vec<(&'static str, SpecPredicate)> {
    vec![
        (C_PRED_ALWAYS, SpecPredicate::new(|| true)),
        (C_PRED_NEVER, SpecPredicate::new(|| false)),
        (
            C_PRED_ZERO,
            SpecPredicate::new(|field: SpecFieldValue| field.is_zero()),
        ),
        (
            C_PRED_NOT_ZERO,
            SpecPredicate::new(|field: SpecFieldValue| !field.is_zero()),
        ),
        (
            C_PRED_NIL,
            SpecPredicate::new(|field: SpecFieldValue| field.is_nil()),
        ),
        (
            C_PRED_NOT_NIL,
            SpecPredicate::new(|field: SpecFieldValue| !field.is_nil()),
        ),
    ]
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Registry

/// Shared handle to one rule registry and one predicate registry.
///
/// Clones share the same underlying catalogs.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rules: Arc<RuleRegistry>,
    predicates: Arc<PredicateRegistry>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the `warn`/`error` rules and built-in predicates.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        for rule in derive_default_rules() {
            registry.register_rule(rule.priority, rule.tag, rule.style);
        }
        for (name, pred) in derive_default_predicates() {
            registry.predicates.insert(name, pred);
        }
        registry
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn predicates(&self) -> &PredicateRegistry {
        &self.predicates
    }

    /// See [`RuleRegistry::register`].
    pub fn register_rule(&self, priority: i64, tag: impl Into<String>, style: SpecCellStyle) {
        self.rules.register(priority, tag, style);
    }

    /// See [`PredicateRegistry::register`].
    pub fn register_predicate<M>(&self, name: impl Into<String>, pred: impl IntoPredicate<M>) {
        self.predicates.register(name, pred);
    }

    pub fn clear_rules(&self) {
        self.rules.clear();
    }

    pub fn clear_predicates(&self) {
        self.predicates.clear();
    }
}

static REGISTRY_GLOBAL: Lazy<Registry> = Lazy::new(Registry::with_defaults);

/// Process-wide registry, created with defaults on first use.
///
/// Convenience for callers without their own wiring; the engine itself only
/// ever uses the registry it is handed.
pub fn global() -> &'static Registry {
    &REGISTRY_GLOBAL
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
