//! Constraint engine.
//!
//! A [`Constraint`] is a named predicate over a prospective property value.
//! It either passes or yields a [`Violation`] carrying a human readable
//! reason. Constraints flagged `eval_on_init` gate instantiation; the others
//! (multiplicities, for instance) are only evaluated on explicit checks.
//!
//! A [`StateConstraint`] is a named predicate over a whole clabject and is
//! never evaluated automatically.

// used to print out readable forms of constraints and their violations
use std::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

// clabject sets are kept as bitmaps over clabject ids
use roaring::RoaringTreemap;
use regex::Regex;
use lazy_static::lazy_static;

use crate::datatype::{Clabject, Value, ValueKind};
use crate::error::{ClabjectError, Result};

/// Read-only view on the instantiation chain, as needed by constraints
/// that reason about how a value relates to its ancestors.
pub trait Lineage {
    /// The clabject `clabject` was generated from, `None` for the origin
    /// (or for a handle the lineage does not know).
    fn generated_from(&self, clabject: &Clabject) -> Option<Clabject>;
    /// Current value of a property of a clabject, `None` while unset.
    fn value_of(&self, clabject: &Clabject, property: &str) -> Result<Option<Value>>;
}

// ------------- Violation -------------
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Violation {
    constraint: String,
    reason: String,
}
impl Violation {
    pub fn new(constraint: &str, reason: &str) -> Self {
        Self {
            constraint: constraint.to_owned(),
            reason: reason.to_owned(),
        }
    }
    pub fn constraint(&self) -> &str {
        &self.constraint
    }
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}' for reason '{}'", self.constraint, self.reason)
    }
}

/// All violated constraints of one operation, keyed by property name.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct ViolationReport {
    violations: BTreeMap<String, Vec<Violation>>,
}
impl ViolationReport {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
    /// Number of properties with at least one violation.
    pub fn len(&self) -> usize {
        self.violations.len()
    }
    pub fn add(&mut self, property: &str, violations: Vec<Violation>) {
        if !violations.is_empty() {
            self.violations
                .entry(property.to_owned())
                .or_default()
                .extend(violations);
        }
    }
    pub fn merge(&mut self, other: ViolationReport) {
        for (property, violations) in other.violations {
            self.add(&property, violations);
        }
    }
    pub fn get(&self, property: &str) -> Option<&[Violation]> {
        self.violations.get(property).map(Vec::as_slice)
    }
    pub fn contains(&self, property: &str) -> bool {
        self.violations.contains_key(property)
    }
    pub fn constraint_names(&self, property: &str) -> Vec<&str> {
        self.get(property)
            .map(|vs| vs.iter().map(Violation::constraint).collect())
            .unwrap_or_default()
    }
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.violations.keys().map(String::as_str)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Violation])> {
        self.violations
            .iter()
            .map(|(p, vs)| (p.as_str(), vs.as_slice()))
    }
}
impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (property, violations) in &self.violations {
            for violation in violations {
                writeln!(f, "'{}' violated {}", property, violation)?;
            }
        }
        Ok(())
    }
}

// ------------- Constraint -------------
pub type CheckFn = dyn Fn(&Value, &dyn Lineage) -> std::result::Result<(), String> + Send + Sync;

#[derive(Clone)]
pub struct Constraint {
    name: Arc<str>,
    eval_on_init: bool,
    type_specific: bool,
    check: Arc<CheckFn>,
}

impl Constraint {
    /// The check returns `Err(reason)` for values that violate the constraint.
    pub fn new<F>(name: &str, eval_on_init: bool, check: F) -> Self
    where
        F: Fn(&Value, &dyn Lineage) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            eval_on_init,
            type_specific: false,
            check: Arc::new(check),
        }
    }
    /// Shorthand for constraints that look at the value alone.
    pub fn on_value<F>(name: &str, eval_on_init: bool, check: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self::new(name, eval_on_init, move |value, _| check(value))
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn eval_on_init(&self) -> bool {
        self.eval_on_init
    }
    pub fn is_type_specific(&self) -> bool {
        self.type_specific
    }
    pub fn with_eval_on_init(&self, eval_on_init: bool) -> Self {
        Self {
            eval_on_init,
            ..self.clone()
        }
    }
    pub(crate) fn as_type_specific(&self) -> Self {
        Self {
            type_specific: true,
            ..self.clone()
        }
    }
    pub fn evaluate(&self, value: &Value, lineage: &dyn Lineage) -> std::result::Result<(), Violation> {
        (self.check)(value, lineage).map_err(|reason| {
            if reason.is_empty() {
                Violation::new(&self.name, &format!("{} is not satisfied by {}", self.name, value))
            } else {
                Violation::new(&self.name, &reason)
            }
        })
    }
}
impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.check, &other.check)
    }
}
impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("eval_on_init", &self.eval_on_init)
            .field("type_specific", &self.type_specific)
            .finish()
    }
}
impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ------------- StateConstraint -------------
pub type StateCheckFn = dyn Fn(&dyn Lineage, &Clabject) -> std::result::Result<(), String> + Send + Sync;

/// A predicate over the current state of a whole clabject.
#[derive(Clone)]
pub struct StateConstraint {
    name: Arc<str>,
    check: Arc<StateCheckFn>,
}
impl StateConstraint {
    pub fn new<F>(name: &str, check: F) -> Self
    where
        F: Fn(&dyn Lineage, &Clabject) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            check: Arc::new(check),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn evaluate(&self, lineage: &dyn Lineage, clabject: &Clabject) -> std::result::Result<(), String> {
        (self.check)(lineage, clabject).map_err(|reason| {
            if reason.is_empty() {
                format!("{} is not satisfied by {}", self.name, clabject)
            } else {
                reason
            }
        })
    }
}
impl PartialEq for StateConstraint {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.check, &other.check)
    }
}
impl fmt::Debug for StateConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StateConstraint").field("name", &self.name).finish()
    }
}

// ------------- Combinators -------------
/// Both constraints must hold. Only the reasons of the operands that
/// failed on this very value are reported.
pub fn and(a: &Constraint, b: &Constraint) -> Constraint {
    let (ca, cb) = (a.clone(), b.clone());
    Constraint::new(
        &format!("{}_AND_{}", a.name(), b.name()),
        a.eval_on_init() && b.eval_on_init(),
        move |value, lineage| {
            let reasons: Vec<String> = [ca.evaluate(value, lineage), cb.evaluate(value, lineage)]
                .into_iter()
                .filter_map(|r| r.err().map(|v| v.reason().to_owned()))
                .collect();
            if reasons.is_empty() {
                Ok(())
            } else {
                Err(reasons.join("; "))
            }
        },
    )
}

/// At least one of the constraints must hold.
pub fn or(a: &Constraint, b: &Constraint) -> Constraint {
    let (ca, cb) = (a.clone(), b.clone());
    Constraint::new(
        &format!("{}_OR_{}", a.name(), b.name()),
        a.eval_on_init() && b.eval_on_init(),
        move |value, lineage| match (ca.evaluate(value, lineage), cb.evaluate(value, lineage)) {
            (Err(va), Err(vb)) => Err(format!("{}; {}", va.reason(), vb.reason())),
            _ => Ok(()),
        },
    )
}

/// Relaxes a constraint so that it also accepts [`Value::Empty`].
pub fn optional(constraint: &Constraint) -> Constraint {
    let inner = constraint.clone();
    Constraint::new(
        &format!("{}_OR_Empty", constraint.name()),
        constraint.eval_on_init(),
        move |value, lineage| {
            if value.is_empty_marker() {
                return Ok(());
            }
            inner
                .evaluate(value, lineage)
                .map_err(|v| format!("{} or an EmptyValue", v.reason()))
        },
    )
}

// ------------- Type constraints -------------
pub fn is_of(kind: ValueKind) -> Constraint {
    Constraint::on_value(&format!("is_of_{}", kind.data_type()), true, move |value| {
        if value.kind() == kind {
            Ok(())
        } else {
            Err(format!("{} is not of the expected type {}", value, kind.data_type()))
        }
    })
}

fn can_be_bound_as_method() -> Constraint {
    Constraint::on_value("can_be_method", true, |value| match value {
        Value::Method(m) if m.params() == 0 => {
            Err(format!("The signature of method {} takes no parameters", m.name()))
        }
        Value::Method(_) => Ok(()),
        other => Err(format!("The given value {} is not a method", other)),
    })
}

fn is_collection() -> Constraint {
    Constraint::on_value("is_collection", true, |value| match value {
        Value::Collection(_) => Ok(()),
        other => Err(format!("{} is not a collection", other)),
    })
}

fn is_not_negative() -> Constraint {
    Constraint::on_value("is_not_negative", true, |value| {
        let negative = match value {
            Value::Int(i) => *i < 0,
            Value::Float(x) => *x < 0.0,
            Value::Decimal(d) => d < &bigdecimal::BigDecimal::from(0),
            Value::Duration(d) => *d < chrono::TimeDelta::zero(),
            other => return Err(format!("{} is not a number", other)),
        };
        if negative {
            Err("The value must not be < 0".to_owned())
        } else {
            Ok(())
        }
    })
}

fn is_clabject_or_empty() -> Constraint {
    optional(&Constraint::on_value("is_a_clabject", true, |value| match value {
        Value::Clabject(_) => Ok(()),
        other => Err(ClabjectError::NotAClabject(other.to_string()).to_string()),
    }))
}

lazy_static! {
    pub static ref IS_STR: Constraint = is_of(ValueKind::Str);
    pub static ref IS_INT: Constraint = is_of(ValueKind::Int);
    pub static ref IS_FLOAT: Constraint = is_of(ValueKind::Float);
    pub static ref IS_BOOL: Constraint = is_of(ValueKind::Bool);
    pub static ref IS_DATE: Constraint = is_of(ValueKind::Date);
    pub static ref IS_DATETIME: Constraint = is_of(ValueKind::DateTime);
    pub static ref IS_DURATION: Constraint = is_of(ValueKind::Duration);
    pub static ref IS_DECIMAL: Constraint = is_of(ValueKind::Decimal);
    pub static ref IS_METHOD: Constraint = is_of(ValueKind::Method);
    pub static ref IS_STATE_CONSTRAINT: Constraint = is_of(ValueKind::StateConstraint).as_type_specific();
    pub static ref IS_COLLECTION: Constraint = is_collection().as_type_specific();
    pub static ref CAN_BE_METHOD: Constraint = can_be_bound_as_method().as_type_specific();
    pub static ref IS_CLABJECT_OR_EMPTY: Constraint = is_clabject_or_empty().as_type_specific();
    pub static ref IS_NOT_NEGATIVE: Constraint = is_not_negative();
    pub static ref IS_NOT_NEGATIVE_INT: Constraint = and(&IS_NOT_NEGATIVE, &IS_INT);
}

pub fn value_in_set(expected: Vec<Value>) -> Constraint {
    Constraint::on_value("is_in_set", true, move |value| {
        if expected.contains(value) {
            Ok(())
        } else {
            Err(format!("The value {} is not in the expected set {}", value, Value::Collection(expected.clone())))
        }
    })
}

/// Strings must match the given regular expression.
pub fn matches_pattern(pattern: &str) -> Result<Constraint> {
    let regex = Regex::new(pattern).map_err(|e| ClabjectError::InvalidPattern(e.to_string()))?;
    Ok(Constraint::on_value(&format!("matches_{}", pattern), true, move |value| match value {
        Value::Str(s) if regex.is_match(s) => Ok(()),
        Value::Str(s) => Err(format!("'{}' does not match {}", s, regex.as_str())),
        other => Err(format!("{} is not of the expected type String", other)),
    }))
}

// ------------- Collections -------------
pub type MemberFilter = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Member count must lie within `[min, max]`, `max` of `None` meaning
/// unbounded. Not init-gating: collections are usually filled up after
/// they are instantiated.
pub fn collection_multiplicity(min: usize, max: Option<usize>) -> Result<Constraint> {
    if let Some(max) = max {
        if min > max {
            return Err(ClabjectError::InvalidMultiplicity {
                min,
                max: max.to_string(),
            });
        }
    }
    let max_str = max.map(|m| m.to_string()).unwrap_or_else(|| "*".to_owned());
    Ok(Constraint::on_value(
        &format!("collection_multiplicity_between_{}_and_{}", min, max_str),
        false,
        move |value| match value {
            Value::Collection(members) => {
                let n = members.len();
                if n < min || max.is_some_and(|max| n > max) {
                    Err(format!("The collection holds {} members", n))
                } else {
                    Ok(())
                }
            }
            other => Err(format!("The given value {} is no collection", other)),
        },
    ))
}

/// Applies `inner` to every (optionally filtered) member of a collection
/// value and aggregates the member violations.
pub fn collection_member(inner: &Constraint, filter: Option<MemberFilter>) -> Constraint {
    let inner_constraint = inner.clone();
    Constraint::new(
        &format!("check_{}_on_collection_members", inner.name()),
        true,
        move |value, lineage| {
            let members = match value {
                Value::Collection(members) => members,
                other => return Err(format!("{} is not a collection", other)),
            };
            let mut reasons = Vec::new();
            for member in members {
                if filter.as_ref().is_some_and(|keep| !keep(member)) {
                    continue;
                }
                if let Err(v) = inner_constraint.evaluate(member, lineage) {
                    reasons.push(format!("Member {} failed for reason: {}", member, v.reason()));
                }
            }
            if reasons.is_empty() {
                Ok(())
            } else {
                Err(reasons.join("\n"))
            }
        },
    )
}

// ------------- Lineage constraints -------------
/// Accepted number of instantiation steps between a value and the
/// clabject it should be an instance of.
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum Order {
    Any,
    Exactly(u32),
    Between(u32, u32),
}
impl Order {
    fn bounds(self) -> Result<(u32, Option<u32>)> {
        match self {
            Order::Any => Ok((1, None)),
            Order::Exactly(n) if n > 0 => Ok((n, Some(n))),
            Order::Between(min, max) if min > 0 && min <= max => Ok((min, Some(max))),
            invalid => Err(ClabjectError::InvalidInstantiationOrder(format!("{:?}", invalid))),
        }
    }
}
impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Order::Any => write!(f, "any"),
            Order::Exactly(n) => write!(f, "{}", n),
            Order::Between(min, max) => write!(f, "between_{}_and_{}", min, max),
        }
    }
}

/// The value must be a clabject that reaches `expected` by walking its
/// instance-of chain an accepted number of times.
pub fn instance_of_order(expected: &Clabject, order: Order) -> Result<Constraint> {
    let (min, max) = order.bounds()?;
    let target = expected.clone();
    Ok(Constraint::new(
        &format!("{}_order_instance_of_{}", order, expected),
        true,
        move |value, lineage| {
            let mut current = match value {
                Value::Clabject(c) => c.clone(),
                other => return Err(ClabjectError::NotAClabject(other.to_string()).to_string()),
            };
            let mut steps = 0;
            while steps < min {
                if current.is_origin() || current == target {
                    return Err("Instantiation order of the given clabject is too low".to_owned());
                }
                current = match lineage.generated_from(&current) {
                    Some(c) => c,
                    None => return Err("Instantiation order of the given clabject is too low".to_owned()),
                };
                steps += 1;
            }
            while !current.is_origin() && max.is_none_or(|max| steps <= max) {
                if current == target {
                    return Ok(());
                }
                current = match lineage.generated_from(&current) {
                    Some(c) => c,
                    None => break,
                };
                steps += 1;
            }
            Err("Instantiation order of the given clabject is too high".to_owned())
        },
    ))
}

/// The value must be a clabject whose `order`-th ancestor is one of `expected`.
pub fn instance_of_any(expected: &[Clabject], order: u32) -> Result<Constraint> {
    if order == 0 {
        return Err(ClabjectError::InvalidInstantiationOrder(order.to_string()));
    }
    let mut accepted = RoaringTreemap::new();
    let mut names: Vec<&str> = Vec::new();
    for c in expected {
        accepted.insert(c.id());
        names.push(c.name());
    }
    names.sort_unstable();
    Ok(Constraint::new(
        &format!("{}_order_instance_of_one_of_{{{}}}", order, names.join(",")),
        true,
        move |value, lineage| {
            let mut current = match value {
                Value::Clabject(c) => c.clone(),
                other => return Err(ClabjectError::NotAClabject(other.to_string()).to_string()),
            };
            for _ in 0..order {
                current = match lineage.generated_from(&current) {
                    Some(c) => c,
                    None => break,
                };
            }
            if accepted.contains(current.id()) {
                Ok(())
            } else {
                Err(format!(
                    "The given clabject {} is not a {} order instance of any of the accepted clabjects",
                    value, order
                ))
            }
        },
    ))
}

// ------------- Re-initialization -------------
// names of the constraints a property kind pins to its properties
fn is_kind_constraint(name: &str) -> bool {
    [&*IS_COLLECTION, &*CAN_BE_METHOD, &*IS_CLABJECT_OR_EMPTY, &*IS_STATE_CONSTRAINT]
        .iter()
        .any(|k| k.name() == name)
}

/// Pending instruction to clear a property's value and swap part of its
/// constraints on the next instantiation step.
#[derive(Clone, Debug, Default)]
pub struct ReInit {
    remove: Vec<String>,
    add: Vec<Constraint>,
}
impl ReInit {
    pub fn new(remove: &[Constraint], add: Vec<Constraint>) -> Result<Self> {
        if let Some(c) = remove.iter().find(|c| c.is_type_specific() || is_kind_constraint(c.name())) {
            return Err(ClabjectError::TypeSpecificConstraintRemoval(c.name().to_owned()));
        }
        Ok(Self {
            remove: remove.iter().map(|c| c.name().to_owned()).collect(),
            add,
        })
    }
    pub fn removing(&self) -> &[String] {
        &self.remove
    }
    pub fn adding(&self) -> &[Constraint] {
        &self.add
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat;
    impl Lineage for Flat {
        fn generated_from(&self, _: &Clabject) -> Option<Clabject> {
            None
        }
        fn value_of(&self, _: &Clabject, _: &str) -> Result<Option<Value>> {
            Ok(None)
        }
    }

    #[test]
    fn and_reports_only_failing_operands() {
        let both = and(&IS_NOT_NEGATIVE, &IS_INT);
        let violation = both.evaluate(&Value::Float(1.5), &Flat).unwrap_err();
        assert!(violation.reason().contains("i64"));
        assert!(!violation.reason().contains("< 0"));
        assert!(both.evaluate(&Value::Int(3), &Flat).is_ok());
        assert!(both.eval_on_init());
    }

    #[test]
    fn or_passes_if_either_passes() {
        let either = or(&IS_INT, &IS_STR);
        assert!(either.evaluate(&Value::Int(1), &Flat).is_ok());
        assert!(either.evaluate(&"x".into(), &Flat).is_ok());
        assert!(either.evaluate(&Value::Bool(true), &Flat).is_err());
    }

    #[test]
    fn disjunction_is_init_gating_only_if_both_are() {
        let lax = collection_multiplicity(0, Some(2)).unwrap();
        assert!(!or(&IS_COLLECTION, &lax).eval_on_init());
        assert!(!and(&IS_COLLECTION, &lax).eval_on_init());
    }

    #[test]
    fn optional_accepts_empty_marker() {
        let maybe_int = optional(&IS_INT);
        assert!(maybe_int.evaluate(&Value::Empty, &Flat).is_ok());
        let violation = maybe_int.evaluate(&"x".into(), &Flat).unwrap_err();
        assert!(violation.reason().ends_with("or an EmptyValue"));
        assert_eq!(maybe_int.name(), "is_of_i64_OR_Empty");
    }

    #[test]
    fn multiplicity_bounds_fail_fast() {
        assert!(matches!(
            collection_multiplicity(3, Some(2)),
            Err(ClabjectError::InvalidMultiplicity { .. })
        ));
        let two_to_four = collection_multiplicity(2, Some(4)).unwrap();
        assert!(!two_to_four.eval_on_init());
        assert!(two_to_four.evaluate(&Value::collection([1, 2]), &Flat).is_ok());
        assert!(two_to_four.evaluate(&Value::collection([1]), &Flat).is_err());
        let unbounded = collection_multiplicity(1, None).unwrap();
        assert!(unbounded.evaluate(&Value::collection(0..100), &Flat).is_ok());
    }

    #[test]
    fn member_constraint_aggregates_and_filters() {
        let ints = collection_member(&IS_INT, None);
        let violation = ints
            .evaluate(&Value::collection([Value::Int(1), "a".into(), "b".into()]), &Flat)
            .unwrap_err();
        assert_eq!(violation.reason().lines().count(), 2);

        let keep_strings: MemberFilter = Arc::new(|m| matches!(m, Value::Str(_)));
        let strings = collection_member(&IS_STR, Some(keep_strings));
        assert!(strings.evaluate(&Value::collection([Value::Int(1), "a".into()]), &Flat).is_ok());
    }

    #[test]
    fn malformed_orders_are_rejected_at_construction() {
        let c = Clabject::new(1, "A");
        assert!(instance_of_order(&c, Order::Exactly(0)).is_err());
        assert!(instance_of_order(&c, Order::Between(3, 2)).is_err());
        assert!(instance_of_order(&c, Order::Between(0, 2)).is_err());
        assert!(instance_of_order(&c, Order::Any).is_ok());
        assert!(instance_of_any(&[c], 0).is_err());
    }

    #[test]
    fn lineage_constraints_reject_non_clabjects() {
        let c = Clabject::new(1, "A");
        let constraint = instance_of_order(&c, Order::Any).unwrap();
        let violation = constraint.evaluate(&Value::Int(34), &Flat).unwrap_err();
        assert!(violation.reason().contains("not a clabject"));
    }

    #[test]
    fn type_specific_constraints_cannot_be_scheduled_for_removal() {
        for pinned in [&*IS_COLLECTION, &*CAN_BE_METHOD, &*IS_CLABJECT_OR_EMPTY, &*IS_STATE_CONSTRAINT] {
            assert!(pinned.is_type_specific());
            assert!(matches!(
                ReInit::new(&[pinned.clone()], vec![]),
                Err(ClabjectError::TypeSpecificConstraintRemoval(_))
            ));
        }
        let look_alike = Constraint::on_value("can_be_method", true, |_| Ok(()));
        assert!(!look_alike.is_type_specific());
        assert!(matches!(
            ReInit::new(&[look_alike], vec![]),
            Err(ClabjectError::TypeSpecificConstraintRemoval(ref name)) if name == "can_be_method"
        ));
        let directive = ReInit::new(&[IS_STR.clone()], vec![IS_INT.clone()]).unwrap();
        assert_eq!(directive.removing(), ["is_of_String".to_owned()]);
    }

    #[test]
    fn pattern_constraint() {
        let upper = matches_pattern("^[A-Z]").unwrap();
        assert!(upper.evaluate(&"Collie".into(), &Flat).is_ok());
        assert!(upper.evaluate(&"collie".into(), &Flat).is_err());
        assert!(matches_pattern("(").is_err());
    }
}
