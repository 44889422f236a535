// used for dates, timestamps and durations held as property values
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
// used for decimal numbers
use bigdecimal::BigDecimal;

// used to print out readable forms of a value
use std::fmt;
// clabject handles are compared and hashed by name
use std::hash::{Hash, Hasher};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::constraint::StateConstraint;
use crate::construct::Hierarchy;
use crate::error::{ClabjectError, Result};

// ------------- Clabject -------------
pub type ClabjectId = u64;

// the origin clabject every lineage starts from
pub const ORIGIN: ClabjectId = 0;
pub const ORIGIN_NAME: &str = "Clabject";

/// A cheap handle to a clabject kept in a [`Hierarchy`].
///
/// Names are unique within a hierarchy, so equality, ordering and hashing
/// all go by name.
#[derive(Clone, Debug)]
pub struct Clabject {
    id: ClabjectId,
    name: Arc<str>,
}

impl Clabject {
    pub(crate) fn new(id: ClabjectId, name: &str) -> Self {
        Self {
            id,
            name: Arc::from(name),
        }
    }
    pub fn id(&self) -> ClabjectId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn is_origin(&self) -> bool {
        self.id == ORIGIN
    }
}
impl PartialEq for Clabject {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Clabject {}
impl Hash for Clabject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
impl Ord for Clabject {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}
impl PartialOrd for Clabject {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl fmt::Display for Clabject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ------------- Method -------------
pub type MethodBody = dyn Fn(&mut Hierarchy, &Clabject, &[Value]) -> Result<Value> + Send + Sync;

/// A callable property value. The first of its `params` positional
/// parameters is always the clabject it is invoked on.
#[derive(Clone)]
pub struct Method {
    name: Arc<str>,
    params: usize,
    body: Arc<MethodBody>,
    // name of the clabject that supplied the implementation, for diagnostics only
    origin: Option<Arc<str>>,
}

impl Method {
    pub fn new<F>(name: &str, params: usize, body: F) -> Self
    where
        F: Fn(&mut Hierarchy, &Clabject, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            params,
            body: Arc::new(body),
            origin: None,
        }
    }
    /// A method that takes nothing but its target.
    pub fn unary<F>(name: &str, body: F) -> Self
    where
        F: Fn(&mut Hierarchy, &Clabject) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(name, 1, move |hierarchy, target, _| body(hierarchy, target))
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn params(&self) -> usize {
        self.params
    }
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
    pub(crate) fn with_origin(&self, origin: &str) -> Self {
        Self {
            origin: Some(Arc::from(origin)),
            ..self.clone()
        }
    }
    pub fn invoke(&self, hierarchy: &mut Hierarchy, target: &Clabject, args: &[Value]) -> Result<Value> {
        let expected = self.params.saturating_sub(1);
        if self.params == 0 || args.len() != expected {
            return Err(ClabjectError::MethodArity {
                method: self.name.to_string(),
                expected,
                given: args.len(),
            });
        }
        (self.body)(hierarchy, target, args)
    }
}
impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}
impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("origin", &self.origin)
            .finish()
    }
}
impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.params)
    }
}

// ------------- Value -------------
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub enum ValueKind {
    Empty,
    Bool,
    Int,
    Float,
    Str,
    Date,
    DateTime,
    Duration,
    Decimal,
    Clabject,
    Collection,
    Method,
    StateConstraint,
}

impl ValueKind {
    pub fn data_type(&self) -> &'static str {
        match self {
            ValueKind::Empty => "Empty",
            ValueKind::Bool => "bool",
            ValueKind::Int => "i64",
            ValueKind::Float => "f64",
            ValueKind::Str => "String",
            ValueKind::Date => "NaiveDate",
            ValueKind::DateTime => "NaiveDateTime",
            ValueKind::Duration => "TimeDelta",
            ValueKind::Decimal => "Decimal",
            ValueKind::Clabject => "Clabject",
            ValueKind::Collection => "Collection",
            ValueKind::Method => "Method",
            ValueKind::StateConstraint => "StateConstraint",
        }
    }
}

/// The value a property holds once it has been instantiated.
///
/// `Empty` is an explicit "nothing here" marker which optional constraints
/// accept; an unset property has no `Value` at all.
#[derive(Clone, Debug)]
pub enum Value {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Duration(TimeDelta),
    Decimal(BigDecimal),
    Clabject(Clabject),
    Collection(Vec<Value>),
    Method(Method),
    StateConstraint(StateConstraint),
}

impl Value {
    pub fn collection<I, V>(members: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Collection(members.into_iter().map(Into::into).collect())
    }
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Empty => ValueKind::Empty,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Date(_) => ValueKind::Date,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Duration(_) => ValueKind::Duration,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Clabject(_) => ValueKind::Clabject,
            Value::Collection(_) => ValueKind::Collection,
            Value::Method(_) => ValueKind::Method,
            Value::StateConstraint(_) => ValueKind::StateConstraint,
        }
    }
    pub fn data_type(&self) -> &'static str {
        self.kind().data_type()
    }
    pub fn is_empty_marker(&self) -> bool {
        matches!(self, Value::Empty)
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }
    pub fn as_clabject(&self) -> Option<&Clabject> {
        match self {
            Value::Clabject(c) => Some(c),
            _ => None,
        }
    }
    pub fn as_collection(&self) -> Option<&[Value]> {
        match self {
            Value::Collection(members) => Some(members),
            _ => None,
        }
    }
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(m) => Some(m),
            _ => None,
        }
    }
    pub fn as_state_constraint(&self) -> Option<&StateConstraint> {
        match self {
            Value::StateConstraint(sc) => Some(sc),
            _ => None,
        }
    }
    /// A concrete syntax friendly string, as shown in visualizations.
    pub fn render(&self) -> String {
        match self {
            Value::Clabject(c) => format!("Associated Clabject: {}", c),
            Value::Method(m) => match m.origin() {
                Some(origin) => format!("Implementation from {}: {}", origin, m),
                None => m.to_string(),
            },
            Value::StateConstraint(sc) => format!("StateConstraint: {}", sc.name()),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Clabject(a), Value::Clabject(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => a == b,
            (Value::StateConstraint(a), Value::StateConstraint(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "EmptyValue"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(d) => write!(f, "{}", d),
            Value::Duration(d) => write!(f, "{}", d),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Clabject(c) => write!(f, "{}", c),
            Value::Collection(members) => {
                let mut s = String::new();
                for m in members {
                    s += &(m.to_string() + ", ");
                }
                s.truncate(s.len().saturating_sub(2));
                write!(f, "[{}]", s)
            }
            Value::Method(m) => write!(f, "{}", m),
            Value::StateConstraint(sc) => write!(f, "{}", sc.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}
impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}
impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::DateTime(d)
    }
}
impl From<TimeDelta> for Value {
    fn from(d: TimeDelta) -> Self {
        Value::Duration(d)
    }
}
impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}
impl From<Clabject> for Value {
    fn from(c: Clabject) -> Self {
        Value::Clabject(c)
    }
}
impl From<&Clabject> for Value {
    fn from(c: &Clabject) -> Self {
        Value::Clabject(c.clone())
    }
}
impl From<Vec<Value>> for Value {
    fn from(members: Vec<Value>) -> Self {
        Value::Collection(members)
    }
}
impl From<Method> for Value {
    fn from(m: Method) -> Self {
        Value::Method(m)
    }
}
impl From<StateConstraint> for Value {
    fn from(sc: StateConstraint) -> Self {
        Value::StateConstraint(sc)
    }
}
