// used to print out readable forms of a property
use std::fmt;

// property snapshots are handed out as serializable views
use serde::Serialize;

use crate::constraint::{
    collection_member, collection_multiplicity, Constraint, Lineage, MemberFilter, ReInit, Violation,
    CAN_BE_METHOD, IS_CLABJECT_OR_EMPTY, IS_COLLECTION, IS_STATE_CONSTRAINT,
};
use crate::datatype::Value;
use crate::error::{ClabjectError, Result};

// ------------- Visibility -------------
/// How many instantiation steps a property survives after it was set.
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum Visibility {
    Steps(u32),
    Unbounded,
}
impl Visibility {
    /// True when the property is dropped by the next instantiation step.
    pub fn is_vanishing(&self) -> bool {
        *self == Visibility::Steps(0)
    }
    fn decremented(self) -> Self {
        match self {
            Visibility::Steps(n) => Visibility::Steps(n.saturating_sub(1)),
            Visibility::Unbounded => Visibility::Unbounded,
        }
    }
}
impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Visibility::Steps(n) => write!(f, "{}", n),
            Visibility::Unbounded => write!(f, "*"),
        }
    }
}

// ------------- Kind -------------
#[derive(Clone, Default)]
pub struct CollectionDescriptor {
    multiplicity: Option<(usize, Option<usize>)>,
    member: Option<Constraint>,
    filter: Option<MemberFilter>,
}
impl CollectionDescriptor {
    pub fn new() -> Self {
        Self::default()
    }
    /// Inclusive bounds on the number of members, `None` for no upper bound.
    pub fn multiplicity(mut self, min: usize, max: Option<usize>) -> Self {
        self.multiplicity = Some((min, max));
        self
    }
    pub fn member(mut self, constraint: Constraint) -> Self {
        self.member = Some(constraint);
        self
    }
    /// Only members passing the filter are subject to the member constraint.
    pub fn filtered(mut self, filter: MemberFilter) -> Self {
        self.filter = Some(filter);
        self
    }
    pub fn bounds(&self) -> Option<(usize, Option<usize>)> {
        self.multiplicity
    }
    fn compile(&self) -> Result<Vec<Constraint>> {
        let mut compiled = vec![IS_COLLECTION.clone()];
        if let Some((min, max)) = self.multiplicity {
            compiled.push(collection_multiplicity(min, max)?);
        }
        if let Some(member) = &self.member {
            compiled.push(collection_member(member, self.filter.clone()));
        }
        Ok(compiled)
    }
}

impl fmt::Debug for CollectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CollectionDescriptor")
            .field("multiplicity", &self.multiplicity)
            .field("member", &self.member)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum PropertyKind {
    Simple,
    Association,
    Collection(CollectionDescriptor),
    Method,
    StateConstraint,
}
impl PropertyKind {
    pub fn tag(&self) -> &'static str {
        match self {
            PropertyKind::Simple => "Simple",
            PropertyKind::Association => "Association",
            PropertyKind::Collection(_) => "Collection",
            PropertyKind::Method => "Method",
            PropertyKind::StateConstraint => "StateConstraint",
        }
    }
    fn type_specific_constraints(&self) -> Result<Vec<Constraint>> {
        Ok(match self {
            PropertyKind::Simple => Vec::new(),
            PropertyKind::Association => vec![IS_CLABJECT_OR_EMPTY.clone()],
            PropertyKind::Collection(desc) => desc.compile()?,
            PropertyKind::Method => vec![CAN_BE_METHOD.clone()],
            PropertyKind::StateConstraint => vec![IS_STATE_CONSTRAINT.clone()],
        })
    }
}

// ------------- Property -------------
/// A named slot on a clabject whose value may be deferred for a number of
/// instantiation steps and which stays visible for a number of steps after.
#[derive(Clone, Debug)]
pub struct Property {
    name: String,
    kind: PropertyKind,
    steps_to: u32,
    steps_from: Visibility,
    constraints: Vec<Constraint>,
    is_final: bool,
    value: Option<Value>,
    default: Option<Value>,
    reinit: Option<ReInit>,
}

impl Property {
    pub fn build(name: &str) -> PropertyBuilder {
        PropertyBuilder::new(name)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }
    pub fn steps_to(&self) -> u32 {
        self.steps_to
    }
    pub fn steps_from(&self) -> Visibility {
        self.steps_from
    }
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
    pub fn constraint_names(&self) -> Vec<&str> {
        self.constraints.iter().map(Constraint::name).collect()
    }
    pub fn is_final(&self) -> bool {
        self.is_final
    }
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
    pub fn pending_reinit(&self) -> Option<&ReInit> {
        self.reinit.as_ref()
    }
    pub fn is_due(&self) -> bool {
        self.steps_to == 0
    }
    /// Due and set.
    pub fn is_active(&self) -> bool {
        self.is_due() && self.value.is_some()
    }
    /// Violations `value` would cause, restricted to the init-gating
    /// constraints when `init_only` is set.
    pub fn violations(&self, value: &Value, init_only: bool, lineage: &dyn Lineage) -> Vec<Violation> {
        self.constraints
            .iter()
            .filter(|c| !init_only || c.eval_on_init())
            .filter_map(|c| c.evaluate(value, lineage).err())
            .collect()
    }
    pub fn view(&self) -> PropertyView {
        PropertyView {
            name: self.name.clone(),
            kind: self.kind.tag(),
            steps_to: self.steps_to,
            steps_from: self.steps_from.to_string(),
            is_final: self.is_final,
            value: self.value.as_ref().map(Value::render),
            constraints: self.constraint_names().into_iter().map(str::to_owned).collect(),
        }
    }

    // mutators used while staging the next property set
    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }
    pub(crate) fn tag_method_origin(&mut self, origin: &str) {
        for slot in [&mut self.value, &mut self.default] {
            if let Some(Value::Method(m)) = slot.as_ref() {
                let tagged = Value::Method(m.with_origin(origin));
                *slot = Some(tagged);
            }
        }
    }
    pub(crate) fn push_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }
    pub(crate) fn adjust_steps_to(&mut self, delta: i64) {
        let adjusted = (self.steps_to as i64).saturating_add(delta).max(1);
        self.steps_to = u32::try_from(adjusted).unwrap_or(u32::MAX);
    }
    pub(crate) fn decrement_steps_to(&mut self) {
        self.steps_to = self.steps_to.saturating_sub(1);
    }
    pub(crate) fn decrement_steps_from(&mut self) {
        self.steps_from = self.steps_from.decremented();
    }
    pub(crate) fn schedule_reinit(&mut self, reinit: ReInit) {
        self.reinit = Some(reinit);
    }
    /// Consumes a pending re-initialization, if any.
    pub(crate) fn apply_reinit(&mut self) {
        if let Some(reinit) = self.reinit.take() {
            self.constraints
                .retain(|c| c.is_type_specific() || !reinit.removing().iter().any(|r| r == c.name()));
            self.constraints.extend(reinit.adding().iter().cloned());
            self.value = None;
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match &self.value {
            Some(v) => v.render(),
            None => "unset".to_owned(),
        };
        write!(f, "{}({}, {}): {}", self.name, self.steps_to, self.steps_from, value)
    }
}

/// Read-only snapshot of a property, as consumed by reporting.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PropertyView {
    pub name: String,
    pub kind: &'static str,
    pub steps_to: u32,
    pub steps_from: String,
    pub is_final: bool,
    pub value: Option<String>,
    pub constraints: Vec<String>,
}

// ------------- Builder -------------
#[derive(Debug)]
pub struct PropertyBuilder {
    name: String,
    steps_to: u32,
    steps_from: Visibility,
    constraints: Vec<Constraint>,
    is_final: bool,
    value: Option<Value>,
    default: Option<Value>,
    method: bool,
    association: bool,
    state_constraint: bool,
    collection: Option<CollectionDescriptor>,
}

impl PropertyBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            steps_to: 1,
            steps_from: Visibility::Unbounded,
            constraints: Vec::new(),
            is_final: false,
            value: None,
            default: None,
            method: false,
            association: false,
            state_constraint: false,
            collection: None,
        }
    }
    pub fn steps_to(mut self, steps: u32) -> Self {
        self.steps_to = steps;
        self
    }
    pub fn steps_from(mut self, steps: u32) -> Self {
        self.steps_from = Visibility::Steps(steps);
        self
    }
    pub fn unbounded(mut self) -> Self {
        self.steps_from = Visibility::Unbounded;
        self
    }
    pub fn constraint(mut self, constraint: &Constraint) -> Self {
        self.constraints.push(constraint.clone());
        self
    }
    pub fn final_(mut self) -> Self {
        self.is_final = true;
        self
    }
    pub fn value<V: Into<Value>>(mut self, value: V) -> Self {
        self.value = Some(value.into());
        self
    }
    pub fn default_value<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }
    pub fn method(mut self) -> Self {
        self.method = true;
        self
    }
    pub fn association(mut self) -> Self {
        self.association = true;
        self
    }
    pub fn state_constraint(mut self) -> Self {
        self.state_constraint = true;
        self
    }
    pub fn collection(mut self, descriptor: CollectionDescriptor) -> Self {
        self.collection = Some(descriptor);
        self
    }
    pub fn finish(self) -> Result<Property> {
        let mut requested = Vec::new();
        if self.method {
            requested.push("Method");
        }
        if self.association {
            requested.push("Association");
        }
        if self.state_constraint {
            requested.push("StateConstraint");
        }
        if self.collection.is_some() {
            requested.push("Collection");
        }
        if requested.len() > 1 {
            return Err(ClabjectError::InconsistentPropertyKind(requested));
        }
        let kind = match (self.method, self.association, self.state_constraint, self.collection) {
            (true, ..) => PropertyKind::Method,
            (_, true, ..) => PropertyKind::Association,
            (_, _, true, _) => PropertyKind::StateConstraint,
            (_, _, _, Some(desc)) => PropertyKind::Collection(desc),
            _ => PropertyKind::Simple,
        };
        let mut constraints = self.constraints;
        constraints.extend(
            kind.type_specific_constraints()?
                .iter()
                .map(Constraint::as_type_specific),
        );
        Ok(Property {
            name: self.name,
            kind,
            steps_to: self.steps_to,
            steps_from: self.steps_from,
            constraints,
            is_final: self.is_final,
            value: self.value,
            default: self.default,
            reinit: None,
        })
    }
}
