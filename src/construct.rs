// used to keep the one-to-one mapping between clabject names and their ids
use bimap::BiMap;

// other keepers use HashMap
use core::hash::BuildHasherDefault;
use std::collections::{BTreeMap, HashMap};
use seahash::SeaHasher;

// used to print out readable forms of a clabject
use std::fmt;

// clabject snapshots are handed out as serializable views
use serde::Serialize;
use tracing::{debug, info, warn};

// our own stuff that we need
use crate::constraint::{Constraint, Lineage, ReInit, ViolationReport};
use crate::datatype::{Clabject, ClabjectId, Method, Value, ORIGIN, ORIGIN_NAME};
use crate::error::{ClabjectError, Result};
use crate::property::{Property, PropertyKind, PropertyView};
use crate::staging::{PropertySet, ProvidedValues, SpeedAdjustments};

// ------------- Ids -------------
pub type IdHasher = BuildHasherDefault<SeaHasher>;

#[derive(Debug)]
pub struct IdGenerator {
    lower_bound: ClabjectId,
}
impl IdGenerator {
    pub fn new() -> Self {
        Self { lower_bound: ORIGIN }
    }
    pub fn generate(&mut self) -> ClabjectId {
        self.lower_bound += 1;
        self.lower_bound
    }
}
impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- Mixin -------------
/// Additional behavior a clabject picks up at generation, on top of the
/// methods bound through its properties. Passed on to all descendants.
#[derive(Clone, Debug)]
pub struct Mixin {
    name: String,
    methods: Vec<Method>,
}
impl Mixin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            methods: Vec::new(),
        }
    }
    pub fn with(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }
}

// ------------- ClabjectRecord -------------
#[derive(Debug)]
pub struct ClabjectRecord {
    handle: Clabject,
    properties: PropertySet,
    generated_from: Option<ClabjectId>,
    direct_instances: Vec<Clabject>,
    terminal: bool,
    // speed adjustments used to generate each direct instance, by instance name
    speed_adjustments: BTreeMap<String, SpeedAdjustments>,
    bindings: BTreeMap<String, Method>,
    mixins: Vec<Mixin>,
}
impl ClabjectRecord {
    fn origin() -> Self {
        Self {
            handle: Clabject::new(ORIGIN, ORIGIN_NAME),
            properties: PropertySet::new(),
            generated_from: None,
            direct_instances: Vec::new(),
            terminal: false,
            speed_adjustments: BTreeMap::new(),
            bindings: BTreeMap::new(),
            mixins: Vec::new(),
        }
    }
    pub fn handle(&self) -> &Clabject {
        &self.handle
    }
    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }
    pub fn generated_from(&self) -> Option<ClabjectId> {
        self.generated_from
    }
    pub fn direct_instances(&self) -> &[Clabject] {
        &self.direct_instances
    }
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
    pub fn speed_adjustments(&self) -> &BTreeMap<String, SpeedAdjustments> {
        &self.speed_adjustments
    }
    pub fn mixins(&self) -> &[Mixin] {
        &self.mixins
    }
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
    // bound methods follow the current values of Method properties
    fn rebind(&mut self) {
        for property in self.properties.iter() {
            if let (PropertyKind::Method, Some(Value::Method(m))) = (property.kind(), property.value()) {
                self.bindings.insert(property.name().to_owned(), m.clone());
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ClabjectKeeper {
    kept: HashMap<ClabjectId, ClabjectRecord, IdHasher>,
    names: BiMap<String, ClabjectId>,
}
impl ClabjectKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns true if a clabject with the same name was previously kept,
    /// in which case the record is not kept.
    pub fn keep(&mut self, record: ClabjectRecord) -> bool {
        let name = record.handle.name().to_owned();
        if self.names.contains_left(&name) {
            return true;
        }
        self.names.insert(name, record.handle.id());
        self.kept.insert(record.handle.id(), record);
        false
    }
    pub fn get(&self, id: ClabjectId) -> Option<&ClabjectRecord> {
        self.kept.get(&id)
    }
    fn get_mut(&mut self, id: ClabjectId) -> Option<&mut ClabjectRecord> {
        self.kept.get_mut(&id)
    }
    pub fn lookup(&self, name: &str) -> Option<ClabjectId> {
        self.names.get_by_left(name).copied()
    }
    pub fn name_of(&self, id: ClabjectId) -> Option<&str> {
        self.names.get_by_right(&id).map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

// ------------- Instantiation -------------
/// Everything that goes into generating one clabject from another.
#[derive(Clone, Debug, Default)]
pub struct Instantiation {
    name: String,
    values: ProvidedValues,
    speed_adjustments: SpeedAdjustments,
    mixins: Vec<Mixin>,
    terminal: bool,
}
impl Instantiation {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }
    pub fn value<V: Into<Value>>(mut self, property: &str, value: V) -> Self {
        self.values.insert(property.to_owned(), value.into());
        self
    }
    pub fn speed(mut self, property: &str, delta: i64) -> Self {
        self.speed_adjustments.insert(property.to_owned(), delta);
        self
    }
    pub fn mixin(mut self, mixin: Mixin) -> Self {
        self.mixins.push(mixin);
        self
    }
    /// The generated clabject will not be able to generate further clabjects.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

// ------------- Observers -------------
#[derive(Clone, Debug)]
pub struct GenerationEvent {
    pub parent: Clabject,
    pub child: Clabject,
    pub speed_adjustments: SpeedAdjustments,
    pub terminal: bool,
}

pub trait GenerationObserver: Send + Sync {
    fn generated(&self, event: &GenerationEvent);
}
impl<F> GenerationObserver for F
where
    F: Fn(&GenerationEvent) + Send + Sync,
{
    fn generated(&self, event: &GenerationEvent) {
        self(event)
    }
}

// ------------- Hierarchy -------------
/// Arena of all clabjects descending from one origin.
pub struct Hierarchy {
    id_generator: IdGenerator,
    keeper: ClabjectKeeper,
    observers: Vec<Box<dyn GenerationObserver>>,
}

impl Hierarchy {
    pub fn new() -> Self {
        let mut keeper = ClabjectKeeper::new();
        keeper.keep(ClabjectRecord::origin());
        Self {
            id_generator: IdGenerator::new(),
            keeper,
            observers: Vec::new(),
        }
    }
    pub fn origin(&self) -> Clabject {
        Clabject::new(ORIGIN, ORIGIN_NAME)
    }
    pub fn len(&self) -> usize {
        self.keeper.len()
    }
    pub fn is_empty(&self) -> bool {
        self.keeper.is_empty()
    }
    pub fn record(&self, clabject: &Clabject) -> Result<&ClabjectRecord> {
        self.keeper
            .get(clabject.id())
            .filter(|r| r.handle == *clabject)
            .ok_or_else(|| ClabjectError::UnknownClabject(clabject.name().to_owned()))
    }
    fn record_mut(&mut self, clabject: &Clabject) -> Result<&mut ClabjectRecord> {
        self.keeper
            .get_mut(clabject.id())
            .filter(|r| r.handle == *clabject)
            .ok_or_else(|| ClabjectError::UnknownClabject(clabject.name().to_owned()))
    }
    pub fn contains(&self, clabject: &Clabject) -> bool {
        self.record(clabject).is_ok()
    }
    pub fn find(&self, name: &str) -> Option<Clabject> {
        let id = self.keeper.lookup(name)?;
        self.keeper.get(id).map(|r| r.handle.clone())
    }
    /// Whether the value refers to a clabject of this hierarchy.
    pub fn is_clabject(&self, value: &Value) -> bool {
        value.as_clabject().is_some_and(|c| self.contains(c))
    }
    pub fn observe(&mut self, observer: Box<dyn GenerationObserver>) {
        self.observers.push(observer);
    }

    /// Generates a new clabject as the next instantiation step of `parent`.
    pub fn generate(&mut self, parent: &Clabject, instantiation: Instantiation) -> Result<Clabject> {
        let name = instantiation.name.clone();
        let provided: Vec<String> = instantiation.values.keys().cloned().collect();
        let generated = self.instantiate(parent, instantiation);
        match &generated {
            Ok(child) => info!(clabject = %child, parent = %parent, "generated"),
            Err(e) => warn!(clabject = %name, parent = %parent, properties = ?provided, error = %e, "instantiation failed"),
        }
        generated
    }

    fn instantiate(&mut self, parent: &Clabject, instantiation: Instantiation) -> Result<Clabject> {
        let Instantiation {
            name,
            values,
            speed_adjustments,
            mixins,
            terminal,
        } = instantiation;
        let parent_record = self.record(parent)?;
        if parent_record.terminal {
            return Err(ClabjectError::DeclaredAsInstance(self.display_name(parent)?));
        }
        if self.keeper.lookup(&name).is_some() {
            return Err(ClabjectError::DuplicateClabject(name));
        }
        let provided: ProvidedValues = values
            .into_iter()
            .map(|(property, value)| match value {
                Value::Method(m) => (property, Value::Method(m.with_origin(&name))),
                other => (property, other),
            })
            .collect();
        let starting_set = if parent.is_origin() {
            PropertySet::new()
        } else {
            parent_record.properties.clone()
        };
        let properties = starting_set.advance(&provided, &speed_adjustments, &*self)?;
        let bindings = parent_record.bindings.clone();
        let mut inherited_mixins = parent_record.mixins.clone();
        inherited_mixins.extend(mixins);

        let handle = Clabject::new(self.id_generator.generate(), &name);
        let mut record = ClabjectRecord {
            handle: handle.clone(),
            properties,
            generated_from: Some(parent.id()),
            direct_instances: Vec::new(),
            terminal,
            speed_adjustments: BTreeMap::new(),
            bindings,
            mixins: inherited_mixins,
        };
        record.rebind();
        if self.keeper.keep(record) {
            return Err(ClabjectError::DuplicateClabject(name));
        }

        let parent_record = self.record_mut(parent)?;
        parent_record.direct_instances.push(handle.clone());
        if !speed_adjustments.is_empty() {
            parent_record
                .speed_adjustments
                .insert(name, speed_adjustments.clone());
        }
        let event = GenerationEvent {
            parent: parent.clone(),
            child: handle.clone(),
            speed_adjustments,
            terminal,
        };
        for observer in &self.observers {
            observer.generated(&event);
        }
        Ok(handle)
    }

    // clones the property set, applies the change and commits it only if it succeeded
    fn stage<F>(&mut self, clabject: &Clabject, apply: F) -> Result<()>
    where
        F: FnOnce(&mut PropertySet, &dyn Lineage) -> Result<()>,
    {
        let mut staged = self.record(clabject)?.properties.clone();
        apply(&mut staged, &*self)?;
        let record = self.record_mut(clabject)?;
        record.properties = staged;
        record.rebind();
        Ok(())
    }

    /// The clabject `clabject` was generated from. The origin is its own type.
    pub fn instance_of(&self, clabject: &Clabject) -> Result<Clabject> {
        self.record(clabject)?;
        Ok(self.generated_from(clabject).unwrap_or_else(|| self.origin()))
    }
    pub fn define(&mut self, clabject: &Clabject, properties: Vec<Property>) -> Result<()> {
        if clabject.is_origin() {
            return Err(ClabjectError::OriginProperties(clabject.name().to_owned()));
        }
        let properties: Vec<Property> = properties
            .into_iter()
            .map(|mut p| {
                p.tag_method_origin(clabject.name());
                p
            })
            .collect();
        let names: Vec<String> = properties.iter().map(|p| p.name().to_owned()).collect();
        self.stage(clabject, |set, lineage| set.define(properties, lineage))?;
        debug!(clabject = %clabject, properties = ?names, "defined");
        Ok(())
    }
    pub fn property(&self, clabject: &Clabject, name: &str) -> Result<&Property> {
        self.record(clabject)?.properties.get(name)
    }
    pub fn properties(&self, clabject: &Clabject) -> Result<&PropertySet> {
        Ok(&self.record(clabject)?.properties)
    }
    /// Current value of a property, `None` while unset.
    pub fn get(&self, clabject: &Clabject, name: &str) -> Result<Option<Value>> {
        Ok(self.property(clabject, name)?.value().cloned())
    }
    pub fn set<V: Into<Value>>(&mut self, clabject: &Clabject, name: &str, value: V) -> Result<()> {
        let value = match value.into() {
            Value::Method(m) => Value::Method(m.with_origin(clabject.name())),
            other => other,
        };
        self.stage(clabject, |set, lineage| set.assign(name, value, lineage))
    }
    pub fn add_constraint(&mut self, clabject: &Clabject, name: &str, constraint: &Constraint) -> Result<()> {
        self.stage(clabject, |set, _| set.add_constraint(name, constraint.clone()))
    }
    pub fn adjust_speed(&mut self, clabject: &Clabject, speed_adjustments: &SpeedAdjustments) -> Result<()> {
        self.stage(clabject, |set, _| set.adjust_speed(speed_adjustments))
    }
    pub fn require_reinit(&mut self, clabject: &Clabject, name: &str, reinit: ReInit) -> Result<()> {
        self.stage(clabject, |set, _| set.require_reinit(name, reinit))?;
        debug!(clabject = %clabject, property = %name, "re-initialization required on next step");
        Ok(())
    }
    /// Evaluates constraints on demand, including the ones that do not gate
    /// instantiation unless `init_only` is set.
    pub fn check_constraints(
        &self,
        clabject: &Clabject,
        name: Option<&str>,
        prospective: Option<&Value>,
        init_only: bool,
    ) -> Result<ViolationReport> {
        self.record(clabject)?
            .properties
            .check_constraints(name, prospective, init_only, self)
    }
    /// Evaluates every due state constraint against the clabject and returns
    /// the reasons of the failing ones by property name.
    pub fn check_state_constraints(&self, clabject: &Clabject) -> Result<BTreeMap<String, String>> {
        let mut violated = BTreeMap::new();
        for property in self.record(clabject)?.properties.iter() {
            if !matches!(property.kind(), PropertyKind::StateConstraint) || !property.is_due() {
                continue;
            }
            if let Some(Value::StateConstraint(sc)) = property.value() {
                if let Err(reason) = sc.evaluate(self, clabject) {
                    violated.insert(property.name().to_owned(), reason);
                }
            }
        }
        Ok(violated)
    }
    /// Invokes a bound method, or a mixin method if no property binds the
    /// name, with the clabject as its target.
    pub fn call(&mut self, clabject: &Clabject, method: &str, args: &[Value]) -> Result<Value> {
        let record = self.record(clabject)?;
        let bound = record
            .bindings
            .get(method)
            .or_else(|| record.mixins.iter().find_map(|m| m.method(method)))
            .cloned()
            .ok_or_else(|| ClabjectError::NotAMethod(method.to_owned()))?;
        bound.invoke(self, clabject, args)
    }
    pub fn direct_instances(&self, clabject: &Clabject) -> Result<&[Clabject]> {
        Ok(&self.record(clabject)?.direct_instances)
    }
    /// First-level clabjects, in generation order.
    pub fn roots(&self) -> &[Clabject] {
        self.keeper
            .get(ORIGIN)
            .map(|r| r.direct_instances.as_slice())
            .unwrap_or_default()
    }
    /// Number of instantiation steps between the clabject and the origin.
    pub fn level(&self, clabject: &Clabject) -> Result<usize> {
        let mut level = 0;
        let mut current = self.record(clabject)?;
        while let Some(parent) = current.generated_from.and_then(|id| self.keeper.get(id)) {
            level += 1;
            current = parent;
        }
        Ok(level)
    }
    /// Longest instantiation chain below the clabject.
    pub fn depth(&self, clabject: &Clabject) -> Result<usize> {
        let mut deepest = 0;
        for instance in self.direct_instances(clabject)? {
            deepest = deepest.max(self.depth(instance)? + 1);
        }
        Ok(deepest)
    }
    pub fn is_terminal(&self, clabject: &Clabject) -> Result<bool> {
        Ok(self.record(clabject)?.terminal)
    }
    /// Terminal clabjects are shown with a lower case initial.
    pub fn display_name(&self, clabject: &Clabject) -> Result<String> {
        let name = clabject.name();
        if !self.record(clabject)?.terminal {
            return Ok(name.to_owned());
        }
        let mut chars = name.chars();
        Ok(match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        })
    }
    pub fn describe(&self, clabject: &Clabject) -> Result<ClabjectView> {
        let record = self.record(clabject)?;
        Ok(ClabjectView {
            name: clabject.name().to_owned(),
            display_name: self.display_name(clabject)?,
            instance_of: self.generated_from(clabject).map(|c| c.name().to_owned()),
            level: self.level(clabject)?,
            terminal: record.terminal,
            direct_instances: record
                .direct_instances
                .iter()
                .map(|c| c.name().to_owned())
                .collect(),
            speed_adjustments: record.speed_adjustments.clone(),
            methods: record.methods().map(str::to_owned).collect(),
            mixins: record.mixins.iter().map(|m| m.name().to_owned()).collect(),
            properties: record.properties.views(),
        })
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Hierarchy")
            .field("keeper", &self.keeper)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Lineage for Hierarchy {
    fn generated_from(&self, clabject: &Clabject) -> Option<Clabject> {
        let parent = self.record(clabject).ok()?.generated_from?;
        self.keeper.get(parent).map(|r| r.handle.clone())
    }
    fn value_of(&self, clabject: &Clabject, property: &str) -> Result<Option<Value>> {
        self.get(clabject, property)
    }
}

/// Read-only snapshot of a clabject, as consumed by reporting.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ClabjectView {
    pub name: String,
    pub display_name: String,
    pub instance_of: Option<String>,
    pub level: usize,
    pub terminal: bool,
    pub direct_instances: Vec<String>,
    pub speed_adjustments: BTreeMap<String, SpeedAdjustments>,
    pub methods: Vec<String>,
    pub mixins: Vec<String>,
    pub properties: Vec<PropertyView>,
}
