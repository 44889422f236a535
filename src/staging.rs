//! The staged property set of a clabject.
//!
//! A [`PropertySet`] is never advanced in place. [`PropertySet::advance`]
//! produces the set of the next clabject down the chain and leaves the
//! receiver untouched, so a failed instantiation never leaves partial state
//! behind. The in-place mutators (`define`, `adjust_speed`, `assign`, ...)
//! validate everything before they change anything.

use std::collections::BTreeMap;

use tracing::debug;

use crate::constraint::{Constraint, Lineage, ReInit, ViolationReport};
use crate::datatype::Value;
use crate::error::{ClabjectError, Result};
use crate::property::{Property, PropertyView};

/// Values provided for an instantiation step, by property name.
pub type ProvidedValues = BTreeMap<String, Value>;
/// Deltas applied to `steps_to` before an instantiation step, by property name.
pub type SpeedAdjustments = BTreeMap<String, i64>;

#[derive(Clone, Debug, Default)]
pub struct PropertySet {
    properties: BTreeMap<String, Property>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.properties.len()
    }
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }
    pub fn get(&self, name: &str) -> Result<&Property> {
        self.properties
            .get(name)
            .ok_or_else(|| ClabjectError::UndefinedProperties(vec![name.to_owned()]))
    }
    fn get_mut(&mut self, name: &str) -> Result<&mut Property> {
        self.properties
            .get_mut(name)
            .ok_or_else(|| ClabjectError::UndefinedProperties(vec![name.to_owned()]))
    }
    /// Current value of a declared property, `None` while unset.
    pub fn value(&self, name: &str) -> Result<Option<&Value>> {
        Ok(self.get(name)?.value())
    }
    pub fn views(&self) -> Vec<PropertyView> {
        self.properties.values().map(Property::view).collect()
    }

    /// Adds new properties. Nothing is added unless every name is new and
    /// every property that is already due with a value passes its
    /// init-gating constraints.
    pub fn define(&mut self, new_properties: Vec<Property>, lineage: &dyn Lineage) -> Result<()> {
        let mut conflicting = Vec::new();
        let mut incoming: BTreeMap<String, Property> = BTreeMap::new();
        for property in new_properties {
            if self.contains(property.name()) || incoming.contains_key(property.name()) {
                conflicting.push(property.name().to_owned());
            } else {
                incoming.insert(property.name().to_owned(), property);
            }
        }
        if !conflicting.is_empty() {
            conflicting.sort();
            conflicting.dedup();
            return Err(ClabjectError::AlreadyDefinedProperties(conflicting));
        }
        let mut report = ViolationReport::new();
        for property in incoming.values() {
            if let (true, Some(value)) = (property.is_due(), property.value()) {
                report.add(property.name(), property.violations(value, true, lineage));
            }
        }
        if !report.is_empty() {
            return Err(ClabjectError::ConstraintViolation(report));
        }
        self.properties.extend(incoming);
        Ok(())
    }

    /// Produces the property set of the next instantiation step.
    pub fn advance(
        &self,
        provided: &ProvidedValues,
        speed_adjustments: &SpeedAdjustments,
        lineage: &dyn Lineage,
    ) -> Result<PropertySet> {
        let mut next = self.clone();
        next.adjust_speed(speed_adjustments)?;

        // properties whose visibility window elapsed are dropped
        let vanishing: Vec<String> = next
            .properties
            .values()
            .filter(|p| p.is_due() && p.steps_from().is_vanishing())
            .map(|p| p.name().to_owned())
            .collect();
        for name in &vanishing {
            next.properties.remove(name);
            debug!(property = %name, "dropped after its visibility window elapsed");
        }
        for property in next.properties.values_mut() {
            if property.is_due() {
                property.decrement_steps_from();
            } else {
                property.decrement_steps_to();
            }
        }
        for property in next.properties.values_mut() {
            if property.pending_reinit().is_some() {
                property.apply_reinit();
                debug!(property = %property.name(), "re-initialized");
            }
        }

        let undefined: Vec<String> = provided
            .keys()
            .filter(|name| !next.contains(name))
            .cloned()
            .collect();
        if !undefined.is_empty() {
            return Err(ClabjectError::UndefinedProperties(undefined));
        }

        let mut report = ViolationReport::new();
        let mut uninitialized = Vec::new();
        let mut defaulted = Vec::new();
        for property in next.properties.values() {
            if !property.is_due() || property.value().is_some() || provided.contains_key(property.name()) {
                continue;
            }
            match property.default_value() {
                Some(default) => {
                    let violations = property.violations(default, true, lineage);
                    if violations.is_empty() {
                        defaulted.push((property.name().to_owned(), default.clone()));
                    } else {
                        report.add(property.name(), violations);
                    }
                }
                None => uninitialized.push(property.name().to_owned()),
            }
        }
        if !uninitialized.is_empty() {
            return Err(ClabjectError::UninitializedProperties(uninitialized));
        }

        let mut accepted = Vec::new();
        for (name, value) in provided {
            let property = next.get(name)?;
            if !property.is_due() {
                return Err(ClabjectError::UndueInstantiation {
                    property: name.clone(),
                    steps: property.steps_to(),
                });
            }
            if property.is_final() && property.value().is_some() {
                return Err(ClabjectError::ChangeFinalProperty(name.clone()));
            }
            let violations = property.violations(value, true, lineage);
            if violations.is_empty() {
                accepted.push((name.clone(), value.clone()));
            } else {
                report.add(name, violations);
            }
        }
        if !report.is_empty() {
            return Err(ClabjectError::ConstraintViolation(report));
        }

        for (name, value) in defaulted.into_iter().chain(accepted) {
            next.get_mut(&name)?.set_value(value);
        }
        Ok(next)
    }

    /// Validates on demand. Without a name every property is checked against
    /// its current value; unset properties are skipped unless a prospective
    /// value is given.
    pub fn check_constraints(
        &self,
        name: Option<&str>,
        prospective: Option<&Value>,
        init_only: bool,
        lineage: &dyn Lineage,
    ) -> Result<ViolationReport> {
        let mut report = ViolationReport::new();
        match name {
            Some(name) => {
                let property = self.get(name)?;
                if let Some(value) = prospective.or(property.value()) {
                    report.add(name, property.violations(value, init_only, lineage));
                }
            }
            None => {
                for property in self.properties.values() {
                    if let Some(value) = property.value() {
                        report.add(property.name(), property.violations(value, init_only, lineage));
                    }
                }
            }
        }
        Ok(report)
    }

    pub fn add_constraint(&mut self, name: &str, constraint: Constraint) -> Result<()> {
        self.get_mut(name)?.push_constraint(constraint);
        Ok(())
    }

    /// Defers (positive delta) or accelerates (negative delta) properties.
    /// An adjusted property is due at the next step at the earliest.
    pub fn adjust_speed(&mut self, speed_adjustments: &SpeedAdjustments) -> Result<()> {
        let undefined: Vec<String> = speed_adjustments
            .keys()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect();
        if !undefined.is_empty() {
            return Err(ClabjectError::UndefinedProperties(undefined));
        }
        for (name, delta) in speed_adjustments {
            self.get_mut(name)?.adjust_steps_to(*delta);
        }
        Ok(())
    }

    /// Schedules a re-initialization for the next instantiation step.
    pub fn require_reinit(&mut self, name: &str, reinit: ReInit) -> Result<()> {
        let property = self.get(name)?;
        if property.is_final() {
            return Err(ClabjectError::ReinitFinalProperty(name.to_owned()));
        }
        if property.steps_from().is_vanishing() {
            return Err(ClabjectError::ReinitVanishingProperty(name.to_owned()));
        }
        if let Some(pinned) = property
            .constraints()
            .iter()
            .find(|c| c.is_type_specific() && reinit.removing().iter().any(|r| r == c.name()))
        {
            return Err(ClabjectError::TypeSpecificConstraintRemoval(pinned.name().to_owned()));
        }
        self.get_mut(name)?.schedule_reinit(reinit);
        Ok(())
    }

    /// Direct write of a due, non-final property.
    pub fn assign(&mut self, name: &str, value: Value, lineage: &dyn Lineage) -> Result<()> {
        let property = self.get(name)?;
        if !property.is_due() {
            return Err(ClabjectError::UndueInstantiation {
                property: name.to_owned(),
                steps: property.steps_to(),
            });
        }
        if property.is_final() {
            return Err(ClabjectError::ChangeFinalProperty(name.to_owned()));
        }
        let violations = property.violations(&value, true, lineage);
        if !violations.is_empty() {
            let mut report = ViolationReport::new();
            report.add(name, violations);
            return Err(ClabjectError::ConstraintViolation(report));
        }
        self.get_mut(name)?.set_value(value);
        Ok(())
    }
}

impl FromIterator<Property> for PropertySet {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|p| (p.name().to_owned(), p))
                .collect(),
        }
    }
}
