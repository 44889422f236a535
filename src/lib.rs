//! Clabjects – deep (multi-level) instantiation with staged properties.
//!
//! A *clabject* is both a class and an object: it holds property values and
//! it can generate further clabjects. Chains of clabjects are built by
//! generating one from another, starting at a distinguished origin:
//! * A [`property::Property`] declared on one clabject may be deferred for a
//!   number of instantiation steps (`steps_to`) before it must be given a
//!   value, and then stays visible for a number of steps (`steps_from`),
//!   possibly unbounded, before it vanishes.
//! * Every step down the chain is validated against the properties'
//!   [`constraint::Constraint`]s. Violations are collected for all
//!   properties of the step and surfaced as one report.
//! * Properties come in kinds: simple values, associations to other
//!   clabjects, collections with multiplicities, methods and state
//!   constraints over the whole clabject.
//!
//! Clabjects are kept in a [`construct::Hierarchy`], an arena keyed by
//! [`datatype::ClabjectId`], and referred to through cheap
//! [`datatype::Clabject`] handles.
//!
//! ## Modules
//! * [`construct`] – The hierarchy, its keeper and the generation of clabjects.
//! * [`staging`] – The staged property set and its one-step `advance`.
//! * [`property`] – Property kinds, counters and the property builder.
//! * [`constraint`] – Value and state constraints, combinators and built-ins.
//! * [`datatype`] – Clabject handles, methods and property values.
//! * [`interface`] – Mutex guarded access for generating from several threads.
//! * [`viz`] – Graphviz output of a hierarchy and its settings.
//!
//! ## Quick Start
//! ```
//! use clabjects::{construct::{Hierarchy, Instantiation}, property::Property};
//! let mut hierarchy = Hierarchy::new();
//! let origin = hierarchy.origin();
//! let breed = hierarchy.generate(&origin, Instantiation::named("Breed")).unwrap();
//! hierarchy
//!     .define(&breed, vec![Property::build("year_registered").steps_to(1).steps_from(0).finish().unwrap()])
//!     .unwrap();
//! let collie = hierarchy
//!     .generate(&breed, Instantiation::named("Collie").value("year_registered", 1888))
//!     .unwrap();
//! assert_eq!(hierarchy.get(&collie, "year_registered").unwrap(), Some(clabjects::Value::Int(1888)));
//! ```
//!
//! ## Logging
//! Generation and staging emit `tracing` events. The binary installs a
//! subscriber honoring `RUST_LOG`, libraries embedding the crate bring their own.

pub mod constraint;
pub mod construct;
pub mod datatype;
pub mod error;
pub mod interface;
pub mod property;
pub mod staging;
pub mod viz;

pub use construct::{Hierarchy, Instantiation, Mixin};
pub use datatype::{Clabject, Method, Value};
pub use error::{ClabjectError, Result};
pub use property::Property;
