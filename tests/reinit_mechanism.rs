use clabjects::constraint::{Constraint, ReInit, CAN_BE_METHOD, IS_INT, IS_STR};
use clabjects::construct::{Hierarchy, Instantiation};
use clabjects::datatype::{Clabject, Method, Value};
use clabjects::error::ClabjectError;
use clabjects::property::Property;

// MetaMeta
//   a: String  1,*
// Meta
//   a = "valid_string", re-initialized as i64 on the next step
fn build_meta(hierarchy: &mut Hierarchy) -> Clabject {
    let origin = hierarchy.origin();
    let meta_meta = hierarchy.generate(&origin, Instantiation::named("MetaMeta")).unwrap();
    hierarchy
        .define(
            &meta_meta,
            vec![Property::build("a").steps_to(1).unbounded().constraint(&IS_STR).finish().unwrap()],
        )
        .unwrap();
    let meta = hierarchy
        .generate(&meta_meta, Instantiation::named("Meta").value("a", "valid_string"))
        .unwrap();
    let a_as_int = ReInit::new(&[IS_STR.clone()], vec![IS_INT.clone()]).unwrap();
    hierarchy.require_reinit(&meta, "a", a_as_int).unwrap();
    meta
}

#[test]
fn re_initialized_property_must_be_given_again() {
    let mut hierarchy = Hierarchy::new();
    let meta = build_meta(&mut hierarchy);
    let err = hierarchy.generate(&meta, Instantiation::named("Cls")).unwrap_err();
    assert!(matches!(err, ClabjectError::UninitializedProperties(ref names) if names == &["a"]));
}

#[test]
fn re_initialized_property_follows_the_new_constraints() {
    let mut hierarchy = Hierarchy::new();
    let meta = build_meta(&mut hierarchy);
    match hierarchy.generate(&meta, Instantiation::named("Cls").value("a", "a_str")) {
        Err(ClabjectError::ConstraintViolation(report)) => {
            assert_eq!(report.constraint_names("a"), ["is_of_i64"]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn valid_re_init() {
    let mut hierarchy = Hierarchy::new();
    let meta = build_meta(&mut hierarchy);
    let cls = hierarchy
        .generate(&meta, Instantiation::named("Cls").value("a", 123))
        .unwrap();
    assert_eq!(hierarchy.property(&cls, "a").unwrap().constraint_names(), ["is_of_i64"]);
    assert_eq!(hierarchy.get(&cls, "a").unwrap(), Some(Value::Int(123)));
    // the parent keeps its value and constraints
    assert_eq!(hierarchy.get(&meta, "a").unwrap(), Some(Value::from("valid_string")));
    assert_eq!(hierarchy.property(&meta, "a").unwrap().constraint_names(), ["is_of_String"]);
    assert!(hierarchy.property(&meta, "a").unwrap().pending_reinit().is_some());
    assert!(hierarchy.property(&cls, "a").unwrap().pending_reinit().is_none());
}

#[test]
fn re_init_applies_once() {
    let mut hierarchy = Hierarchy::new();
    let meta = build_meta(&mut hierarchy);
    let cls = hierarchy
        .generate(&meta, Instantiation::named("Cls").value("a", 123))
        .unwrap();
    let instance = hierarchy.generate(&cls, Instantiation::named("instance")).unwrap();
    assert_eq!(hierarchy.get(&instance, "a").unwrap(), Some(Value::Int(123)));
}

#[test]
fn final_and_vanishing_properties_cannot_be_re_initialized() {
    let mut hierarchy = Hierarchy::new();
    let origin = hierarchy.origin();
    let meta_meta = hierarchy.generate(&origin, Instantiation::named("MetaMeta")).unwrap();
    hierarchy
        .define(
            &meta_meta,
            vec![
                Property::build("fixed").steps_to(0).unbounded().final_().value(1).finish().unwrap(),
                Property::build("fleeting").steps_to(0).steps_from(0).value(2).finish().unwrap(),
            ],
        )
        .unwrap();
    assert!(matches!(
        hierarchy.require_reinit(&meta_meta, "fixed", ReInit::default()),
        Err(ClabjectError::ReinitFinalProperty(_))
    ));
    assert!(matches!(
        hierarchy.require_reinit(&meta_meta, "fleeting", ReInit::default()),
        Err(ClabjectError::ReinitVanishingProperty(_))
    ));
    assert!(matches!(
        hierarchy.require_reinit(&meta_meta, "missing", ReInit::default()),
        Err(ClabjectError::UndefinedProperties(_))
    ));
}

#[test]
fn type_specific_constraints_survive_re_init() {
    let mut hierarchy = Hierarchy::new();
    let origin = hierarchy.origin();
    let meta = hierarchy.generate(&origin, Instantiation::named("Meta")).unwrap();
    hierarchy
        .define(
            &meta,
            vec![Property::build("m").steps_to(1).unbounded().method().finish().unwrap()],
        )
        .unwrap();

    let pinned = hierarchy.property(&meta, "m").unwrap().constraints()[0].clone();
    assert!(pinned.is_type_specific());
    assert!(matches!(
        ReInit::new(&[pinned], Vec::new()),
        Err(ClabjectError::TypeSpecificConstraintRemoval(_))
    ));
    // the shared kind constraint is refused when the directive is built
    assert!(matches!(
        ReInit::new(&[CAN_BE_METHOD.clone()], Vec::new()),
        Err(ClabjectError::TypeSpecificConstraintRemoval(ref name)) if name == "can_be_method"
    ));

    let noop = Method::unary("noop", |_, _| Ok(Value::Empty));
    let cls = hierarchy
        .generate(&meta, Instantiation::named("Cls").value("m", noop.clone()))
        .unwrap();
    let takes_no_arguments = Constraint::on_value("takes_no_arguments", true, |value| match value {
        Value::Method(m) if m.params() == 1 => Ok(()),
        other => Err(format!("{} takes arguments", other)),
    });
    hierarchy
        .require_reinit(&cls, "m", ReInit::new(&[], vec![takes_no_arguments]).unwrap())
        .unwrap();
    let instance = hierarchy
        .generate(&cls, Instantiation::named("Instance").value("m", noop))
        .unwrap();
    assert_eq!(
        hierarchy.property(&instance, "m").unwrap().constraint_names(),
        ["can_be_method", "takes_no_arguments"]
    );
}
