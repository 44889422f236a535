use clabjects::constraint::IS_INT;
use clabjects::construct::{Hierarchy, Instantiation};
use clabjects::datatype::Value;
use clabjects::error::ClabjectError;
use clabjects::interface::SharedHierarchy;
use clabjects::property::Property;

fn setup() -> (SharedHierarchy, clabjects::Clabject) {
    let mut hierarchy = Hierarchy::new();
    let origin = hierarchy.origin();
    let kennel = hierarchy.generate(&origin, Instantiation::named("Kennel")).unwrap();
    hierarchy
        .define(&kennel, vec![Property::build("dogs").constraint(&IS_INT).finish().unwrap()])
        .unwrap();
    (SharedHierarchy::new(hierarchy), kennel)
}

#[test]
fn concurrent_generation_from_one_parent() {
    let (shared, kennel) = setup();
    let handles: Vec<_> = (0..16)
        .map(|i| {
            shared.spawn_generate(
                kennel.clone(),
                Instantiation::named(&format!("Kennel_{}", i)).value("dogs", i),
            )
        })
        .collect();
    let mut names = Vec::new();
    for handle in handles {
        let expected = handle.name().to_owned();
        let generated = handle.join().unwrap();
        assert_eq!(generated.name(), expected);
        names.push(expected);
    }
    let hierarchy = shared.into_inner().unwrap();
    let mut recorded: Vec<String> = hierarchy
        .direct_instances(&kennel)
        .unwrap()
        .iter()
        .map(|c| c.name().to_owned())
        .collect();
    recorded.sort();
    names.sort();
    assert_eq!(recorded, names);
    let seventh = hierarchy.find("Kennel_7").unwrap();
    assert_eq!(hierarchy.get(&seventh, "dogs").unwrap(), Some(Value::Int(7)));
}

#[test]
fn racing_for_the_same_name_admits_one() {
    let (shared, kennel) = setup();
    let handles: Vec<_> = (0..8)
        .map(|i| shared.spawn_generate(kennel.clone(), Instantiation::named("Kennel_A").value("dogs", i)))
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .filter_map(|o| o.as_ref().err())
        .all(|e| matches!(e, ClabjectError::DuplicateClabject(_))));
    let count = shared
        .with(|hierarchy| Ok(hierarchy.direct_instances(&kennel)?.len()))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn failed_generations_leave_no_trace() {
    let (shared, kennel) = setup();
    let handle = shared.spawn_generate(kennel.clone(), Instantiation::named("Broken").value("dogs", "many"));
    assert!(matches!(handle.join(), Err(ClabjectError::ConstraintViolation(_))));
    shared
        .with(|hierarchy| {
            assert!(hierarchy.find("Broken").is_none());
            assert!(hierarchy.direct_instances(&kennel)?.is_empty());
            Ok(())
        })
        .unwrap();
    let other_handle = shared.clone();
    assert!(matches!(shared.into_inner(), Err(ClabjectError::Lock(_))));
    drop(other_handle);
}
