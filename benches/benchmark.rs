use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use clabjects::constraint::{Lineage, IS_INT, IS_STR};
use clabjects::construct::{Hierarchy, Instantiation};
use clabjects::datatype::{Clabject, Value};
use clabjects::property::Property;
use clabjects::staging::{PropertySet, ProvidedValues, SpeedAdjustments};

struct Detached;
impl Lineage for Detached {
    fn generated_from(&self, _: &Clabject) -> Option<Clabject> {
        None
    }
    fn value_of(&self, _: &Clabject, _: &str) -> clabjects::Result<Option<Value>> {
        Ok(None)
    }
}

// n properties, half of them due at the next step
fn property_set(n: usize) -> PropertySet {
    (0..n)
        .map(|i| {
            Property::build(&format!("p{}", i))
                .steps_to(1 + (i % 2) as u32)
                .constraint(if i % 3 == 0 { &*IS_STR } else { &*IS_INT })
                .finish()
                .unwrap()
        })
        .collect()
}

fn due_values(n: usize) -> ProvidedValues {
    (0..n)
        .step_by(2)
        .map(|i| {
            let value = if i % 3 == 0 { Value::from(format!("v{}", i)) } else { Value::Int(i as i64) };
            (format!("p{}", i), value)
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let no_speed = SpeedAdjustments::new();
    for n in [10, 100, 1000] {
        let set = property_set(n);
        let provided = due_values(n);
        c.bench_function(&format!("advance {}", n), |b| {
            b.iter(|| set.advance(black_box(&provided), &no_speed, &Detached).unwrap())
        });
    }

    let mut hierarchy = Hierarchy::new();
    let origin = hierarchy.origin();
    let parent = hierarchy.generate(&origin, Instantiation::named("Parent")).unwrap();
    hierarchy
        .define(
            &parent,
            vec![
                Property::build("name").constraint(&IS_STR).finish().unwrap(),
                Property::build("count").steps_to(2).constraint(&IS_INT).finish().unwrap(),
            ],
        )
        .unwrap();
    let mut counter = 0u64;
    c.bench_function("generate", |b| {
        b.iter_batched(
            || {
                counter += 1;
                Instantiation::named(&format!("Child_{}", counter)).value("name", "child")
            },
            |instantiation| hierarchy.generate(&parent, instantiation).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
