//! Builds the breed hierarchy used throughout the documentation, logs what
//! the dogs have to say and writes the hierarchy as dot and JSON files.
//!
//! The first argument, if any, names the visualization settings file
//! (defaults to `clabjects`, i.e. `clabjects.toml` and friends).

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use clabjects::constraint::{instance_of_order, optional, Order, IS_DATE, IS_STR};
use clabjects::construct::{ClabjectView, GenerationEvent};
use clabjects::viz::{write_dot, VizSettings};
use clabjects::{Clabject, Hierarchy, Instantiation, Method, Property, Result, Value};

fn date(year: i32, month: u32, day: u32) -> Value {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(Value::Date)
        .unwrap_or(Value::Empty)
}

fn noise(text: &'static str) -> Method {
    Method::unary("make_noise", move |_, _| Ok(Value::from(text)))
}

fn breeds(hierarchy: &mut Hierarchy) -> Result<Clabject> {
    let origin = hierarchy.origin();
    let breed = hierarchy.generate(&origin, Instantiation::named("Breed"))?;
    hierarchy.define(
        &breed,
        vec![
            Property::build("make_noise").steps_to(1).unbounded().method().finish()?,
            Property::build("coat_colour").steps_to(2).steps_from(1).constraint(&IS_STR).final_().finish()?,
            Property::build("father").steps_to(3).unbounded().association().final_().finish()?,
            Property::build("year_of_birth").steps_to(3).unbounded().constraint(&IS_DATE).final_().finish()?,
        ],
    )?;

    let collie = hierarchy.generate(
        &breed,
        Instantiation::named("Collie").value("make_noise", noise("Wuff - I'm a Collie")),
    )?;
    let golden_retriever = hierarchy.generate(
        &breed,
        Instantiation::named("GoldenRetriever")
            .speed("coat_colour", -1)
            .value("make_noise", noise("Wuff I'm a Golden Retriever"))
            .value("coat_colour", "light golden to dark golden"),
    )?;
    let sable_rough_collie = hierarchy.generate(
        &collie,
        Instantiation::named("SableRoughCollie").value("coat_colour", "sable-white"),
    )?;
    let father_constraint = instance_of_order(&sable_rough_collie, Order::Exactly(1))?;
    hierarchy.add_constraint(&sable_rough_collie, "father", &optional(&father_constraint))?;

    let sam = hierarchy.generate(
        &sable_rough_collie,
        Instantiation::named("Sam")
            .terminal()
            .value("year_of_birth", date(1996, 3, 2))
            .value("father", Value::Empty)
            .value(
                "make_noise",
                Method::unary("make_noise", |_, target| {
                    Ok(Value::from(format!("Wuff I'm called {}", target.name())))
                }),
            ),
    )?;
    hierarchy.generate(
        &sable_rough_collie,
        Instantiation::named("Lassie")
            .value("year_of_birth", date(2002, 2, 20))
            .value("father", &sam),
    )?;
    hierarchy.generate(
        &golden_retriever,
        Instantiation::named("Derek")
            .speed("year_of_birth", -1)
            .speed("father", -1)
            .value("year_of_birth", date(2016, 9, 15))
            .value("father", Value::Empty),
    )?;
    Ok(breed)
}

fn views(hierarchy: &Hierarchy, start: &Clabject, collected: &mut Vec<ClabjectView>) -> Result<()> {
    collected.push(hierarchy.describe(start)?);
    for instance in hierarchy.direct_instances(start)? {
        views(hierarchy, instance, collected)?;
    }
    Ok(())
}

fn run() -> Result<()> {
    let settings_path = std::env::args().nth(1).unwrap_or_else(|| "clabjects".to_owned());
    let settings = VizSettings::load(Some(&settings_path))?;

    let mut hierarchy = Hierarchy::new();
    hierarchy.observe(Box::new(|event: &GenerationEvent| {
        info!(
            clabject = %event.child,
            parent = %event.parent,
            terminal = event.terminal,
            speed_adjustments = ?event.speed_adjustments,
            "instantiation step"
        );
    }));
    let breed = breeds(&mut hierarchy)?;

    for name in ["Collie", "GoldenRetriever", "Sam", "Lassie", "Derek"] {
        if let Some(dog) = hierarchy.find(name) {
            let said = hierarchy.call(&dog, "make_noise", &[])?;
            info!(clabject = %hierarchy.display_name(&dog)?, said = %said, "make_noise");
        }
    }

    let dot_file = write_dot(&hierarchy, &breed, &settings)?;
    info!(command = %settings.render_command(&dot_file), "render the dot file with graphviz");

    let mut collected = Vec::new();
    views(&hierarchy, &breed, &mut collected)?;
    let json_file = Path::new(&settings.output_dir).join(format!("{}.json", settings.output_name));
    fs::write(&json_file, serde_json::to_string_pretty(&collected)?)?;
    info!(path = %json_file.display(), clabjects = collected.len(), "wrote hierarchy snapshot");
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    if let Err(e) = run() {
        error!(error = %e, "clabjects demo failed");
        std::process::exit(1);
    }
}
