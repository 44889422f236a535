use std::fs;
use std::path::PathBuf;

use clabjects::constraint::IS_STR;
use clabjects::construct::{Hierarchy, Instantiation};
use clabjects::datatype::{Clabject, Method, Value};
use clabjects::error::ClabjectError;
use clabjects::property::Property;
use clabjects::viz::{render_dot, write_dot, VizSettings};

// Breed -> Collie -> lassie
//       -> GoldenRetriever (coat_colour one step earlier)
fn setup() -> (Hierarchy, Clabject) {
    let mut hierarchy = Hierarchy::new();
    let origin = hierarchy.origin();
    let breed = hierarchy.generate(&origin, Instantiation::named("Breed")).unwrap();
    hierarchy
        .define(
            &breed,
            vec![
                Property::build("make_noise").method().finish().unwrap(),
                Property::build("coat_colour").steps_to(2).constraint(&IS_STR).finish().unwrap(),
            ],
        )
        .unwrap();
    let bark = Method::unary("make_noise", |_, _| Ok(Value::from("Wuff")));
    let collie = hierarchy
        .generate(&breed, Instantiation::named("Collie").value("make_noise", bark.clone()))
        .unwrap();
    hierarchy
        .generate(
            &breed,
            Instantiation::named("GoldenRetriever")
                .speed("coat_colour", -1)
                .value("make_noise", bark)
                .value("coat_colour", "golden"),
        )
        .unwrap();
    hierarchy
        .generate(&collie, Instantiation::named("Lassie").terminal().value("coat_colour", "sable"))
        .unwrap();
    (hierarchy, breed)
}

fn scratch_dir(test: &str) -> PathBuf {
    std::env::temp_dir().join(format!("clabjects-{}-{}", test, std::process::id()))
}

#[test]
fn depth_first_rendering() {
    let (hierarchy, breed) = setup();
    let dot = render_dot(&hierarchy, &breed, &VizSettings::default()).unwrap();
    assert!(dot.starts_with("digraph \"cluster_Breed\" {"));
    assert!(dot.trim_end().ends_with('}'));
    for node in ["\"Breed\" [label=<", "\"Collie\" [label=<", "\"GoldenRetriever\" [label=<", "\"Lassie\" [label=<"] {
        assert!(dot.contains(node), "missing {node}");
    }
    assert!(dot.contains("<b>lassie</b>"));
    assert!(dot.contains("\"Breed\" -> \"GoldenRetriever\" [label=\"{coat_colour: -1}\""));
    assert!(dot.contains("\"Breed\" -> \"Collie\" [label=\"\""));
    assert!(dot.contains("Implementation from Collie: make_noise/1"));
    assert!(dot.contains("coat_colour (0, *): golden"));
    assert!(dot.contains("fontsize=\"14\""));
}

#[test]
fn hidden_root_and_hierarchy_name() {
    let (hierarchy, breed) = setup();
    let settings = VizSettings {
        hidden_root: true,
        show_hierarchy_name: true,
        ..VizSettings::default()
    };
    let dot = render_dot(&hierarchy, &breed, &settings).unwrap();
    assert!(!dot.contains("\"Breed\" [label=<"));
    assert!(!dot.contains("\"Breed\" -> "));
    assert!(dot.contains("\"Collie\" -> \"Lassie\""));
    assert!(dot.contains("label=\"Breed_Hierarchy\""));
}

#[test]
fn level_by_level_rendering() {
    let (hierarchy, breed) = setup();
    let settings = VizSettings {
        by_level: true,
        ..VizSettings::default()
    };
    let dot = render_dot(&hierarchy, &breed, &settings).unwrap();
    for cluster in ["Breed_Hierarchy_2", "Breed_Hierarchy_1", "Breed_Hierarchy_0"] {
        assert!(dot.contains(&format!("subgraph \"cluster_{}\"", cluster)), "missing {cluster}");
    }
    let top = dot.find("cluster_Breed_Hierarchy_2").unwrap();
    let bottom = dot.find("cluster_Breed_Hierarchy_0").unwrap();
    let lassie = dot.find("\"Lassie\" [label=<").unwrap();
    assert!(top < bottom && bottom < lassie);
    assert!(dot.contains("\"Collie\" -> \"Lassie\""));
}

#[test]
fn unknown_start_is_rejected() {
    let (hierarchy, _) = setup();
    let mut elsewhere = Hierarchy::new();
    let origin = elsewhere.origin();
    let stranger = elsewhere.generate(&origin, Instantiation::named("Stranger")).unwrap();
    assert!(matches!(
        render_dot(&hierarchy, &stranger, &VizSettings::default()),
        Err(ClabjectError::NotAClabject(_))
    ));
}

#[test]
fn settings_fall_back_to_defaults() {
    let settings = VizSettings::load(Some("/definitely/not/here/clabjects")).unwrap();
    assert_eq!(settings.font, "arial");
    assert_eq!(settings.fontsize, 12);
    assert_eq!(settings.format, "png");
    assert_eq!(settings.output_dir, "viz_output");
}

#[test]
fn settings_file_overrides_defaults() {
    let dir = scratch_dir("settings");
    fs::create_dir_all(&dir).unwrap();
    let file = dir.join("viz.toml");
    fs::write(&file, "format = \"svg\"\nfontsize = 20\nby_level = true\n").unwrap();
    let settings = VizSettings::load(file.to_str()).unwrap();
    assert_eq!(settings.format, "svg");
    assert_eq!(settings.fontsize, 20);
    assert!(settings.by_level);
    assert_eq!(settings.font, "arial");
    assert_eq!(
        settings.render_command(&dir.join("hierarchy.dot")),
        format!(
            "dot -Tsvg {} -o {}",
            dir.join("hierarchy.dot").display(),
            dir.join("hierarchy.svg").display()
        )
    );
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn dot_file_is_written_into_the_output_dir() {
    let (hierarchy, breed) = setup();
    let dir = scratch_dir("write");
    let settings = VizSettings {
        output_dir: dir.to_string_lossy().into_owned(),
        output_name: "breeds".to_owned(),
        ..VizSettings::default()
    };
    let path = write_dot(&hierarchy, &breed, &settings).unwrap();
    assert_eq!(path, dir.join("breeds.dot"));
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, render_dot(&hierarchy, &breed, &settings).unwrap());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn huge_font_sizes_from_settings_do_not_overflow() {
    let (hierarchy, breed) = setup();
    let settings = VizSettings {
        fontsize: u32::MAX,
        ..VizSettings::default()
    };
    let dot = render_dot(&hierarchy, &breed, &settings).unwrap();
    assert!(dot.contains(&format!("fontsize=\"{}\"", u32::MAX)));
    assert!(dot.contains(&format!("style=\"dashed\", fontsize=\"{}\"", u32::MAX / 5)));
}
