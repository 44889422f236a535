//! Graphviz rendering of instantiation hierarchies.
//!
//! Settings are read from an optional `clabjects.toml` (or any format the
//! `config` crate understands) and from `CLABJECTS_*` environment variables,
//! the latter taking precedence.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::construct::Hierarchy;
use crate::datatype::Clabject;
use crate::error::{ClabjectError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizSettings {
    pub output_dir: String,
    pub output_name: String,
    /// Anything `dot -T` accepts, e.g. png, svg or pdf.
    pub format: String,
    pub font: String,
    pub fontsize: u32,
    /// Breadth first, one cluster per level, instead of depth first.
    pub by_level: bool,
    pub hidden_root: bool,
    pub show_hierarchy_name: bool,
}

impl Default for VizSettings {
    fn default() -> Self {
        Self {
            output_dir: "viz_output".to_owned(),
            output_name: "hierarchy".to_owned(),
            format: "png".to_owned(),
            font: "arial".to_owned(),
            fontsize: 12,
            by_level: false,
            hidden_root: false,
            show_hierarchy_name: false,
        }
    }
}

impl VizSettings {
    /// Load settings from an optional file, then the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&VizSettings::default())?);
        if let Some(path) = path {
            if !Path::new(path).exists() && !Path::new(&format!("{}.toml", path)).exists() {
                warn!(path = %path, "visualization settings not found, using defaults");
            }
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("CLABJECTS")
                .prefix_separator("_")
                .try_parsing(true),
        );
        Ok(builder.build()?.try_deserialize()?)
    }
    /// The shell command turning a written dot file into the configured format.
    pub fn render_command(&self, dot_file: &Path) -> String {
        format!(
            "dot -T{} {} -o {}",
            self.format,
            dot_file.display(),
            dot_file.with_extension(&self.format).display()
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn node(dot: &mut String, hierarchy: &Hierarchy, clabject: &Clabject, settings: &VizSettings) -> Result<()> {
    let mut label = format!(
        "<table border=\"0\" cellborder=\"1\" cellspacing=\"0\"><tr><td bgcolor=\"lightgrey\"><b>{}</b></td></tr>",
        escape(&hierarchy.display_name(clabject)?)
    );
    for property in hierarchy.properties(clabject)?.iter() {
        let value = property
            .value()
            .map(|v| v.render())
            .unwrap_or_default();
        write!(
            label,
            "<tr><td align=\"left\">{} ({}, {}): {}</td></tr>",
            escape(property.name()),
            property.steps_to(),
            property.steps_from(),
            escape(&value)
        )?;
    }
    label.push_str("</table>");
    writeln!(
        dot,
        "  \"{}\" [label=<{}>, fontname=\"{}\", fontsize=\"{}\"];",
        escape(clabject.name()),
        label,
        settings.font,
        settings.fontsize
    )?;
    Ok(())
}

fn edge(dot: &mut String, hierarchy: &Hierarchy, parent: &Clabject, instance: &Clabject, settings: &VizSettings) -> Result<()> {
    let record = hierarchy.record(parent)?;
    let label = match record.speed_adjustments().get(instance.name()) {
        Some(adjustments) => {
            let parts: Vec<String> = adjustments
                .iter()
                .map(|(property, delta)| {
                    if *delta > 0 {
                        format!("{}: +{}", property, delta)
                    } else {
                        format!("{}: {}", property, delta)
                    }
                })
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        None => String::new(),
    };
    writeln!(
        dot,
        "  \"{}\" -> \"{}\" [label=\"{}\", style=\"dashed\", fontsize=\"{}\"];",
        escape(parent.name()),
        escape(instance.name()),
        escape(&label),
        settings.fontsize.saturating_mul(6) / 5
    )?;
    Ok(())
}

fn depth_first(
    dot: &mut String,
    hierarchy: &Hierarchy,
    clabject: &Clabject,
    settings: &VizSettings,
    hidden: bool,
) -> Result<()> {
    if !hidden {
        node(dot, hierarchy, clabject, settings)?;
    }
    for instance in hierarchy.direct_instances(clabject)? {
        if !hidden {
            edge(dot, hierarchy, clabject, instance, settings)?;
        }
        depth_first(dot, hierarchy, instance, settings, false)?;
    }
    Ok(())
}

fn by_level(dot: &mut String, hierarchy: &Hierarchy, start: &Clabject, settings: &VizSettings) -> Result<()> {
    let hierarchy_name = format!("{}_Hierarchy", start.name());
    let mut level = hierarchy.depth(start)?;
    let mut current = vec![start.clone()];
    let mut previous: Vec<Clabject> = Vec::new();
    loop {
        let level_label = format!("{}_{}", hierarchy_name, level);
        writeln!(dot, "  subgraph \"cluster_{}\" {{\n  label=\"{}\";", level_label, level_label)?;
        let mut next = Vec::new();
        for clabject in &current {
            node(dot, hierarchy, clabject, settings)?;
            next.extend(hierarchy.direct_instances(clabject)?.iter().cloned());
        }
        dot.push_str("  }\n");
        for parent in &previous {
            for instance in hierarchy.direct_instances(parent)? {
                edge(dot, hierarchy, parent, instance, settings)?;
            }
        }
        if next.is_empty() || level == 0 {
            break;
        }
        level -= 1;
        previous = std::mem::replace(&mut current, next);
    }
    Ok(())
}

/// Renders the hierarchy below `start` as a dot digraph.
pub fn render_dot(hierarchy: &Hierarchy, start: &Clabject, settings: &VizSettings) -> Result<String> {
    if !hierarchy.contains(start) {
        return Err(ClabjectError::NotAClabject(start.name().to_owned()));
    }
    let label = if settings.show_hierarchy_name {
        format!("{}_Hierarchy", start.name())
    } else {
        String::new()
    };
    let mut dot = String::new();
    writeln!(dot, "digraph \"cluster_{}\" {{", escape(start.name()))?;
    dot.push_str("  comment=\"Visualization of Instantiation Hierarchy\";\n");
    writeln!(
        dot,
        "  graph [splines=polyline, rankdir=LR, labelloc=t, fontname=\"arial\", label=\"{}\", fontsize=\"10\"];",
        escape(&label)
    )?;
    dot.push_str("  node [shape=plaintext];\n");
    if settings.by_level {
        by_level(&mut dot, hierarchy, start, settings)?;
    } else {
        depth_first(&mut dot, hierarchy, start, settings, settings.hidden_root)?;
    }
    dot.push_str("}\n");
    Ok(dot)
}

/// Writes the dot source into the configured output directory.
pub fn write_dot(hierarchy: &Hierarchy, start: &Clabject, settings: &VizSettings) -> Result<PathBuf> {
    let dot = render_dot(hierarchy, start, settings)?;
    fs::create_dir_all(&settings.output_dir)?;
    let path = Path::new(&settings.output_dir).join(format!("{}.dot", settings.output_name));
    fs::write(&path, dot)?;
    info!(path = %path.display(), "wrote hierarchy visualization");
    Ok(path)
}
