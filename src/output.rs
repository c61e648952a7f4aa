//! CLI output formatting.
//!
//! Output is information-first: every entity leads with its position in the
//! field and its identity, with details on indented context lines.
//!
//! ```text
//! field_hero (background_image_tools_media)
//!     CSS Selector: #node-[node:nid]
//!     Image Style: Wide (1090)
//! 001 media 7 → background_image_tools__3b0e...__7
//!     #node-42 { background-image: url('/sites/default/files/styles/wide/hero/a.png'); }
//! 002 media 8 skipped
//!     media 8 has a 'oembed:video' source that stores no file
//! 003 media 9 not an image
//!
//! 1 rule, 1 skipped, 1 filtered
//! ```
//!
//! Each `format_*` function returns `Vec<String>` for testability; the
//! `print_*` wrappers write to stdout.

use crate::formatter::FormatterVariant;
use crate::pipeline::RenderReport;
use crate::types::{AssetReference, EntityId};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Format the result of rendering one field, entity by entity in field order.
pub fn format_render_output(
    field_name: &str,
    variant: FormatterVariant,
    summary: &[String],
    entities: &[AssetReference],
    report: &RenderReport,
) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", field_name, variant.plugin_id())];
    lines.extend(summary.iter().map(|s| format!("{}{}", indent(1), s)));

    for (i, entity) in entities.iter().enumerate() {
        let header = format!(
            "{} {} {}",
            format_index(i + 1),
            entity.entity_type(),
            entity.id()
        );
        let id = entity.id();

        if let Some(fragment) = report.fragments.iter().find(|f| f.source.as_ref() == Some(id)) {
            lines.push(format!("{} → {}", header, fragment.fragment_key));
            lines.push(format!("{}{}", indent(1), fragment.css_text));
        } else if let Some(skip) = report.skipped.iter().find(|s| &s.entity == id) {
            lines.push(format!("{} skipped", header));
            lines.push(format!("{}{}", indent(1), skip.reason));
        } else if report.filtered.contains(id) {
            lines.push(format!("{} not an image", header));
        } else {
            // Layered into a combined rule owned by another entity.
            lines.push(format!("{} combined", header));
        }
    }

    if let Some(reason) = &report.empty_reason {
        lines.push(format!("{}Nothing rendered: {}", indent(1), reason));
    }

    lines.push(String::new());
    lines.push(format!(
        "{}, {} skipped, {} filtered",
        plural(report.fragments.len(), "rule"),
        report.skipped.len(),
        report.filtered.len()
    ));
    lines
}

pub fn print_render_output(
    field_name: &str,
    variant: FormatterVariant,
    summary: &[String],
    entities: &[AssetReference],
    report: &RenderReport,
) {
    for line in format_render_output(field_name, variant, summary, entities, report) {
        println!("{}", line);
    }
}

/// Format registered image styles as `name  label` lines.
pub fn format_style_options(options: &[(String, String)]) -> Vec<String> {
    if options.is_empty() {
        return vec!["No image styles registered".to_string()];
    }
    let width = options.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    options
        .iter()
        .map(|(name, label)| format!("{:<width$}  {}", name, label, width = width))
        .collect()
}

pub fn print_style_options(options: &[(String, String)]) {
    for line in format_style_options(options) {
        println!("{}", line);
    }
}

/// Exit status of `render` when an image in the field ended up in no rule.
pub const EXIT_UNRENDERED: u8 = 2;

/// Ids of entities that ended up in no rule.
pub fn unrendered(entities: &[AssetReference], report: &RenderReport) -> Vec<EntityId> {
    entities
        .iter()
        .map(|e| e.id())
        .filter(|id| report.skipped.iter().any(|s| &s.entity == *id))
        .cloned()
        .collect()
}

/// `0` when every image was rendered, [`EXIT_UNRENDERED`] otherwise.
///
/// Images filtered out by the variant do not count.
pub fn exit_status(entities: &[AssetReference], report: &RenderReport) -> u8 {
    if unrendered(entities, report).is_empty() {
        0
    } else {
        EXIT_UNRENDERED
    }
}
