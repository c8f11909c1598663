use std::fmt::Write;
use std::path::Path;

use serde::Serialize;
use sfdelta_core::Manifest;
use sfdelta_operations::operations::DeltaOutput;

use crate::error::CliError;

/// Machine-readable run summary printed with `--json`.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    success: bool,
    warnings: &'a [String],
    error: Option<String>,
    output: String,
}

pub(crate) fn success_json(delta: &DeltaOutput, output_dir: &Path) -> String {
    render(&RunSummary {
        success: true,
        warnings: &delta.warnings,
        error: None,
        output: output_dir.display().to_string(),
    })
}

pub(crate) fn failure_json(error: &CliError, output_dir: &Path) -> String {
    render(&RunSummary {
        success: false,
        warnings: &[],
        error: Some(error.chain()),
        output: output_dir.display().to_string(),
    })
}

fn render(summary: &RunSummary<'_>) -> String {
    serde_json::to_string_pretty(summary).unwrap_or_else(|e| {
        format!(r#"{{"success":false,"error":"failed to render summary: {e}"}}"#)
    })
}

pub(crate) fn format_text(delta: &DeltaOutput, output_dir: &Path) -> String {
    let mut text = String::new();

    if delta.to_add.is_empty() && delta.to_destroy.is_empty() {
        text.push_str("No metadata changes.\n");
    } else {
        format_manifest(&mut text, "To deploy", &delta.to_add);
        format_manifest(&mut text, "To destroy", &delta.to_destroy);
    }

    if !delta.warnings.is_empty() {
        let _ = writeln!(
            text,
            "{} change(s) skipped with warnings.",
            delta.warnings.len()
        );
    }
    let _ = writeln!(text, "Output written to '{}'.", output_dir.display());
    text
}

fn format_manifest(text: &mut String, title: &str, manifest: &Manifest) {
    if manifest.is_empty() {
        return;
    }
    let _ = writeln!(text, "{title}:");
    for (type_name, members) in manifest.iter() {
        for member in members {
            let _ = writeln!(text, "  {type_name}: {member}");
        }
    }
}
