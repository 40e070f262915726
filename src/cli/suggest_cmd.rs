//! Suggestion-backed commands: extraction and mechanism explanations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use super::session::Session;
use crate::storage::Project;
use crate::suggest::{PluginSuggester, SuggestError, Suggester, Suggestion};

/// Finds the plugin named in the project's `[suggest]` settings
pub fn load_suggester(project: &Project) -> Result<PluginSuggester, SuggestError> {
    let name = project
        .config()
        .project
        .suggest
        .plugin
        .as_deref()
        .ok_or(SuggestError::NotConfigured)?;

    PluginSuggester::discover(name, &[project.plugins_dir()])
}

/// Mime type sent along with an extracted document
fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("txt") | Some("csv") => "text/plain",
        _ => "application/octet-stream",
    }
}

pub fn extract(
    output: &Output,
    actor: Option<&str>,
    text: Option<&str>,
    file: Option<&Path>,
    save: bool,
) -> Result<()> {
    let mut session = Session::open(actor, output)?;
    let suggester = load_suggester(&session.project)?;

    let found = match (text, file) {
        (Some(text), _) => suggester.extract_from_text(text)?,
        (None, Some(path)) => {
            let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            output.verbose_ctx("extract", &format!("Sending {} bytes as {}", data.len(), mime_type(path)));
            suggester.extract_from_file(&data, mime_type(path))?
        }
        (None, None) => anyhow::bail!("Pass --text or --file"),
    };
    output.verbose_ctx("extract", &format!("Plugin found {} medication(s)", found.len()));

    let mut created = Vec::new();
    if save {
        for suggestion in found.iter().cloned() {
            let Some(fields) = suggestion.into_fields() else {
                output.verbose_ctx("extract", "Skipping a medication without a name");
                continue;
            };
            match session.inventory.create(&session.actor, fields) {
                Ok(record) => created.push(record.clone()),
                Err(e) => tracing::warn!(error = %e, "skipping extracted medication"),
            }
        }
        if !created.is_empty() {
            session.save(output);
        }
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "found": found.iter().map(suggestion_json).collect::<Vec<_>>(),
            "created": created,
        }));
        return Ok(());
    }

    if found.is_empty() {
        println!("No medications found.");
        return Ok(());
    }

    println!("Found {} medication(s):", found.len());
    for suggestion in &found {
        let name = suggestion.name.as_deref().unwrap_or("(unnamed)");
        let details: Vec<&str> = [
            suggestion.presentation.as_deref(),
            suggestion.active_ingredient.as_deref(),
            suggestion.manufacturer.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if details.is_empty() {
            println!("  - {}", name);
        } else {
            println!("  - {} ({})", name, details.join(", "));
        }
    }

    if save {
        output.blank();
        output.success(&format!("Added {} record(s)", created.len()));
    }

    Ok(())
}

fn suggestion_json(s: &Suggestion) -> serde_json::Value {
    serde_json::json!({
        "name": s.name,
        "activeIngredient": s.active_ingredient,
        "manufacturer": s.manufacturer,
        "presentation": s.presentation,
        "class": s.class,
        "quantity": s.quantity,
        "pmc": s.pmc,
        "expirationDate": s.expiration_date,
    })
}

pub fn explain(output: &Output, ingredient: &str) -> Result<()> {
    let ingredient = ingredient.trim();
    if ingredient.is_empty() {
        anyhow::bail!("Active ingredient cannot be empty");
    }

    let project = Project::open_current()?;
    let suggester = load_suggester(&project)?;
    let text = suggester.mechanism_of_action(ingredient)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "activeIngredient": ingredient,
            "mechanismOfAction": text,
        }));
    } else {
        match text {
            Some(text) => println!("{}", text),
            None => println!("No explanation available for {}", ingredient),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types_by_extension() {
        assert_eq!(mime_type(Path::new("leaflet.PDF")), "application/pdf");
        assert_eq!(mime_type(Path::new("box.jpeg")), "image/jpeg");
        assert_eq!(mime_type(Path::new("notes")), "application/octet-stream");
    }
}
