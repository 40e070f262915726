//! Per-command project context: the open project, the acting user and the
//! loaded inventory.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{Actor, Inventory, RecordId};
use crate::storage::Project;

pub struct Session {
    pub project: Project,
    pub actor: Actor,
    pub inventory: Inventory,
}

impl Session {
    /// Opens the current project and loads its inventory as `actor_override`
    /// (or the configured actor)
    pub fn open(actor_override: Option<&str>, output: &Output) -> Result<Self> {
        let project = Project::open_current()?;
        let actor = project.config().resolve_actor(actor_override)?;
        let inventory = project.load_inventory()?;

        output.verbose_ctx(
            "session",
            &format!(
                "Project {} as {} ({} records)",
                project.root().display(),
                actor.id,
                inventory.len()
            ),
        );

        Ok(Self {
            project,
            actor,
            inventory,
        })
    }

    /// Writes the inventory back; a failed write is reported but not fatal
    pub fn save(&self, output: &Output) {
        if self.project.save_inventory(&self.inventory) {
            output.verbose_ctx("session", "Inventory saved");
        } else {
            output.error("Changes could not be saved to disk");
        }
    }

    /// Parses a record ID and checks that it exists
    pub fn require_record(&self, id: &str) -> Result<RecordId> {
        let id: RecordId = id.parse()?;
        if self.inventory.get(&id).is_none() {
            anyhow::bail!("Record not found: {}", id);
        }
        Ok(id)
    }
}

/// Asks a yes/no question on stderr; only `y` or `yes` confirms
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    eprint!("{} [y/N] ", prompt);
    io::stderr().flush().context("Failed to write prompt")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_y_or_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn assume_yes_skips_prompt() {
        assert!(confirm("Replace?", true).unwrap());
    }
}
