//! Plugin discovery and execution
//!
//! Suggestion plugins are executables named `medstock-suggest-<name>`,
//! looked up in the project's `.medstock/plugins/` first and then on `$PATH`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use super::protocol::{Operation, PluginRequest, PluginResponse};
use super::suggestion::{parse_details, parse_extraction, parse_price, parse_text, Suggestion};
use super::{SuggestError, Suggester};

/// Executable name prefix for suggestion plugins
pub const PLUGIN_PREFIX: &str = "medstock-suggest-";

/// A [`Suggester`] backed by an external plugin process
#[derive(Debug, Clone)]
pub struct PluginSuggester {
    name: String,
    path: PathBuf,
}

impl PluginSuggester {
    /// Uses the executable at `path` directly
    pub fn at(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Finds `medstock-suggest-<name>` in `plugin_dirs`, then on `$PATH`
    pub fn discover(name: &str, plugin_dirs: &[PathBuf]) -> Result<Self, SuggestError> {
        let file_name = format!("{}{}", PLUGIN_PREFIX, name);

        let path_dirs = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect::<Vec<_>>())
            .unwrap_or_default();

        let found = plugin_dirs
            .iter()
            .chain(path_dirs.iter())
            .map(|dir| dir.join(&file_name))
            .find(|candidate| is_executable(candidate));

        match found {
            Some(path) => {
                tracing::debug!(plugin = %file_name, path = %path.display(), "found suggestion plugin");
                Ok(Self::at(name, path))
            }
            None => Err(SuggestError::NotFound(file_name)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sends one request and returns the response data
    pub fn call(&self, request: &PluginRequest) -> Result<Value, SuggestError> {
        let io_error = |source| SuggestError::Io {
            plugin: self.name.clone(),
            source,
        };

        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(io_error)?;

        let request_json =
            serde_json::to_string(request).map_err(|e| io_error(std::io::Error::other(e)))?;

        // Stdin is closed when dropped at the end of this block
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| io_error(std::io::Error::other("plugin stdin unavailable")))?;
            writeln!(stdin, "{}", request_json).map_err(io_error)?;
        }

        let output = child.wait_with_output().map_err(io_error)?;

        let response_line = String::from_utf8_lossy(&output.stdout)
            .lines()
            .find(|line| !line.trim().is_empty())
            .map(str::to_string);

        let Some(response_line) = response_line else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(if output.status.success() {
                SuggestError::NoResponse(self.name.clone())
            } else {
                SuggestError::Failed {
                    plugin: self.name.clone(),
                    message: stderr,
                }
            });
        };

        let response: PluginResponse =
            serde_json::from_str(&response_line).map_err(|source| SuggestError::InvalidResponse {
                plugin: self.name.clone(),
                source,
            })?;

        if !response.success {
            return Err(SuggestError::Failed {
                plugin: self.name.clone(),
                message: response.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        tracing::debug!(plugin = %self.name, operation = request.operation.as_str(), "plugin answered");
        Ok(response.data.unwrap_or(Value::Null))
    }

    fn request(&self, operation: Operation, params: Value) -> Result<Value, SuggestError> {
        self.call(&PluginRequest::new(operation, params))
    }
}

impl Suggester for PluginSuggester {
    fn extract_from_text(&self, text: &str) -> Result<Vec<Suggestion>, SuggestError> {
        let data = self.request(Operation::ExtractText, json!({ "text": text }))?;
        Ok(parse_extraction(data))
    }

    fn extract_from_file(&self, data: &[u8], mime_type: &str) -> Result<Vec<Suggestion>, SuggestError> {
        let params = json!({
            "data": STANDARD.encode(data),
            "mimeType": mime_type,
        });
        Ok(parse_extraction(self.request(Operation::ExtractFile, params)?))
    }

    fn suggest_price(&self, name: &str, presentation: Option<&str>) -> Result<Option<f64>, SuggestError> {
        let params = json!({ "name": name, "presentation": presentation });
        Ok(parse_price(self.request(Operation::Price, params)?))
    }

    fn suggest_class(&self, name: &str, active_ingredient: Option<&str>) -> Result<Option<String>, SuggestError> {
        let params = json!({ "name": name, "activeIngredient": active_ingredient });
        Ok(parse_text(self.request(Operation::Class, params)?, "class"))
    }

    fn suggest_details(&self, name: &str) -> Result<Option<Suggestion>, SuggestError> {
        let data = self.request(Operation::Details, json!({ "name": name }))?;
        Ok(parse_details(data))
    }

    fn mechanism_of_action(&self, active_ingredient: &str) -> Result<Option<String>, SuggestError> {
        let params = json!({ "activeIngredient": active_ingredient });
        Ok(parse_text(
            self.request(Operation::Mechanism, params)?,
            "mechanismOfAction",
        ))
    }
}

/// Checks if a file is executable
fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.permissions().mode() & 0o111 != 0;
        }
    }

    #[cfg(windows)]
    {
        if let Some(ext) = path.extension() {
            return ext == "exe" || ext == "bat" || ext == "cmd";
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn discover_in_empty_dir_fails() {
        let dir = TempDir::new().unwrap();
        let result = PluginSuggester::discover("definitely-not-installed", &[dir.path().to_path_buf()]);

        assert!(matches!(result, Err(SuggestError::NotFound(name)) if name == "medstock-suggest-definitely-not-installed"));
    }

    #[cfg(unix)]
    fn write_plugin(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(format!("{}{}", PLUGIN_PREFIX, name));
        std::fs::write(&path, format!("#!/bin/sh\ncat > /dev/null\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn discover_prefers_project_plugins() {
        let dir = TempDir::new().unwrap();
        let path = write_plugin(dir.path(), "fake", "echo '{}'");

        let plugin = PluginSuggester::discover("fake", &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(plugin.path(), path);
        assert_eq!(plugin.name(), "fake");
    }

    #[cfg(unix)]
    #[test]
    fn extraction_round_trip_through_plugin() {
        let dir = TempDir::new().unwrap();
        let path = write_plugin(
            dir.path(),
            "fake",
            r#"echo '{"success": true, "data": {"medications": [{"name": "Dipirona", "pmc": 9.9}]}}'"#,
        );

        let plugin = PluginSuggester::at("fake", path);
        let found = plugin.extract_from_text("Dipirona 500mg").unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("Dipirona"));
        assert_eq!(found[0].pmc, Some(9.9));
    }

    #[cfg(unix)]
    #[test]
    fn plugin_error_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = write_plugin(
            dir.path(),
            "broken",
            r#"echo '{"success": false, "error": "quota exceeded"}'"#,
        );

        let plugin = PluginSuggester::at("broken", path);
        let err = plugin.suggest_price("Dipirona", None).unwrap_err();

        assert!(matches!(err, SuggestError::Failed { ref message, .. } if message == "quota exceeded"));
    }

    #[cfg(unix)]
    #[test]
    fn silent_plugin_is_no_response() {
        let dir = TempDir::new().unwrap();
        let path = write_plugin(dir.path(), "silent", "true");

        let plugin = PluginSuggester::at("silent", path);
        assert!(matches!(
            plugin.suggest_class("Dipirona", None),
            Err(SuggestError::NoResponse(_))
        ));
    }
}
