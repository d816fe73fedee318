//! Acceptance checks for a single uploaded export

use super::file::FileHandle;
use crate::config::ValidationConfig;

const MIB: f64 = 1024.0 * 1024.0;

/// Stateless checks on one candidate file
///
/// Both checks return a list of human-readable violations; an empty list means
/// the file is acceptable. Neither check mutates anything.
#[derive(Clone, Debug, Default)]
pub struct FileValidator {
    config: ValidationConfig,
}

impl FileValidator {
    /// Create a validator with custom rules
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Rules in use
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Name and size checks
    ///
    /// All rules are evaluated, so a tiny file with the wrong extension
    /// reports both problems.
    pub fn validate(&self, file: &FileHandle) -> Vec<String> {
        let mut violations = Vec::new();
        let extension = self.config.extension.trim_start_matches('.');

        if !has_extension(file.name(), extension) {
            violations.push(format!(
                "File must be an {} file (.{})",
                extension.to_uppercase(),
                extension
            ));
        }

        if file.size_bytes() > self.config.max_file_bytes {
            violations.push(format!(
                "File size ({:.2}MB) exceeds the {}MB limit",
                file.size_bytes() as f64 / MIB,
                format_limit(self.config.max_file_bytes)
            ));
        }

        if file.size_bytes() < self.config.min_file_bytes {
            violations.push(
                "File appears to be empty or too small to contain FM24 data".to_string(),
            );
        }

        violations
    }

    /// Full-text checks
    ///
    /// Reads the file once. A read failure is reported on its own; otherwise
    /// one violation is reported per failed category (markup, table
    /// structure, content size, field vocabulary).
    pub async fn validate_content(&self, file: &FileHandle) -> Vec<String> {
        let text = match file.read_text().await {
            Ok(text) => text,
            Err(e) => return vec![format!("Failed to read file content: {}", e)],
        };

        self.check_text(&text)
    }

    fn check_text(&self, text: &str) -> Vec<String> {
        let mut violations = Vec::new();
        let lowered = text.to_lowercase();

        let has_markup = self
            .config
            .markup_indicators
            .iter()
            .any(|m| lowered.contains(&m.to_lowercase()));
        if !has_markup {
            violations.push("File does not appear to be a valid HTML export from FM24".to_string());
        }

        let has_structure = self
            .config
            .structure_markers
            .iter()
            .all(|m| lowered.contains(&m.to_lowercase()));
        if !has_structure {
            violations.push("File does not contain expected FM24 table structure".to_string());
        }

        if text.len() < self.config.min_content_bytes {
            violations.push(
                "File content appears too small to contain meaningful player data".to_string(),
            );
        }

        let found = self
            .config
            .field_tokens
            .iter()
            .filter(|token| text.contains(token.as_str()))
            .count();
        if found < self.config.min_field_tokens {
            violations.push(format!(
                "File does not appear to contain player data from FM24 (expected at least {} of: {})",
                self.config.min_field_tokens,
                self.config.field_tokens.join(", ")
            ));
        }

        violations
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case(extension))
}

fn format_limit(bytes: u64) -> String {
    const WHOLE_MIB: u64 = 1024 * 1024;
    if bytes % WHOLE_MIB == 0 {
        format!("{}", bytes / WHOLE_MIB)
    } else {
        format!("{:.2}", bytes as f64 / MIB)
    }
}
