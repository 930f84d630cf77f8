// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge.
//!
//! Turns Figment extraction errors into miette diagnostics that point at the
//! offending key in the TOML file and suggest the closest valid key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a valid key must beat to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, rendered with miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {section}")]
    #[diagnostic(
        code(clanbattle::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// `[battle]`, `[stages.jp]` or `the top level`.
        section: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a {section} key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(clanbattle::config::invalid_type), help("{hint}"))]
    InvalidType {
        key: String,
        detail: String,
        hint: String,
        #[label("here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing key `{key}`")]
    #[diagnostic(
        code(clanbattle::config::missing_key),
        help("add `{key} = <value>` to your clanbattle.toml")
    )]
    MissingKey { key: String },

    /// A value that parsed but breaks a rule (ranges, counts, limits).
    #[error("validation error: {message}")]
    #[diagnostic(code(clanbattle::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(clanbattle::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// What a mistyped key should look like, for the keys people get wrong.
fn type_hint(key: &str, expected: &str) -> String {
    match key.rsplit('.').next().unwrap_or(key) {
        "health" => "list exactly five boss health values, e.g. `health = [6000000, 8000000, 10000000, 12000000, 15000000]`".to_string(),
        "cycles" => "give the inclusive cycle range as two numbers, e.g. `cycles = [1, 3]`".to_string(),
        "backend" => "use \"memory\" or \"sqlite\"".to_string(),
        _ => format!("expected {expected}"),
    }
}

/// Section label for a Figment key path, ignoring array indices.
fn section_label(path: &[String]) -> String {
    let named: Vec<&str> = path
        .iter()
        .map(String::as_str)
        .filter(|p| p.parse::<usize>().is_err())
        .collect();
    if named.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{}]", named.join("."))
    }
}

/// Loaded TOML files, used to point diagnostics at the right line.
struct Sources<'a> {
    files: &'a [(String, String)],
}

impl Sources<'_> {
    /// Locate `field` under `path` in the file that produced `error`.
    fn locate(
        &self,
        error: &figment::Error,
        path: &[String],
        field: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        let origin = error
            .metadata
            .as_ref()
            .and_then(|m| m.source.as_ref())
            .and_then(|s| match s {
                figment::Source::File(file) => Some(file.display().to_string()),
                _ => None,
            });
        let Some((name, content)) = origin
            .and_then(|origin| self.files.iter().find(|(name, _)| *name == origin))
        else {
            return (None, None);
        };
        match find_key_offset(content, path, field) {
            Some(offset) => (
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(name, content.clone())),
            ),
            None => (None, None),
        }
    }
}

/// Convert a `figment::Error` (which may hold several errors) into
/// diagnostics, resolving spans against `toml_sources` (`(path, content)`).
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    let sources = Sources {
        files: toml_sources,
    };

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = sources.locate(&error, &path, field);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section: section_label(&path),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => {
                    let mut key = path.clone();
                    key.push(field.to_string());
                    ConfigError::MissingKey { key: key.join(".") }
                }
                Kind::InvalidType(actual, expected) | Kind::InvalidValue(actual, expected) => {
                    let key = path.join(".");
                    let (parent, field) = match path.split_last() {
                        Some((last, parent)) => (parent, last.as_str()),
                        None => (&path[..], ""),
                    };
                    let (span, src) = sources.locate(&error, parent, field);
                    ConfigError::InvalidType {
                        hint: type_hint(&key, expected),
                        detail: format!("found {actual}, expected {expected}"),
                        key,
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Byte offset of `field` in `content`, searched after the table header
/// named by `path`. Both `[a.b]` and `[[a.b]]` headers match; numeric path
/// parts (array indices) are skipped. An empty path searches from the top.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let table: Vec<&str> = path
        .iter()
        .map(String::as_str)
        .filter(|p| p.parse::<usize>().is_err())
        .collect();

    let mut offset = 0;
    let mut in_table = table.is_empty();
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            let name = trimmed.trim_matches(|c| c == '[' || c == ']').trim();
            in_table = !table.is_empty() && name == table.join(".");
        } else if in_table {
            let indent = line.len() - line.trim_start().len();
            let rest = &line[indent..];
            if let Some(after) = rest.strip_prefix(field) {
                if after.trim_start().starts_with('=') {
                    return Some(offset + indent);
                }
            }
        }
        offset += line.len();
    }
    None
}

/// The valid key closest to `unknown`, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn suggests_daily_attempts_for_typo() {
        let valid = &["daily_attempts", "reset_hour"];
        assert_eq!(
            suggest_key("daily_atempts", valid),
            Some("daily_attempts".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        assert_eq!(suggest_key("zzzzzz", &["name", "log_level"]), None);
    }

    #[test]
    fn finds_key_in_its_own_section_only() {
        let content = "[service]\nreset_hr = 1\n\n[battle]\nreset_hr = 4\n";
        let o = find_key_offset(content, &path(&["battle"]), "reset_hr").unwrap();
        assert_eq!(o, content.rfind("reset_hr").unwrap());
        assert_eq!(find_key_offset(content, &path(&["storage"]), "reset_hr"), None);
    }

    #[test]
    fn finds_key_in_array_of_tables() {
        let content = "[[stages.jp]]\ncycles = [1, 3]\n  health = \"lots\"\n";
        let o = find_key_offset(content, &path(&["stages", "jp", "0"]), "health").unwrap();
        assert_eq!(&content[o..o + 6], "health");
    }

    #[test]
    fn top_level_keys_stop_at_first_table() {
        let content = "strays = 1\n[battle]\nother = 2\n";
        assert_eq!(find_key_offset(content, &[], "strays"), Some(0));
        assert_eq!(find_key_offset(content, &[], "other"), None);
    }

    #[test]
    fn section_labels() {
        assert_eq!(section_label(&[]), "the top level");
        assert_eq!(section_label(&path(&["stages", "cn", "2"])), "[stages.cn]");
    }

    #[test]
    fn health_type_errors_get_a_concrete_hint() {
        assert!(type_hint("stages.jp.0.health", "an array").contains("five"));
        assert_eq!(type_hint("battle.reset_hour", "u32"), "expected u32");
    }
}
