//! Command-line additions layered on top of the merged config files.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::output::OutputSink;

/// Mounts, environment variables and ports given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// Raw mount arguments (shorthand or full mount strings)
    pub mounts: Vec<String>,
    /// `(NAME, VALUE)` pairs, later entries win
    pub env: Vec<(String, String)>,
    /// Raw port arguments (`8080`, `3000:3000`)
    pub ports: Vec<String>,
    /// Copy the project's `forwardPorts` into `appPort`
    pub auto_forward_ports: bool,
}

impl CliOverrides {
    /// True if nothing was added on the command line
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty() && self.env.is_empty() && self.ports.is_empty()
    }
}

fn env_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid pattern"))
}

/// Parse `NAME=VALUE` arguments, splitting at the first `=`.
///
/// Entries without `=` or with a name that is not a shell identifier are
/// skipped with a warning.
pub fn parse_env_pairs(raw: &[String], output: &dyn OutputSink) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|entry| {
            let Some((name, value)) = entry.split_once('=') else {
                output.warn(&format!("Ignoring --env '{}': expected NAME=VALUE", entry));
                return None;
            };
            if !env_name_pattern().is_match(name) {
                output.warn(&format!("Ignoring --env '{}': invalid variable name", entry));
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingSink;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_split_at_first_equals() {
        let sink = RecordingSink::new();
        let pairs = parse_env_pairs(&args(&["URL=a=b", "EMPTY="]), &sink);
        assert_eq!(
            pairs,
            vec![
                ("URL".to_string(), "a=b".to_string()),
                ("EMPTY".to_string(), String::new()),
            ]
        );
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_missing_equals_skipped() {
        let sink = RecordingSink::new();
        let pairs = parse_env_pairs(&args(&["NOVALUE", "A=1"]), &sink);
        assert_eq!(pairs, vec![("A".to_string(), "1".to_string())]);
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_invalid_names_skipped() {
        let sink = RecordingSink::new();
        let pairs = parse_env_pairs(&args(&["1A=x", "=x", "MY-VAR=x", "_OK9=y"]), &sink);
        assert_eq!(pairs, vec![("_OK9".to_string(), "y".to_string())]);
        assert_eq!(sink.warnings().len(), 3);
    }

    #[test]
    fn test_is_empty_ignores_flag() {
        let overrides = CliOverrides {
            auto_forward_ports: true,
            ..Default::default()
        };
        assert!(overrides.is_empty());
    }
}
