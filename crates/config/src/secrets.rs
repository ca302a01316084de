//! Loads the convenience secrets file used for local development.
//!
//! Production deployments are expected to set provider API keys as real
//! environment variables. The secrets file is a second, lower-priority
//! source consulted only for keys that are still missing after the
//! environment has been read — mirroring `backend/secrets.py` in the
//! original council implementation, which sourced `~/.bash_secrets`.
//!
//! We don't actually invoke a shell here: sourcing an arbitrary file would
//! mean executing untrusted shell syntax just to read a handful of
//! `KEY=VALUE` pairs. Instead we parse the common `export KEY=VALUE` /
//! `KEY=VALUE` shapes directly, which covers what a secrets file realistically
//! contains.

use std::{collections::HashMap, path::PathBuf};

/// Environment variable names recognized as provider secrets.
pub const KNOWN_KEYS: &[&str] = &[
    "OPENROUTER_API_KEY",
    "CEREBRAS_API_KEY",
    "ANTHROPIC_API_KEY",
    "MOONSHOT_API_KEY",
    "GROK_API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_AI_API_KEY",
    "FIREWORKS_API_KEY",
    "COUNCIL_API_KEY",
];

/// Default location of the secrets file, `~/.bash_secrets`.
pub fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".bash_secrets"))
}

/// Parse `export KEY=VALUE` / `KEY=VALUE` lines out of a secrets file.
///
/// Unknown keys are ignored. Missing file is not an error — callers treat
/// this as a best-effort convenience source.
pub fn load(path: &std::path::Path) -> HashMap<String, String> {
    let mut out = HashMap::new();

    let Ok(content) = std::fs::read_to_string(path) else {
        log::debug!("secrets file not found at {}, skipping", path.display());
        return out;
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        if !KNOWN_KEYS.contains(&key) {
            continue;
        }

        let value = value.trim().trim_matches('"').trim_matches('\'');
        out.insert(key.to_string(), value.to_string());
    }

    out
}

/// Resolve a single key: environment variable first, secrets file second.
pub fn resolve(key: &str, file_secrets: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| file_secrets.get(key).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_export_and_bare_lines() {
        let mut file = tempfile_with(
            "export ANTHROPIC_API_KEY=sk-ant-123\n# a comment\nCEREBRAS_API_KEY='abc def'\nUNRELATED=nope\n",
        );
        let parsed = load(file.path());
        assert_eq!(parsed.get("ANTHROPIC_API_KEY").map(String::as_str), Some("sk-ant-123"));
        assert_eq!(parsed.get("CEREBRAS_API_KEY").map(String::as_str), Some("abc def"));
        assert!(!parsed.contains_key("UNRELATED"));
        file.close();
    }

    #[test]
    fn missing_file_returns_empty_map() {
        let parsed = load(std::path::Path::new("/nonexistent/path/.bash_secrets"));
        assert!(parsed.is_empty());
    }

    struct TempFile {
        path: std::path::PathBuf,
    }

    impl TempFile {
        fn path(&self) -> &std::path::Path {
            &self.path
        }

        fn close(self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    fn tempfile_with(content: &str) -> TempFile {
        let path = std::env::temp_dir().join(format!("council-secrets-test-{}", uuid_like()));
        std::fs::write(&path, content).unwrap();
        TempFile { path }
    }

    fn uuid_like() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos() as u64
    }
}
