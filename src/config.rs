use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::str::FromStr;

/// Failure to read a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, source: std::io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "error reading config {path}: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// INI-style configuration: `[Section]` headers, `key = value` lines, `#` comments.
///
/// Keys outside any section are globals. Section lookups fall back to globals
/// in the `*_or_default` getters. Unknown keys are kept but never consulted.
#[derive(Debug, Default)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read. Malformed lines
    /// are skipped, never rejected.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = Some(line[1..line.len() - 1].trim().to_string());
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_string();
                let value = value.trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(String::as_str)
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn get_non_empty_or_default<'a>(
        &'a self,
        section: &str,
        key: &str,
        default: &'a str,
    ) -> &'a str {
        self.get_non_empty(section, key)
            .or_else(|| self.get_global(key).filter(|s| !s.is_empty()))
            .unwrap_or(default)
    }

    /// Parses `section.key` as `T`.
    ///
    /// `None` if the key is absent; `Some(Err(raw))` if present but unparsable,
    /// so callers can warn before falling back to their default.
    #[must_use]
    pub fn parsed<T: FromStr>(&self, section: &str, key: &str) -> Option<Result<T, String>> {
        self.get_non_empty(section, key)
            .map(|raw| raw.parse::<T>().map_err(|_| raw.to_owned()))
    }

    /// Parses a boolean: `true/false`, `yes/no`, `on/off`, `1/0`.
    #[must_use]
    pub fn parsed_bool(&self, section: &str, key: &str) -> Option<Result<bool, String>> {
        self.get_non_empty(section, key).map(|raw| {
            match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(raw.to_owned()),
            }
        })
    }
}
