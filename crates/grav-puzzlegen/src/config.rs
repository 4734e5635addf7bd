//! Key/value configuration files.
//!
//! One `key = value` pair per line, `#` starts a comment line, blank lines
//! are ignored. Values come in four shapes:
//!
//! ```text
//! num_puzzles = 200          # integer
//! grid_width = [6,10]        # inclusive range
//! spawn_weights = 3,1,1      # integer array
//! output_dir = "bundles"     # string
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced while reading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// Underlying filesystem error.
    Io(io::Error),
    /// A non-comment line that does not parse.
    Syntax { line: usize, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config I/O: {err}"),
            Self::Syntax { line, message } => write!(f, "config line {line}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// A parsed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Range(i32, i32),
    IntArray(Vec<i32>),
    Str(String),
}

/// Parsed configuration, keyed by name.
#[derive(Debug, Default)]
pub struct Config {
    entries: HashMap<String, Value>,
}

impl Config {
    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Config> {
        let text = fs::read_to_string(path)?;
        Config::parse(&text)
    }

    /// Parse configuration text. Malformed non-comment lines fail with a
    /// line-numbered diagnostic.
    pub fn parse(text: &str) -> ConfigResult<Config> {
        let mut entries = HashMap::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once(" = ") else {
                return Err(ConfigError::Syntax {
                    line,
                    message: format!("expected `key = value`, got `{trimmed}`"),
                });
            };
            let value = parse_value(value.trim(), line)?;
            entries.insert(key.trim().to_string(), value);
        }
        Ok(Config { entries })
    }

    /// Integer value of `key`, if present with that shape.
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.entries.get(key) {
            Some(Value::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// `[lo,hi]` range value of `key`, if present with that shape.
    pub fn range(&self, key: &str) -> Option<(i32, i32)> {
        match self.entries.get(key) {
            Some(Value::Range(lo, hi)) => Some((*lo, *hi)),
            _ => None,
        }
    }

    /// Integer array value of `key`, if present with that shape.
    #[allow(dead_code)]
    pub fn int_array(&self, key: &str) -> Option<&[i32]> {
        match self.entries.get(key) {
            Some(Value::IntArray(values)) => Some(values),
            _ => None,
        }
    }

    /// String value of `key`, if present with that shape.
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(Value::Str(value)) => Some(value),
            _ => None,
        }
    }
}

fn parse_int(text: &str, line: usize) -> ConfigResult<i32> {
    text.trim().parse().map_err(|_| ConfigError::Syntax {
        line,
        message: format!("expected integer, got `{text}`"),
    })
}

fn parse_value(text: &str, line: usize) -> ConfigResult<Value> {
    if let Some(body) = text.strip_prefix('[') {
        let body = body.strip_suffix(']').ok_or_else(|| ConfigError::Syntax {
            line,
            message: format!("unterminated range `{text}`"),
        })?;
        let (lo, hi) = body.split_once(',').ok_or_else(|| ConfigError::Syntax {
            line,
            message: format!("range needs two values, got `{text}`"),
        })?;
        Ok(Value::Range(parse_int(lo, line)?, parse_int(hi, line)?))
    } else if let Some(body) = text.strip_prefix('"') {
        let body = body.strip_suffix('"').ok_or_else(|| ConfigError::Syntax {
            line,
            message: format!("unterminated string `{text}`"),
        })?;
        Ok(Value::Str(body.to_string()))
    } else if text.contains(',') {
        let mut values = Vec::new();
        for item in text.split(',') {
            values.push(parse_int(item, line)?);
        }
        Ok(Value::IntArray(values))
    } else {
        let value = text.parse().map_err(|_| ConfigError::Syntax {
            line,
            message: format!("expected integer, got `{text}`"),
        })?;
        Ok(Value::Int(value))
    }
}
