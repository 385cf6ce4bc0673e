// src/package/info.rs

//! Reader for SlackBuild `.info` files
//!
//! `.info` files are shell fragments of `NAME="value"` assignments. Values
//! may span several lines inside quotes, optionally with `\` continuations:
//!
//! ```text
//! PRGNAM="libfoo"
//! VERSION="1.2.3"
//! REQUIRES="libbar \
//!           %README%"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::Lines;

use crate::error::{Error, Result};

/// Parsed variables of a `.info` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoFile {
    vars: HashMap<String, String>,
}

impl InfoFile {
    /// Read and parse an info file from disk
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut vars = HashMap::new();
        let mut lines = content.lines();

        while let Some(line) = lines.next() {
            let line = line.trim_start();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, rest)) = line.split_once('=') else {
                continue;
            };
            if !is_variable_name(key) {
                continue;
            }

            let rest = rest.trim();
            let value = match rest.chars().next() {
                Some(quote @ ('"' | '\'')) => read_quoted(quote, &rest[1..], &mut lines),
                _ => strip_comment(rest)
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string(),
            };
            vars.insert(key.to_string(), value);
        }

        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn version(&self) -> &str {
        self.get("VERSION").unwrap_or_default()
    }

    pub fn requires(&self) -> &str {
        self.get("REQUIRES").unwrap_or_default()
    }
}

/// Extract the default of `BUILD=${BUILD:-N}` from a `.SlackBuild` script
pub fn read_build_number(script: &str) -> Option<String> {
    script.lines().find_map(|line| {
        let value = line.trim_start().strip_prefix("BUILD=")?;
        let value = strip_comment(value).trim();
        let value = match value.strip_prefix("${BUILD:-") {
            Some(rest) => rest.split('}').next().unwrap_or_default(),
            None => value.trim_matches(|c| c == '"' || c == '\''),
        };
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn is_variable_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn strip_comment(value: &str) -> &str {
    value.split('#').next().unwrap_or_default()
}

/// Read a quoted value starting after the opening quote
fn read_quoted(quote: char, first: &str, lines: &mut Lines<'_>) -> String {
    let mut value = String::new();
    let mut current = first;

    loop {
        if let Some(end) = current.find(quote) {
            push_segment(&mut value, &current[..end]);
            return value;
        }

        let trimmed = current.trim_end();
        push_segment(&mut value, trimmed.strip_suffix('\\').unwrap_or(trimmed));

        match lines.next() {
            Some(next) => current = next,
            // Unterminated quote: keep what was read
            None => return value,
        }
    }
}

fn push_segment(value: &mut String, segment: &str) {
    let segment = segment.trim();
    if segment.is_empty() {
        return;
    }
    if !value.is_empty() {
        value.push(' ');
    }
    value.push_str(segment);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_info() {
        let info = InfoFile::parse(
            "PRGNAM=\"libfoo\"\nVERSION=\"1.2.3\"\nREQUIRES=\"libbar libbaz\"\n",
        );
        assert_eq!(info.get("PRGNAM"), Some("libfoo"));
        assert_eq!(info.version(), "1.2.3");
        assert_eq!(info.requires(), "libbar libbaz");
    }

    #[test]
    fn test_parse_multiline_requires() {
        let info = InfoFile::parse(
            "VERSION=2.0\nREQUIRES=\"libbar \\\n          libbaz \\\n   %README%\"\nMAINTAINER=\"Someone\"\n",
        );
        assert_eq!(info.version(), "2.0");
        assert_eq!(info.requires(), "libbar libbaz %README%");
        assert_eq!(info.get("MAINTAINER"), Some("Someone"));
    }

    #[test]
    fn test_parse_skips_comments_and_empty_values() {
        let info = InfoFile::parse("# header\nREQUIRES=\"\"\nVERSION=1.0 # trailing\n");
        assert_eq!(info.requires(), "");
        assert_eq!(info.version(), "1.0");
    }

    #[test]
    fn test_missing_variable() {
        let info = InfoFile::parse("PRGNAM=foo\n");
        assert_eq!(info.requires(), "");
        assert_eq!(info.get("DOWNLOAD"), None);
    }

    #[test]
    fn test_read_build_number() {
        let script = "#!/bin/bash\nPRGNAM=foo\nBUILD=${BUILD:-3}\nTAG=${TAG:-_SBo}\n";
        assert_eq!(read_build_number(script), Some("3".to_string()));
        assert_eq!(read_build_number("BUILD=2\n"), Some("2".to_string()));
        assert_eq!(read_build_number("PRGNAM=foo\n"), None);
    }
}
