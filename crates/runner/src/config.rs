//! Runner configuration from environment variables and arguments.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::RunnerError;

pub const INPUT_ENV: &str = "PROMO_INPUT";
pub const OUTPUT_ENV: &str = "PROMO_OUTPUT";
pub const PRETTY_ENV: &str = "PROMO_PRETTY";

/// Where the checkout document is read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputSource {
    #[default]
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` means stdin; anything else is a file path.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "-" => InputSource::Stdin,
            path => InputSource::File(PathBuf::from(path)),
        }
    }

    pub fn read(&self) -> Result<String, RunnerError> {
        match self {
            InputSource::Stdin => {
                let mut raw = String::new();
                io::stdin()
                    .read_to_string(&mut raw)
                    .map_err(|source| RunnerError::Io {
                        path: "<stdin>".to_string(),
                        source,
                    })?;
                Ok(raw)
            }
            InputSource::File(path) => fs::read_to_string(path).map_err(|source| RunnerError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Where the rendered output goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "-" => OutputTarget::Stdout,
            path => OutputTarget::File(PathBuf::from(path)),
        }
    }

    pub fn write(&self, rendered: &str) -> Result<(), RunnerError> {
        match self {
            OutputTarget::Stdout => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{rendered}").map_err(|source| RunnerError::Io {
                    path: "<stdout>".to_string(),
                    source,
                })
            }
            OutputTarget::File(path) => fs::write(path, rendered).map_err(|source| RunnerError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerConfig {
    pub input: InputSource,
    pub output: OutputTarget,
    pub pretty: bool,
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable values fall back
    /// to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let input = lookup(INPUT_ENV)
            .map(|value| InputSource::parse(&value))
            .unwrap_or_default();
        let output = lookup(OUTPUT_ENV)
            .map(|value| OutputTarget::parse(&value))
            .unwrap_or_default();
        let pretty = match lookup(PRETTY_ENV) {
            None => false,
            Some(value) => parse_flag(&value).unwrap_or_else(|| {
                tracing::warn!(%value, "{PRETTY_ENV} is not a boolean; using false");
                false
            }),
        };

        Self {
            input,
            output,
            pretty,
        }
    }

    /// A positional argument overrides the configured input.
    pub fn with_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        if let Some(path) = args.into_iter().next() {
            self.input = InputSource::parse(&path);
        }
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
