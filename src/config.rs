use crate::{grade::GradeOptions, strings::CONFIG_FILE_NAME};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Search for fitch.toml starting from the current directory and moving up the directory tree
pub fn find_config_file() -> Result<Option<PathBuf>, ConfigError> {
    let current_dir = env::current_dir().map_err(|e| ConfigError::Io(PathBuf::from("."), e))?;

    let start_dir = current_dir
        .canonicalize()
        .map_err(|e| ConfigError::Io(current_dir.to_path_buf(), e))?;

    Ok(start_dir
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraderConfig {
    grading: GradeOptions,
    color: bool,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            grading: GradeOptions::default(),
            color: true,
        }
    }
}

impl GraderConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml(&contents, path)
    }

    fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: GraderConfigFile =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

        let defaults = Self::default();
        let grading = file.grading.unwrap_or_default();
        let report = file.report.unwrap_or_default();

        Ok(Self {
            grading: GradeOptions {
                similarity: grading.similarity.unwrap_or(defaults.grading.similarity),
                parallel: grading.parallel.unwrap_or(defaults.grading.parallel),
            },
            color: report.color.unwrap_or(defaults.color),
        })
    }

    /// Loads the given file, or the nearest fitch.toml, or falls back to
    /// defaults when there is none.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match find_config_file()? {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn grading(&self) -> GradeOptions {
        self.grading
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn with_similarity(mut self, enabled: bool) -> Self {
        self.grading.similarity |= enabled;
        self
    }

    pub fn with_plain(mut self, plain: bool) -> Self {
        self.color &= !plain;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraderConfigFile {
    grading: Option<GradingSection>,
    report: Option<ReportSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GradingSection {
    similarity: Option<bool>,
    parallel: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReportSection {
    color: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}", path = .0.display(), source = .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config file `{path}`: {source}", path = .0.display(), source = .1)]
    Parse(PathBuf, #[source] toml::de::Error),
}
