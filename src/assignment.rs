use crate::calculus::CalculusKind;
use itertools::Itertools;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// A set of problems with their proofs, as written by an instructor or a
/// student.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assignment {
    #[serde(default, rename = "problem")]
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Problem {
    pub id: String,

    #[serde(default)]
    pub calculus: CalculusKind,

    #[serde(default)]
    pub premises: Option<Vec<String>>,

    #[serde(default)]
    pub goal: Option<String>,

    #[serde(default, rename = "line")]
    pub lines: Vec<LineEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineEntry {
    pub expr: String,
    pub rule: String,

    #[serde(default)]
    pub depth: usize,

    #[serde(default)]
    pub cites: Vec<String>,
}

/// Errors that stop grading altogether.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("could not read `{path}`: {source}", path = .0.display(), source = .1)]
    Io(PathBuf, #[source] io::Error),

    #[error("`{path}` is not a valid assignment: {source}", path = .0.display(), source = .1)]
    Toml(PathBuf, #[source] toml::de::Error),

    #[error("problem `{id}` appears more than once in `{}`", .path.display())]
    DuplicateProblem { path: PathBuf, id: String },
}

impl Assignment {
    pub fn from_file(path: &Path) -> Result<Self, GradeError> {
        let text = fs::read_to_string(path).map_err(|e| GradeError::Io(path.to_path_buf(), e))?;
        Self::from_toml(&text, path)
    }

    /// Parses assignment text; `path` only labels errors.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, GradeError> {
        let assignment: Self =
            toml::from_str(text).map_err(|e| GradeError::Toml(path.to_path_buf(), e))?;

        if let Some(id) = assignment.problems.iter().map(|p| &p.id).duplicates().next() {
            return Err(GradeError::DuplicateProblem {
                path: path.to_path_buf(),
                id: id.clone(),
            });
        }

        Ok(assignment)
    }
}
