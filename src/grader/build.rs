use crate::{
    assignment::Problem,
    calculus::Calculus,
    diagnostics::render_syntax_error,
    expr::{ExprForest, ExprId},
    parse::SyntaxError,
    proof::{Citation, CitationParseError, DocumentError, DraftLine, ProofDocument, RuleKind},
};
use std::fmt;
use thiserror::Error;

/// Where in a problem a formula was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Premise(usize),
    Goal,
    Line(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Premise(n) => write!(f, "premise {n}"),
            Location::Goal => f.write_str("the goal"),
            Location::Line(n) => write!(f, "line {n}"),
        }
    }
}

/// Reasons a problem's text cannot be turned into a proof document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{location}: {error}")]
    Syntax {
        location: Location,
        text: String,
        error: SyntaxError,
    },

    #[error("line {line}: unknown rule `{name}`")]
    UnknownRule { line: usize, name: String },

    #[error("line {line}: {error}")]
    Citation {
        line: usize,
        error: CitationParseError,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl BuildError {
    /// A longer form for reports: syntax errors get the source snippet.
    pub fn render(&self, problem: &str) -> String {
        match self {
            BuildError::Syntax {
                location,
                text,
                error,
            } => render_syntax_error(&format!("problem {problem}, {location}"), text, error),
            _ => self.to_string(),
        }
    }
}

/// The premises and goal a problem declares.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    pub premises: Option<Vec<ExprId>>,
    pub goal: Option<ExprId>,
}

pub fn statement(
    problem: &Problem,
    calculus: &dyn Calculus,
    forest: &mut ExprForest,
) -> Result<Statement, BuildError> {
    let premises = match &problem.premises {
        Some(texts) => Some(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| formula(text, Location::Premise(i + 1), calculus, forest))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    let goal = problem
        .goal
        .as_deref()
        .map(|text| formula(text, Location::Goal, calculus, forest))
        .transpose()?;

    Ok(Statement { premises, goal })
}

pub fn document(
    problem: &Problem,
    calculus: &dyn Calculus,
    forest: &mut ExprForest,
) -> Result<ProofDocument, BuildError> {
    let mut drafts = Vec::with_capacity(problem.lines.len());

    for (i, entry) in problem.lines.iter().enumerate() {
        let line = i + 1;

        let expr = formula(&entry.expr, Location::Line(line), calculus, forest)?;
        let rule = RuleKind::from_name(&entry.rule).ok_or_else(|| BuildError::UnknownRule {
            line,
            name: entry.rule.clone(),
        })?;
        let citations = entry
            .cites
            .iter()
            .map(|text| text.parse::<Citation>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| BuildError::Citation { line, error })?;

        drafts.push(DraftLine {
            expr,
            rule,
            citations,
            depth: entry.depth,
        });
    }

    Ok(ProofDocument::build(drafts)?)
}

fn formula(
    text: &str,
    location: Location,
    calculus: &dyn Calculus,
    forest: &mut ExprForest,
) -> Result<ExprId, BuildError> {
    calculus
        .parse(text, forest)
        .map_err(|error| BuildError::Syntax {
            location,
            text: text.to_string(),
            error,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assignment::LineEntry, calculus::CalculusKind};

    fn problem(lines: &[(&str, &str, usize, &[&str])]) -> Problem {
        Problem {
            id: "1".to_string(),
            calculus: CalculusKind::Propositional,
            premises: Some(vec!["P".to_string()]),
            goal: Some("P | Q".to_string()),
            lines: lines
                .iter()
                .map(|&(expr, rule, depth, cites)| LineEntry {
                    expr: expr.to_string(),
                    rule: rule.to_string(),
                    depth,
                    cites: cites.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn builds_statement_and_lines() {
        let mut forest = ExprForest::new();
        let calculus = CalculusKind::Propositional.calculus();
        let problem = problem(&[("P", "premise", 0, &[]), ("P | Q", "Or Intro", 0, &["1"])]);

        let statement = statement(&problem, calculus, &mut forest).unwrap();
        assert_eq!(statement.premises.as_deref().map(<[_]>::len), Some(1));

        let doc = document(&problem, calculus, &mut forest).unwrap();
        assert_eq!(doc.lines().len(), 2);
        assert_eq!(doc.lines()[1].rule(), RuleKind::OrIntro);
        assert_eq!(doc.lines()[1].citations(), [Citation::Line(1)]);
        assert_eq!(Some(doc.lines()[1].expr()), statement.goal);
    }

    #[test]
    fn reports_the_first_broken_line() {
        let mut forest = ExprForest::new();
        let calculus = CalculusKind::Propositional.calculus();

        let err = document(&problem(&[("P", "premise", 0, &[]), ("P &", "reit", 0, &[])]), calculus, &mut forest)
            .unwrap_err();
        assert!(matches!(err, BuildError::Syntax { location: Location::Line(2), .. }));
        assert!(err.render("1").contains("problem 1, line 2"));

        let err = document(&problem(&[("P", "modus tollens", 0, &[])]), calculus, &mut forest).unwrap_err();
        assert_eq!(err.to_string(), "line 1: unknown rule `modus tollens`");

        let err = document(&problem(&[("P", "reit", 0, &["one"])]), calculus, &mut forest).unwrap_err();
        assert!(matches!(err, BuildError::Citation { line: 1, .. }));

        let err = document(&problem(&[("P", "assume", 0, &[])]), calculus, &mut forest).unwrap_err();
        assert_eq!(
            err,
            BuildError::Document(DocumentError::AssumptionAtTopLevel { line: 1 })
        );
    }
}
