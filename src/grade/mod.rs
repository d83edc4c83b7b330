//! Compares a student's verified proof with the instructor's.

pub mod similarity;

use crate::{
    expr::{ExprForest, ExprId},
    proof::RuleKind,
    verify::{GoalStatus, VerifiedProof},
};
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOptions {
    /// Attach a similarity score to each report.
    pub similarity: bool,
    /// Grade problems on the rayon thread pool.
    pub parallel: bool,
}

impl Default for GradeOptions {
    fn default() -> Self {
        Self {
            similarity: false,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProblemResult {
    Correct,
    IncorrectConclusion,
    InvalidProof(Vec<LineDiagnostic>),
    ParseError(String),
    /// The problem exists in only one of the two assignments.
    Unmatched,
}

impl ProblemResult {
    pub fn tag(&self) -> &'static str {
        match self {
            ProblemResult::Correct => "correct",
            ProblemResult::IncorrectConclusion => "incorrect conclusion",
            ProblemResult::InvalidProof(_) => "invalid proof",
            ProblemResult::ParseError(_) => "parse error",
            ProblemResult::Unmatched => "unmatched",
        }
    }
}

/// A line that failed verification, with the check it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    pub index: usize,
    pub rule: RuleKind,
    pub message: String,
}

impl fmt::Display for LineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} ({}): {}", self.index, self.rule, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeReport {
    pub result: ProblemResult,
    pub score: Option<f64>,
    pub diagnostic: String,
}

impl GradeReport {
    pub fn parse_error(message: String, diagnostic: String) -> Self {
        Self {
            result: ProblemResult::ParseError(message),
            score: None,
            diagnostic,
        }
    }

    pub fn unmatched(diagnostic: String) -> Self {
        Self {
            result: ProblemResult::Unmatched,
            score: None,
            diagnostic,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.result == ProblemResult::Correct
    }
}

/// Grades `student` against `instructor`. Both proofs must live in `forest`.
///
/// A student proof with any invalid line is rejected outright. Otherwise its
/// last top-level line must match the instructor's goal (or the student's own
/// goal when the instructor gives none) up to the order of `∧` and `∨`
/// operands.
pub fn compare(
    instructor: &VerifiedProof,
    student: &VerifiedProof,
    forest: &ExprForest,
    options: &GradeOptions,
) -> GradeReport {
    let score = options
        .similarity
        .then(|| similarity::score(instructor, student, forest));

    let mut notes = Vec::new();
    if !instructor.is_valid() {
        notes.push("warning: the reference proof does not verify".to_string());
    }

    let invalid = student
        .verification()
        .invalid_lines()
        .filter_map(|(index, verdict)| {
            let line = student.document().line(index)?;
            Some(LineDiagnostic {
                index,
                rule: line.rule(),
                message: verdict.to_string(),
            })
        })
        .collect_vec();

    let result = if !invalid.is_empty() {
        notes.push(invalid.iter().join("\n"));
        ProblemResult::InvalidProof(invalid)
    } else {
        let goal = instructor.document().goal().or(student.document().goal());
        let conclusion = student.document().conclusion().map(|line| line.expr());
        let (result, note) = judge_conclusion(goal, conclusion, forest);
        notes.push(note);
        result
    };

    if student.verification().goal() == GoalStatus::Unreached
        && result == ProblemResult::Correct
    {
        notes.push("the conclusion matches the goal only up to operand order".to_string());
    }

    GradeReport {
        result,
        score,
        diagnostic: notes.join("\n"),
    }
}

fn judge_conclusion(
    goal: Option<ExprId>,
    conclusion: Option<ExprId>,
    forest: &ExprForest,
) -> (ProblemResult, String) {
    match (goal, conclusion) {
        (None, _) => (
            ProblemResult::IncorrectConclusion,
            "no goal to compare the conclusion with".to_string(),
        ),
        (Some(_), None) => (
            ProblemResult::IncorrectConclusion,
            "the proof has no top-level conclusion".to_string(),
        ),
        (Some(goal), Some(conclusion)) if forest.equiv(goal, conclusion) => (
            ProblemResult::Correct,
            format!("proves {}", forest.render(conclusion)),
        ),
        (Some(goal), Some(conclusion)) => (
            ProblemResult::IncorrectConclusion,
            format!(
                "concludes {}, but the goal is {}",
                forest.render(conclusion),
                forest.render(goal)
            ),
        ),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        parse::{Grammar, parse},
        proof::{DraftLine, ProofDocument},
        verify::{VerifyOptions, verify},
    };

    pub(crate) type Line<'a> = (&'a str, RuleKind, usize, &'a [&'a str]);

    pub(crate) fn proof(
        forest: &mut ExprForest,
        lines: &[Line],
        goal: Option<&str>,
    ) -> VerifiedProof {
        let drafts = lines
            .iter()
            .map(|&(text, rule, depth, cites)| DraftLine {
                expr: parse(text, Grammar::Predicate, forest).unwrap(),
                rule,
                citations: cites.iter().map(|c| c.parse().unwrap()).collect(),
                depth,
            })
            .collect();
        let goal = goal.map(|g| parse(g, Grammar::Predicate, forest).unwrap());
        let document = ProofDocument::build(drafts).unwrap().with_goal(goal);
        verify(document, forest, VerifyOptions { quantifiers: true })
    }

    const IDENTITY: &[Line] = &[
        ("P", RuleKind::Assumption, 1, &[]),
        ("P -> P", RuleKind::ImpliesIntro, 0, &["1-1"]),
    ];

    #[test]
    fn a_valid_proof_compared_with_itself_is_correct() {
        let mut forest = ExprForest::new();
        let reference = proof(&mut forest, IDENTITY, Some("P -> P"));
        let report = compare(&reference, &reference, &forest, &GradeOptions::default());
        assert_eq!(report.result, ProblemResult::Correct);
        assert_eq!(report.score, None);
    }

    #[test]
    fn any_invalid_line_rejects_the_proof() {
        let mut forest = ExprForest::new();
        let reference = proof(&mut forest, IDENTITY, Some("P -> P"));
        let student = proof(
            &mut forest,
            &[
                ("P", RuleKind::Assumption, 1, &[]),
                ("Q", RuleKind::Assumption, 2, &[]),
                ("P", RuleKind::Reiteration, 2, &["1"]),
                ("Q -> P", RuleKind::ImpliesIntro, 1, &["2-3"]),
                ("P -> P", RuleKind::ImpliesIntro, 0, &["1-4"]),
            ],
            Some("P -> P"),
        );

        let report = compare(&reference, &student, &forest, &GradeOptions::default());
        let ProblemResult::InvalidProof(lines) = &report.result else {
            panic!("expected an invalid proof, got {:?}", report.result);
        };
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].index, 5);
        assert_eq!(lines[0].rule, RuleKind::ImpliesIntro);
        assert_eq!(lines[0].message, "subproof must end in the consequent");
    }

    #[test]
    fn conclusions_match_up_to_operand_order() {
        let mut forest = ExprForest::new();
        let reference = proof(
            &mut forest,
            &[
                ("A & B", RuleKind::Premise, 0, &[]),
                ("A", RuleKind::AndElim, 0, &["1"]),
                ("B", RuleKind::AndElim, 0, &["1"]),
                ("B & A", RuleKind::AndIntro, 0, &["2", "3"]),
            ],
            Some("B & A"),
        );
        let student = proof(
            &mut forest,
            &[("A & B", RuleKind::Premise, 0, &[])],
            Some("B & A"),
        );
        let report = compare(&reference, &student, &forest, &GradeOptions::default());
        assert_eq!(report.result, ProblemResult::Correct);
    }

    #[test]
    fn implication_order_matters() {
        let mut forest = ExprForest::new();
        let reference = proof(&mut forest, &[], Some("P -> Q"));
        let student = proof(
            &mut forest,
            &[
                ("P", RuleKind::Assumption, 1, &[]),
                ("Q", RuleKind::Assumption, 2, &[]),
                ("P", RuleKind::Reiteration, 2, &["1"]),
                ("Q -> P", RuleKind::ImpliesIntro, 1, &["2-3"]),
                ("P -> (Q -> P)", RuleKind::ImpliesIntro, 0, &["1-4"]),
            ],
            None,
        );
        let report = compare(&reference, &student, &forest, &GradeOptions::default());
        assert_eq!(report.result, ProblemResult::IncorrectConclusion);
        assert!(report.diagnostic.contains("but the goal is P → Q"), "{}", report.diagnostic);
    }

    #[test]
    fn missing_goal_or_conclusion_is_incorrect() {
        let mut forest = ExprForest::new();
        let valid = proof(&mut forest, IDENTITY, None);
        let report = compare(&valid, &valid, &forest, &GradeOptions::default());
        assert_eq!(report.result, ProblemResult::IncorrectConclusion);

        let reference = proof(&mut forest, IDENTITY, Some("P -> P"));
        let empty = proof(&mut forest, &[], None);
        let report = compare(&reference, &empty, &forest, &GradeOptions::default());
        assert_eq!(report.result, ProblemResult::IncorrectConclusion);
    }

    #[test]
    fn student_goal_is_used_when_the_instructor_has_none() {
        let mut forest = ExprForest::new();
        let reference = proof(&mut forest, &[], None);
        let student = proof(&mut forest, IDENTITY, Some("P -> P"));
        let report = compare(&reference, &student, &forest, &GradeOptions::default());
        assert_eq!(report.result, ProblemResult::Correct);
    }

    #[test]
    fn invalid_reference_proof_is_flagged() {
        let mut forest = ExprForest::new();
        let reference = proof(
            &mut forest,
            &[("Q", RuleKind::Reiteration, 0, &["1"])],
            Some("P -> P"),
        );
        let student = proof(&mut forest, IDENTITY, Some("P -> P"));
        let report = compare(&reference, &student, &forest, &GradeOptions::default());
        assert_eq!(report.result, ProblemResult::Correct);
        assert!(report.diagnostic.starts_with("warning:"));
    }

    #[test]
    fn similarity_is_reported_when_enabled() {
        let mut forest = ExprForest::new();
        let reference = proof(&mut forest, IDENTITY, Some("P -> P"));
        let options = GradeOptions {
            similarity: true,
            ..GradeOptions::default()
        };
        let report = compare(&reference, &reference, &forest, &options);
        assert_eq!(report.score, Some(1.0));
    }
}
