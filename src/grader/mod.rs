//! Grades a student assignment against the instructor's, problem by problem.

mod build;

use crate::{
    assignment::{Assignment, GradeError, Problem},
    expr::ExprForest,
    grade::{GradeOptions, GradeReport, ProblemResult, compare},
};
use build::BuildError;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Which assignments a problem appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    Matched,
    InstructorOnly,
    StudentOnly,
}

#[derive(Debug, Clone)]
pub struct ProblemReport {
    pub id: String,
    pub pairing: Pairing,
    pub report: GradeReport,
}

impl ProblemReport {
    /// Whether this problem makes the whole run fail.
    pub fn is_failure(&self) -> bool {
        match self.report.result {
            ProblemResult::InvalidProof(_) | ProblemResult::ParseError(_) => true,
            ProblemResult::Unmatched => self.pairing == Pairing::InstructorOnly,
            ProblemResult::Correct | ProblemResult::IncorrectConclusion => false,
        }
    }
}

/// Reports in instructor order, followed by problems only the student has.
#[derive(Debug, Clone, Default)]
pub struct GradingReport {
    pub problems: Vec<ProblemReport>,
}

impl GradingReport {
    pub fn passed(&self) -> usize {
        self.problems.iter().filter(|p| p.report.is_correct()).count()
    }

    pub fn is_failure(&self) -> bool {
        self.problems.iter().any(ProblemReport::is_failure)
    }
}

pub fn grade_files(
    instructor: &Path,
    student: &Path,
    options: &GradeOptions,
) -> Result<GradingReport, GradeError> {
    let instructor_assignment = Assignment::from_file(instructor)?;
    info!(
        path = %instructor.display(),
        problems = instructor_assignment.problems.len(),
        "loaded instructor assignment"
    );

    let student_assignment = Assignment::from_file(student)?;
    info!(
        path = %student.display(),
        problems = student_assignment.problems.len(),
        "loaded student assignment"
    );

    Ok(grade(&instructor_assignment, &student_assignment, options))
}

enum Task<'a> {
    Matched(&'a Problem, &'a Problem),
    InstructorOnly(&'a Problem),
    StudentOnly(&'a Problem),
}

impl Task<'_> {
    fn run(&self, options: &GradeOptions) -> ProblemReport {
        match *self {
            Task::Matched(instructor, student) => ProblemReport {
                id: instructor.id.clone(),
                pairing: Pairing::Matched,
                report: grade_problem(instructor, student, options),
            },
            Task::InstructorOnly(problem) => ProblemReport {
                id: problem.id.clone(),
                pairing: Pairing::InstructorOnly,
                report: GradeReport::unmatched("no answer in the student assignment".to_string()),
            },
            Task::StudentOnly(problem) => ProblemReport {
                id: problem.id.clone(),
                pairing: Pairing::StudentOnly,
                report: GradeReport::unmatched("not part of the instructor assignment".to_string()),
            },
        }
    }
}

pub fn grade(instructor: &Assignment, student: &Assignment, options: &GradeOptions) -> GradingReport {
    let answers: FxHashMap<&str, &Problem> = student
        .problems
        .iter()
        .map(|p| (p.id.as_str(), p))
        .collect();
    let asked: FxHashSet<&str> = instructor.problems.iter().map(|p| p.id.as_str()).collect();

    let mut tasks: Vec<Task> = instructor
        .problems
        .iter()
        .map(|problem| match answers.get(problem.id.as_str()) {
            Some(&answer) => Task::Matched(problem, answer),
            None => Task::InstructorOnly(problem),
        })
        .collect();
    tasks.extend(
        student
            .problems
            .iter()
            .filter(|p| !asked.contains(p.id.as_str()))
            .map(Task::StudentOnly),
    );

    let problems: Vec<ProblemReport> = if options.parallel {
        tasks.par_iter().map(|task| task.run(options)).collect()
    } else {
        tasks.iter().map(|task| task.run(options)).collect()
    };

    GradingReport { problems }
}

/// Parses, verifies and compares one problem. The instructor's calculus
/// and statement govern both proofs.
fn grade_problem(instructor: &Problem, student: &Problem, options: &GradeOptions) -> GradeReport {
    let id = instructor.id.as_str();
    let calculus = instructor.calculus.calculus();
    if student.calculus != instructor.calculus {
        warn!(
            problem = id,
            "student answer is tagged {}, grading it in the {} calculus",
            student.calculus,
            instructor.calculus
        );
    }

    let mut forest = ExprForest::new();

    let reference = build::statement(instructor, calculus, &mut forest).and_then(|statement| {
        let document = build::document(instructor, calculus, &mut forest)?;
        Ok((statement, document))
    });
    let (statement, reference) = match reference {
        Ok(built) => built,
        Err(err) => return reference_error(id, &err),
    };

    let answer = build::statement(student, calculus, &mut forest).and_then(|statement| {
        let document = build::document(student, calculus, &mut forest)?;
        Ok((statement, document))
    });
    let (own_statement, answer) = match answer {
        Ok(built) => built,
        Err(err) => {
            debug!(problem = id, error = %err, "student answer does not parse");
            return GradeReport::parse_error(err.to_string(), err.render(id));
        }
    };

    let premises = statement.premises.clone().or(own_statement.premises);
    let goal = statement.goal.or(own_statement.goal);

    let reference = calculus.verify(
        reference
            .with_premises(statement.premises)
            .with_goal(statement.goal),
        &forest,
    );
    if !reference.is_valid() {
        warn!(problem = id, "reference proof does not verify");
    }

    let answer = calculus.verify(answer.with_premises(premises).with_goal(goal), &forest);
    let report = compare(&reference, &answer, &forest, options);
    debug!(
        problem = id,
        calculus = %calculus.kind(),
        result = report.result.tag(),
        "graded"
    );
    report
}

fn reference_error(id: &str, err: &BuildError) -> GradeReport {
    warn!(problem = id, error = %err, "reference proof does not parse");
    GradeReport::parse_error(
        format!("the reference proof does not parse: {err}"),
        err.render(id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(text: &str) -> Assignment {
        Assignment::from_toml(text, Path::new("test.toml")).unwrap()
    }

    const INSTRUCTOR: &str = r#"
        [[problem]]
        id = "identity"
        goal = "P -> P"

        [[problem.line]]
        expr = "P"
        rule = "assumption"
        depth = 1

        [[problem.line]]
        expr = "P"
        rule = "reiteration"
        depth = 1
        cites = ["1"]

        [[problem.line]]
        expr = "P -> P"
        rule = "conditional-proof"
        cites = ["1-2"]

        [[problem]]
        id = "swap"
        premises = ["A & B"]
        goal = "B & A"
    "#;

    fn grade_against(student: &str) -> GradingReport {
        grade(
            &assignment(INSTRUCTOR),
            &assignment(student),
            &GradeOptions::default(),
        )
    }

    fn result<'a>(report: &'a GradingReport, id: &str) -> &'a ProblemResult {
        let problem = report.problems.iter().find(|p| p.id == id).unwrap();
        &problem.report.result
    }

    #[test]
    fn restating_the_assumption_proves_identity() {
        let report = grade_against(
            r#"
            [[problem]]
            id = "identity"

            [[problem.line]]
            expr = "P"
            rule = "assume"
            depth = 1

            [[problem.line]]
            expr = "P"
            rule = "reit"
            depth = 1
            cites = ["1"]

            [[problem.line]]
            expr = "P -> P"
            rule = "conditional-proof"
            cites = ["1-2"]
            "#,
        );
        assert_eq!(result(&report, "identity"), &ProblemResult::Correct);
    }

    #[test]
    fn subproof_ending_elsewhere_invalidates_the_conditional_proof() {
        let report = grade_against(
            r#"
            [[problem]]
            id = "identity"

            [[problem.line]]
            expr = "Q"
            rule = "premise"

            [[problem.line]]
            expr = "P"
            rule = "assumption"
            depth = 1

            [[problem.line]]
            expr = "Q"
            rule = "reiteration"
            depth = 1
            cites = ["1"]

            [[problem.line]]
            expr = "P -> P"
            rule = "conditional-proof"
            cites = ["2-3"]
            "#,
        );

        let ProblemResult::InvalidProof(lines) = result(&report, "identity") else {
            panic!("expected an invalid proof");
        };
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].index, 4);
        assert_eq!(lines[0].rule.name(), "implies-intro");
        assert!(report.is_failure());
    }

    #[test]
    fn missing_answers_are_unmatched_and_the_rest_is_graded() {
        let report = grade_against(
            r#"
            [[problem]]
            id = "swap"

            [[problem.line]]
            expr = "A & B"
            rule = "premise"

            [[problem.line]]
            expr = "A"
            rule = "and-elim"
            cites = ["1"]

            [[problem.line]]
            expr = "B"
            rule = "and-elim"
            cites = ["1"]

            [[problem.line]]
            expr = "A & B"
            rule = "and-intro"
            cites = ["2", "3"]

            [[problem]]
            id = "extra"
            "#,
        );

        let ids: Vec<_> = report.problems.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["identity", "swap", "extra"]);
        assert_eq!(result(&report, "identity"), &ProblemResult::Unmatched);
        assert_eq!(result(&report, "swap"), &ProblemResult::Correct);
        assert_eq!(result(&report, "extra"), &ProblemResult::Unmatched);
        assert_eq!(report.problems[2].pairing, Pairing::StudentOnly);
        assert_eq!(report.passed(), 1);
        assert!(report.is_failure());
    }

    #[test]
    fn premises_outside_the_statement_are_rejected() {
        let report = grade_against(
            r#"
            [[problem]]
            id = "swap"

            [[problem.line]]
            expr = "B & A"
            rule = "premise"
            "#,
        );
        let ProblemResult::InvalidProof(lines) = result(&report, "swap") else {
            panic!("expected an invalid proof");
        };
        assert_eq!(lines[0].message, "not one of the premises of the problem");
    }

    #[test]
    fn syntax_errors_become_parse_errors() {
        let report = grade_against(
            r#"
            [[problem]]
            id = "identity"

            [[problem.line]]
            expr = "P ->"
            rule = "assumption"
            depth = 1
            "#,
        );
        let problem = &report.problems[0];
        assert!(matches!(problem.report.result, ProblemResult::ParseError(_)));
        assert!(problem.report.diagnostic.contains("problem identity, line 1"));
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let instructor = assignment(INSTRUCTOR);
        let student = assignment(INSTRUCTOR);
        let parallel = grade(&instructor, &student, &GradeOptions::default());
        let sequential = grade(
            &instructor,
            &student,
            &GradeOptions {
                parallel: false,
                ..GradeOptions::default()
            },
        );

        let results = |report: &GradingReport| {
            report
                .problems
                .iter()
                .map(|p| (p.id.clone(), p.report.result.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(results(&parallel), results(&sequential));
        // The reference for "swap" has no lines, so comparing it with itself
        // has no conclusion to check.
        assert_eq!(parallel.passed(), 1);
    }

    #[test]
    fn grades_the_demo_assignments() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
        let report = grade_files(
            &demos.join("instructor.toml"),
            &demos.join("student.toml"),
            &GradeOptions::default(),
        )
        .unwrap();

        assert_eq!(result(&report, "identity"), &ProblemResult::Correct);
        assert!(matches!(result(&report, "commute"), ProblemResult::InvalidProof(_)));
        assert_eq!(result(&report, "cases"), &ProblemResult::Unmatched);
        assert_eq!(result(&report, "generalize"), &ProblemResult::Correct);
        assert!(report.problems.iter().all(|p| !p.report.diagnostic.starts_with("warning")));
    }
}
