use crate::{
    assignment::GradeError,
    config::{ConfigError, GraderConfig},
    grader::{GradingReport, grade_files},
    report::display_report,
    util::ansi::{ANSI_BOLD, ANSI_RED, ANSI_RESET},
};
use argh::FromArgs;
use std::{path::PathBuf, process::ExitCode};
use thiserror::Error;
use tracing::info;

/// Grade natural-deduction proofs against an instructor's reference proofs.
#[derive(FromArgs)]
pub struct GradeCommand {
    /// the instructor's assignment file.
    #[argh(positional)]
    instructor: PathBuf,

    /// the student's assignment file.
    #[argh(positional)]
    student: PathBuf,

    /// path to fitch.toml config file.
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// score how closely each proof follows the reference.
    #[argh(switch, short = 's')]
    similarity: bool,

    /// disable colored output.
    #[argh(switch)]
    plain: bool,
}

#[derive(Debug, Error)]
enum FatalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grade(#[from] GradeError),
}

pub fn run_grade(cmd: GradeCommand) -> ExitCode {
    let plain = cmd.plain;
    let outcome = run(cmd);
    match &outcome {
        Ok((report, color)) => display_report(report, *color),
        Err(err) if plain => eprintln!("error: {err}"),
        Err(err) => eprintln!("{ANSI_RED}{ANSI_BOLD}error:{ANSI_RESET} {err}"),
    }
    ExitCode::from(exit_status(outcome.as_ref().map(|(report, _)| report)))
}

/// 0 when every problem passes, 1 when grading found failures, 2 when
/// grading could not run.
fn exit_status(outcome: Result<&GradingReport, &FatalError>) -> u8 {
    match outcome {
        Ok(report) if report.is_failure() => 1,
        Ok(_) => 0,
        Err(_) => 2,
    }
}

fn run(cmd: GradeCommand) -> Result<(GradingReport, bool), FatalError> {
    let config = GraderConfig::load(cmd.config.as_deref())?
        .with_similarity(cmd.similarity)
        .with_plain(cmd.plain);
    info!(?config, "configuration loaded");

    let report = grade_files(&cmd.instructor, &cmd.student, &config.grading())?;
    info!(
        problems = report.problems.len(),
        passed = report.passed(),
        "grading finished"
    );

    Ok((report, config.color()))
}
