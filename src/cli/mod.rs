use crate::cli::grade_command::{GradeCommand, run_grade};
use std::process::ExitCode;

mod grade_command;

pub fn run_cli() -> ExitCode {
    let cmd: GradeCommand = argh::from_env();
    run_grade(cmd)
}
