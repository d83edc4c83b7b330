use crate::{
    grade::ProblemResult,
    grader::GradingReport,
    util::{
        ansi::{ANSI_BOLD, ANSI_GRAY, ANSI_GREEN, ANSI_RED, ANSI_RESET, ANSI_YELLOW},
        plural,
    },
};
use std::fmt::Write;

struct Palette {
    reset: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    gray: &'static str,
    bold: &'static str,
}

impl Palette {
    fn new(color: bool) -> Self {
        if color {
            Self {
                reset: ANSI_RESET,
                red: ANSI_RED,
                green: ANSI_GREEN,
                yellow: ANSI_YELLOW,
                gray: ANSI_GRAY,
                bold: ANSI_BOLD,
            }
        } else {
            Self {
                reset: "",
                red: "",
                green: "",
                yellow: "",
                gray: "",
                bold: "",
            }
        }
    }
}

pub fn display_report(report: &GradingReport, color: bool) {
    print!("{}", render_report(report, color));
}

pub fn render_report(report: &GradingReport, color: bool) -> String {
    let Palette {
        reset,
        red,
        green,
        yellow,
        gray,
        bold,
    } = Palette::new(color);

    let mut out = String::new();

    let mut incorrect_count = 0;
    let mut invalid_count = 0;
    let mut parse_error_count = 0;
    let mut unmatched_count = 0;

    for problem in &report.problems {
        let result = &problem.report.result;
        let (mark, tint) = match result {
            ProblemResult::Correct => ("✓", green),
            ProblemResult::IncorrectConclusion => {
                incorrect_count += 1;
                ("✗", yellow)
            }
            ProblemResult::InvalidProof(_) => {
                invalid_count += 1;
                ("✗", red)
            }
            ProblemResult::ParseError(_) => {
                parse_error_count += 1;
                ("✗", red)
            }
            ProblemResult::Unmatched => {
                unmatched_count += 1;
                ("?", gray)
            }
        };

        let _ = write!(
            out,
            " {tint}{mark}{reset} problem {bold}{}{reset}: {}",
            problem.id,
            result.tag()
        );
        if let Some(score) = problem.report.score {
            let _ = write!(out, " {gray}(similarity {:.0}%){reset}", score * 100.0);
        }
        out.push('\n');

        let correct = *result == ProblemResult::Correct;
        for line in problem.report.diagnostic.lines() {
            if !correct || line.starts_with("warning") {
                let _ = writeln!(out, "     {gray}{line}{reset}");
            }
        }
    }

    let total = report.problems.len();
    let correct_count = report.passed();

    let _ = writeln!(out);
    let _ = writeln!(out, "Graded {total} problem{}:", plural(total));
    let _ = writeln!(
        out,
        " {green}✓{reset} {bold}{correct_count}{reset} correct."
    );
    if incorrect_count > 0 {
        let _ = writeln!(
            out,
            " {yellow}✗{reset} {bold}{incorrect_count}{reset} with the wrong conclusion."
        );
    }
    if invalid_count > 0 {
        let _ = writeln!(
            out,
            " {red}✗{reset} {bold}{invalid_count}{reset} with invalid steps."
        );
    }
    if parse_error_count > 0 {
        let _ = writeln!(
            out,
            " {red}✗{reset} {bold}{parse_error_count}{reset} that could not be read."
        );
    }
    if unmatched_count > 0 {
        let _ = writeln!(
            out,
            " {gray}?{reset} {bold}{unmatched_count}{reset} without a counterpart."
        );
    }

    if total > 0 && correct_count == total {
        let _ = writeln!(out);
        let _ = writeln!(out, "🎉 All problems correct! 🎉");
    }

    out
}
