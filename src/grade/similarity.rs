use crate::{
    expr::ExprForest,
    proof::ProofLine,
    verify::{LineVerdict, VerifiedProof},
};

/// Fraction of the instructor's lines that the student reproduces: same
/// rule, same formula up to the order of `∧` and `∨` operands, on a line
/// that verifies. Between 0 and 1, and 1 when the instructor has no lines.
///
/// Appending lines to the student's proof never lowers the score.
pub fn score(instructor: &VerifiedProof, student: &VerifiedProof, forest: &ExprForest) -> f64 {
    let reference = instructor.document().lines();
    if reference.is_empty() {
        return 1.0;
    }

    let verification = student.verification();
    let candidates: Vec<&ProofLine> = student
        .document()
        .lines()
        .iter()
        .filter(|line| verification.verdict(line.index()).is_some_and(LineVerdict::is_valid))
        .collect();

    let matched = reference
        .iter()
        .filter(|wanted| {
            candidates
                .iter()
                .any(|line| line.rule() == wanted.rule() && forest.equiv(line.expr(), wanted.expr()))
        })
        .count();

    matched as f64 / reference.len() as f64
}
