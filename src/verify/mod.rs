//! Checks every line of a proof document against its rule and citations.
//!
//! Lines are checked in order while keeping a stack of open scopes. A line
//! may cite an earlier line in any open scope, or a subproof that has been
//! closed and whose parent scope is still open.

mod rule_check;

use crate::{
    expr::{ExprForest, ExprId},
    proof::{Citation, ProofDocument, ProofLine, RuleKind, ScopeId},
};
use rule_check::{Cited, CitedLine, CitedSubproof, Env};
use std::fmt;
use ustr::Ustr;

pub use rule_check::RuleMismatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineVerdict {
    Valid,
    InvalidRuleApplication(RuleMismatch),
    /// The citation does not name a line, or a range that is exactly a subproof.
    UnresolvedCitation(Citation),
    /// The citation names a line or subproof that is not visible from here.
    OutOfScopeCitation(Citation),
}

impl LineVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, LineVerdict::Valid)
    }
}

impl fmt::Display for LineVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineVerdict::Valid => f.write_str("valid"),
            LineVerdict::InvalidRuleApplication(mismatch) => write!(f, "{mismatch}"),
            LineVerdict::UnresolvedCitation(Citation::Line(n)) => {
                write!(f, "cites line {n}, which does not exist")
            }
            LineVerdict::UnresolvedCitation(citation) => {
                write!(f, "cites {citation}, which is not a subproof")
            }
            LineVerdict::OutOfScopeCitation(citation) => {
                write!(f, "cites {citation}, which is not available here")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    /// No goal was declared, so only the lines matter.
    Undeclared,
    Reached,
    Unreached,
}

#[derive(Debug, Clone)]
pub struct Verification {
    verdicts: Vec<LineVerdict>,
    goal: GoalStatus,
}

impl Verification {
    /// Verdict of the line with the given 1-based index.
    pub fn verdict(&self, index: usize) -> Option<&LineVerdict> {
        index.checked_sub(1).and_then(|i| self.verdicts.get(i))
    }

    pub fn goal(&self) -> GoalStatus {
        self.goal
    }

    /// Every line is valid and a declared goal is the last top-level line.
    pub fn is_valid(&self) -> bool {
        self.goal != GoalStatus::Unreached && self.verdicts.iter().all(LineVerdict::is_valid)
    }

    /// Indices and verdicts of the lines that failed.
    pub fn invalid_lines(&self) -> impl Iterator<Item = (usize, &LineVerdict)> {
        self.verdicts
            .iter()
            .enumerate()
            .filter(|(_, verdict)| !verdict.is_valid())
            .map(|(i, verdict)| (i + 1, verdict))
    }
}

/// A document together with the verdicts of its lines.
#[derive(Debug, Clone)]
pub struct VerifiedProof {
    document: ProofDocument,
    verification: Verification,
}

impl VerifiedProof {
    pub fn document(&self) -> &ProofDocument {
        &self.document
    }

    pub fn verification(&self) -> &Verification {
        &self.verification
    }

    pub fn is_valid(&self) -> bool {
        self.verification.is_valid()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Whether the quantifier rules are available.
    pub quantifiers: bool,
}

/// An open scope and the names free in the premises and assumptions that
/// are visible inside it.
#[derive(Debug, Clone)]
struct Frame {
    scope: ScopeId,
    names: im::HashSet<Ustr>,
}

pub fn verify(document: ProofDocument, forest: &ExprForest, options: VerifyOptions) -> VerifiedProof {
    let declared_names: im::HashSet<Ustr> = document
        .premises()
        .unwrap_or_default()
        .iter()
        .flat_map(|&premise| forest.free_names(premise))
        .collect();

    let mut frames = im::vector![Frame {
        scope: document.root(),
        names: declared_names,
    }];
    let mut after_derivation = false;
    let mut verdicts = Vec::with_capacity(document.lines().len());

    for line in document.lines() {
        if line.rule() == RuleKind::Assumption {
            frames.truncate(line.depth());
            let mut names = frames.back().map(|f| f.names.clone()).unwrap_or_default();
            names.extend(forest.free_names(line.expr()));
            frames.push_back(Frame {
                scope: line.scope(),
                names,
            });
        } else {
            frames.truncate(line.depth() + 1);
        }

        let verdict = check_line(line, &document, forest, &frames, options, after_derivation);
        verdicts.push(verdict);

        if line.rule() == RuleKind::Premise {
            if line.depth() == 0
                && let Some(root) = frames.get_mut(0)
            {
                root.names.extend(forest.free_names(line.expr()));
            }
        } else {
            after_derivation = true;
        }
    }

    let goal = match document.goal() {
        None => GoalStatus::Undeclared,
        Some(goal) if document.conclusion().map(ProofLine::expr) == Some(goal) => GoalStatus::Reached,
        Some(_) => GoalStatus::Unreached,
    };

    VerifiedProof {
        document,
        verification: Verification { verdicts, goal },
    }
}

fn check_line(
    line: &ProofLine,
    document: &ProofDocument,
    forest: &ExprForest,
    frames: &im::Vector<Frame>,
    options: VerifyOptions,
    after_derivation: bool,
) -> LineVerdict {
    let mut cited = Vec::with_capacity(line.citations().len());
    for &citation in line.citations() {
        match resolve(citation, line, document, frames) {
            Ok(resolved) => cited.push(resolved),
            Err(verdict) => return verdict,
        }
    }

    let empty = im::HashSet::new();
    let env = Env {
        rule: line.rule(),
        conclusion: line.expr(),
        cited: &cited,
        depth: line.depth(),
        context_names: frames.back().map_or(&empty, |frame| &frame.names),
        declared_premises: document.premises(),
        after_derivation,
        quantifiers: options.quantifiers,
    };

    match rule_check::check(&env, forest) {
        Ok(()) => LineVerdict::Valid,
        Err(mismatch) => LineVerdict::InvalidRuleApplication(mismatch),
    }
}

fn resolve(
    citation: Citation,
    line: &ProofLine,
    document: &ProofDocument,
    frames: &im::Vector<Frame>,
) -> Result<Cited, LineVerdict> {
    let visible = |scope: ScopeId| frames.iter().any(|frame| frame.scope == scope);
    let expr_of = |index: usize| -> Option<ExprId> { document.line(index).map(ProofLine::expr) };

    match citation {
        Citation::Line(index) => {
            let Some(cited) = document.line(index) else {
                return Err(LineVerdict::UnresolvedCitation(citation));
            };
            if index >= line.index() || !visible(cited.scope()) {
                return Err(LineVerdict::OutOfScopeCitation(citation));
            }
            Ok(Cited::Line(CitedLine {
                citation,
                expr: cited.expr(),
            }))
        }

        Citation::Subproof(first, last) => {
            let Some(scope) = document.subproof(first, last) else {
                return Err(LineVerdict::UnresolvedCitation(citation));
            };
            let parent_visible = document[scope].parent().is_some_and(visible);
            if last >= line.index() || !parent_visible {
                return Err(LineVerdict::OutOfScopeCitation(citation));
            }

            // The subproof's result is its own last line, not a line of a
            // nested subproof that happens to close with it.
            let ends_at_own_level = document.line(last).is_some_and(|l| l.scope() == scope);
            let (Some(assumption), Some(conclusion)) = (expr_of(first), expr_of(last)) else {
                return Err(LineVerdict::UnresolvedCitation(citation));
            };
            if !ends_at_own_level {
                return Err(LineVerdict::InvalidRuleApplication(
                    RuleMismatch::SubproofEndsNested(citation),
                ));
            }

            Ok(Cited::Subproof(CitedSubproof {
                assumption,
                conclusion,
            }))
        }
    }
}
