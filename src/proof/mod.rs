mod rules;

use crate::expr::ExprId;
use slotmap::{SlotMap, new_key_type};
use std::{fmt, ops::Index, str::FromStr};
use thiserror::Error;

pub use rules::RuleKind;

/// A Fitch-style proof: numbered lines, each justified by a rule and by
/// citations of earlier lines and closed subproofs.
#[derive(Debug, Clone)]
pub struct ProofDocument {
    goal: Option<ExprId>,
    premises: Option<Vec<ExprId>>,
    lines: Vec<ProofLine>,
    scopes: SlotMap<ScopeId, Scope>,
    root: ScopeId,
}

#[derive(Debug, Clone)]
pub struct ProofLine {
    index: usize,
    expr: ExprId,
    rule: RuleKind,
    citations: Vec<Citation>,
    depth: usize,
    scope: ScopeId,
}

impl ProofLine {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn expr(&self) -> ExprId {
        self.expr
    }

    pub fn rule(&self) -> RuleKind {
        self.rule
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }
}

new_key_type! { pub struct ScopeId; }

/// A region of visibility. The root scope holds the top-level lines; every
/// other scope is a subproof opened by its assumption line.
#[derive(Debug, Clone)]
pub struct Scope {
    parent: Option<ScopeId>,
    /// Index of the assumption line; `None` for the root scope.
    assumption: Option<usize>,
    /// Index of the last line inside the scope, nested subproofs included.
    last: usize,
}

impl Scope {
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }
}

/// A reference from one line to an earlier line or to a closed subproof
/// given by its first and last line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Citation {
    Line(usize),
    Subproof(usize, usize),
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Citation::Line(n) => write!(f, "{n}"),
            Citation::Subproof(first, last) => write!(f, "{first}-{last}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a line number or a line range like `2-4`")]
pub struct CitationParseError(String);

impl FromStr for Citation {
    type Err = CitationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CitationParseError(s.to_string());
        let number = |text: &str| text.trim().parse::<usize>().map_err(|_| err());

        match s.split_once('-') {
            Some((first, last)) => {
                let (first, last) = (number(first)?, number(last)?);
                if first > last {
                    return Err(err());
                }
                Ok(Citation::Subproof(first, last))
            }
            None => Ok(Citation::Line(number(s)?)),
        }
    }
}

/// A line before its place in the scope tree is known.
#[derive(Debug, Clone)]
pub struct DraftLine {
    pub expr: ExprId,
    pub rule: RuleKind,
    pub citations: Vec<Citation>,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("line {line}: an assumption must open a subproof (depth 1 or more)")]
    AssumptionAtTopLevel { line: usize },

    #[error("line {line}: depth jumps from {from} to {to}; subproofs open one level at a time")]
    DepthJump { line: usize, from: usize, to: usize },

    #[error("line {line}: only an assumption can open a subproof")]
    SubproofWithoutAssumption { line: usize },
}

impl ProofDocument {
    /// Lays the lines out in a scope tree. Lines are numbered from 1 in the
    /// order given.
    pub fn build(drafts: Vec<DraftLine>) -> Result<Self, DocumentError> {
        let mut scopes = SlotMap::with_key();
        let root = scopes.insert(Scope {
            parent: None,
            assumption: None,
            last: 0,
        });

        // Open scopes, outermost first. `open.len() - 1` is the current depth.
        let mut open = vec![root];
        let mut lines = Vec::with_capacity(drafts.len());

        for (i, draft) in drafts.into_iter().enumerate() {
            let index = i + 1;
            let current = open.len() - 1;

            if draft.rule == RuleKind::Assumption {
                if draft.depth == 0 {
                    return Err(DocumentError::AssumptionAtTopLevel { line: index });
                }
                if draft.depth > current + 1 {
                    return Err(DocumentError::DepthJump {
                        line: index,
                        from: current,
                        to: draft.depth,
                    });
                }

                // Closes any scope at this depth or deeper, so two assumptions
                // in a row at the same depth make sibling subproofs.
                open.truncate(draft.depth);
                let parent = open[open.len() - 1];
                let scope = scopes.insert(Scope {
                    parent: Some(parent),
                    assumption: Some(index),
                    last: index,
                });
                open.push(scope);
            } else {
                if draft.depth > current {
                    return Err(DocumentError::SubproofWithoutAssumption { line: index });
                }
                open.truncate(draft.depth + 1);
            }

            for &scope in &open {
                scopes[scope].last = index;
            }

            lines.push(ProofLine {
                index,
                expr: draft.expr,
                rule: draft.rule,
                citations: draft.citations,
                depth: draft.depth,
                scope: open[open.len() - 1],
            });
        }

        Ok(Self {
            goal: None,
            premises: None,
            lines,
            scopes,
            root,
        })
    }

    pub fn with_goal(mut self, goal: Option<ExprId>) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_premises(mut self, premises: Option<Vec<ExprId>>) -> Self {
        self.premises = premises;
        self
    }

    pub fn goal(&self) -> Option<ExprId> {
        self.goal
    }

    /// Premises declared by the problem statement, if it declares any.
    pub fn premises(&self) -> Option<&[ExprId]> {
        self.premises.as_deref()
    }

    pub fn lines(&self) -> &[ProofLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&ProofLine> {
        index.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// The last line outside every subproof: what the proof establishes.
    pub fn conclusion(&self) -> Option<&ProofLine> {
        self.lines.iter().rev().find(|line| line.depth == 0)
    }

    /// The subproof that starts exactly at `first` and ends exactly at `last`.
    pub fn subproof(&self, first: usize, last: usize) -> Option<ScopeId> {
        let line = self.line(first)?;
        let scope = &self.scopes[line.scope];
        (scope.assumption == Some(first) && scope.last == last).then_some(line.scope)
    }
}

impl Index<ScopeId> for ProofDocument {
    type Output = Scope;

    fn index(&self, index: ScopeId) -> &Self::Output {
        &self.scopes[index]
    }
}
