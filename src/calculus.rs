use crate::{
    expr::{ExprForest, ExprId},
    parse::{Grammar, SyntaxError, parse},
    proof::ProofDocument,
    verify::{VerifiedProof, VerifyOptions, verify},
};
use serde::Deserialize;
use std::fmt;

/// What a logic system provides to the grader: how to read its formulas,
/// how to check its proofs and how to print formulas back.
pub trait Calculus: Sync {
    fn kind(&self) -> CalculusKind;

    fn parse(&self, text: &str, forest: &mut ExprForest) -> Result<ExprId, SyntaxError>;

    fn verify(&self, document: ProofDocument, forest: &ExprForest) -> VerifiedProof;

    fn render(&self, forest: &ExprForest, expr: ExprId) -> String {
        forest.render(expr).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculusKind {
    #[default]
    Propositional,
    Predicate,
}

impl CalculusKind {
    pub fn calculus(self) -> &'static dyn Calculus {
        match self {
            CalculusKind::Propositional => &Propositional,
            CalculusKind::Predicate => &Predicate,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CalculusKind::Propositional => "propositional",
            CalculusKind::Predicate => "predicate",
        }
    }
}

impl fmt::Display for CalculusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sentence letters and connectives.
pub struct Propositional;

impl Calculus for Propositional {
    fn kind(&self) -> CalculusKind {
        CalculusKind::Propositional
    }

    fn parse(&self, text: &str, forest: &mut ExprForest) -> Result<ExprId, SyntaxError> {
        parse(text, Grammar::Propositional, forest)
    }

    fn verify(&self, document: ProofDocument, forest: &ExprForest) -> VerifiedProof {
        verify(document, forest, VerifyOptions { quantifiers: false })
    }
}

/// First-order logic over names, without function symbols or identity.
pub struct Predicate;

impl Calculus for Predicate {
    fn kind(&self) -> CalculusKind {
        CalculusKind::Predicate
    }

    fn parse(&self, text: &str, forest: &mut ExprForest) -> Result<ExprId, SyntaxError> {
        parse(text, Grammar::Predicate, forest)
    }

    fn verify(&self, document: ProofDocument, forest: &ExprForest) -> VerifiedProof {
        verify(document, forest, VerifyOptions { quantifiers: true })
    }
}
