//! Recursive-descent parser for formulas.
//!
//! Precedence from loosest to tightest: `↔`, `→`, `∨`, `∧`, `¬`. `→` and `↔`
//! associate to the right, `∧` and `∨` to the left. A quantifier binds one
//! variable over the rest of the formula unless parenthesized.

mod stream;

use crate::{
    expr::{Connective, ExprForest, ExprId, Quantifier},
    strings,
};
use std::fmt;
use stream::Stream;
use thiserror::Error;

/// Which formulas a calculus accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// Atoms without arguments and no quantifiers.
    Propositional,
    Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct SyntaxError {
    position: usize,
    expected: &'static str,
    found: Found,
}

impl SyntaxError {
    fn new(position: usize, expected: &'static str, found: Option<char>) -> Self {
        Self {
            position,
            expected,
            found: found.map_or(Found::EndOfInput, Found::Char),
        }
    }

    /// Byte offset of the offending token.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn expected(&self) -> &'static str {
        self.expected
    }

    /// Byte range of the offending token, empty at the end of input.
    pub fn span(&self) -> std::ops::Range<usize> {
        let width = match self.found {
            Found::Char(c) => c.len_utf8(),
            Found::EndOfInput => 0,
        };
        let start = self.position();
        start..start + width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Char(char),
    EndOfInput,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Char(c) => write!(f, "`{c}`"),
            Found::EndOfInput => f.write_str("end of input"),
        }
    }
}

pub fn parse(text: &str, grammar: Grammar, forest: &mut ExprForest) -> Result<ExprId, SyntaxError> {
    let mut parser = Parser {
        stream: Stream::new(text),
        grammar,
        forest,
    };

    let expr = parser.expr()?;
    parser.stream.expect_eof("a connective or end of input")?;
    Ok(expr)
}

struct Parser<'a, 'f> {
    stream: Stream<'a>,
    grammar: Grammar,
    forest: &'f mut ExprForest,
}

impl Parser<'_, '_> {
    fn expr(&mut self) -> Result<ExprId, SyntaxError> {
        self.iff()
    }

    fn iff(&mut self) -> Result<ExprId, SyntaxError> {
        let left = self.implies()?;
        if self.stream.eat_any(strings::IFF) {
            let right = self.iff()?;
            Ok(self.forest.binary(Connective::Iff, left, right))
        } else {
            Ok(left)
        }
    }

    fn implies(&mut self) -> Result<ExprId, SyntaxError> {
        let left = self.or()?;
        if self.stream.eat_any(strings::IMPLIES) {
            let right = self.implies()?;
            Ok(self.forest.binary(Connective::Implies, left, right))
        } else {
            Ok(left)
        }
    }

    fn or(&mut self) -> Result<ExprId, SyntaxError> {
        let mut left = self.and()?;
        while self.stream.eat_any(strings::OR) {
            let right = self.and()?;
            left = self.forest.binary(Connective::Or, left, right);
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<ExprId, SyntaxError> {
        let mut left = self.unary()?;
        while self.stream.eat_any(strings::AND) {
            let right = self.unary()?;
            left = self.forest.binary(Connective::And, left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<ExprId, SyntaxError> {
        if self.stream.eat_any(strings::NOT) {
            let inner = self.unary()?;
            return Ok(self.forest.not(inner));
        }

        for (spellings, quant) in [
            (strings::FORALL, Quantifier::Forall),
            (strings::EXISTS, Quantifier::Exists),
        ] {
            if self.stream.at_any(spellings) {
                return self.quantifier(spellings, quant);
            }
        }

        self.primary()
    }

    fn quantifier(
        &mut self,
        spellings: &[&str],
        quant: Quantifier,
    ) -> Result<ExprId, SyntaxError> {
        if self.grammar == Grammar::Propositional {
            return Err(self.stream.error("a formula without quantifiers"));
        }
        self.stream.eat_any(spellings);

        let var = self
            .stream
            .ident()
            .ok_or_else(|| self.stream.error("a variable name"))?;

        self.separator();
        let body = self.expr()?;
        Ok(self.forest.quantifier(quant, var, body))
    }

    /// `∀x. P(x)` and `∀x, P(x)` are accepted too, but a dot macro after the
    /// variable starts the body.
    fn separator(&mut self) {
        if self.stream.eat(strings::COMMA) {
            return;
        }

        let rest = self.stream.rest().trim_start();
        if let Some(after) = rest.strip_prefix(strings::DOT)
            && !starts_with_macro(after)
        {
            self.stream.eat(strings::DOT);
        }
    }

    fn primary(&mut self) -> Result<ExprId, SyntaxError> {
        if self.stream.eat(strings::LEFT_PAREN) {
            let inner = self.expr()?;
            self.stream.expect(strings::RIGHT_PAREN)?;
            return Ok(inner);
        }

        if self.stream.eat_any(strings::BOTTOM) {
            return Ok(self.forest.contradiction());
        }

        if self.stream.eat_any(strings::TOP) {
            return Ok(self.forest.tautology());
        }

        let Some(name) = self.stream.ident() else {
            return Err(self.stream.error("a formula"));
        };

        // Arguments must follow the predicate name directly.
        let mut args = Vec::new();
        if self.stream.rest().starts_with(strings::LEFT_PAREN) {
            if self.grammar == Grammar::Propositional {
                return Err(self.stream.error("a connective (predicates need the predicate calculus)"));
            }

            self.stream.expect(strings::LEFT_PAREN)?;
            loop {
                let arg = self
                    .stream
                    .ident()
                    .ok_or_else(|| self.stream.error("a name"))?;
                args.push(arg);

                if !self.stream.eat(strings::COMMA) {
                    break;
                }
            }
            self.stream.expect(strings::RIGHT_PAREN)?;
        }

        Ok(self.forest.atom(name, args))
    }
}

fn starts_with_macro(text: &str) -> bool {
    [
        strings::NOT,
        strings::AND,
        strings::OR,
        strings::IMPLIES,
        strings::IFF,
        strings::BOTTOM,
        strings::TOP,
    ]
    .iter()
    .flat_map(|spellings| spellings.iter())
    .filter_map(|spelling| spelling.strip_prefix(strings::DOT))
    .any(|name| {
        text.strip_prefix(name)
            .is_some_and(|after| !after.starts_with(stream::is_ident_char))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    fn parse_pred(text: &str) -> (ExprForest, Result<ExprId, SyntaxError>) {
        let mut forest = ExprForest::new();
        let res = parse(text, Grammar::Predicate, &mut forest);
        (forest, res)
    }

    fn render(text: &str) -> String {
        let (forest, res) = parse_pred(text);
        forest.render(res.unwrap()).to_string()
    }

    #[test]
    fn precedence_follows_not_and_or_implies_iff() {
        assert_eq!(render("~A & B | C -> D <-> E"), "(((¬A ∧ B) ∨ C) → D) ↔ E");
        assert_eq!(render("A <-> B -> C | D & ~E"), "A ↔ (B → (C ∨ (D ∧ ¬E)))");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(render("(A | B) & C"), "(A ∨ B) ∧ C");
        assert_eq!(render("~(A -> B)"), "¬(A → B)");
    }

    #[test]
    fn implication_is_right_associative() {
        assert_eq!(render("A -> B -> C"), "A → (B → C)");
        assert_eq!(render("A & B & C"), "(A ∧ B) ∧ C");
    }

    #[test]
    fn quantifier_extends_to_the_end() {
        assert_eq!(render("forall x P(x) & Q(x)"), "∀x P(x) ∧ Q(x)");
        let (forest, res) = parse_pred("forall x P(x) & Q(x)");
        assert!(matches!(forest[res.unwrap()], Expr::Quantifier(Quantifier::Forall, ..)));

        let (forest, res) = parse_pred("(forall x P(x)) & Q(x)");
        assert!(matches!(forest[res.unwrap()], Expr::Binary(Connective::And, ..)));
    }

    #[test]
    fn quantifier_separators_are_optional() {
        assert_eq!(render("∀x. P(x)"), "∀x P(x)");
        assert_eq!(render("∃y, Q(y)"), "∃y Q(y)");
        assert_eq!(render("forall x .not P(x)"), "∀x ¬P(x)");
    }

    #[test]
    fn ascii_and_macro_spellings() {
        assert_eq!(render(r"A /\ B \/ C"), "(A ∧ B) ∨ C");
        assert_eq!(render("A .and B .impl .con"), "(A ∧ B) → ⊥");
        assert_eq!(render("A .bicon ^|^"), "A ↔ ⊤");
    }

    #[test]
    fn equivalence_spellings_read_as_biconditional() {
        assert_eq!(render("P ≡ Q"), "P ↔ Q");
        assert_eq!(render("P .equiv Q"), "P ↔ Q");
        assert_eq!(render("P === Q -> R"), "P ↔ (Q → R)");
    }

    #[test]
    fn reports_position_of_unexpected_token() {
        let (_, res) = parse_pred("A & ) B");
        let err = res.unwrap_err();
        assert_eq!(err.position(), 4);
        assert_eq!(err.to_string(), "expected a formula, found `)`");
    }

    #[test]
    fn rejects_trailing_input() {
        let (_, res) = parse_pred("A B");
        let err = res.unwrap_err();
        assert_eq!(err.position(), 2);
        assert_eq!(err.expected(), "a connective or end of input");
    }

    #[test]
    fn rejects_empty_and_unclosed_input() {
        let (_, res) = parse_pred("");
        assert_eq!(res.unwrap_err().to_string(), "expected a formula, found end of input");

        let (_, res) = parse_pred("(A & B");
        assert_eq!(res.unwrap_err().position(), 6);
    }

    #[test]
    fn rejects_empty_argument_list() {
        let (_, res) = parse_pred("P()");
        assert_eq!(res.unwrap_err().expected(), "a name");
    }

    #[test]
    fn propositional_grammar_rejects_predicates_and_quantifiers() {
        let mut forest = ExprForest::new();
        let err = parse("forall x P", Grammar::Propositional, &mut forest).unwrap_err();
        assert_eq!(err.position(), 0);

        let err = parse("A & P(a)", Grammar::Propositional, &mut forest).unwrap_err();
        assert_eq!(err.position(), 5);
    }
}
