use crate::expr::{Expr, ExprForest, ExprId};
use itertools::Itertools;
use std::fmt;

/// Canonical text of an expression. Parsing the output yields the same
/// expression back.
pub struct Rendered<'a> {
    forest: &'a ExprForest,
    id: ExprId,
}

impl ExprForest {
    pub fn render(&self, id: ExprId) -> Rendered<'_> {
        Rendered { forest: self, id }
    }

    /// Atoms, constants and negation chains over them never need parentheses.
    fn is_simple(&self, id: ExprId) -> bool {
        match &self[id] {
            Expr::Atom { .. } | Expr::Contradiction | Expr::Tautology => true,
            Expr::Not(inner) => self.is_simple(*inner),
            Expr::Binary(..) | Expr::Quantifier(..) => false,
        }
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(self.forest, self.id, f)
    }
}

fn write_expr(forest: &ExprForest, id: ExprId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &forest[id] {
        Expr::Atom { name, args } if args.is_empty() => write!(f, "{name}"),
        Expr::Atom { name, args } => write!(f, "{name}({})", args.iter().join(", ")),
        Expr::Not(inner) => {
            f.write_str("¬")?;
            if matches!(forest[*inner], Expr::Binary(..)) {
                write_parenthesized(forest, *inner, f)
            } else {
                write_expr(forest, *inner, f)
            }
        }
        Expr::Binary(conn, left, right) => {
            write_operand(forest, *left, f)?;
            write!(f, " {} ", conn.symbol())?;
            write_operand(forest, *right, f)
        }
        // The body extends to the end of the enclosing text, so a quantifier
        // only needs parentheses when it is itself an operand.
        Expr::Quantifier(quant, var, body) => {
            write!(f, "{}{var} ", quant.symbol())?;
            write_expr(forest, *body, f)
        }
        Expr::Contradiction => f.write_str("⊥"),
        Expr::Tautology => f.write_str("⊤"),
    }
}

fn write_operand(forest: &ExprForest, id: ExprId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if forest.is_simple(id) {
        write_expr(forest, id, f)
    } else {
        write_parenthesized(forest, id, f)
    }
}

fn write_parenthesized(forest: &ExprForest, id: ExprId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("(")?;
    write_expr(forest, id, f)?;
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use crate::expr::{Connective, Expr, ExprForest, ExprId, Quantifier};
    use crate::parse::{Grammar, parse};
    use proptest::prelude::*;
    use ustr::Ustr;

    fn rendered(text: &str) -> String {
        let mut forest = ExprForest::new();
        let id = parse(text, Grammar::Predicate, &mut forest).unwrap();
        forest.render(id).to_string()
    }

    #[test]
    fn renders_unicode_symbols() {
        assert_eq!(rendered("~P & Q -> R"), "(¬P ∧ Q) → R");
        assert_eq!(rendered("P <-> _|_ | ^|^"), "P ↔ (⊥ ∨ ⊤)");
    }

    #[test]
    fn renders_quantifiers_and_predicates() {
        assert_eq!(rendered("forall x P(x, a)"), "∀x P(x, a)");
        assert_eq!(rendered("(exists y Q(y)) & R"), "(∃y Q(y)) ∧ R");
        assert_eq!(rendered("~forall x ~P(x)"), "¬∀x ¬P(x)");
    }

    #[test]
    fn renders_negated_binary_with_parentheses() {
        assert_eq!(rendered("~(A | B)"), "¬(A ∨ B)");
        assert_eq!(rendered("~~A"), "¬¬A");
    }

    /// Shape of a random expression, built into a forest afterwards.
    #[derive(Debug, Clone)]
    enum Shape {
        Atom(u8, Vec<u8>),
        Not(Box<Shape>),
        Binary(u8, Box<Shape>, Box<Shape>),
        Quantifier(bool, u8, Box<Shape>),
        Contradiction,
        Tautology,
    }

    fn arb_shape() -> impl Strategy<Value = Shape> {
        let leaf = prop_oneof![
            6 => (0..4u8, proptest::collection::vec(0..4u8, 0..3))
                .prop_map(|(name, args)| Shape::Atom(name, args)),
            1 => Just(Shape::Contradiction),
            1 => Just(Shape::Tautology),
        ];

        leaf.prop_recursive(5, 48, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|s| Shape::Not(Box::new(s))),
                (0..4u8, inner.clone(), inner.clone())
                    .prop_map(|(c, l, r)| Shape::Binary(c, Box::new(l), Box::new(r))),
                (any::<bool>(), 0..4u8, inner)
                    .prop_map(|(all, v, b)| Shape::Quantifier(all, v, Box::new(b))),
            ]
        })
    }

    fn build(shape: &Shape, forest: &mut ExprForest) -> ExprId {
        const PREDICATES: [&str; 4] = ["P", "Q", "R", "Sad"];
        const NAMES: [&str; 4] = ["x", "y", "a", "b"];
        const CONNECTIVES: [Connective; 4] = [
            Connective::And,
            Connective::Or,
            Connective::Implies,
            Connective::Iff,
        ];

        match shape {
            Shape::Atom(name, args) => {
                let args = args.iter().map(|a| Ustr::from(NAMES[*a as usize])).collect();
                forest.atom(Ustr::from(PREDICATES[*name as usize]), args)
            }
            Shape::Not(inner) => {
                let inner = build(inner, forest);
                forest.not(inner)
            }
            Shape::Binary(conn, left, right) => {
                let left = build(left, forest);
                let right = build(right, forest);
                forest.binary(CONNECTIVES[*conn as usize], left, right)
            }
            Shape::Quantifier(all, var, body) => {
                let body = build(body, forest);
                let quant = if *all {
                    Quantifier::Forall
                } else {
                    Quantifier::Exists
                };
                forest.quantifier(quant, Ustr::from(NAMES[*var as usize]), body)
            }
            Shape::Contradiction => forest.get_or_insert(Expr::Contradiction),
            Shape::Tautology => forest.get_or_insert(Expr::Tautology),
        }
    }

    proptest! {
        #[test]
        fn parse_inverts_render(shape in arb_shape()) {
            let mut forest = ExprForest::new();
            let id = build(&shape, &mut forest);
            let text = forest.render(id).to_string();
            let reparsed = parse(&text, Grammar::Predicate, &mut forest);
            prop_assert_eq!(reparsed, Ok(id), "rendered as {}", text);
        }
    }
}
