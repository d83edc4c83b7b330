use crate::{
    expr::{Connective, Expr, ExprForest, ExprId, Instance, Quantifier},
    proof::{Citation, RuleKind},
    util::plural,
};
use std::fmt;
use thiserror::Error;
use ustr::Ustr;

/// Why a rule's structural check failed for a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleMismatch {
    #[error("expects {expected}, but cites {found}")]
    Citations {
        expected: CitationShape,
        found: CitationShape,
    },

    #[error("conclusion must be {0}")]
    ConclusionShape(&'static str),

    #[error("cited line {citation} must be {expected}")]
    CitedShape {
        citation: Citation,
        expected: &'static str,
    },

    #[error("{0}")]
    Check(&'static str),

    #[error("subproof {0} must end at its own level, not inside a nested subproof")]
    SubproofEndsNested(Citation),

    #[error("premises may only appear outside every subproof")]
    PremiseInSubproof,

    #[error("premises must come before every derived line")]
    PremiseAfterDerivation,

    #[error("not one of the premises of the problem")]
    PremiseNotInStatement,

    #[error("`{0}` is not arbitrary: it occurs free in a premise, an open assumption or the conclusion")]
    NotFresh(Ustr),

    #[error("{0} needs the predicate calculus")]
    NeedsPredicateCalculus(RuleKind),
}

/// How many lines and subproofs a line cites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationShape {
    lines: usize,
    subproofs: usize,
}

impl fmt::Display for CitationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { lines, subproofs } = *self;
        match (lines, subproofs) {
            (0, 0) => f.write_str("no citations"),
            (l, 0) => write!(f, "{l} line{}", plural(l)),
            (0, s) => write!(f, "{s} subproof{}", plural(s)),
            (l, s) => write!(f, "{l} line{} and {s} subproof{}", plural(l), plural(s)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CitedLine {
    pub citation: Citation,
    pub expr: ExprId,
}

#[derive(Debug, Clone, Copy)]
pub struct CitedSubproof {
    pub assumption: ExprId,
    pub conclusion: ExprId,
}

/// A citation after it has been resolved against the document.
#[derive(Debug, Clone, Copy)]
pub enum Cited {
    Line(CitedLine),
    Subproof(CitedSubproof),
}

/// Everything a rule may look at when justifying one line.
pub struct Env<'a> {
    pub rule: RuleKind,
    pub conclusion: ExprId,
    pub cited: &'a [Cited],
    pub depth: usize,
    /// Names free in the premises and the assumptions open at this line.
    pub context_names: &'a im::HashSet<Ustr>,
    pub declared_premises: Option<&'a [ExprId]>,
    /// Whether a non-premise line came earlier.
    pub after_derivation: bool,
    pub quantifiers: bool,
}

pub fn check(env: &Env, forest: &ExprForest) -> Result<(), RuleMismatch> {
    use RuleMismatch::{CitedShape, Check, ConclusionShape};

    if env.rule.is_quantifier_rule() && !env.quantifiers {
        return Err(RuleMismatch::NeedsPredicateCalculus(env.rule));
    }

    let c = env.conclusion;

    match env.rule {
        RuleKind::Premise => {
            split(env.cited, 0, 0)?;
            if env.depth != 0 {
                return Err(RuleMismatch::PremiseInSubproof);
            }
            if env.after_derivation {
                return Err(RuleMismatch::PremiseAfterDerivation);
            }
            if let Some(premises) = env.declared_premises
                && !premises.contains(&c)
            {
                return Err(RuleMismatch::PremiseNotInStatement);
            }
            Ok(())
        }

        RuleKind::Assumption => split(env.cited, 0, 0).map(|_| ()),

        RuleKind::Reiteration => {
            let (lines, _) = split(env.cited, 1, 0)?;
            ensure(lines[0].expr == c, "conclusion must repeat the cited line")
        }

        RuleKind::AndIntro => {
            let &Expr::Binary(Connective::And, left, right) = &forest[c] else {
                return Err(ConclusionShape("a conjunction"));
            };

            // `A ∧ A` may cite `A` once.
            if let [Cited::Line(a)] = env.cited {
                return ensure(
                    left == right && a.expr == left,
                    "a single cited line only justifies its conjunction with itself",
                );
            }

            let (lines, _) = split(env.cited, 2, 0)?;
            let (a, b) = (lines[0].expr, lines[1].expr);
            ensure(
                (a == left && b == right) || (a == right && b == left),
                "cited lines must be the two conjuncts",
            )
        }

        RuleKind::AndElim => {
            let (lines, _) = split(env.cited, 1, 0)?;
            let &Expr::Binary(Connective::And, left, right) = &forest[lines[0].expr] else {
                return Err(CitedShape {
                    citation: lines[0].citation,
                    expected: "a conjunction",
                });
            };
            ensure(c == left || c == right, "conclusion must be one of the conjuncts")
        }

        RuleKind::OrIntro => {
            let (lines, _) = split(env.cited, 1, 0)?;
            let &Expr::Binary(Connective::Or, left, right) = &forest[c] else {
                return Err(ConclusionShape("a disjunction"));
            };
            let a = lines[0].expr;
            ensure(a == left || a == right, "cited line must be one of the disjuncts")
        }

        RuleKind::OrElim => {
            let (lines, subproofs) = split(env.cited, 1, 2)?;
            let &Expr::Binary(Connective::Or, left, right) = &forest[lines[0].expr] else {
                return Err(CitedShape {
                    citation: lines[0].citation,
                    expected: "a disjunction",
                });
            };
            let (s1, s2) = (subproofs[0], subproofs[1]);
            ensure(
                (s1.assumption == left && s2.assumption == right)
                    || (s1.assumption == right && s2.assumption == left),
                "subproofs must assume the two disjuncts",
            )?;
            ensure(
                s1.conclusion == c && s2.conclusion == c,
                "both subproofs must end in the conclusion",
            )
        }

        RuleKind::ImpliesIntro => {
            let (_, subproofs) = split(env.cited, 0, 1)?;
            let &Expr::Binary(Connective::Implies, antecedent, consequent) = &forest[c] else {
                return Err(ConclusionShape("an implication"));
            };
            let s = subproofs[0];
            ensure(s.assumption == antecedent, "subproof must assume the antecedent")?;
            ensure(s.conclusion == consequent, "subproof must end in the consequent")
        }

        RuleKind::ImpliesElim => {
            let (lines, _) = split(env.cited, 2, 0)?;
            let mut failure = Check("one cited line must be an implication");

            for (implication, other) in [(lines[0], lines[1]), (lines[1], lines[0])] {
                let &Expr::Binary(Connective::Implies, antecedent, consequent) =
                    &forest[implication.expr]
                else {
                    continue;
                };
                if other.expr != antecedent {
                    failure = Check("the other cited line must be the antecedent");
                } else if c != consequent {
                    failure = Check("conclusion must be the consequent");
                } else {
                    return Ok(());
                }
            }

            Err(failure)
        }

        RuleKind::NotIntro => {
            let (_, subproofs) = split(env.cited, 0, 1)?;
            let &Expr::Not(negated) = &forest[c] else {
                return Err(ConclusionShape("a negation"));
            };
            let s = subproofs[0];
            ensure(s.assumption == negated, "subproof must assume what the conclusion negates")?;
            ensure(
                forest[s.conclusion] == Expr::Contradiction,
                "subproof must end in ⊥",
            )
        }

        RuleKind::NotElim => {
            let (lines, _) = split(env.cited, 1, 0)?;
            let double_negated = match &forest[lines[0].expr] {
                &Expr::Not(inner) => match &forest[inner] {
                    &Expr::Not(inner) => Some(inner),
                    _ => None,
                },
                _ => None,
            };
            let Some(inner) = double_negated else {
                return Err(CitedShape {
                    citation: lines[0].citation,
                    expected: "a double negation",
                });
            };
            ensure(inner == c, "conclusion must drop both negations")
        }

        RuleKind::ContradictionIntro => {
            let (lines, _) = split(env.cited, 2, 0)?;
            if forest[c] != Expr::Contradiction {
                return Err(ConclusionShape("⊥"));
            }
            let (a, b) = (lines[0].expr, lines[1].expr);
            ensure(
                forest[a] == Expr::Not(b) || forest[b] == Expr::Not(a),
                "cited lines must be a formula and its negation",
            )
        }

        RuleKind::ContradictionElim => {
            let (lines, _) = split(env.cited, 1, 0)?;
            if forest[lines[0].expr] != Expr::Contradiction {
                return Err(CitedShape {
                    citation: lines[0].citation,
                    expected: "⊥",
                });
            }
            Ok(())
        }

        RuleKind::TautologyIntro => {
            split(env.cited, 0, 0)?;
            if forest[c] != Expr::Tautology {
                return Err(ConclusionShape("⊤"));
            }
            Ok(())
        }

        RuleKind::IffIntro => {
            let (_, subproofs) = split(env.cited, 0, 2)?;
            let &Expr::Binary(Connective::Iff, left, right) = &forest[c] else {
                return Err(ConclusionShape("a biconditional"));
            };
            let derives = |s: CitedSubproof, from: ExprId, to: ExprId| {
                s.assumption == from && s.conclusion == to
            };
            let (s1, s2) = (subproofs[0], subproofs[1]);
            ensure(
                (derives(s1, left, right) && derives(s2, right, left))
                    || (derives(s1, right, left) && derives(s2, left, right)),
                "subproofs must derive each side from the other",
            )
        }

        RuleKind::IffElim => {
            let (lines, _) = split(env.cited, 2, 0)?;
            let mut failure = Check("one cited line must be a biconditional");

            for (biconditional, other) in [(lines[0], lines[1]), (lines[1], lines[0])] {
                let &Expr::Binary(Connective::Iff, left, right) = &forest[biconditional.expr]
                else {
                    continue;
                };
                if (other.expr == left && c == right) || (other.expr == right && c == left) {
                    return Ok(());
                }
                failure = Check("conclusion must be the side opposite the other cited line");
            }

            Err(failure)
        }

        RuleKind::ForallIntro => {
            let (lines, _) = split(env.cited, 1, 0)?;
            let &Expr::Quantifier(Quantifier::Forall, var, body) = &forest[c] else {
                return Err(ConclusionShape("a universal"));
            };
            match forest.match_instance(body, var, lines[0].expr) {
                None => Err(Check(
                    "cited line must be the body with one name in place of the variable",
                )),
                Some(Instance::Vacuous) => Ok(()),
                Some(Instance::Name(name)) => {
                    ensure_fresh(name, env.context_names, &[c], forest)
                }
            }
        }

        RuleKind::ForallElim => {
            let (lines, _) = split(env.cited, 1, 0)?;
            let &Expr::Quantifier(Quantifier::Forall, var, body) = &forest[lines[0].expr] else {
                return Err(CitedShape {
                    citation: lines[0].citation,
                    expected: "a universal",
                });
            };
            ensure(
                forest.match_instance(body, var, c).is_some(),
                "conclusion must be the body with one name in place of the variable",
            )
        }

        RuleKind::ExistsIntro => {
            let (lines, _) = split(env.cited, 1, 0)?;
            let &Expr::Quantifier(Quantifier::Exists, var, body) = &forest[c] else {
                return Err(ConclusionShape("an existential"));
            };
            ensure(
                forest.match_instance(body, var, lines[0].expr).is_some(),
                "cited line must be the body with one name in place of the variable",
            )
        }

        RuleKind::ExistsElim => {
            let (lines, subproofs) = split(env.cited, 1, 1)?;
            let existential = lines[0].expr;
            let &Expr::Quantifier(Quantifier::Exists, var, body) = &forest[existential] else {
                return Err(CitedShape {
                    citation: lines[0].citation,
                    expected: "an existential",
                });
            };
            let s = subproofs[0];
            match forest.match_instance(body, var, s.assumption) {
                None => {
                    return Err(Check(
                        "subproof must assume the body with one name in place of the variable",
                    ));
                }
                Some(Instance::Vacuous) => {}
                Some(Instance::Name(name)) => {
                    ensure_fresh(name, env.context_names, &[existential, c], forest)?;
                }
            }
            ensure(s.conclusion == c, "subproof must end in the conclusion")
        }
    }
}

fn ensure(holds: bool, check: &'static str) -> Result<(), RuleMismatch> {
    if holds {
        Ok(())
    } else {
        Err(RuleMismatch::Check(check))
    }
}

/// A name standing for an arbitrary individual may not appear free in the
/// context or in the given expressions.
fn ensure_fresh(
    name: Ustr,
    context_names: &im::HashSet<Ustr>,
    exprs: &[ExprId],
    forest: &ExprForest,
) -> Result<(), RuleMismatch> {
    let clashes = context_names.contains(&name)
        || exprs.iter().any(|&e| forest.free_names(e).contains(&name));
    if clashes {
        Err(RuleMismatch::NotFresh(name))
    } else {
        Ok(())
    }
}

/// Splits citations into lines and subproofs, requiring exact counts.
fn split(
    cited: &[Cited],
    lines: usize,
    subproofs: usize,
) -> Result<(Vec<CitedLine>, Vec<CitedSubproof>), RuleMismatch> {
    let mut found_lines = Vec::new();
    let mut found_subproofs = Vec::new();
    for cited in cited {
        match *cited {
            Cited::Line(line) => found_lines.push(line),
            Cited::Subproof(subproof) => found_subproofs.push(subproof),
        }
    }

    if found_lines.len() != lines || found_subproofs.len() != subproofs {
        return Err(RuleMismatch::Citations {
            expected: CitationShape { lines, subproofs },
            found: CitationShape {
                lines: found_lines.len(),
                subproofs: found_subproofs.len(),
            },
        });
    }

    Ok((found_lines, found_subproofs))
}
