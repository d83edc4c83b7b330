use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{SlotMap, new_key_type};
use std::ops::Index;
use ustr::Ustr;

mod render;

/// Owns every expression node of one grading problem. Structurally identical
/// expressions are interned to the same id, so syntactic equality is id
/// equality.
pub struct ExprForest {
    exprs: SlotMap<ExprId, Expr>,
    ids_by_expr: FxHashMap<Expr, ExprId>,
}

impl ExprForest {
    pub fn new() -> Self {
        Self {
            exprs: SlotMap::default(),
            ids_by_expr: FxHashMap::default(),
        }
    }

    pub fn get_or_insert(&mut self, expr: Expr) -> ExprId {
        if let Some(&id) = self.ids_by_expr.get(&expr) {
            id
        } else {
            let id = self.exprs.insert(expr.clone());
            self.ids_by_expr.insert(expr, id);
            id
        }
    }

    pub fn atom(&mut self, name: Ustr, args: Vec<Ustr>) -> ExprId {
        self.get_or_insert(Expr::Atom { name, args })
    }

    pub fn not(&mut self, inner: ExprId) -> ExprId {
        self.get_or_insert(Expr::Not(inner))
    }

    pub fn binary(&mut self, conn: Connective, left: ExprId, right: ExprId) -> ExprId {
        self.get_or_insert(Expr::Binary(conn, left, right))
    }

    pub fn quantifier(&mut self, quant: Quantifier, var: Ustr, body: ExprId) -> ExprId {
        self.get_or_insert(Expr::Quantifier(quant, var, body))
    }

    pub fn contradiction(&mut self) -> ExprId {
        self.get_or_insert(Expr::Contradiction)
    }

    pub fn tautology(&mut self) -> ExprId {
        self.get_or_insert(Expr::Tautology)
    }
}

impl Index<ExprId> for ExprForest {
    type Output = Expr;

    fn index(&self, index: ExprId) -> &Self::Output {
        &self.exprs[index]
    }
}

new_key_type! { pub struct ExprId; }

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// A proposition `P` or a predicate applied to names `P(a, x)`.
    Atom { name: Ustr, args: Vec<Ustr> },
    Not(ExprId),
    Binary(Connective, ExprId, ExprId),
    Quantifier(Quantifier, Ustr, ExprId),
    Contradiction,
    Tautology,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
    Implies,
    Iff,
}

impl Connective {
    pub fn symbol(self) -> &'static str {
        match self {
            Connective::And => "∧",
            Connective::Or => "∨",
            Connective::Implies => "→",
            Connective::Iff => "↔",
        }
    }

    /// Whether operand order is irrelevant when grading conclusions.
    pub fn is_commutative(self) -> bool {
        matches!(self, Connective::And | Connective::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Forall,
    Exists,
}

impl Quantifier {
    pub fn symbol(self) -> &'static str {
        match self {
            Quantifier::Forall => "∀",
            Quantifier::Exists => "∃",
        }
    }
}

/// Outcome of matching an expression against a quantifier body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instance {
    /// The bound variable does not occur free in the body.
    Vacuous,
    /// Every free occurrence of the bound variable was replaced by this name.
    Name(Ustr),
}

impl ExprForest {
    /// Equality up to the order of `∧` and `∨` operands, applied recursively.
    pub fn equiv(&self, a: ExprId, b: ExprId) -> bool {
        if a == b {
            return true;
        }

        match (&self[a], &self[b]) {
            (Expr::Not(a), Expr::Not(b)) => self.equiv(*a, *b),
            (Expr::Binary(c1, l1, r1), Expr::Binary(c2, l2, r2)) if c1 == c2 => {
                (self.equiv(*l1, *l2) && self.equiv(*r1, *r2))
                    || (c1.is_commutative() && self.equiv(*l1, *r2) && self.equiv(*r1, *l2))
            }
            (Expr::Quantifier(q1, v1, b1), Expr::Quantifier(q2, v2, b2)) => {
                q1 == q2 && v1 == v2 && self.equiv(*b1, *b2)
            }
            _ => false,
        }
    }

    /// Names occurring free in argument positions.
    pub fn free_names(&self, id: ExprId) -> FxHashSet<Ustr> {
        fn collect(forest: &ExprForest, id: ExprId, bound: &mut Vec<Ustr>, out: &mut FxHashSet<Ustr>) {
            match &forest[id] {
                Expr::Atom { args, .. } => {
                    out.extend(args.iter().filter(|arg| !bound.contains(*arg)));
                }
                Expr::Not(inner) => collect(forest, *inner, bound, out),
                Expr::Binary(_, left, right) => {
                    collect(forest, *left, bound, out);
                    collect(forest, *right, bound, out);
                }
                Expr::Quantifier(_, var, body) => {
                    bound.push(*var);
                    collect(forest, *body, bound, out);
                    bound.pop();
                }
                Expr::Contradiction | Expr::Tautology => {}
            }
        }

        let mut out = FxHashSet::default();
        collect(self, id, &mut Vec::new(), &mut out);
        out
    }

    /// Decides whether `target` is `body` with the free occurrences of `var`
    /// uniformly replaced by a single name, without that name being captured
    /// by a quantifier inside `body`.
    pub fn match_instance(&self, body: ExprId, var: Ustr, target: ExprId) -> Option<Instance> {
        let mut matcher = InstanceMatcher {
            forest: self,
            var,
            bound: Vec::new(),
            name: None,
        };

        if matcher.matches(body, target, false) {
            Some(matcher.name.map_or(Instance::Vacuous, Instance::Name))
        } else {
            None
        }
    }
}

struct InstanceMatcher<'a> {
    forest: &'a ExprForest,
    var: Ustr,
    bound: Vec<Ustr>,
    name: Option<Ustr>,
}

impl InstanceMatcher<'_> {
    fn matches(&mut self, pattern: ExprId, target: ExprId, shadowed: bool) -> bool {
        let forest = self.forest;
        match (&forest[pattern], &forest[target]) {
            (
                Expr::Atom { name: p_name, args: p_args },
                Expr::Atom { name: t_name, args: t_args },
            ) => {
                p_name == t_name
                    && p_args.len() == t_args.len()
                    && p_args
                        .iter()
                        .zip(t_args)
                        .all(|(p, t)| self.matches_name(*p, *t, shadowed))
            }
            (Expr::Not(p), Expr::Not(t)) => self.matches(*p, *t, shadowed),
            (Expr::Binary(pc, pl, pr), Expr::Binary(tc, tl, tr)) => {
                pc == tc && self.matches(*pl, *tl, shadowed) && self.matches(*pr, *tr, shadowed)
            }
            (Expr::Quantifier(pq, pv, pb), Expr::Quantifier(tq, tv, tb)) => {
                if pq != tq || pv != tv {
                    return false;
                }
                self.bound.push(*pv);
                let res = self.matches(*pb, *tb, shadowed || *pv == self.var);
                self.bound.pop();
                res
            }
            (Expr::Contradiction, Expr::Contradiction) | (Expr::Tautology, Expr::Tautology) => true,
            _ => false,
        }
    }

    fn matches_name(&mut self, pattern: Ustr, target: Ustr, shadowed: bool) -> bool {
        if pattern != self.var || shadowed {
            return pattern == target;
        }

        // A free occurrence of the variable. The replacement must not be
        // captured by a quantifier between here and the top.
        if self.bound.contains(&target) {
            return false;
        }

        match self.name {
            Some(name) => name == target,
            None => {
                self.name = Some(target);
                true
            }
        }
    }
}
