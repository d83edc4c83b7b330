use std::fmt;

/// The inference rules of the Fitch system. The set is closed: every rule
/// has exactly one structural check in `verify::rule_check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Premise,
    Assumption,
    Reiteration,
    AndIntro,
    AndElim,
    OrIntro,
    OrElim,
    ImpliesIntro,
    ImpliesElim,
    NotIntro,
    NotElim,
    ContradictionIntro,
    ContradictionElim,
    TautologyIntro,
    IffIntro,
    IffElim,
    ForallIntro,
    ForallElim,
    ExistsIntro,
    ExistsElim,
}

impl RuleKind {
    pub const ALL: [RuleKind; 20] = [
        RuleKind::Premise,
        RuleKind::Assumption,
        RuleKind::Reiteration,
        RuleKind::AndIntro,
        RuleKind::AndElim,
        RuleKind::OrIntro,
        RuleKind::OrElim,
        RuleKind::ImpliesIntro,
        RuleKind::ImpliesElim,
        RuleKind::NotIntro,
        RuleKind::NotElim,
        RuleKind::ContradictionIntro,
        RuleKind::ContradictionElim,
        RuleKind::TautologyIntro,
        RuleKind::IffIntro,
        RuleKind::IffElim,
        RuleKind::ForallIntro,
        RuleKind::ForallElim,
        RuleKind::ExistsIntro,
        RuleKind::ExistsElim,
    ];

    /// The name used in assignment files.
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Premise => "premise",
            RuleKind::Assumption => "assumption",
            RuleKind::Reiteration => "reiteration",
            RuleKind::AndIntro => "and-intro",
            RuleKind::AndElim => "and-elim",
            RuleKind::OrIntro => "or-intro",
            RuleKind::OrElim => "or-elim",
            RuleKind::ImpliesIntro => "implies-intro",
            RuleKind::ImpliesElim => "implies-elim",
            RuleKind::NotIntro => "not-intro",
            RuleKind::NotElim => "not-elim",
            RuleKind::ContradictionIntro => "contradiction-intro",
            RuleKind::ContradictionElim => "contradiction-elim",
            RuleKind::TautologyIntro => "tautology-intro",
            RuleKind::IffIntro => "iff-intro",
            RuleKind::IffElim => "iff-elim",
            RuleKind::ForallIntro => "forall-intro",
            RuleKind::ForallElim => "forall-elim",
            RuleKind::ExistsIntro => "exists-intro",
            RuleKind::ExistsElim => "exists-elim",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            RuleKind::Assumption => &["assume"],
            RuleKind::Reiteration => &["reit"],
            RuleKind::ImpliesIntro => &["conditional-proof"],
            RuleKind::ImpliesElim => &["modus-ponens"],
            RuleKind::NotElim => &["double-negation"],
            RuleKind::ContradictionElim => &["explosion"],
            RuleKind::IffIntro => &["biconditional-intro"],
            RuleKind::IffElim => &["biconditional-elim"],
            _ => &[],
        }
    }

    /// Looks a rule up by name or alias. Case, underscores and spaces are
    /// ignored, so `Modus_Ponens` and `modus ponens` both work.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|rule| rule.name() == name || rule.aliases().contains(&name.as_str()))
    }

    /// Rules that only make sense with quantifiers.
    pub fn is_quantifier_rule(self) -> bool {
        matches!(
            self,
            RuleKind::ForallIntro | RuleKind::ForallElim | RuleKind::ExistsIntro | RuleKind::ExistsElim
        )
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
