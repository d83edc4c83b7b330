//! Accepted spellings of the logical symbols. Unicode first, then the ASCII
//! forms and dot macros students type when they lack a symbol palette.

pub const NOT: &[&str] = &["¬", "~", ".not"];
pub const AND: &[&str] = &["∧", "&", r"/\", ".and"];
pub const OR: &[&str] = &["∨", r"\/", "|", ".or"];
pub const IMPLIES: &[&str] = &["→", "->", ".impl"];
pub const IFF: &[&str] = &["↔", "≡", "<->", "===", ".bicon", ".equiv"];
pub const FORALL: &[&str] = &["∀", "forall"];
pub const EXISTS: &[&str] = &["∃", "exists"];
pub const BOTTOM: &[&str] = &["⊥", "_|_", ".con"];
pub const TOP: &[&str] = &["⊤", "^|^", ".taut"];

pub const LEFT_PAREN: &str = "(";
pub const RIGHT_PAREN: &str = ")";
pub const COMMA: &str = ",";
pub const DOT: &str = ".";

pub const CONFIG_FILE_NAME: &str = "fitch.toml";
