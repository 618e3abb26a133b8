// Used in both Token and Ast

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Ident {
    Plain(String),
    String(String),
    Integer(String),
}

impl Ident {
    /// The canonical store key, suffix included: `A`, `A$`, `A%`.
    pub fn name(&self) -> &str {
        use Ident::*;
        match self {
            Plain(s) => s,
            String(s) => s,
            Integer(s) => s,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Ident::String(_))
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
