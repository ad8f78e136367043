use serde::{Deserialize, Serialize};

/// Bounds applied to untrusted formula text before and during parsing.
///
/// Formulas are authored by workspace users, so every limit here fails closed with a
/// [`SyntaxErrorKind::LimitExceeded`](crate::SyntaxErrorKind::LimitExceeded) error rather than
/// truncating or guessing.
///
/// Deserializes from camelCase keys (`maxChars`, `maxTokens`, `maxDepth`); missing keys keep
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExprLimits {
    /// Maximum length of the source, in Unicode scalar values.
    pub max_chars: usize,
    /// Maximum number of tokens produced by the lexer.
    pub max_tokens: usize,
    /// Maximum nesting depth of parentheses, and of the resulting AST.
    ///
    /// Binary operators nest in the tree, so a flat chain of `n` operands is `n` levels deep:
    /// with the default limit `f1 + f2 + ... + f128` is accepted and a 129th operand is not.
    /// Chains are rejected while they are parsed, before an over-deep tree exists.
    pub max_depth: usize,
}

impl ExprLimits {
    pub const DEFAULT_MAX_CHARS: usize = 4_096;
    pub const DEFAULT_MAX_TOKENS: usize = 1_024;
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_chars: Self::DEFAULT_MAX_CHARS,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for ExprLimits {
    fn default() -> Self {
        Self::new()
    }
}
