//! Syntax kinds and the immutable syntax tree.
//!
//! Trees are lossless rowan green trees: every byte of the input, trivia
//! included, appears in exactly one token, so `tree.text()` reproduces the
//! source. Green nodes are reference counted and immutable, which is what
//! lets the parse cache hand the same tree to every reader without copying.

use std::fmt;
use std::sync::Arc;

use rowan::{GreenNode, GreenNodeData, Language, TextSize};

/// Token and node kinds produced by the lexer and the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // === Trivia ===
    /// Spaces, tabs, carriage returns
    Whitespace,
    /// A single `\n`; significant inside blocks
    Newline,
    /// `// ...`
    LineComment,
    /// `/* ... */`
    BlockComment,

    // === Names and literals ===
    /// Identifier
    Ident,
    /// Integer literal
    IntLiteral,
    /// Double-quoted string literal
    StringLiteral,

    // === Keywords ===
    /// `package`
    PackageKw,
    /// `import`
    ImportKw,
    /// `fun`
    FunKw,
    /// `val`
    ValKw,
    /// `var`
    VarKw,
    /// `class`
    ClassKw,
    /// `return`
    ReturnKw,
    /// `if`
    IfKw,
    /// `else`
    ElseKw,
    /// `true`
    TrueKw,
    /// `false`
    FalseKw,
    /// `null`
    NullKw,
    /// `as`
    AsKw,

    // === Punctuation ===
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `->`
    Arrow,
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `!=`
    ExclEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `!`
    Excl,
    /// `?`
    Quest,
    /// Input the lexer could not classify
    ErrorToken,
    /// End of input; never stored in a tree
    Eof,

    // === Roots ===
    /// Whole-file root
    File,
    /// Script root
    Script,
    /// Root of a type fragment
    TypeCodeFragment,
    /// Root of an expression fragment
    ExpressionCodeFragment,
    /// Root of a block fragment
    BlockCodeFragment,
    /// Root of a lambda fragment
    LambdaCodeFragment,
    /// Root of a block-expression fragment
    BlockExpressionCodeFragment,

    // === Declarations ===
    /// `package a.b`
    PackageDirective,
    /// Consecutive import directives
    ImportList,
    /// `import a.b.C`
    ImportDirective,
    /// Dotted name in a directive
    QualifiedName,
    /// Function declaration
    Fun,
    /// `(a: A, b: B)`
    ValueParameterList,
    /// `a: A`
    ValueParameter,
    /// `val`/`var` declaration
    Property,
    /// Class declaration
    Class,
    /// `{ ... }` after a class header
    ClassBody,

    // === Types ===
    /// Type reference
    TypeReference,
    /// `T?`
    NullableType,
    /// `<A, B>`
    TypeArgumentList,

    // === Statements and expressions ===
    /// Statement sequence, braced or not
    Block,
    /// Lambda literal
    LambdaExpression,
    /// Body of a lambda, including its braces
    FunctionLiteral,
    /// `a, b` before `->`
    LambdaParameterList,
    /// `a + b`
    BinaryExpression,
    /// `-a`, `!a`
    PrefixExpression,
    /// `f(a)`
    CallExpression,
    /// `(a, b)` after a callee
    ValueArgumentList,
    /// `a.b`
    DotQualifiedExpression,
    /// `(a)`
    ParenthesizedExpression,
    /// A bare name used as a value
    ReferenceExpression,
    /// Constant literal
    Literal,
    /// `if (c) a else b`
    IfExpression,
    /// `return a`
    ReturnExpression,

    /// Error-marked node wrapping input the grammar could not place
    Error,
}

use SyntaxKind as K;

impl SyntaxKind {
    /// Every kind, indexed by its discriminant.
    const ALL: [Self; 82] = [
        K::Whitespace,
        K::Newline,
        K::LineComment,
        K::BlockComment,
        K::Ident,
        K::IntLiteral,
        K::StringLiteral,
        K::PackageKw,
        K::ImportKw,
        K::FunKw,
        K::ValKw,
        K::VarKw,
        K::ClassKw,
        K::ReturnKw,
        K::IfKw,
        K::ElseKw,
        K::TrueKw,
        K::FalseKw,
        K::NullKw,
        K::AsKw,
        K::LParen,
        K::RParen,
        K::LBrace,
        K::RBrace,
        K::Comma,
        K::Dot,
        K::Colon,
        K::Semicolon,
        K::Arrow,
        K::Eq,
        K::EqEq,
        K::ExclEq,
        K::Lt,
        K::Gt,
        K::LtEq,
        K::GtEq,
        K::Plus,
        K::Minus,
        K::Star,
        K::Slash,
        K::Percent,
        K::AndAnd,
        K::OrOr,
        K::Excl,
        K::Quest,
        K::ErrorToken,
        K::Eof,
        K::File,
        K::Script,
        K::TypeCodeFragment,
        K::ExpressionCodeFragment,
        K::BlockCodeFragment,
        K::LambdaCodeFragment,
        K::BlockExpressionCodeFragment,
        K::PackageDirective,
        K::ImportList,
        K::ImportDirective,
        K::QualifiedName,
        K::Fun,
        K::ValueParameterList,
        K::ValueParameter,
        K::Property,
        K::Class,
        K::ClassBody,
        K::TypeReference,
        K::NullableType,
        K::TypeArgumentList,
        K::Block,
        K::LambdaExpression,
        K::FunctionLiteral,
        K::LambdaParameterList,
        K::BinaryExpression,
        K::PrefixExpression,
        K::CallExpression,
        K::ValueArgumentList,
        K::DotQualifiedExpression,
        K::ParenthesizedExpression,
        K::ReferenceExpression,
        K::Literal,
        K::IfExpression,
        K::ReturnExpression,
        K::Error,
    ];

    /// Whitespace, newlines and comments.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::LineComment | Self::BlockComment
        )
    }

    /// Reserved words.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        (Self::PackageKw as u16..=Self::AsKw as u16).contains(&(self as u16))
    }

    fn from_raw(raw: u16) -> Self {
        Self::ALL.get(usize::from(raw)).copied().unwrap_or(Self::Error)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// rowan language tag for parsefront trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lang {}

impl Language for Lang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        SyntaxKind::from_raw(raw.0)
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Red-tree node over a [`SyntaxTree`], for traversal.
pub type SyntaxNode = rowan::SyntaxNode<Lang>;

/// Red-tree token over a [`SyntaxTree`].
pub type SyntaxToken = rowan::SyntaxToken<Lang>;

/// A problem the grammar recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// What was expected or found
    pub message: String,
    /// Byte offset into the source where the problem was noticed
    pub offset: TextSize,
}

impl SyntaxError {
    /// Create a new syntax error.
    pub fn new(message: impl Into<String>, offset: TextSize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, u32::from(self.offset))
    }
}

/// Immutable result of one grammar engine invocation.
///
/// Cloning is cheap and shares the underlying nodes. `==` compares
/// structure; [`SyntaxTree::ptr_eq`] tells whether two handles share the
/// same allocation (e.g. both came out of the cache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    green: GreenNode,
    errors: Arc<[SyntaxError]>,
}

impl SyntaxTree {
    pub(crate) fn new(green: GreenNode, errors: Vec<SyntaxError>) -> Self {
        Self {
            green,
            errors: errors.into(),
        }
    }

    /// The underlying green tree.
    #[must_use]
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// A traversable red-tree view rooted at this tree.
    #[must_use]
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Kind of the root node.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        Lang::kind_from_raw(self.green.kind())
    }

    /// The source text the tree covers, trivia included.
    #[must_use]
    pub fn text(&self) -> String {
        self.syntax().text().to_string()
    }

    /// Problems the grammar recovered from, in source order of discovery.
    #[must_use]
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Returns `true` if the grammar had to recover from anything.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if both handles point at the same tree allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq::<GreenNodeData>(&*self.green, &*other.green)
    }

    /// Indented dump of every node and token, one per line.
    #[must_use]
    pub fn debug_tree(&self) -> String {
        format!("{:#?}", self.syntax())
    }

    /// Kinds of every node (not token) in preorder.
    #[must_use]
    pub fn node_kinds(&self) -> Vec<SyntaxKind> {
        self.syntax().descendants().map(|node| node.kind()).collect()
    }
}
