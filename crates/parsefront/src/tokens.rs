//! Lexing and the token source grammar engines consume.
//!
//! [`TokenSource`] plays two roles at once:
//!
//! - a cursor over significant tokens with arbitrary lookahead, where trivia
//!   (whitespace, newlines, comments) is skipped but remembered, so a grammar
//!   can ask whether a newline separates the previous token from the current
//!   one;
//! - the tree builder. Every consumed token, trivia included, goes into a
//!   rowan green builder, and after the engine returns exactly one tree is
//!   retrievable with [`TokenSource::finish`].
//!
//! Newlines terminate statements inside blocks and are ignored inside
//! parentheses. Grammars switch between the two with
//! [`TokenSource::with_newlines`].

use std::ops::Range;

use logos::Logos;
use rowan::{Checkpoint, GreenNodeBuilder, TextSize};

use crate::syntax::{SyntaxError, SyntaxKind, SyntaxTree};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum LexToken {
    #[regex(r"[ \t\r\f]+")]
    Whitespace,
    #[token("\n")]
    Newline,
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,

    #[token("package")]
    PackageKw,
    #[token("import")]
    ImportKw,
    #[token("fun")]
    FunKw,
    #[token("val")]
    ValKw,
    #[token("var")]
    VarKw,
    #[token("class")]
    ClassKw,
    #[token("return")]
    ReturnKw,
    #[token("if")]
    IfKw,
    #[token("else")]
    ElseKw,
    #[token("true")]
    TrueKw,
    #[token("false")]
    FalseKw,
    #[token("null")]
    NullKw,
    #[token("as")]
    AsKw,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9][0-9_]*[lL]?")]
    IntLiteral,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLiteral,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("->")]
    Arrow,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    ExclEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Excl,
    #[token("?")]
    Quest,
}

/// Extend a `/*` match through the closing `*/`. Block comments do not
/// nest. An unterminated comment runs to the end of input and lexes as an
/// error token.
fn block_comment(lex: &mut logos::Lexer<'_, LexToken>) -> bool {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(rest.len());
            false
        }
    }
}

impl From<LexToken> for SyntaxKind {
    fn from(token: LexToken) -> Self {
        match token {
            LexToken::Whitespace => Self::Whitespace,
            LexToken::Newline => Self::Newline,
            LexToken::LineComment => Self::LineComment,
            LexToken::BlockComment => Self::BlockComment,
            LexToken::PackageKw => Self::PackageKw,
            LexToken::ImportKw => Self::ImportKw,
            LexToken::FunKw => Self::FunKw,
            LexToken::ValKw => Self::ValKw,
            LexToken::VarKw => Self::VarKw,
            LexToken::ClassKw => Self::ClassKw,
            LexToken::ReturnKw => Self::ReturnKw,
            LexToken::IfKw => Self::IfKw,
            LexToken::ElseKw => Self::ElseKw,
            LexToken::TrueKw => Self::TrueKw,
            LexToken::FalseKw => Self::FalseKw,
            LexToken::NullKw => Self::NullKw,
            LexToken::AsKw => Self::AsKw,
            LexToken::Ident => Self::Ident,
            LexToken::IntLiteral => Self::IntLiteral,
            LexToken::StringLiteral => Self::StringLiteral,
            LexToken::LParen => Self::LParen,
            LexToken::RParen => Self::RParen,
            LexToken::LBrace => Self::LBrace,
            LexToken::RBrace => Self::RBrace,
            LexToken::Comma => Self::Comma,
            LexToken::Dot => Self::Dot,
            LexToken::Colon => Self::Colon,
            LexToken::Semicolon => Self::Semicolon,
            LexToken::Arrow => Self::Arrow,
            LexToken::Eq => Self::Eq,
            LexToken::EqEq => Self::EqEq,
            LexToken::ExclEq => Self::ExclEq,
            LexToken::Lt => Self::Lt,
            LexToken::Gt => Self::Gt,
            LexToken::LtEq => Self::LtEq,
            LexToken::GtEq => Self::GtEq,
            LexToken::Plus => Self::Plus,
            LexToken::Minus => Self::Minus,
            LexToken::Star => Self::Star,
            LexToken::Slash => Self::Slash,
            LexToken::Percent => Self::Percent,
            LexToken::AndAnd => Self::AndAnd,
            LexToken::OrOr => Self::OrOr,
            LexToken::Excl => Self::Excl,
            LexToken::Quest => Self::Quest,
        }
    }
}

/// A lexed token: its kind and byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind
    pub kind: SyntaxKind,
    /// Byte range in the source text
    pub range: Range<usize>,
}

/// Split `text` into tokens covering every byte.
///
/// Input the lexer cannot classify becomes [`SyntaxKind::ErrorToken`]; lexing
/// never fails.
#[must_use]
pub fn lex(text: &str) -> Vec<Token> {
    LexToken::lexer(text)
        .spanned()
        .map(|(result, range)| Token {
            kind: result.map_or(SyntaxKind::ErrorToken, SyntaxKind::from),
            range,
        })
        .collect()
}

/// Lookahead-capable, newline-aware token stream that builds the tree as it
/// is consumed.
pub struct TokenSource {
    text: String,
    tokens: Vec<Token>,
    /// Index of the next unconsumed token, trivia included.
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    /// Open nodes, root included.
    depth: usize,
    newline_modes: Vec<bool>,
}

impl TokenSource {
    /// Lex `text` and position the cursor before its first token.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens = lex(&text);
        Self {
            text,
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            depth: 0,
            newline_modes: vec![true],
        }
    }

    /// The full source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Index of the current significant token. Consuming trivia alone does
    /// not move it, so grammars compare positions to detect when a rule made
    /// no progress.
    #[must_use]
    pub fn position(&self) -> usize {
        self.nth_index(0).unwrap_or(self.tokens.len())
    }

    /// Number of currently open nodes, the root included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    // === Lookahead ===

    fn nth_index(&self, n: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(self.pos)
            .filter(|(_, token)| !token.kind.is_trivia())
            .nth(n)
            .map(|(index, _)| index)
    }

    /// Kinds of the significant tokens from the current one onwards, in a
    /// single pass.
    pub fn lookahead(&self) -> impl Iterator<Item = SyntaxKind> + '_ {
        self.tokens[self.pos..]
            .iter()
            .map(|token| token.kind)
            .filter(|kind| !kind.is_trivia())
    }

    /// Kind of the `n`th significant token ahead; `Eof` past the end.
    #[must_use]
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_index(n)
            .map_or(SyntaxKind::Eof, |index| self.tokens[index].kind)
    }

    /// Kind of the current significant token.
    #[must_use]
    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Text of the current significant token; empty at the end.
    #[must_use]
    pub fn current_text(&self) -> &str {
        self.nth_index(0)
            .map_or("", |index| &self.text[self.tokens[index].range.clone()])
    }

    /// Returns `true` if the current token is `kind`.
    #[must_use]
    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Returns `true` if the current token is any of `kinds`.
    #[must_use]
    pub fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Returns `true` once every significant token has been consumed.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.at(SyntaxKind::Eof)
    }

    /// Returns `true` if a line break separates the previous significant
    /// token from the current one. Always `false` while newlines are
    /// switched off.
    #[must_use]
    pub fn newline_before_current(&self) -> bool {
        if !self.newlines_significant() {
            return false;
        }
        self.tokens[self.pos..]
            .iter()
            .take_while(|token| token.kind.is_trivia())
            .any(|token| {
                token.kind == SyntaxKind::Newline
                    || (token.kind == SyntaxKind::BlockComment
                        && self.text[token.range.clone()].contains('\n'))
            })
    }

    /// Whether line breaks currently separate statements.
    #[must_use]
    pub fn newlines_significant(&self) -> bool {
        self.newline_modes.last().copied().unwrap_or(true)
    }

    /// Run `f` with newlines switched on or off, restoring the previous mode.
    pub fn with_newlines<R>(&mut self, significant: bool, f: impl FnOnce(&mut Self) -> R) -> R {
        self.newline_modes.push(significant);
        let result = f(self);
        self.newline_modes.pop();
        result
    }

    // === Consumption ===

    fn offset(&self) -> TextSize {
        let offset = self
            .nth_index(0)
            .map_or(self.text.len(), |index| self.tokens[index].range.start);
        TextSize::try_from(offset).unwrap_or(TextSize::from(u32::MAX))
    }

    fn push_raw(&mut self, index: usize) {
        let token = &self.tokens[index];
        self.builder
            .token(token.kind.into(), &self.text[token.range.clone()]);
    }

    fn flush_trivia(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|token| token.kind.is_trivia())
        {
            self.push_raw(self.pos);
            self.pos += 1;
        }
    }

    /// Consume the current significant token (and the trivia before it) into
    /// the open node. Does nothing at the end of input.
    pub fn bump(&mut self) {
        self.flush_trivia();
        if self.pos < self.tokens.len() {
            self.push_raw(self.pos);
            self.pos += 1;
        }
    }

    /// Consume the current token if it is `kind`.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or record "expected `what`" without consuming anything.
    pub fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {what}"));
        false
    }

    // === Tree building ===

    /// Open the root node. Called once by the engine driver before the entry
    /// rule runs; leading trivia ends up inside the root.
    pub(crate) fn start_root(&mut self, kind: SyntaxKind) {
        debug_assert_eq!(self.depth, 0, "root opened twice");
        self.builder.start_node(kind.into());
        self.depth = 1;
    }

    /// Open a child node. Pending trivia is attached to the parent first.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
        self.depth += 1;
    }

    /// Close the innermost open node. The root is closed by
    /// [`TokenSource::finish`]; an extra call here is ignored.
    pub fn finish_node(&mut self) {
        if self.depth <= 1 {
            tracing::warn!("grammar tried to close the root node; ignoring");
            return;
        }
        self.builder.finish_node();
        self.depth -= 1;
    }

    /// Mark a position a node can later be opened at, once it is known
    /// what the tokens that follow belong to.
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    /// Open a node that starts at `checkpoint` and wraps everything built
    /// since then.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
        self.depth += 1;
    }

    /// Record a syntax error at the current token without consuming it.
    pub fn error(&mut self, message: impl Into<String>) {
        let offset = self.offset();
        self.errors.push(SyntaxError::new(message, offset));
    }

    /// Record a syntax error and wrap the current token in an `ERROR` node.
    pub fn error_and_bump(&mut self, message: impl Into<String>) {
        self.error(message);
        if self.at_end() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    /// Record one syntax error and wrap tokens in a single `ERROR` node until
    /// one of `recovery` is current, a new line starts, or the input ends.
    /// Always consumes at least one token unless already at the end.
    pub fn error_until(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        if self.at_end() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        self.bump();
        while !self.at_end() && !self.at_any(recovery) && !self.newline_before_current() {
            self.bump();
        }
        self.finish_node();
    }

    /// Close every node still open, wrap unconsumed tokens in an `ERROR`
    /// node, and hand back the tree.
    pub(crate) fn finish(mut self) -> SyntaxTree {
        if self.depth == 0 {
            self.start_root(SyntaxKind::Error);
        }
        while self.depth > 1 {
            self.builder.finish_node();
            self.depth -= 1;
        }
        if !self.at_end() {
            self.error(format!("unexpected `{}`", self.current_text()));
            self.start_node(SyntaxKind::Error);
            while !self.at_end() {
                self.bump();
            }
            self.finish_node();
        }
        self.flush_trivia();
        self.builder.finish_node();
        SyntaxTree::new(self.builder.finish(), self.errors)
    }
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSource")
            .field("tokens", &self.tokens.len())
            .field("position", &self.pos)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
