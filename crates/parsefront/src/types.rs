//! Domain types for grammar dispatch and caching.
//!
//! - **Inputs**: `ParseRequest`, `FileIdentity`, `SourceKind`
//! - **Dispatch**: `GrammarEntry`, `Fragment`
//! - **Results**: `CacheStatus`
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Identity | Normalised on construction | Lookup and insertion can't disagree on equality |
//! | Entry | Closed enum | Selection is total; no string sniffing at call sites |
//! | Fragment | Separate enum | Fragment calls can never name a whole-file entry |

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::syntax::SyntaxKind;

// ============================================================================
// Enums
// ============================================================================

/// Declared nature of a parse input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// An ordinary source file; the grammar is chosen from its name.
    #[default]
    RegularFile,
    /// An already-compiled representation being re-surfaced as source.
    /// Always parsed with the whole-file grammar, whatever its name.
    PrecompiledFile,
}

/// A named sub-grammar the engine can start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarEntry {
    /// Whole source file: package, imports, declarations.
    TopLevelFile,
    /// Script: package, imports, then statements.
    Script,
    /// A lone type reference.
    TypeFragment,
    /// A lone expression.
    ExpressionFragment,
    /// A sequence of statements without braces.
    BlockFragment,
    /// A lambda literal (`{ a, b -> a + b }`).
    LambdaExpression,
    /// A braced block (`{ ... }`).
    BlockExpression,
}

impl GrammarEntry {
    /// All entries, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::TopLevelFile,
        Self::Script,
        Self::TypeFragment,
        Self::ExpressionFragment,
        Self::BlockFragment,
        Self::LambdaExpression,
        Self::BlockExpression,
    ];

    /// Stable string form, used in logs and CLI output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLevelFile => "top-level-file",
            Self::Script => "script",
            Self::TypeFragment => "type-fragment",
            Self::ExpressionFragment => "expression-fragment",
            Self::BlockFragment => "block-fragment",
            Self::LambdaExpression => "lambda-expression",
            Self::BlockExpression => "block-expression",
        }
    }

    /// Kind of the root node every tree built from this entry has.
    #[must_use]
    pub fn root_kind(&self) -> SyntaxKind {
        match self {
            Self::TopLevelFile => SyntaxKind::File,
            Self::Script => SyntaxKind::Script,
            Self::TypeFragment => SyntaxKind::TypeCodeFragment,
            Self::ExpressionFragment => SyntaxKind::ExpressionCodeFragment,
            Self::BlockFragment => SyntaxKind::BlockCodeFragment,
            Self::LambdaExpression => SyntaxKind::LambdaCodeFragment,
            Self::BlockExpression => SyntaxKind::BlockExpressionCodeFragment,
        }
    }

    /// Returns `true` for the two entries the facade dispatches between.
    #[must_use]
    pub fn is_whole_file(&self) -> bool {
        matches!(self, Self::TopLevelFile | Self::Script)
    }
}

impl fmt::Display for GrammarEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five isolated grammar roots tooling can parse without a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fragment {
    /// A type reference, e.g. `Map<String, Int>?`.
    Type,
    /// An expression, e.g. a debugger watch.
    Expression,
    /// Statements without surrounding braces.
    Block,
    /// A lambda literal.
    Lambda,
    /// A braced block expression.
    BlockExpression,
}

impl Fragment {
    /// The fixed grammar entry this fragment kind runs.
    #[must_use]
    pub fn entry(&self) -> GrammarEntry {
        match self {
            Self::Type => GrammarEntry::TypeFragment,
            Self::Expression => GrammarEntry::ExpressionFragment,
            Self::Block => GrammarEntry::BlockFragment,
            Self::Lambda => GrammarEntry::LambdaExpression,
            Self::BlockExpression => GrammarEntry::BlockExpression,
        }
    }
}

/// Whether a facade call was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the cache; the engine did not run.
    Hit,
    /// The engine ran.
    Miss,
}

impl CacheStatus {
    /// Stable string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Caller-supplied key naming "which file", independent of its content.
///
/// The only way to build one is through a normalising constructor, so two
/// spellings of the same path (`src/./a.kt`, `src/b/../a.kt`) always compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileIdentity(PathBuf);

impl FileIdentity {
    /// Create an identity by lexically normalising `path`.
    ///
    /// `.` segments are dropped and `name/..` pairs folded. The file system
    /// is not consulted, so symlinks are not resolved; use
    /// [`FileIdentity::canonical`] when that matters.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let mut normalized = PathBuf::new();
        for component in path.as_ref().components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match normalized.components().next_back() {
                    Some(Component::Normal(_)) => {
                        normalized.pop();
                    }
                    Some(Component::RootDir | Component::Prefix(_)) => {}
                    _ => normalized.push(".."),
                },
                other => normalized.push(other.as_os_str()),
            }
        }
        Self(normalized)
    }

    /// Create an identity from the file system's canonical form of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the path does not exist or cannot be resolved.
    pub fn canonical(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("cannot resolve identity for {}: {e}", path.display()),
            ))
        })?;
        Ok(Self::new(canonical))
    }

    /// The normalised path this identity wraps.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

// ============================================================================
// Requests
// ============================================================================

/// A whole-file or script parse request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequest {
    /// Cache key; `None` disables caching for the call.
    pub identity: Option<FileIdentity>,
    /// File name used to pick the grammar entry.
    pub file_name: String,
    /// Declared nature of the input.
    pub source_kind: SourceKind,
}

impl ParseRequest {
    /// Request for a file on disk, keyed by the lexically normalised path.
    pub fn for_file(path: impl AsRef<Path>) -> Self {
        let identity = FileIdentity::new(path);
        let file_name = identity
            .as_path()
            .file_name()
            .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
        Self {
            identity: Some(identity),
            file_name,
            source_kind: SourceKind::RegularFile,
        }
    }

    /// Request for an in-memory buffer that must never be cached.
    pub fn anonymous(file_name: impl Into<String>) -> Self {
        Self {
            identity: None,
            file_name: file_name.into(),
            source_kind: SourceKind::RegularFile,
        }
    }

    /// Replace the cache key.
    #[must_use]
    pub fn with_identity(mut self, identity: FileIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Replace the declared source kind.
    #[must_use]
    pub fn with_source_kind(mut self, source_kind: SourceKind) -> Self {
        self.source_kind = source_kind;
        self
    }
}
