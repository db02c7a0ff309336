//! Choosing the whole-file grammar entry from a file name.
//!
//! Selection is a pure function of the file name and the declared
//! [`SourceKind`]. The first matching rule wins:
//!
//! | # | Condition | Entry |
//! |---|-----------|-------|
//! | 1 | `PrecompiledFile` | `TopLevelFile` |
//! | 2 | no extension | `TopLevelFile` |
//! | 3 | extension is the canonical one (`kt`) | `TopLevelFile` |
//! | 4 | anything else | `Script` |
//!
//! The extension is the text after the last `.` of the final path
//! component. A leading dot (`.hidden`) and a trailing dot (`Foo.`) do not
//! make an extension. Comparison is exact, so `Foo.KT` is a script.

use std::path::Path;

use crate::types::{GrammarEntry, SourceKind};

/// Extension of ordinary source files.
pub const CANONICAL_EXTENSION: &str = "kt";

/// Extension of the final component of `file_name`, if it has one.
#[must_use]
pub fn extension(file_name: &str) -> Option<&str> {
    let name = Path::new(file_name).file_name()?.to_str()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Picks [`GrammarEntry::TopLevelFile`] or [`GrammarEntry::Script`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    canonical_extension: String,
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            canonical_extension: CANONICAL_EXTENSION.to_string(),
        }
    }
}

impl Selector {
    /// Selector treating `extension` (without the dot) as the whole-file
    /// extension.
    #[must_use]
    pub fn with_canonical_extension(extension: impl Into<String>) -> Self {
        Self {
            canonical_extension: extension.into(),
        }
    }

    /// The extension that selects the whole-file grammar.
    #[must_use]
    pub fn canonical_extension(&self) -> &str {
        &self.canonical_extension
    }

    /// Entry for `file_name` declared as `source_kind`.
    #[must_use]
    pub fn select(&self, file_name: &str, source_kind: SourceKind) -> GrammarEntry {
        if source_kind == SourceKind::PrecompiledFile {
            return GrammarEntry::TopLevelFile;
        }
        match extension(file_name) {
            None => GrammarEntry::TopLevelFile,
            Some(ext) if ext == self.canonical_extension => GrammarEntry::TopLevelFile,
            Some(_) => GrammarEntry::Script,
        }
    }
}

/// [`Selector::select`] with the default canonical extension.
#[must_use]
pub fn select(file_name: &str, source_kind: SourceKind) -> GrammarEntry {
    Selector::default().select(file_name, source_kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case::canonical("Foo.kt", SourceKind::RegularFile, GrammarEntry::TopLevelFile)]
    #[case::no_extension("Foo", SourceKind::RegularFile, GrammarEntry::TopLevelFile)]
    #[case::script("Foo.kts", SourceKind::RegularFile, GrammarEntry::Script)]
    #[case::precompiled_script("Foo.kts", SourceKind::PrecompiledFile, GrammarEntry::TopLevelFile)]
    #[case::precompiled_other("Foo.class", SourceKind::PrecompiledFile, GrammarEntry::TopLevelFile)]
    #[case::other_extension("build.gradle", SourceKind::RegularFile, GrammarEntry::Script)]
    #[case::case_sensitive("Foo.KT", SourceKind::RegularFile, GrammarEntry::Script)]
    #[case::hidden_file(".editorconfig", SourceKind::RegularFile, GrammarEntry::TopLevelFile)]
    #[case::trailing_dot("Foo.", SourceKind::RegularFile, GrammarEntry::TopLevelFile)]
    #[case::last_dot_wins("Foo.kts.kt", SourceKind::RegularFile, GrammarEntry::TopLevelFile)]
    #[case::directory_dots("src.v2/Foo", SourceKind::RegularFile, GrammarEntry::TopLevelFile)]
    #[case::nested_path("src/main/Foo.kts", SourceKind::RegularFile, GrammarEntry::Script)]
    #[case::empty("", SourceKind::RegularFile, GrammarEntry::TopLevelFile)]
    fn selects_entry(
        #[case] file_name: &str,
        #[case] kind: SourceKind,
        #[case] expected: GrammarEntry,
    ) {
        assert_eq!(select(file_name, kind), expected);
    }

    #[test]
    fn custom_canonical_extension() {
        let selector = Selector::with_canonical_extension("kts");

        assert_eq!(selector.canonical_extension(), "kts");
        assert_eq!(
            selector.select("Foo.kts", SourceKind::RegularFile),
            GrammarEntry::TopLevelFile
        );
        assert_eq!(
            selector.select("Foo.kt", SourceKind::RegularFile),
            GrammarEntry::Script
        );
    }

    #[test]
    fn extension_of_final_component_only() {
        assert_eq!(extension("a.b/c.kts"), Some("kts"));
        assert_eq!(extension("a.b/c"), None);
        assert_eq!(extension(".kt"), None);
    }

    proptest! {
        #[test]
        fn selection_is_whole_file_or_script(name in ".{0,24}") {
            let entry = select(&name, SourceKind::RegularFile);
            prop_assert!(matches!(entry, GrammarEntry::TopLevelFile | GrammarEntry::Script));
        }

        #[test]
        fn precompiled_is_always_top_level(name in ".{0,24}") {
            prop_assert_eq!(
                select(&name, SourceKind::PrecompiledFile),
                GrammarEntry::TopLevelFile
            );
        }
    }
}
