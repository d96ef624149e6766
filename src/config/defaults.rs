// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Locale**: source language and catalog discovery
//! - **Lint**: advisory checks that are off unless enabled
//! - **Export**: layout of generated `.ts` and Fluent files

// ==========================================================================
// Locale Defaults
// ==========================================================================

/// Language the untranslated source strings are written in.
pub const DEFAULT_SOURCE_LOCALE: &str = "en";

/// File extension of Qt Linguist translation sources.
pub const CATALOG_EXTENSION: &str = "ts";

// ==========================================================================
// Lint Defaults
// ==========================================================================

/// Provenance markers are advisory, so their absence is not reported by default.
pub const DEFAULT_LINT_MISSING_LOCATION: bool = false;

// ==========================================================================
// Export Defaults
// ==========================================================================

/// Indentation used for generated `.ts` files, matching `lupdate`.
pub const TS_INDENT_WIDTH: usize = 4;

/// Longest Fluent message id generated from a context and source string.
pub const MAX_FLUENT_ID_LEN: usize = 64;

/// Minimum length kept for the source-derived part of a Fluent id.
pub const MIN_FLUENT_SLUG_LEN: usize = 8;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(TS_INDENT_WIDTH > 0);
    assert!(MIN_FLUENT_SLUG_LEN > 0);
    assert!(MAX_FLUENT_ID_LEN > MIN_FLUENT_SLUG_LEN);
    assert!(!DEFAULT_SOURCE_LOCALE.is_empty());
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_defaults_are_valid() {
        assert_eq!(TS_INDENT_WIDTH, 4);
        assert!(MAX_FLUENT_ID_LEN > MIN_FLUENT_SLUG_LEN);
    }

    #[test]
    fn locale_defaults_are_valid() {
        assert_eq!(DEFAULT_SOURCE_LOCALE, "en");
        assert_eq!(CATALOG_EXTENSION, "ts");
    }
}
