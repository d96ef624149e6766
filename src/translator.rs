// SPDX-License-Identifier: MPL-2.0
//! Read-only lookup table built from a [`Catalog`].
//!
//! Lookups never fail: a missing key, an obsolete entry or an empty
//! translation all resolve to the source string itself. Once built the table
//! is immutable, so a `Translator` can be shared across threads freely.

use crate::catalog::{Catalog, DuplicatePolicy, Message};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

#[derive(Debug, Clone)]
struct Entry {
    comment: Option<String>,
    text: String,
    forms: Vec<String>,
}

/// Plural rule families, indexed the way `lupdate` orders numerus forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// One form for every count (Chinese, Japanese, Korean, ...).
    Single,
    /// `n == 1` and everything else (English, German, ...).
    OneOther,
    /// `n <= 1` and everything else (French, Brazilian Portuguese).
    ZeroOneOther,
    /// Russian-style one / few / many.
    Slavic,
}

impl PluralRule {
    pub fn for_language(language: &str) -> Self {
        let primary = language
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "zh" | "ja" | "ko" | "vi" | "th" | "id" | "ms" | "lo" | "my" => Self::Single,
            "fr" | "pt" => Self::ZeroOneOther,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::Slavic,
            _ => Self::OneOther,
        }
    }

    /// Index of the numerus form to use for `n`.
    pub fn form_index(self, n: u64) -> usize {
        match self {
            Self::Single => 0,
            Self::OneOther => usize::from(n != 1),
            Self::ZeroOneOther => usize::from(n > 1),
            Self::Slavic => {
                if n % 10 == 1 && n % 100 != 11 {
                    0
                } else if (2..=4).contains(&(n % 10)) && !(12..=14).contains(&(n % 100)) {
                    1
                } else {
                    2
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Translator {
    table: HashMap<String, HashMap<String, Vec<Entry>>>,
    language: Option<LanguageIdentifier>,
    plural_rule: PluralRule,
    len: usize,
}

impl Default for Translator {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
            language: None,
            plural_rule: PluralRule::OneOther,
            len: 0,
        }
    }
}

impl Translator {
    /// Builds the lookup table. Obsolete entries and entries without text
    /// are left out so that they fall back to the source string.
    pub fn from_catalog(catalog: &Catalog, policy: DuplicatePolicy) -> Self {
        let language = catalog
            .language
            .as_deref()
            .and_then(|tag| tag.replace('_', "-").parse::<LanguageIdentifier>().ok());
        let plural_rule = catalog
            .language
            .as_deref()
            .map_or(PluralRule::OneOther, PluralRule::for_language);

        let mut translator = Self {
            language,
            plural_rule,
            ..Self::default()
        };
        for (context, message) in catalog.messages() {
            if message.status.is_active() && message.is_translated() {
                translator.add(context, message, policy);
            }
        }
        log::debug!(
            "built lookup table with {} entries in {} contexts",
            translator.len,
            translator.table.len()
        );
        translator
    }

    fn add(&mut self, context: &str, message: &Message, policy: DuplicatePolicy) {
        let entries = self
            .table
            .entry(context.to_string())
            .or_default()
            .entry(message.source.clone())
            .or_default();
        let entry = Entry {
            comment: message.comment.clone(),
            text: message.translation.clone(),
            forms: message.numerus_forms.clone(),
        };

        match entries.iter_mut().find(|e| e.comment == message.comment) {
            Some(existing) => {
                log::debug!(
                    "duplicate entry {context} / {:?}, {:?} applied",
                    message.source,
                    policy
                );
                if policy == DuplicatePolicy::LastWins {
                    *existing = entry;
                }
            }
            None => {
                entries.push(entry);
                self.len += 1;
            }
        }
    }

    fn find(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Entry> {
        let entries = self.table.get(context)?.get(source)?;
        entries
            .iter()
            .find(|e| e.comment.as_deref() == comment)
            .or_else(|| {
                // A disambiguated lookup falls back to the plain entry.
                comment.and_then(|_| entries.iter().find(|e| e.comment.is_none()))
            })
    }

    /// Returns the translation of `source` in `context`, or `source` itself.
    pub fn translate<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.translate_disambiguated(context, source, None)
    }

    /// Like [`translate`](Self::translate) for entries carrying a
    /// disambiguation comment.
    pub fn translate_disambiguated<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
    ) -> &'a str {
        match self.find(context, source, comment) {
            Some(entry) if !entry.text.is_empty() => entry.text.as_str(),
            _ => source,
        }
    }

    /// Picks the numerus form for `n` using the catalog language's plural rule.
    pub fn translate_plural<'a>(&'a self, context: &str, source: &'a str, n: u64) -> &'a str {
        let Some(entry) = self.find(context, source, None) else {
            return source;
        };
        if entry.forms.is_empty() {
            return if entry.text.is_empty() { source } else { entry.text.as_str() };
        }
        let index = self.plural_rule.form_index(n).min(entry.forms.len() - 1);
        match entry.forms[index].as_str() {
            "" => source,
            form => form,
        }
    }

    pub fn contains(&self, context: &str, source: &str) -> bool {
        self.find(context, source, None).is_some()
    }

    pub fn contexts(&self) -> impl Iterator<Item = &str> + '_ {
        self.table.keys().map(String::as_str)
    }

    pub fn language(&self) -> Option<&LanguageIdentifier> {
        self.language.as_ref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
