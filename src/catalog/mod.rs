// SPDX-License-Identifier: MPL-2.0
//! In-memory model of a Qt Linguist translation source (`.ts`) catalog.
//!
//! A [`Catalog`] is an ordered list of [`Context`]s, each bundling the
//! [`Message`]s owned by one UI surface. Document order is kept so that
//! exporting a loaded catalog produces a stable, diff-friendly file.
//!
//! Duplicate `(context, source, comment)` keys are tolerated here; the
//! [`DuplicatePolicy`] decides which one wins when a lookup table is built
//! or when catalogs are merged.

pub mod reader;
pub mod writer;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

pub use reader::{read_file, read_str};
pub use writer::{write_file, write_string};

/// Which entry wins when the same key appears more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    FirstWins,
    /// Later entries overwrite earlier ones, as `lrelease` does.
    #[default]
    LastWins,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" | "first-wins" => Ok(Self::FirstWins),
            "last" | "last-wins" => Ok(Self::LastWins),
            other => Err(format!(
                "unknown duplicate policy '{other}' (expected 'first-wins' or 'last-wins')"
            )),
        }
    }
}

/// State of a translation as recorded in the `type` attribute of `<translation>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TranslationStatus {
    #[default]
    Finished,
    Unfinished,
    /// The source string no longer exists in the code.
    Obsolete,
    /// Like `Obsolete`, written by newer `lupdate` versions.
    Vanished,
}

impl TranslationStatus {
    /// Parses the optional `type` attribute.
    pub fn from_type_attr(value: Option<&str>) -> Result<Self, String> {
        match value {
            None | Some("") => Ok(Self::Finished),
            Some("unfinished") => Ok(Self::Unfinished),
            Some("obsolete") => Ok(Self::Obsolete),
            Some("vanished") => Ok(Self::Vanished),
            Some(other) => Err(format!("unknown translation type '{other}'")),
        }
    }

    /// Value to write back as the `type` attribute, if any.
    pub fn type_attr(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Whether the entry still belongs to a live UI string.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Finished | Self::Unfinished)
    }
}

/// Provenance marker pointing at the code that owns a string.
///
/// Advisory only: ignored by lookup, round-trip comparison and diffing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub filename: String,
    pub line: Option<u32>,
}

impl Location {
    pub fn new(filename: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.filename, line),
            None => write!(f, "{}", self.filename),
        }
    }
}

/// A single translation entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    /// Untranslated text; the exact lookup key.
    pub source: String,
    /// Localized text, kept verbatim including surrounding whitespace.
    pub translation: String,
    /// Plural variants when `numerus` is set.
    pub numerus_forms: Vec<String>,
    pub numerus: bool,
    /// Disambiguation comment; part of the lookup key.
    pub comment: Option<String>,
    pub extra_comment: Option<String>,
    pub translator_comment: Option<String>,
    pub locations: Vec<Location>,
    pub status: TranslationStatus,
}

impl Message {
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, filename: impl Into<String>, line: u32) -> Self {
        self.locations.push(Location::new(filename, Some(line)));
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_numerus_forms(mut self, forms: Vec<String>) -> Self {
        self.numerus = true;
        self.translation = forms.first().cloned().unwrap_or_default();
        self.numerus_forms = forms;
        self
    }

    /// True when the entry carries usable localized text.
    pub fn is_translated(&self) -> bool {
        if self.numerus {
            self.numerus_forms.iter().any(|form| !form.is_empty())
        } else {
            !self.translation.is_empty()
        }
    }

    /// Equality that ignores provenance markers.
    pub fn same_content(&self, other: &Message) -> bool {
        self.source == other.source
            && self.comment == other.comment
            && self.translation == other.translation
            && self.numerus_forms == other.numerus_forms
            && self.status == other.status
    }
}

/// Identity of a message within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub context: String,
    pub source: String,
    pub comment: Option<String>,
}

impl MessageKey {
    pub fn of(context: &str, message: &Message) -> Self {
        Self {
            context: context.to_string(),
            source: message.source.clone(),
            comment: message.comment.clone(),
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {:?}", self.context, self.source)?;
        if let Some(comment) = &self.comment {
            write!(f, " ({comment})")?;
        }
        Ok(())
    }
}

/// Strings owned by one UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Context {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }

    fn position(&self, source: &str, comment: Option<&str>) -> Option<usize> {
        self.messages
            .iter()
            .position(|m| m.source == source && m.comment.as_deref() == comment)
    }
}

/// Result of [`Catalog::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub replaced: usize,
    pub kept: usize,
}

/// Summary counts over a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub contexts: usize,
    pub messages: usize,
    pub finished: usize,
    pub unfinished: usize,
    pub obsolete: usize,
    /// Entries whose key already appeared earlier in the same context.
    pub duplicates: usize,
}

impl CatalogStats {
    /// Share of active messages that are finished, in percent.
    pub fn completion_percent(&self) -> f32 {
        let active = self.finished + self.unfinished;
        if active == 0 {
            return 100.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let percent = self.finished as f32 * 100.0 / active as f32;
        percent
    }
}

impl fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} contexts, {} messages ({} finished, {} unfinished, {} obsolete, {} duplicates), {:.1}% complete",
            self.contexts,
            self.messages,
            self.finished,
            self.unfinished,
            self.obsolete,
            self.duplicates,
            self.completion_percent()
        )
    }
}

/// A translation source set: the parsed form of one or more `.ts` files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    pub version: Option<String>,
    pub language: Option<String>,
    pub source_language: Option<String>,
    contexts: Vec<Context>,
    origin: Option<PathBuf>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// File the catalog was read from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub(crate) fn set_origin(&mut self, origin: PathBuf) {
        self.origin = Some(origin);
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    fn context_mut_or_insert(&mut self, name: &str) -> &mut Context {
        let index = match self.contexts.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[index]
    }

    /// Appends a context as-is. Repeated context names are kept separate,
    /// mirroring what a loader sees in the file.
    pub(crate) fn push_context(&mut self, context: Context) {
        self.contexts.push(context);
    }

    /// Appends a message to `context`, creating the context if needed.
    pub fn insert(&mut self, context: &str, message: Message) {
        self.context_mut_or_insert(context).messages.push(message);
    }

    /// All messages paired with their context name, in document order.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> + '_ {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    pub fn len(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `(context, source, translation)` set, order aside.
    pub fn entry_set(&self) -> BTreeSet<(String, String, String)> {
        self.messages()
            .map(|(context, m)| (context.to_string(), m.source.clone(), m.translation.clone()))
            .collect()
    }

    /// Folds `other` into this catalog.
    ///
    /// Keys already present are replaced or kept according to `policy`;
    /// new keys are appended to their context in `other`'s order.
    pub fn merge(&mut self, other: &Catalog, policy: DuplicatePolicy) -> MergeReport {
        let mut report = MergeReport::default();
        if self.language.is_none() {
            self.language.clone_from(&other.language);
        }
        if self.source_language.is_none() {
            self.source_language.clone_from(&other.source_language);
        }
        if self.version.is_none() {
            self.version.clone_from(&other.version);
        }

        for (context_name, message) in other.messages() {
            let context = self.context_mut_or_insert(context_name);
            match context.position(&message.source, message.comment.as_deref()) {
                Some(index) => match policy {
                    DuplicatePolicy::LastWins => {
                        context.messages[index] = message.clone();
                        report.replaced += 1;
                    }
                    DuplicatePolicy::FirstWins => report.kept += 1,
                },
                None => {
                    context.messages.push(message.clone());
                    report.added += 1;
                }
            }
        }

        log::debug!(
            "merged catalog: {} added, {} replaced, {} kept",
            report.added,
            report.replaced,
            report.kept
        );
        report
    }

    /// Collapses repeated context blocks and duplicate keys in place.
    ///
    /// Returns the number of messages dropped.
    pub fn resolve_duplicates(&mut self, policy: DuplicatePolicy) -> usize {
        let before = self.len();
        let mut resolved = Catalog {
            version: self.version.take(),
            language: self.language.take(),
            source_language: self.source_language.take(),
            contexts: Vec::new(),
            origin: self.origin.take(),
        };
        resolved.merge(self, policy);
        *self = resolved;
        before - self.len()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats::default();
        let mut seen: HashMap<&str, BTreeSet<(&str, Option<&str>)>> = HashMap::new();

        for context in &self.contexts {
            let keys = seen.entry(context.name.as_str()).or_insert_with(|| {
                stats.contexts += 1;
                BTreeSet::new()
            });
            for message in &context.messages {
                stats.messages += 1;
                match message.status {
                    TranslationStatus::Finished => stats.finished += 1,
                    TranslationStatus::Unfinished => stats.unfinished += 1,
                    TranslationStatus::Obsolete | TranslationStatus::Vanished => {
                        stats.obsolete += 1;
                    }
                }
                if !keys.insert((message.source.as_str(), message.comment.as_deref())) {
                    stats.duplicates += 1;
                }
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new().with_language("zh_CN");
        catalog.insert("SizeDialog", Message::new("Width: ", "宽度: "));
        catalog.insert("SizeDialog", Message::new("Height: ", "高度: "));
        catalog.insert("BaseWidget", Message::new("move up", "上移"));
        catalog
    }

    #[test]
    fn insert_groups_messages_by_context() {
        let catalog = sample();
        assert_eq!(catalog.contexts().len(), 2);
        assert_eq!(catalog.context("SizeDialog").map(|c| c.messages.len()), Some(2));
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn messages_iterate_in_document_order() {
        let catalog = sample();
        let sources: Vec<&str> = catalog.messages().map(|(_, m)| m.source.as_str()).collect();
        assert_eq!(sources, vec!["Width: ", "Height: ", "move up"]);
    }

    #[test]
    fn merge_last_wins_replaces_existing_translation() {
        let mut base = sample();
        let mut update = Catalog::new();
        update.insert("SizeDialog", Message::new("Width: ", "宽: "));
        update.insert("View", Message::new("create canvas widget", "创建画布控件"));

        let report = base.merge(&update, DuplicatePolicy::LastWins);

        assert_eq!(report, MergeReport { added: 1, replaced: 1, kept: 0 });
        let width = &base.context("SizeDialog").unwrap().messages[0];
        assert_eq!(width.translation, "宽: ");
        assert!(base.context("View").is_some());
    }

    #[test]
    fn merge_first_wins_keeps_existing_translation() {
        let mut base = sample();
        let mut update = Catalog::new();
        update.insert("SizeDialog", Message::new("Width: ", "宽: "));

        let report = base.merge(&update, DuplicatePolicy::FirstWins);

        assert_eq!(report.kept, 1);
        assert_eq!(base.context("SizeDialog").unwrap().messages[0].translation, "宽度: ");
    }

    #[test]
    fn disambiguation_comment_makes_keys_distinct() {
        let mut base = Catalog::new();
        base.insert("View", Message::new("Open", "打开"));
        let mut other = Catalog::new();
        other.insert("View", Message::new("Open", "开启").with_comment("state"));

        let report = base.merge(&other, DuplicatePolicy::LastWins);
        assert_eq!(report.added, 1);
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn resolve_duplicates_collapses_repeated_keys() {
        let mut catalog = sample();
        catalog.push_context(Context {
            name: "SizeDialog".into(),
            messages: vec![Message::new("Width: ", "宽: ")],
        });
        assert_eq!(catalog.stats().duplicates, 1);

        let dropped = catalog.resolve_duplicates(DuplicatePolicy::FirstWins);

        assert_eq!(dropped, 1);
        assert_eq!(catalog.contexts().len(), 2);
        assert_eq!(catalog.context("SizeDialog").unwrap().messages[0].translation, "宽度: ");
        assert_eq!(catalog.language.as_deref(), Some("zh_CN"));
    }

    #[test]
    fn stats_count_statuses() {
        let mut catalog = sample();
        catalog.insert(
            "View",
            Message::new("change flowing image", "").with_status(TranslationStatus::Unfinished),
        );
        catalog.insert(
            "View",
            Message::new("old entry", "旧").with_status(TranslationStatus::Vanished),
        );

        let stats = catalog.stats();
        assert_eq!(stats.contexts, 3);
        assert_eq!(stats.messages, 5);
        assert_eq!(stats.finished, 3);
        assert_eq!(stats.unfinished, 1);
        assert_eq!(stats.obsolete, 1);
        assert_eq!(stats.completion_percent(), 75.0);
    }

    #[test]
    fn same_content_ignores_locations() {
        let a = Message::new("move up", "上移").with_location("attribute.py", 1529);
        let b = Message::new("move up", "上移").with_location("attribute.py", 1575);
        assert!(a.same_content(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn translation_status_parses_type_attribute() {
        assert_eq!(TranslationStatus::from_type_attr(None), Ok(TranslationStatus::Finished));
        assert_eq!(
            TranslationStatus::from_type_attr(Some("unfinished")),
            Ok(TranslationStatus::Unfinished)
        );
        assert!(TranslationStatus::from_type_attr(Some("bogus")).is_err());
        assert_eq!(TranslationStatus::Vanished.type_attr(), Some("vanished"));
        assert!(!TranslationStatus::Obsolete.is_active());
    }

    #[test]
    fn duplicate_policy_parses_short_and_long_names() {
        assert_eq!("first".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::FirstWins));
        assert_eq!("last-wins".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::LastWins));
        assert!("middle".parse::<DuplicatePolicy>().is_err());
    }
}
