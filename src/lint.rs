// SPDX-License-Identifier: MPL-2.0
//! Consistency checks for translation catalogs.

use crate::catalog::{Catalog, Message, MessageKey};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    EmptySource,
    /// Same key, different translations: which one shows depends on load policy.
    ConflictingDuplicate,
    RedundantDuplicate,
    Untranslated,
    /// The source has leading or trailing whitespace the translation lacks.
    WhitespaceMismatch,
    MissingLocation,
}

impl Rule {
    pub fn severity(self) -> Severity {
        match self {
            Rule::EmptySource | Rule::ConflictingDuplicate => Severity::Error,
            Rule::RedundantDuplicate
            | Rule::Untranslated
            | Rule::WhitespaceMismatch
            | Rule::MissingLocation => Severity::Warning,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Rule::EmptySource => "empty-source",
            Rule::ConflictingDuplicate => "conflicting-duplicate",
            Rule::RedundantDuplicate => "redundant-duplicate",
            Rule::Untranslated => "untranslated",
            Rule::WhitespaceMismatch => "whitespace-mismatch",
            Rule::MissingLocation => "missing-location",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: Rule,
    pub key: MessageKey,
    pub detail: String,
}

impl Finding {
    pub fn severity(&self) -> Severity {
        self.rule.severity()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}: {}",
            self.severity(),
            self.rule.code(),
            self.key,
            self.detail
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LintOptions {
    pub missing_location: bool,
}

/// Runs all checks over active messages; obsolete entries are ignored.
pub fn lint(catalog: &Catalog, options: LintOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut first_seen: HashMap<MessageKey, &Message> = HashMap::new();

    for (context, message) in catalog.messages() {
        if !message.status.is_active() {
            continue;
        }
        let key = MessageKey::of(context, message);
        let mut report = |rule: Rule, detail: String| {
            findings.push(Finding {
                rule,
                key: key.clone(),
                detail,
            });
        };

        if message.source.is_empty() {
            report(Rule::EmptySource, "source string is empty".into());
        }

        if !message.is_translated() {
            report(Rule::Untranslated, "no translation".into());
        } else if let Some(detail) = whitespace_mismatch(&message.source, &message.translation) {
            report(Rule::WhitespaceMismatch, detail);
        }

        if options.missing_location && message.locations.is_empty() {
            report(Rule::MissingLocation, "no <location> marker".into());
        }

        match first_seen.get(&key) {
            Some(previous) if previous.translation != message.translation => report(
                Rule::ConflictingDuplicate,
                format!(
                    "translated both as {:?} and {:?}",
                    previous.translation, message.translation
                ),
            ),
            Some(_) => report(Rule::RedundantDuplicate, "repeated with the same translation".into()),
            None => {
                first_seen.insert(key, message);
            }
        }
    }

    findings
}

fn whitespace_mismatch(source: &str, translation: &str) -> Option<String> {
    let leading = |s: &str| s.len() - s.trim_start().len() > 0;
    let trailing = |s: &str| s.len() - s.trim_end().len() > 0;

    if trailing(source) && !trailing(translation) {
        return Some(format!("source ends with whitespace, translation {translation:?} does not"));
    }
    if leading(source) && !leading(translation) {
        return Some(format!("source starts with whitespace, translation {translation:?} does not"));
    }
    None
}

/// True when any finding is an error.
pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity() == Severity::Error)
}
