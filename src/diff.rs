// SPDX-License-Identifier: MPL-2.0
//! Semantic comparison of two catalogs.
//!
//! Entries are matched by context, source and disambiguation comment.
//! Provenance markers are not part of the comparison: an entry whose only
//! change is a shifted line number counts as moved, not changed.

use crate::catalog::{Catalog, Message, MessageKey};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedEntry {
    pub key: MessageKey,
    pub old: Message,
    pub new: Message,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogDiff {
    pub added: Vec<(MessageKey, Message)>,
    pub removed: Vec<(MessageKey, Message)>,
    pub changed: Vec<ChangedEntry>,
    /// Entries identical except for their `<location>` markers.
    pub moved_locations: usize,
}

impl CatalogDiff {
    /// True when the catalogs translate the same keys the same way.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Keyed view of a catalog. Duplicate keys keep their last occurrence,
/// which is what a lookup table built with `LastWins` would serve.
fn index(catalog: &Catalog) -> BTreeMap<MessageKey, &Message> {
    catalog
        .messages()
        .map(|(context, message)| (MessageKey::of(context, message), message))
        .collect()
}

pub fn diff(old: &Catalog, new: &Catalog) -> CatalogDiff {
    let old_index = index(old);
    let new_index = index(new);
    let mut result = CatalogDiff::default();

    for (key, old_message) in &old_index {
        match new_index.get(key) {
            None => result.removed.push((key.clone(), (*old_message).clone())),
            Some(new_message) if !old_message.same_content(new_message) => {
                result.changed.push(ChangedEntry {
                    key: key.clone(),
                    old: (*old_message).clone(),
                    new: (*new_message).clone(),
                });
            }
            Some(new_message) => {
                if old_message.locations != new_message.locations {
                    result.moved_locations += 1;
                }
            }
        }
    }

    for (key, new_message) in &new_index {
        if !old_index.contains_key(key) {
            result.added.push((key.clone(), (*new_message).clone()));
        }
    }

    result
}

impl fmt::Display for CatalogDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, message) in &self.removed {
            writeln!(f, "- {key}: {:?}", message.translation)?;
        }
        for (key, message) in &self.added {
            writeln!(f, "+ {key}: {:?}", message.translation)?;
        }
        for change in &self.changed {
            writeln!(
                f,
                "~ {}: {:?} ({:?}) -> {:?} ({:?})",
                change.key,
                change.old.translation,
                change.old.status,
                change.new.translation,
                change.new.status
            )?;
        }
        write!(
            f,
            "{} added, {} removed, {} changed, {} moved",
            self.added.len(),
            self.removed.len(),
            self.changed.len(),
            self.moved_locations
        )
    }
}
