// SPDX-License-Identifier: MPL-2.0
//! Runtime translation of UI strings from `.ts` catalogs.
//!
//! Catalogs bundled in `assets/i18n/` are embedded into the binary; more can
//! be picked up from the directories listed in [`Config::catalog_dirs`].
//! The file stem names the locale (`zh_CN.ts` is `zh-CN`).
//!
//! # Locale resolution
//!
//! 1. CLI argument
//! 2. `language` from the config file
//! 3. OS locale
//! 4. The source language, where every lookup returns its key

use crate::catalog::{self, Catalog};
use crate::config::defaults::{CATALOG_EXTENSION, DEFAULT_SOURCE_LOCALE};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::translator::Translator;
use rust_embed::RustEmbed;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use unic_langid::LanguageIdentifier;

#[derive(RustEmbed)]
#[folder = "assets/i18n/"]
struct Asset;

pub struct I18n {
    bundles: HashMap<LanguageIdentifier, Translator>,
    pub available_locales: Vec<LanguageIdentifier>,
    current_locale: LanguageIdentifier,
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(None, &Config::default())
    }
}

impl I18n {
    /// Loads bundled and configured catalogs. Broken catalogs are logged and
    /// skipped so the UI still comes up with whatever could be loaded.
    pub fn new(cli_lang: Option<String>, config: &Config) -> Self {
        let mut catalogs = bundled_catalogs();
        for dir in &config.catalog_dirs {
            match scan_catalog_dir(dir) {
                Ok(found) => merge_into(&mut catalogs, found, config),
                Err(err) => log::warn!("skipping catalog dir {}: {}", dir.display(), err),
            }
        }
        Self::from_catalogs(catalogs, cli_lang, config)
    }

    /// Like [`I18n::new`] but fails on the first unreadable or malformed
    /// user catalog.
    pub fn with_catalog_dirs(cli_lang: Option<String>, config: &Config) -> Result<Self> {
        let mut catalogs = bundled_catalogs();
        for dir in &config.catalog_dirs {
            let found = scan_catalog_dir(dir)?;
            merge_into(&mut catalogs, found, config);
        }
        Ok(Self::from_catalogs(catalogs, cli_lang, config))
    }

    fn from_catalogs(
        catalogs: HashMap<LanguageIdentifier, Catalog>,
        cli_lang: Option<String>,
        config: &Config,
    ) -> Self {
        let policy = config.duplicate_policy();
        let mut available_locales: Vec<LanguageIdentifier> = catalogs.keys().cloned().collect();
        available_locales.sort_by_key(ToString::to_string);

        let bundles = catalogs
            .into_iter()
            .map(|(locale, catalog)| (locale, Translator::from_catalog(&catalog, policy)))
            .collect();

        let current_locale = resolve_locale(cli_lang, config, &available_locales)
            .unwrap_or_else(source_locale);
        log::debug!("using locale {current_locale}");

        Self {
            bundles,
            available_locales,
            current_locale,
        }
    }

    pub fn set_locale(&mut self, locale: LanguageIdentifier) {
        if self.bundles.contains_key(&locale) || locale == source_locale() {
            self.current_locale = locale;
        }
    }

    pub fn current_locale(&self) -> &LanguageIdentifier {
        &self.current_locale
    }

    /// The lookup table for the current locale, if it has one.
    pub fn translator(&self) -> Option<&Translator> {
        self.bundles.get(&self.current_locale)
    }

    /// Translates `key` in `context`; a miss yields `key` itself.
    pub fn tr<'a>(&'a self, context: &str, key: &'a str) -> &'a str {
        match self.translator() {
            Some(translator) => translator.translate(context, key),
            None => key,
        }
    }

    pub fn tr_n<'a>(&'a self, context: &str, key: &'a str, n: u64) -> &'a str {
        match self.translator() {
            Some(translator) => translator.translate_plural(context, key, n),
            None => key,
        }
    }
}

fn source_locale() -> LanguageIdentifier {
    DEFAULT_SOURCE_LOCALE
        .parse()
        .unwrap_or_default()
}

/// Parses `zh_CN`, `zh-CN` or `zh_CN.UTF-8` into a language identifier.
pub fn parse_locale(raw: &str) -> Option<LanguageIdentifier> {
    let tag = raw.split(['.', '@']).next().unwrap_or_default();
    if tag.is_empty() {
        return None;
    }
    tag.replace('_', "-").parse().ok()
}

fn bundled_catalogs() -> HashMap<LanguageIdentifier, Catalog> {
    let mut catalogs = HashMap::new();
    for file in Asset::iter() {
        let filename = file.as_ref();
        let Some(stem) = filename.strip_suffix(".ts") else {
            continue;
        };
        let Some(locale) = parse_locale(stem) else {
            log::warn!("bundled catalog {filename} does not name a locale");
            continue;
        };
        let Some(content) = Asset::get(filename) else {
            continue;
        };
        let text = String::from_utf8_lossy(content.data.as_ref());
        match catalog::read_str(&text, Some(Path::new(filename))) {
            Ok(parsed) => {
                catalogs.insert(locale, parsed);
            }
            Err(err) => log::warn!("skipping bundled catalog: {err}"),
        }
    }
    catalogs
}

/// Reads every `.ts` file directly inside `dir`, keyed by locale.
pub fn scan_catalog_dir(dir: &Path) -> Result<Vec<(LanguageIdentifier, Catalog)>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_catalog = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(CATALOG_EXTENSION));
        if is_catalog {
            paths.push(path);
        }
    }
    paths.sort();

    let mut found = Vec::new();
    for path in paths {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let locale = parse_locale(stem)
            .ok_or_else(|| Error::Locale(format!("{} does not name a locale", path.display())))?;
        found.push((locale, catalog::read_file(&path)?));
    }
    Ok(found)
}

fn merge_into(
    catalogs: &mut HashMap<LanguageIdentifier, Catalog>,
    found: Vec<(LanguageIdentifier, Catalog)>,
    config: &Config,
) {
    for (locale, parsed) in found {
        catalogs
            .entry(locale)
            .or_default()
            .merge(&parsed, config.duplicate_policy());
    }
}

fn resolve_locale(
    cli_lang: Option<String>,
    config: &Config,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    // 1. Check CLI args
    if let Some(lang) = cli_lang.as_deref().and_then(|s| match_locale(s, available)) {
        return Some(lang);
    }

    // 2. Check config file
    if let Some(lang) = config
        .language
        .as_deref()
        .and_then(|s| match_locale(s, available))
    {
        return Some(lang);
    }

    // 3. Check OS locale
    if let Some(os_locale) = sys_locale::get_locale() {
        return match_locale(&os_locale, available);
    }

    None
}

/// Exact match first, then any available locale sharing the language.
fn match_locale(raw: &str, available: &[LanguageIdentifier]) -> Option<LanguageIdentifier> {
    let wanted = parse_locale(raw)?;
    if available.contains(&wanted) {
        return Some(wanted);
    }
    available
        .iter()
        .find(|candidate| candidate.language == wanted.language)
        .cloned()
}
