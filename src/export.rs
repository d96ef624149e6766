// SPDX-License-Identifier: MPL-2.0
//! Conversions of a catalog into formats used outside Qt.
//!
//! - JSON: `{context: {source: translation}}` for scripts and web tooling.
//!   Disambiguated entries use gettext's `source\u{4}comment` key; numerus
//!   entries map to the array of their plural forms.
//! - Fluent: one message per entry, checked by parsing the output with
//!   `fluent-bundle` before it is returned.

use crate::catalog::{Catalog, Message};
use crate::config::defaults::{MAX_FLUENT_ID_LEN, MIN_FLUENT_SLUG_LEN};
use crate::error::{Error, Result};
use crate::translator::PluralRule;
use fluent_bundle::FluentResource;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

/// Separator between a source string and its disambiguation comment in JSON keys.
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// Output formats supported by the `export` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Ts,
    Json,
    Fluent,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ts" => Ok(Self::Ts),
            "json" => Ok(Self::Json),
            "ftl" | "fluent" => Ok(Self::Fluent),
            other => Err(format!("unknown format '{other}' (expected ts, json or ftl)")),
        }
    }
}

/// Renders `catalog` in the requested format.
pub fn render(catalog: &Catalog, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Ts => crate::catalog::write_string(catalog),
        ExportFormat::Json => to_json(catalog),
        ExportFormat::Fluent => to_fluent(catalog),
    }
}

fn exportable(message: &Message) -> bool {
    message.status.is_active() && message.is_translated()
}

pub fn to_json(catalog: &Catalog) -> Result<String> {
    let mut table: BTreeMap<&str, BTreeMap<String, Value>> = BTreeMap::new();
    for (context, message) in catalog.messages().filter(|(_, m)| exportable(m)) {
        let key = match &message.comment {
            Some(comment) => format!("{}{CONTEXT_SEPARATOR}{}", message.source, comment),
            None => message.source.clone(),
        };
        table
            .entry(context)
            .or_default()
            .insert(key, json_value(message));
    }
    Ok(serde_json::to_string_pretty(&table)?)
}

fn json_value(message: &Message) -> Value {
    if message.numerus && !message.numerus_forms.is_empty() {
        Value::from(message.numerus_forms.clone())
    } else {
        Value::from(message.translation.as_str())
    }
}

pub fn to_fluent(catalog: &Catalog) -> Result<String> {
    let rule = catalog
        .language
        .as_deref()
        .map_or(PluralRule::OneOther, PluralRule::for_language);
    let mut out = String::new();
    let mut used_ids = HashSet::new();
    let mut count = 0usize;

    for context in catalog.contexts() {
        let messages: Vec<&Message> = context.messages.iter().filter(|m| exportable(m)).collect();
        if messages.is_empty() {
            continue;
        }
        let _ = writeln!(out, "## {}\n", single_line(&context.name));

        for message in messages {
            let id = unique_id(&mut used_ids, &context.name, &message.source);
            let _ = writeln!(out, "# {}", single_line(&message.source));
            if let Some(comment) = &message.comment {
                let _ = writeln!(out, "# ({})", single_line(comment));
            }
            let value = if message.numerus && message.numerus_forms.len() > 1 {
                plural_select(&message.numerus_forms, rule)
            } else {
                fluent_pattern(&message.translation)
            };
            let _ = writeln!(out, "{id} = {value}\n");
            count += 1;
        }
    }

    if let Err((_, errors)) = FluentResource::try_new(out.clone()) {
        return Err(Error::Export(format!(
            "generated Fluent resource is invalid: {errors:?}"
        )));
    }
    log::debug!("exported {count} messages to Fluent");
    Ok(out)
}

/// Fluent ids are `[a-zA-Z][a-zA-Z0-9_-]*`; build one from the context and
/// source, suffixing `-2`, `-3`, ... on collision.
fn unique_id(used: &mut HashSet<String>, context: &str, source: &str) -> String {
    let mut prefix = slug(context);
    if prefix.is_empty() {
        prefix.push_str("ctx");
    } else if !prefix.starts_with(|c: char| c.is_ascii_alphabetic()) {
        prefix.insert_str(0, "ctx-");
    }
    let mut tail = slug(source);
    if tail.is_empty() {
        tail.push_str("msg");
    }

    let room = MAX_FLUENT_ID_LEN
        .saturating_sub(prefix.len() + 1)
        .max(MIN_FLUENT_SLUG_LEN);
    tail.truncate(room);
    let base = format!("{prefix}-{}", tail.trim_end_matches('-'));

    let mut id = base.clone();
    let mut n = 2;
    while !used.insert(id.clone()) {
        id = format!("{base}-{n}");
        n += 1;
    }
    id
}

fn slug(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

fn single_line(text: &str) -> String {
    text.replace('\r', "").replace('\n', "\\n")
}

/// Renders a text value as a Fluent pattern.
///
/// Plain single-line text is written inline with braces escaped. Anything
/// whose whitespace Fluent would trim or re-indent becomes a string literal.
fn fluent_pattern(text: &str) -> String {
    let plain = !text.is_empty()
        && !text.contains(['\n', '\r'])
        && text.trim() == text;
    if !plain {
        return string_literal(text);
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '{' => out.push_str("{\"{\"}"),
            '}' => out.push_str("{\"}\"}"),
            _ => out.push(c),
        }
    }
    out
}

fn string_literal(text: &str) -> String {
    let mut out = String::from("{\"");
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' | '\r' => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            _ => out.push(c),
        }
    }
    out.push_str("\"}");
    out
}

fn plural_select(forms: &[String], rule: PluralRule) -> String {
    let categories: &[&str] = match (rule, forms.len()) {
        (PluralRule::Slavic, n) if n >= 3 => &["one", "few", "other"],
        _ => &["one", "other"],
    };
    let mut out = String::from("\n    { $n ->\n");
    for (index, category) in categories.iter().enumerate() {
        let form = forms.get(index).or_else(|| forms.last()).map_or("", String::as_str);
        let marker = if index + 1 == categories.len() { "*" } else { " " };
        let _ = writeln!(
            out,
            "       {marker}[{category}] {}",
            fluent_pattern(form)
        );
    }
    out.push_str("    }");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TranslationStatus;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new().with_language("zh_CN");
        catalog.insert("SizeDialog", Message::new("Width: ", "宽度: "));
        catalog.insert("SizeDialog", Message::new("Are you sure to quit?", "你确定要关闭吗?"));
        catalog.insert("BaseWidget", Message::new("move up", "上移"));
        catalog.insert("BaseWidget", Message::new("move-up", "向上"));
        catalog.insert(
            "View",
            Message::new("change flowing image", "").with_status(TranslationStatus::Unfinished),
        );
        catalog
    }

    #[test]
    fn json_groups_by_context_and_skips_untranslated() {
        let json = to_json(&sample()).expect("renders");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["SizeDialog"]["Width: "], "宽度: ");
        assert_eq!(value["BaseWidget"]["move up"], "上移");
        assert!(value.get("View").is_none());
    }

    #[test]
    fn json_keeps_every_plural_form() {
        let mut catalog = Catalog::new().with_language("de");
        catalog.insert(
            "NoteWindow",
            Message::new("%n scene(s)", "")
                .with_numerus_forms(vec!["%n Szene".into(), "%n Szenen".into()]),
        );
        let json = to_json(&catalog).expect("renders");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(
            value["NoteWindow"]["%n scene(s)"],
            serde_json::json!(["%n Szene", "%n Szenen"])
        );
    }

    #[test]
    fn json_keys_disambiguated_entries() {
        let mut catalog = Catalog::new();
        catalog.insert("View", Message::new("Open", "开启").with_comment("state"));
        let json = to_json(&catalog).expect("renders");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["View"]["Open\u{4}state"], "开启");
    }

    #[test]
    fn fluent_ids_are_slugged_and_unique() {
        let ftl = to_fluent(&sample()).expect("renders");
        assert!(ftl.contains("basewidget-move-up = 上移"), "{ftl}");
        assert!(ftl.contains("basewidget-move-up-2 = 向上"), "{ftl}");
        assert!(ftl.contains("sizedialog-are-you-sure-to-quit = 你确定要关闭吗?"), "{ftl}");
    }

    #[test]
    fn fluent_keeps_trailing_whitespace_with_literal() {
        let ftl = to_fluent(&sample()).expect("renders");
        assert!(ftl.contains("sizedialog-width = {\"宽度: \"}"), "{ftl}");

        let resource = FluentResource::try_new(ftl).expect("valid ftl");
        let mut bundle = fluent_bundle::FluentBundle::new(vec!["zh-CN".parse().unwrap()]);
        bundle.set_use_isolating(false);
        bundle.add_resource(resource).expect("adds");
        let message = bundle.get_message("sizedialog-width").expect("present");
        let mut errors = vec![];
        let value = bundle.format_pattern(message.value().expect("has value"), None, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(value, "宽度: ");
    }

    #[test]
    fn fluent_escapes_braces() {
        let mut catalog = Catalog::new();
        catalog.insert("View", Message::new("Use {name}", "使用 {name}"));
        let ftl = to_fluent(&catalog).expect("renders");
        assert!(ftl.contains("view-use-name = 使用 {\"{\"}name{\"}\"}"), "{ftl}");
    }

    #[test]
    fn fluent_plural_uses_select_expression() {
        let mut catalog = Catalog::new().with_language("de");
        catalog.insert(
            "NoteWindow",
            Message::new("%n scene(s)", "")
                .with_numerus_forms(vec!["%n Szene".into(), "%n Szenen".into()]),
        );
        let ftl = to_fluent(&catalog).expect("renders");
        assert!(ftl.contains("[one] %n Szene"), "{ftl}");
        assert!(ftl.contains("*[other] %n Szenen"), "{ftl}");
    }

    #[test]
    fn non_ascii_source_gets_placeholder_slug() {
        let mut used = HashSet::new();
        assert_eq!(unique_id(&mut used, "View", "场景"), "view-msg");
        assert_eq!(unique_id(&mut used, "3D", "move up"), "ctx-3d-move-up");
    }

    #[test]
    fn export_format_parses_names() {
        assert_eq!("ftl".parse::<ExportFormat>(), Ok(ExportFormat::Fluent));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
