// SPDX-License-Identifier: MPL-2.0
//! `ts_catalog` loads Qt Linguist translation sources (`.ts`) into typed
//! catalogs and serves read-only lookups from them.
//!
//! Lookups never fail: a missing entry resolves to the untranslated source
//! string. Malformed files fail at load time with the offending file named.
//!
//! ```
//! use ts_catalog::catalog::{self, DuplicatePolicy};
//! use ts_catalog::Translator;
//!
//! let xml = r#"<TS version="2.0" language="zh_CN">
//! <context><name>SizeDialog</name>
//! <message><source>Width: </source><translation>宽度: </translation></message>
//! </context></TS>"#;
//! let catalog = catalog::read_str(xml, None).unwrap();
//! let translator = Translator::from_catalog(&catalog, DuplicatePolicy::LastWins);
//! assert_eq!(translator.translate("SizeDialog", "Width: "), "宽度: ");
//! assert_eq!(translator.translate("SizeDialog", "Nonexistent Key"), "Nonexistent Key");
//! ```

pub mod catalog;
pub mod config;
pub mod diff;
pub mod error;
pub mod export;
pub mod i18n;
pub mod lint;
pub mod paths;
pub mod translator;

pub use catalog::{Catalog, Context, DuplicatePolicy, Location, Message, TranslationStatus};
pub use error::{Error, Result};
pub use translator::Translator;
