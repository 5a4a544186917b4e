//! Plugin manifest header
//!
//! Single-file plugins open with a docstring of `key: value` lines that the
//! host application reads when the plugin is installed:
//!
//! ```text
//! """
//! title: Advanced Prompt Injector
//! id: system_prompt_injector
//! version: 0.6.0
//! """
//! ```

use std::collections::BTreeMap;

const QUOTES: [&str; 2] = ["\"\"\"", "'''"];

/// Fields declared in a plugin's leading docstring
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PluginManifest {
    fields: BTreeMap<String, String>,
}

impl PluginManifest {
    /// Read the manifest from the top of a plugin source file
    ///
    /// Returns `None` when the file does not start with a docstring or the
    /// docstring declares no fields. Leading blank lines and `#` comments
    /// (shebang, encoding) are skipped.
    pub fn parse(source: &str) -> Option<Self> {
        let mut lines = source
            .lines()
            .skip_while(|line| line.trim().is_empty() || line.trim_start().starts_with('#'));

        let first = lines.next()?.trim();
        let quote: &str = QUOTES.iter().copied().find(|q| first.starts_with(*q))?;
        let opening = &first[quote.len()..];

        let mut fields = BTreeMap::new();

        // One-line docstring: """id: foo"""
        if let Some(inner) = opening.strip_suffix(quote) {
            insert_field(&mut fields, inner);
        } else {
            insert_field(&mut fields, opening);
            for line in lines {
                match line.find(quote) {
                    Some(end) => {
                        insert_field(&mut fields, &line[..end]);
                        break;
                    }
                    None => insert_field(&mut fields, line),
                }
            }
        }

        if fields.is_empty() {
            None
        } else {
            Some(PluginManifest { fields })
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("version")
    }
}

fn insert_field(fields: &mut BTreeMap<String, String>, line: &str) {
    let Some((key, value)) = line.split_once(':') else {
        return;
    };

    let key = key.trim();
    let value = value.trim();
    let is_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    // First declaration wins
    if is_key && !value.is_empty() {
        fields
            .entry(key.to_ascii_lowercase())
            .or_insert_with(|| value.to_string());
    }
}
