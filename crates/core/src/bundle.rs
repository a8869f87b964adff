use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{
    strategies::ResolutionStrategy,
    types::TranslationEntry,
    workflow::ResolveSink,
};

#[derive(Debug, Clone)]
struct Leaf {
    key: String,
    path: Vec<String>,
    text: String,
}

/// A JSON translation file. Nested objects are addressed with dotted keys.
#[derive(Debug, Clone)]
pub struct TranslationBundle {
    root: Value,
    leaves: Vec<Leaf>,
    index: HashMap<String, usize>,
}

impl TranslationBundle {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let root: Value = serde_json::from_str(s).context("parse json")?;
        if !root.is_object() {
            anyhow::bail!("translation bundle must be a JSON object at the top level");
        }

        let mut leaves = Vec::new();
        flatten(&root, "", &mut Vec::new(), &mut leaves);

        let mut index = HashMap::with_capacity(leaves.len());
        for (i, leaf) in leaves.iter().enumerate() {
            if index.insert(leaf.key.clone(), i).is_some() {
                warn!(key = %leaf.key, "duplicate translation key, last one wins");
            }
        }

        Ok(Self {
            root,
            leaves,
            index,
        })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json_str(&contents).with_context(|| format!("parse {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.leaves[i].text.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.leaves
            .iter()
            .map(|l| (l.key.as_str(), l.text.as_str()))
    }

    /// Replaces the text of an existing key. Returns false when the key is unknown.
    pub fn set(&mut self, key: &str, text: &str) -> bool {
        let Some(&i) = self.index.get(key) else {
            return false;
        };

        let mut node = &mut self.root;
        for segment in &self.leaves[i].path {
            node = match node.get_mut(segment.as_str()) {
                Some(n) => n,
                None => return false,
            };
        }
        *node = Value::String(text.to_string());
        self.leaves[i].text = text.to_string();
        true
    }

    pub fn to_json_string(&self) -> anyhow::Result<String> {
        let mut s = serde_json::to_string_pretty(&self.root).context("serialize bundle json")?;
        s.push('\n');
        Ok(s)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
    }
}

fn flatten(value: &Value, prefix: &str, path: &mut Vec<String>, out: &mut Vec<Leaf>) {
    let Value::Object(map) = value else {
        return;
    };
    for (k, v) in map {
        let key = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        path.push(k.clone());
        match v {
            Value::String(text) => out.push(Leaf {
                key,
                path: path.clone(),
                text: text.clone(),
            }),
            Value::Object(_) => flatten(v, &key, path, out),
            _ => warn!(%key, "skipping non-string translation value"),
        }
        path.pop();
    }
}

impl ResolveSink for TranslationBundle {
    fn resolve(&mut self, key: &str, locale: &str, new_text: &str, strategy: ResolutionStrategy) {
        if !self.set(key, new_text) {
            warn!(key, locale, %strategy, "resolved key is not in the bundle");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPrefix {
    pub prefix: String,
    pub context: String,
}

/// Longest matching prefix wins.
pub fn context_for<'a>(key: &str, prefixes: &'a [ContextPrefix]) -> Option<&'a str> {
    prefixes
        .iter()
        .filter(|p| key.starts_with(&p.prefix))
        .max_by_key(|p| p.prefix.len())
        .map(|p| p.context.as_str())
}

#[derive(Debug, Clone, Default)]
pub struct PairedEntries {
    pub entries: Vec<TranslationEntry>,
    pub missing_keys: Vec<String>,
}

pub fn pair_entries(
    source: &TranslationBundle,
    target: &TranslationBundle,
    prefixes: &[ContextPrefix],
    max_lengths: &BTreeMap<String, usize>,
) -> PairedEntries {
    let mut paired = PairedEntries::default();

    for (key, source_text) in source.entries() {
        let Some(translated) = target.get(key) else {
            paired.missing_keys.push(key.to_string());
            continue;
        };
        paired.entries.push(TranslationEntry {
            key: key.to_string(),
            source: source_text.to_string(),
            translated: translated.to_string(),
            context: context_for(key, prefixes).map(str::to_string),
            max_length: max_lengths.get(key).copied(),
        });
    }

    paired
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"{
        "buttons": { "save": "Guardar", "cancel": "Cancelar" },
        "title": "Ofertas",
        "count": 3
    }"#;

    #[test]
    fn flattens_nested_objects_in_file_order() {
        let b = TranslationBundle::from_json_str(NESTED).unwrap();
        let keys: Vec<_> = b.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["buttons.save", "buttons.cancel", "title"]);
        assert_eq!(b.get("buttons.cancel"), Some("Cancelar"));
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn set_updates_nested_leaf() {
        let mut b = TranslationBundle::from_json_str(NESTED).unwrap();
        assert!(b.set("buttons.save", "Guardar ya"));
        assert_eq!(b.get("buttons.save"), Some("Guardar ya"));

        let reparsed = TranslationBundle::from_json_str(&b.to_json_string().unwrap()).unwrap();
        assert_eq!(reparsed.get("buttons.save"), Some("Guardar ya"));
        assert_eq!(reparsed.get("title"), Some("Ofertas"));
    }

    #[test]
    fn set_unknown_key_is_rejected() {
        let mut b = TranslationBundle::from_json_str(NESTED).unwrap();
        assert!(!b.set("buttons.delete", "Borrar"));
    }

    #[test]
    fn dotted_flat_keys_are_supported() {
        let mut b = TranslationBundle::from_json_str(r#"{"nav.home": "Inicio"}"#).unwrap();
        assert_eq!(b.get("nav.home"), Some("Inicio"));
        assert!(b.set("nav.home", "Casa"));
        assert!(b.to_json_string().unwrap().contains(r#""nav.home": "Casa""#));
    }

    #[test]
    fn top_level_must_be_object() {
        assert!(TranslationBundle::from_json_str(r#"["a"]"#).is_err());
    }

    #[test]
    fn longest_prefix_wins() {
        let prefixes = vec![
            ContextPrefix {
                prefix: "nav.".to_string(),
                context: "menu_item".to_string(),
            },
            ContextPrefix {
                prefix: "nav.cta.".to_string(),
                context: "button".to_string(),
            },
        ];
        assert_eq!(context_for("nav.cta.go", &prefixes), Some("button"));
        assert_eq!(context_for("nav.home", &prefixes), Some("menu_item"));
        assert_eq!(context_for("title", &prefixes), None);
    }

    #[test]
    fn pairing_reports_missing_keys() {
        let source =
            TranslationBundle::from_json_str(r#"{"a": "Save", "b": "Cancel", "c": "Close"}"#)
                .unwrap();
        let target = TranslationBundle::from_json_str(r#"{"c": "Cerrar", "a": "Guardar"}"#).unwrap();
        let mut max = BTreeMap::new();
        max.insert("a".to_string(), 6);

        let paired = pair_entries(&source, &target, &[], &max);
        let keys: Vec<_> = paired.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(paired.entries[0].max_length, Some(6));
        assert_eq!(paired.missing_keys, vec!["b"]);
    }
}
