//! Family Templates - Placeholder Contracts
//!
//! A template declares each parameter as `name = 0;`. Substitution rewrites
//! those assignments by exact identifier, never by raw text search.

use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::family::Family;
use crate::params::ParameterRecord;

pub const TEMPLATE_EXTENSION: &str = "scad";

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\b(?P<name>[A-Za-z_][A-Za-z0-9_]*)[ \t]*=[ \t]*0[ \t]*;")
            .expect("regex for placeholder assignments")
    })
}

/// True when only blanks separate `start` from the previous statement
/// boundary (start of text, end of line, `;`, `{` or `}`).
fn at_statement_start(source: &str, start: usize) -> bool {
    matches!(
        source[..start].trim_end_matches(|c| c == ' ' || c == '\t').chars().last(),
        None | Some('\n' | '\r' | ';' | '{' | '}')
    )
}

fn placeholder_captures(source: &str) -> impl Iterator<Item = Captures<'_>> {
    placeholder_regex()
        .captures_iter(source)
        .filter(move |cap| at_statement_start(source, cap.get(0).map_or(0, |m| m.start())))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyTemplate {
    pub family: Family,
    pub source: String,
    /// Where the template was loaded from; `None` for built-ins.
    pub path: Option<PathBuf>,
}

impl FamilyTemplate {
    pub fn new(family: Family, source: impl Into<String>) -> Self {
        Self { family, source: source.into(), path: None }
    }

    /// Placeholder names in document order.
    pub fn placeholders(&self) -> Vec<String> {
        placeholder_captures(&self.source)
            .map(|cap| cap["name"].to_string())
            .collect()
    }

    /// Replace each placeholder whose name is a key in `values`.
    /// Placeholders without a value keep their zero.
    pub fn substitute(&self, values: &BTreeMap<String, String>) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut last = 0;
        for cap in placeholder_captures(&self.source) {
            let Some(whole) = cap.get(0) else { continue };
            let name = &cap["name"];
            out.push_str(&self.source[last..whole.start()]);
            match values.get(name) {
                Some(value) => out.push_str(&format!("{} = {};", name, value)),
                None => {
                    tracing::warn!(family = %self.family, placeholder = name, "placeholder left unfilled");
                    out.push_str(whole.as_str());
                }
            }
            last = whole.end();
        }
        out.push_str(&self.source[last..]);
        out
    }
}

/// Template values for a record. The load class is emitted as a string literal.
pub fn substitution_map(params: &ParameterRecord) -> BTreeMap<String, String> {
    params
        .named_values()
        .into_iter()
        .map(|(name, value)| match name {
            "load" => (name.to_string(), format!("\"{}\"", value)),
            _ => (name.to_string(), value),
        })
        .collect()
}

/// Template registry - one template per family
pub struct TemplateRegistry {
    templates: HashMap<Family, FamilyTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self { templates: HashMap::new() }
    }

    /// The templates shipped with the crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(FamilyTemplate::new(Family::Container, include_str!("../families/container.scad")));
        registry.register(FamilyTemplate::new(Family::Hook, include_str!("../families/hook.scad")));
        registry.register(FamilyTemplate::new(Family::Stand, include_str!("../families/stand.scad")));
        registry
    }

    /// Load `<family>.scad` files. Files named after no family are skipped.
    pub fn load_from_dir(dir: &Path) -> Result<Self, std::io::Error> {
        let mut registry = Self::new();
        if dir.exists() {
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                if path.extension().map_or(true, |e| e != TEMPLATE_EXTENSION) {
                    continue;
                }
                let family = match path.file_stem().and_then(|s| s.to_str()).map(str::parse::<Family>) {
                    Some(Ok(family)) => family,
                    _ => {
                        tracing::debug!(path = %path.display(), "skipping template with unknown family");
                        continue;
                    }
                };
                let source = fs::read_to_string(&path)?;
                registry.register(FamilyTemplate { family, source, path: Some(path) });
            }
        }
        Ok(registry)
    }

    pub fn get(&self, family: Family) -> Option<&FamilyTemplate> {
        self.templates.get(&family)
    }

    /// Templates in family order.
    pub fn list(&self) -> Vec<&FamilyTemplate> {
        Family::ALL.iter().filter_map(|f| self.templates.get(f)).collect()
    }

    pub fn register(&mut self, template: FamilyTemplate) {
        self.templates.insert(template.family, template);
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
