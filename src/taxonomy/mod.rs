//! Document taxonomy: the closed set of categories, where each one lives on
//! disk, and how the classifier sees it.
//!
//! This module provides:
//! - `table`: the static category table and folder-name overrides
//! - `prompt`: rendering of the table into classifier instructions
//! - [`Classification`] parsing and destination resolution

mod prompt;
mod table;

pub use prompt::describe_for_prompt;
pub use table::{SubfolderRule, TaxonomyEntry, CATCH_ALL_FOLDER, ENTRIES, SUBFOLDER_OVERRIDES};

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A category (and optional subcategory) assigned to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub subcategory: Option<String>,
}

impl Classification {
    pub fn new(category: impl Into<String>, subcategory: Option<String>) -> Self {
        Self {
            category: category.into(),
            subcategory,
        }
    }

    /// Parse an assistant response such as `Medical/Oliver`,
    /// `Financial/Bills/Electric` or `Misc`.
    ///
    /// Surrounding whitespace and quote characters are stripped and only the
    /// first line is used. The category is the longest run of leading
    /// segments that names a known category; the remaining segments, joined
    /// with `/`, are the subcategory. With no known prefix, the first segment
    /// is the category and the rest the subcategory.
    pub fn parse(response: &str) -> Option<Self> {
        let cleaned = strip_quotes(response.lines().map(str::trim).find(|l| !l.is_empty())?);
        if cleaned.is_empty() {
            return None;
        }

        let parts: Vec<&str> = cleaned.split('/').map(str::trim).collect();
        let taxonomy = Taxonomy::global();

        for prefix_len in (1..=parts.len()).rev() {
            let candidate = parts[..prefix_len].join("/");
            if let Some(entry) = taxonomy.lookup(&candidate) {
                let rest = &parts[prefix_len..];
                let subcategory = (!rest.is_empty()).then(|| rest.join("/"));
                return Some(Self::new(entry.key, subcategory));
            }
        }

        let subcategory = (parts.len() > 1).then(|| parts[1..].join("/"));
        Some(Self::new(parts[0], subcategory))
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subcategory {
            Some(sub) => write!(f, "{}/{}", self.category, sub),
            None => write!(f, "{}", self.category),
        }
    }
}

/// Strip surrounding whitespace and quote characters
pub fn strip_quotes(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’'))
        .trim()
}

/// The static taxonomy with case-insensitive lookup
pub struct Taxonomy {
    by_key: HashMap<String, &'static TaxonomyEntry>,
}

static TAXONOMY: Lazy<Taxonomy> = Lazy::new(|| Taxonomy::from_entries(ENTRIES));

impl Taxonomy {
    fn from_entries(entries: &'static [TaxonomyEntry]) -> Self {
        let by_key = entries
            .iter()
            .map(|entry| (entry.key.to_lowercase(), entry))
            .collect();
        Self { by_key }
    }

    /// The process-wide taxonomy
    pub fn global() -> &'static Taxonomy {
        &TAXONOMY
    }

    /// Find an entry by category key, ignoring case
    pub fn lookup(&self, category: &str) -> Option<&'static TaxonomyEntry> {
        self.by_key.get(&category.trim().to_lowercase()).copied()
    }

    /// Destination folder for a classification under `base`.
    ///
    /// Unknown categories go to the catch-all folder. Subcategories are
    /// canonicalised against the entry's closed set when one exists and
    /// remapped through [`SUBFOLDER_OVERRIDES`].
    pub fn resolve_destination(&self, base: &Path, classification: &Classification) -> PathBuf {
        let Some(entry) = self.lookup(&classification.category) else {
            tracing::warn!(
                "[Taxonomy] Unknown category '{}', treating as unclassified",
                classification.category
            );
            return base.join(CATCH_ALL_FOLDER);
        };

        let mut path = entry.folder.iter().fold(base.to_path_buf(), |p, seg| p.join(seg));

        let Some(sub) = classification.subcategory.as_deref() else {
            return path;
        };

        match entry.subfolders {
            SubfolderRule::None => {
                tracing::debug!("[Taxonomy] {} takes no subfolder, ignoring '{}'", entry.key, sub);
            }
            SubfolderRule::Append => match subfolder_segments(entry, sub) {
                Some(segments) => {
                    for segment in segments {
                        path.push(segment);
                    }
                }
                None => {
                    tracing::warn!("[Taxonomy] Rejected subcategory '{}' for {}", sub, entry.key);
                }
            },
        }

        path
    }
}

/// Folder segments for a subcategory, or `None` if it would escape the
/// category folder.
fn subfolder_segments(entry: &TaxonomyEntry, sub: &str) -> Option<Vec<String>> {
    let canonical = entry.canonical_subcategory(sub);
    if canonical.is_none() && entry.subcategories.is_some() {
        tracing::warn!(
            "[Taxonomy] '{}' is not a known subcategory of {}, using it as-is",
            sub,
            entry.key
        );
    }
    let label = canonical.unwrap_or(sub);

    if let Some(folder) = table::override_for(entry.key, label) {
        return Some(vec![folder.to_string()]);
    }

    let segments: Vec<String> = label.split('/').map(|s| s.trim().to_string()).collect();
    let escapes = segments
        .iter()
        .any(|s| s.is_empty() || s == "." || s == ".." || s.contains('\\'));
    (!escapes).then_some(segments)
}
