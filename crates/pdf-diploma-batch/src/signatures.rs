//! Signature index and the professor → signature resolution policy
//!
//! A roster's `profesor` column holds either a display name ("Oscar
//! Pimentel") or a signature file name ("oscar_pimentel.gif"). Values that
//! end in an image extension are looked up by file name, everything else by
//! name. The two lookups never fall back to each other.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

static IMAGE_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(gif|png|jpg|jpeg|webp)$").expect("image extension pattern is valid")
});

/// One registered signature image
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignatureEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "professorName")]
    pub professor_name: String,
    /// URL or path of the image; entries without one are ignored
    #[serde(default, rename = "url")]
    pub location: String,
}

/// Lookup maps built once per batch
#[derive(Debug, Clone, Default)]
pub struct SignatureIndex {
    by_name: HashMap<String, String>,
    by_file: HashMap<String, String>,
}

impl SignatureIndex {
    pub fn from_entries(entries: impl IntoIterator<Item = SignatureEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            index.insert(&entry);
        }
        index
    }

    /// Register an entry. Later entries win on key collisions.
    pub fn insert(&mut self, entry: &SignatureEntry) {
        let location = entry.location.trim();
        if location.is_empty() {
            return;
        }

        for name in [&entry.name, &entry.professor_name] {
            let key = normalize_key(name);
            if !key.is_empty() {
                self.by_name.insert(key, location.to_string());
            }
        }

        let file = basename(location);
        if !file.is_empty() {
            self.by_file
                .insert(normalize_filename(file), location.to_string());
        }
    }

    /// Signature location for a roster `profesor` value
    pub fn resolve(&self, profesor: &str) -> Option<&str> {
        let raw = profesor.trim();
        if raw.is_empty() {
            return None;
        }
        let found = if looks_like_image_filename(raw) {
            self.by_file.get(&normalize_filename(raw))
        } else {
            self.by_name.get(&normalize_key(raw))
        };
        found.map(String::as_str)
    }

    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty() && self.by_file.is_empty()
    }
}

/// Trim, lowercase and collapse internal whitespace runs to one space.
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`normalize_key`] with spaces turned into underscores
pub fn normalize_filename(value: &str) -> String {
    normalize_key(value).replace(' ', "_")
}

pub fn looks_like_image_filename(value: &str) -> bool {
    IMAGE_FILENAME.is_match(value.trim())
}

/// Last path segment of a URL or path, ignoring any query or fragment.
pub fn basename(location: &str) -> &str {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
