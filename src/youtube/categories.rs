/// Video category id → name table
use crate::error::{Result, SeoError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Standard YouTube categories
const BUILTIN_CATEGORIES: &[(&str, &str)] = &[
    ("1", "Film & Animation"),
    ("2", "Autos & Vehicles"),
    ("10", "Music"),
    ("15", "Pets & Animals"),
    ("17", "Sports"),
    ("18", "Short Movies"),
    ("19", "Travel & Events"),
    ("20", "Gaming"),
    ("21", "Videoblogging"),
    ("22", "People & Blogs"),
    ("23", "Comedy"),
    ("24", "Entertainment"),
    ("25", "News & Politics"),
    ("26", "Howto & Style"),
    ("27", "Education"),
    ("28", "Science & Technology"),
    ("29", "Nonprofits & Activism"),
    ("30", "Movies"),
    ("31", "Anime/Animation"),
    ("32", "Action/Adventure"),
    ("33", "Classics"),
    ("34", "Comedy"),
    ("35", "Documentary"),
    ("36", "Drama"),
    ("37", "Family"),
    ("38", "Foreign"),
    ("39", "Horror"),
    ("40", "Sci-Fi/Fantasy"),
    ("41", "Thriller"),
    ("42", "Shorts"),
    ("43", "Shows"),
    ("44", "Trailers"),
];

#[derive(Debug, Deserialize)]
struct CategoryFile {
    #[serde(default)]
    categories: Vec<CategoryRecord>,
}

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    id: Value,
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    names: HashMap<String, String>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryTable {
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_CATEGORIES
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        }
    }

    /// Load a `{"categories": [{"id": .., "name": ..}]}` file; ids may be numbers or strings
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_json(&content)?;
        info!("📂 Loaded {} categories from {}", table.len(), path.display());
        Ok(table)
    }

    /// Table from an optional categories file; a file that cannot be loaded
    /// is reported and the built-in table is used instead
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::from_file(path).unwrap_or_else(|e| {
                warn!("⚠️ Could not load categories from {}: {}", path.display(), e);
                Self::builtin()
            }),
            None => Self::builtin(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: CategoryFile = serde_json::from_str(content)?;

        let mut names = HashMap::new();
        for record in file.categories {
            let id = match record.id {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(SeoError::Configuration(format!(
                        "invalid category id: {}",
                        other
                    )))
                }
            };
            names.insert(id, record.name);
        }

        Ok(Self { names })
    }

    /// Category name, or `Unknown`
    pub fn resolve(&self, category_id: &str) -> &str {
        self.names
            .get(category_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_table_resolves_common_ids() {
        let table = CategoryTable::builtin();
        assert_eq!(table.resolve("27"), "Education");
        assert_eq!(table.resolve("10"), "Music");
    }

    #[test]
    fn unknown_ids_fall_back() {
        let table = CategoryTable::builtin();
        assert_eq!(table.resolve("999"), UNKNOWN_CATEGORY);
        assert_eq!(table.resolve("N/A"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn loads_numeric_and_string_ids_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"categories": [{{"id": 22, "name": "People"}}, {{"id": "28", "name": "Tech"}}]}}"#
        )
        .unwrap();

        let table = CategoryTable::from_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve("22"), "People");
        assert_eq!(table.resolve("28"), "Tech");
        assert_eq!(table.resolve("27"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(CategoryTable::from_json("not json").is_err());
        assert!(CategoryTable::from_json(r#"{"categories": [{"id": null, "name": "x"}]}"#).is_err());
        assert!(CategoryTable::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn unreadable_file_falls_back_to_builtin() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let table = CategoryTable::load_or_builtin(Some(file.path()));
        assert_eq!(table, CategoryTable::builtin());
        assert_eq!(table.resolve("27"), "Education");

        let missing = CategoryTable::load_or_builtin(Some(Path::new("/nonexistent/categories.json")));
        assert_eq!(missing.len(), CategoryTable::builtin().len());
        assert_eq!(CategoryTable::load_or_builtin(None), CategoryTable::builtin());
    }
}
