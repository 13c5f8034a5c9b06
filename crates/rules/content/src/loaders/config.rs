//! Handler schema loader.

use std::path::Path;

use rules_core::{Config, ConfigSpec};
use serde::de::DeserializeOwned;

use crate::loaders::{LoadResult, read_file};
use crate::standard::StandardSchemas;

/// Loader for handler schemas from RON or TOML files.
///
/// The format is picked from the file extension (`.ron` or `.toml`).
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load an authored schema.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a RON/TOML file containing one `ConfigSpec<X>`
    pub fn load_spec<X>(path: &Path) -> LoadResult<ConfigSpec<X>>
    where
        X: DeserializeOwned + Default,
    {
        let content = read_file(path)?;
        parse(path, &content)
    }

    /// Load and normalize a schema.
    pub fn load<X>(path: &Path) -> LoadResult<Config<X>>
    where
        X: DeserializeOwned + Default,
    {
        let spec = Self::load_spec(path)?;
        Ok(Config::build(spec))
    }

    /// Load the schema set for [`standard_registry`](crate::standard_registry).
    ///
    /// Example (TOML):
    /// ```toml
    /// [[flat_bonuses]]
    /// top_level_path = "item.damage"
    /// optional_attributes = ["bonus"]
    /// extension = { bonus_attribute = "bonus" }
    ///
    /// [[multipliers]]
    /// top_level_path = "actor.speed"
    /// ```
    pub fn load_schemas(path: &Path) -> LoadResult<StandardSchemas> {
        let content = read_file(path)?;
        let schemas: StandardSchemas = parse(path, &content)?;
        tracing::debug!(
            target: "rules::content",
            path = %path.display(),
            flat_bonuses = schemas.flat_bonuses.len(),
            multipliers = schemas.multipliers.len(),
            "loaded handler schemas"
        );
        Ok(schemas)
    }
}

fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> LoadResult<T> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("ron") => ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse schema RON at {}: {}", path.display(), e)),
        Some("toml") => toml::from_str(content).map_err(|e| {
            anyhow::anyhow!("Failed to parse schema TOML at {}: {}", path.display(), e)
        }),
        _ => Err(anyhow::anyhow!(
            "Unsupported schema format at {} (expected .ron or .toml)",
            path.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::handlers::FlatBonusOptions;

    #[test]
    fn loads_ron_schema_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("damage.ron");
        fs::write(
            &path,
            r#"(
                top_level_path: "Item.Damage",
                optional_attributes: ["bonus"],
                extension: (bonus_attribute: Some("bonus")),
                sub_segments: {
                    "Fire": (required_attributes: ["die"]),
                },
            )"#,
        )
        .unwrap();

        let config: Config<FlatBonusOptions> = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.top_level_path(), "item.damage");
        assert_eq!(
            config.root().extension().bonus_attribute.as_deref(),
            Some("bonus")
        );
        let fire = config.resolve("item.damage.fire").unwrap();
        assert!(fire.is_required("die"));
        assert_eq!(*fire.extension(), FlatBonusOptions::default());
    }

    #[test]
    fn loads_toml_schema_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speed.toml");
        fs::write(
            &path,
            r#"
top_level_path = "actor.speed"

[sub_segments.climb]
optional_attributes = ["source"]
"#,
        )
        .unwrap();

        let config: Config = ConfigLoader::load(&path).unwrap();
        assert!(config.root().required_attributes().is_empty());
        assert!(config.resolve("actor.speed.climb").unwrap().permits("source"));
    }

    #[test]
    fn rejects_unknown_extension_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, "{}").unwrap();
        let err = ConfigLoader::load_spec::<()>(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported schema format"));

        let missing = dir.path().join("missing.ron");
        let err = ConfigLoader::load_spec::<()>(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn malformed_content_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        fs::write(&path, "(top_level_path: 3)").unwrap();
        let err = ConfigLoader::load_spec::<()>(&path).unwrap_err();
        assert!(err.to_string().contains("broken.ron"));
    }
}
