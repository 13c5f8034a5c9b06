//! Engine constants and handler schemas.
//!
//! A handler validates descriptors against a [`Config`]: a top-level path plus
//! a tree of [`ConfigSegment`]s listing required and optional attributes.
//! Configs are authored as [`ConfigSpec`] values (in code or, with the `serde`
//! feature, in data files) and normalized once by [`Config::build`]. After that
//! the tree is read-only.
//!
//! Every segment carries an extension payload `X` for handler-specific data
//! (a combination operator, a default die, ...). The engine never looks at it.

use std::collections::BTreeMap;

/// Engine-wide constants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RulesConfig;

impl RulesConfig {
    /// Reserved attribute holding a modifier's display name.
    pub const NAME_ATTRIBUTE: &'static str = "name";
    /// Reserved attribute holding a modifier's stacking type.
    pub const TYPE_ATTRIBUTE: &'static str = "type";
    /// Attributes every segment accepts without listing them.
    pub const RESERVED_ATTRIBUTES: [&'static str; 2] = [Self::NAME_ATTRIBUTE, Self::TYPE_ATTRIBUTE];
    /// Separator between path segments.
    pub const PATH_SEPARATOR: char = '.';
    /// Most dice a single dice term may roll (`1000d6`).
    pub const MAX_DICE_PER_TERM: u32 = 1_000;
    /// Most faces a single die may have (`1d10000`).
    pub const MAX_DIE_FACES: u32 = 10_000;

    pub fn is_reserved_attribute(name: &str) -> bool {
        Self::RESERVED_ATTRIBUTES.contains(&name)
    }

    /// Lower-cases `path` and splits it into segments.
    pub fn split_path(path: &str) -> Vec<String> {
        path.to_lowercase()
            .split(Self::PATH_SEPARATOR)
            .map(str::to_owned)
            .collect()
    }
}

// ============================================================================
// Authoring types
// ============================================================================

/// Authored description of one segment. Missing lists default to empty.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "X: serde::Serialize",
        deserialize = "X: serde::Deserialize<'de> + Default"
    ))
)]
pub struct SegmentSpec<X = ()> {
    pub required_attributes: Vec<String>,
    pub optional_attributes: Vec<String>,
    pub sub_segments: BTreeMap<String, SegmentSpec<X>>,
    pub extension: X,
}

impl<X: Default> SegmentSpec<X> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<X> SegmentSpec<X> {
    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_attributes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn optional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_attributes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn sub_segment(mut self, name: impl Into<String>, segment: SegmentSpec<X>) -> Self {
        self.sub_segments.insert(name.into(), segment);
        self
    }

    pub fn with_extension(mut self, extension: X) -> Self {
        self.extension = extension;
        self
    }
}

/// Authored handler schema: the root segment plus its top-level path.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "X: serde::Serialize",
        deserialize = "X: serde::Deserialize<'de> + Default"
    ))
)]
pub struct ConfigSpec<X = ()> {
    pub top_level_path: String,
    pub required_attributes: Vec<String>,
    pub optional_attributes: Vec<String>,
    pub sub_segments: BTreeMap<String, SegmentSpec<X>>,
    pub extension: X,
}

impl<X: Default> ConfigSpec<X> {
    pub fn new(top_level_path: impl Into<String>) -> Self {
        Self {
            top_level_path: top_level_path.into(),
            ..Self::default()
        }
    }
}

impl<X> ConfigSpec<X> {
    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_attributes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn optional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_attributes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn sub_segment(mut self, name: impl Into<String>, segment: SegmentSpec<X>) -> Self {
        self.sub_segments.insert(name.into(), segment);
        self
    }

    pub fn with_extension(mut self, extension: X) -> Self {
        self.extension = extension;
        self
    }

    fn into_parts(self) -> (String, SegmentSpec<X>) {
        let root = SegmentSpec {
            required_attributes: self.required_attributes,
            optional_attributes: self.optional_attributes,
            sub_segments: self.sub_segments,
            extension: self.extension,
        };
        (self.top_level_path, root)
    }
}

// ============================================================================
// Built schema
// ============================================================================

/// Normalized, read-only segment.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigSegment<X = ()> {
    required_attributes: Vec<String>,
    optional_attributes: Vec<String>,
    /// Keys are lower-cased.
    sub_segments: BTreeMap<String, ConfigSegment<X>>,
    extension: X,
}

impl<X> ConfigSegment<X> {
    fn build(spec: SegmentSpec<X>) -> Self {
        Self {
            required_attributes: spec.required_attributes,
            optional_attributes: spec.optional_attributes,
            sub_segments: spec
                .sub_segments
                .into_iter()
                .map(|(name, segment)| (name.to_lowercase(), Self::build(segment)))
                .collect(),
            extension: spec.extension,
        }
    }

    pub fn required_attributes(&self) -> &[String] {
        &self.required_attributes
    }

    pub fn optional_attributes(&self) -> &[String] {
        &self.optional_attributes
    }

    pub fn sub_segments(&self) -> &BTreeMap<String, ConfigSegment<X>> {
        &self.sub_segments
    }

    /// Case-insensitive child lookup.
    pub fn sub_segment(&self, name: &str) -> Option<&ConfigSegment<X>> {
        self.sub_segments.get(&name.to_lowercase())
    }

    pub fn extension(&self) -> &X {
        &self.extension
    }

    pub fn is_required(&self, attribute: &str) -> bool {
        self.required_attributes.iter().any(|a| a == attribute)
    }

    /// Whether `attribute` may appear on a descriptor for this segment.
    pub fn permits(&self, attribute: &str) -> bool {
        self.is_required(attribute)
            || self.optional_attributes.iter().any(|a| a == attribute)
            || RulesConfig::is_reserved_attribute(attribute)
    }
}

/// Normalized handler schema.
#[derive(Clone, Debug, PartialEq)]
pub struct Config<X = ()> {
    top_level_path: String,
    root: ConfigSegment<X>,
}

impl<X> Config<X> {
    /// Normalizes an authored schema: lower-cases the top-level path and every
    /// sub-segment name.
    pub fn build(spec: ConfigSpec<X>) -> Self {
        let (top_level_path, root) = spec.into_parts();
        Self {
            top_level_path: top_level_path.to_lowercase(),
            root: ConfigSegment::build(root),
        }
    }

    pub fn top_level_path(&self) -> &str {
        &self.top_level_path
    }

    pub fn root(&self) -> &ConfigSegment<X> {
        &self.root
    }

    /// Resolves a descriptor path to its segment.
    ///
    /// The lower-cased path must start with every segment of the top-level
    /// path; each remaining segment must name a sub-segment. There is no
    /// partial match: any miss returns `None`.
    pub fn resolve(&self, path: &str) -> Option<&ConfigSegment<X>> {
        let requested = RulesConfig::split_path(path);
        let prefix = RulesConfig::split_path(&self.top_level_path);
        if requested.len() < prefix.len() || requested[..prefix.len()] != prefix[..] {
            return None;
        }
        requested[prefix.len()..]
            .iter()
            .try_fold(&self.root, |segment, name| segment.sub_segment(name))
    }
}

impl<X> From<ConfigSpec<X>> for Config<X> {
    fn from(spec: ConfigSpec<X>) -> Self {
        Self::build(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn damage_config() -> Config<&'static str> {
        Config::build(
            ConfigSpec::new("Item.Damage")
                .optional(["source"])
                .with_extension("sum")
                .sub_segment(
                    "Fire",
                    SegmentSpec::new().required(["die"]).with_extension("max"),
                )
                .sub_segment("cold", SegmentSpec::new()),
        )
    }

    #[test]
    fn build_normalizes_case() {
        let config = damage_config();
        assert_eq!(config.top_level_path(), "item.damage");
        assert!(config.root().sub_segments().contains_key("fire"));
        assert!(config.root().sub_segment("FIRE").is_some());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let config: Config = Config::build(ConfigSpec::new("item"));
        assert!(config.root().required_attributes().is_empty());
        assert!(config.root().optional_attributes().is_empty());
        assert!(config.root().sub_segments().is_empty());
    }

    #[test]
    fn extension_is_preserved_per_segment() {
        let config = damage_config();
        assert_eq!(*config.root().extension(), "sum");
        assert_eq!(config.resolve("item.damage.fire").map(|s| *s.extension()), Some("max"));
        assert_eq!(config.resolve("item.damage.cold").map(|s| *s.extension()), Some(""));
    }

    #[test]
    fn resolve_requires_literal_prefix() {
        let config = damage_config();
        assert!(config.resolve("item.damage").is_some());
        assert!(config.resolve("ITEM.Damage.Fire").is_some());
        assert!(config.resolve("item").is_none());
        assert!(config.resolve("item.damages").is_none());
        assert!(config.resolve("actor.damage.fire").is_none());
    }

    #[test]
    fn resolve_has_no_partial_matches() {
        let config = damage_config();
        assert!(config.resolve("item.damage.acid").is_none());
        assert!(config.resolve("item.damage.fire.magical").is_none());
    }

    #[test]
    fn reserved_attributes_are_always_permitted() {
        let config = damage_config();
        let fire = config.resolve("item.damage.fire").unwrap();
        assert!(fire.is_required("die"));
        assert!(fire.permits("die"));
        assert!(fire.permits("name"));
        assert!(fire.permits("type"));
        assert!(!fire.permits("source"));
        assert!(config.root().permits("source"));
    }
}
