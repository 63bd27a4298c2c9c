//! Feature knowledge base for email client compatibility
//!
//! Maps CSS-like feature names to per-client support records. The builtin
//! dataset (see `catalog`) is assembled once on first access and is read-only
//! afterwards.

use super::clients::EmailClient;
use crate::error::CompatError;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

/// How well a client renders a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    Full,
    Partial,
    None,
    Unknown,
}

impl SupportLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportLevel::Full => "full",
            SupportLevel::Partial => "partial",
            SupportLevel::None => "none",
            SupportLevel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of a tracked feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureCategory {
    Layout,
    BoxModel,
    Typography,
    Backgrounds,
    Borders,
    Effects,
    Animation,
    Media,
}

impl FeatureCategory {
    pub const ALL: [FeatureCategory; 8] = [
        FeatureCategory::Layout,
        FeatureCategory::BoxModel,
        FeatureCategory::Typography,
        FeatureCategory::Backgrounds,
        FeatureCategory::Borders,
        FeatureCategory::Effects,
        FeatureCategory::Animation,
        FeatureCategory::Media,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureCategory::Layout => "layout",
            FeatureCategory::BoxModel => "box-model",
            FeatureCategory::Typography => "typography",
            FeatureCategory::Backgrounds => "backgrounds",
            FeatureCategory::Borders => "borders",
            FeatureCategory::Effects => "effects",
            FeatureCategory::Animation => "animation",
            FeatureCategory::Media => "media",
        }
    }
}

impl std::fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeatureCategory {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| CompatError::UnknownCategory(s.to_string()))
    }
}

/// Support record for one feature in one client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySupport {
    pub level: SupportLevel,
    /// Client version the record applies from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workarounds: Vec<String>,
    /// Link to test results or documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl PropertySupport {
    fn with_level(level: SupportLevel) -> Self {
        Self {
            level,
            version: None,
            notes: Vec::new(),
            workarounds: Vec::new(),
            reference: None,
        }
    }

    /// Attach a note
    pub fn note(mut self, note: &str) -> Self {
        self.notes.push(note.to_string());
        self
    }

    /// Attach a workaround
    pub fn workaround(mut self, workaround: &str) -> Self {
        self.workarounds.push(workaround.to_string());
        self
    }

    /// Record the client version this applies from
    pub fn since(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Attach a reference URL
    pub fn reference(mut self, url: &str) -> Self {
        self.reference = Some(url.to_string());
        self
    }
}

/// Record for a fully supported feature
pub fn full() -> PropertySupport {
    PropertySupport::with_level(SupportLevel::Full)
}

/// Record for a partially supported feature
pub fn partial() -> PropertySupport {
    PropertySupport::with_level(SupportLevel::Partial)
}

/// Record for an unsupported feature
pub fn none() -> PropertySupport {
    PropertySupport::with_level(SupportLevel::None)
}

/// Record for an untested feature
pub fn unknown() -> PropertySupport {
    PropertySupport::with_level(SupportLevel::Unknown)
}

/// Support records for every client in the catalog
///
/// Only constructible with full coverage, so a lookup never misses.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportMatrix {
    records: [PropertySupport; EmailClient::COUNT],
}

impl SupportMatrix {
    /// Give every client the same record
    pub fn uniform(support: PropertySupport) -> Self {
        Self {
            records: std::array::from_fn(|_| support.clone()),
        }
    }

    /// Override the record for the given clients
    pub fn set(mut self, clients: &[EmailClient], support: PropertySupport) -> Self {
        for client in clients {
            self.records[client.index()] = support.clone();
        }
        self
    }

    pub fn get(&self, client: EmailClient) -> &PropertySupport {
        &self.records[client.index()]
    }

    /// Records in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (EmailClient, &PropertySupport)> {
        EmailClient::ALL.iter().copied().zip(self.records.iter())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Serialize for SupportMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (client, support) in self.iter() {
            map.serialize_entry(&client, support)?;
        }
        map.end()
    }
}

/// Knowledge base entry for one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityInfo {
    /// Unique key, e.g. `box-shadow`
    pub feature: String,
    pub category: FeatureCategory,
    pub description: String,
    pub support: SupportMatrix,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub general_notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safe_alternatives: Vec<String>,
}

impl CompatibilityInfo {
    pub fn new(
        feature: &str,
        category: FeatureCategory,
        description: &str,
        support: SupportMatrix,
    ) -> Self {
        Self {
            feature: feature.to_string(),
            category,
            description: description.to_string(),
            support,
            general_notes: Vec::new(),
            safe_alternatives: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: &[&str]) -> Self {
        self.general_notes = notes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_alternatives(mut self, alternatives: &[&str]) -> Self {
        self.safe_alternatives = alternatives.iter().map(|s| s.to_string()).collect();
        self
    }
}

static BUILTIN: LazyLock<KnowledgeBase> = LazyLock::new(|| {
    let kb = KnowledgeBase::index(super::catalog::builtin_entries());
    tracing::debug!(features = kb.len(), "loaded builtin knowledge base");
    kb
});

/// Read-only registry of feature entries
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<CompatibilityInfo>,
    by_name: HashMap<String, usize>,
}

impl KnowledgeBase {
    /// The compiled-in dataset
    pub fn builtin() -> &'static KnowledgeBase {
        &BUILTIN
    }

    /// Build a knowledge base from custom entries
    pub fn from_entries(entries: Vec<CompatibilityInfo>) -> Result<Self, CompatError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.feature.as_str()) {
                return Err(CompatError::DuplicateFeature(entry.feature.clone()));
            }
        }
        Ok(Self::index(entries))
    }

    // Later duplicates win; callers that care go through `from_entries`.
    fn index(entries: Vec<CompatibilityInfo>) -> Self {
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.feature.clone(), i))
            .collect();
        Self { entries, by_name }
    }

    /// Feature names in definition order
    pub fn all_features(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.feature.as_str()).collect()
    }

    pub fn feature_info(&self, name: &str) -> Option<&CompatibilityInfo> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn features_by_category(&self, category: FeatureCategory) -> Vec<&CompatibilityInfo> {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All entries in definition order
    pub fn entries(&self) -> &[CompatibilityInfo] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> CompatibilityInfo {
        CompatibilityInfo::new(
            name,
            FeatureCategory::Effects,
            "sample",
            SupportMatrix::uniform(full()),
        )
    }

    #[test]
    fn test_builders_set_level_and_extras() {
        let record = partial()
            .note("only on tables")
            .workaround("use bgcolor")
            .since("16.0")
            .reference("https://example.test/ref");
        assert_eq!(record.level, SupportLevel::Partial);
        assert_eq!(record.notes, vec!["only on tables"]);
        assert_eq!(record.workarounds, vec!["use bgcolor"]);
        assert_eq!(record.version.as_deref(), Some("16.0"));
        assert!(record.reference.is_some());
        assert_eq!(none().level, SupportLevel::None);
        assert_eq!(unknown().level, SupportLevel::Unknown);
    }

    #[test]
    fn test_matrix_set_overrides_only_listed_clients() {
        let matrix = SupportMatrix::uniform(full())
            .set(&[EmailClient::GmailWeb, EmailClient::YahooMail], none());
        assert_eq!(matrix.len(), EmailClient::COUNT);
        assert_eq!(matrix.get(EmailClient::GmailWeb).level, SupportLevel::None);
        assert_eq!(matrix.get(EmailClient::YahooMail).level, SupportLevel::None);
        assert_eq!(matrix.get(EmailClient::Thunderbird).level, SupportLevel::Full);
    }

    #[test]
    fn test_matrix_serializes_as_client_map() {
        let matrix = SupportMatrix::uniform(unknown());
        let value = serde_json::to_value(&matrix).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), EmailClient::COUNT);
        assert_eq!(map["samsung-email"]["level"], "unknown");
    }

    #[test]
    fn test_from_entries_rejects_duplicates() {
        let result = KnowledgeBase::from_entries(vec![sample("opacity"), sample("opacity")]);
        assert!(matches!(result, Err(CompatError::DuplicateFeature(name)) if name == "opacity"));
    }

    #[test]
    fn test_lookup_accessors() {
        let kb = KnowledgeBase::from_entries(vec![sample("opacity"), sample("filter")]).unwrap();
        assert_eq!(kb.all_features(), vec!["opacity", "filter"]);
        assert!(kb.has_feature("filter"));
        assert!(!kb.has_feature("Filter"));
        assert!(kb.feature_info("missing").is_none());
        assert_eq!(kb.features_by_category(FeatureCategory::Effects).len(), 2);
        assert!(kb.features_by_category(FeatureCategory::Media).is_empty());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("box-model".parse::<FeatureCategory>().unwrap(), FeatureCategory::BoxModel);
        assert_eq!(" Layout ".parse::<FeatureCategory>().unwrap(), FeatureCategory::Layout);
        assert!("widgets".parse::<FeatureCategory>().is_err());
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = KnowledgeBase::builtin() as *const KnowledgeBase;
        let b = KnowledgeBase::builtin() as *const KnowledgeBase;
        assert_eq!(a, b);
        assert!(!KnowledgeBase::builtin().is_empty());
    }
}
