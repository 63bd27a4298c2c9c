//! Support query service
//!
//! Derived statistics and multi-dimensional queries over a knowledge base.
//! Nothing is cached: every call recomputes from the underlying entries.

use super::clients::{EmailClient, PlatformGroup};
use super::features::{
    CompatibilityInfo, FeatureCategory, KnowledgeBase, PropertySupport, SupportLevel,
};
use crate::error::CompatError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use strsim::jaro_winkler;

/// Default lower bound for [`SupportQuery::safe_features`]
pub const DEFAULT_SAFE_MIN_SCORE: u8 = 75;

/// Default upper bound for [`SupportQuery::problematic_features`]
pub const DEFAULT_PROBLEMATIC_MAX_SCORE: u8 = 40;

/// Worst-case ordering for platform summaries, worst first
pub const WORST_CASE_PRECEDENCE: [SupportLevel; 4] = [
    SupportLevel::None,
    SupportLevel::Partial,
    SupportLevel::Unknown,
    SupportLevel::Full,
];

fn severity_rank(level: SupportLevel) -> usize {
    WORST_CASE_PRECEDENCE
        .iter()
        .position(|l| *l == level)
        .unwrap_or(WORST_CASE_PRECEDENCE.len())
}

/// The worse of two levels under [`WORST_CASE_PRECEDENCE`]
pub fn worse_level(a: SupportLevel, b: SupportLevel) -> SupportLevel {
    if severity_rank(b) < severity_rank(a) {
        b
    } else {
        a
    }
}

/// Coarse classification of a support score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelBucket {
    High,
    Medium,
    Low,
    Unknown,
}

impl LevelBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelBucket::High => "high",
            LevelBucket::Medium => "medium",
            LevelBucket::Low => "low",
            LevelBucket::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LevelBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LevelBucket {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(LevelBucket::High),
            "medium" => Ok(LevelBucket::Medium),
            "low" => Ok(LevelBucket::Low),
            "unknown" => Ok(LevelBucket::Unknown),
            _ => Err(CompatError::UnknownLevelBucket(s.to_string())),
        }
    }
}

/// Per-feature support statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportStatistics {
    pub feature: String,
    pub total_targets: usize,
    pub full_count: usize,
    pub partial_count: usize,
    pub none_count: usize,
    pub unknown_count: usize,
    /// Weighted support, 0-100
    pub score: u8,
    pub level_bucket: LevelBucket,
}

impl SupportStatistics {
    fn from_info(info: &CompatibilityInfo) -> Self {
        let mut stats = SupportStatistics {
            feature: info.feature.clone(),
            total_targets: 0,
            full_count: 0,
            partial_count: 0,
            none_count: 0,
            unknown_count: 0,
            score: 0,
            level_bucket: LevelBucket::Unknown,
        };

        for (_, support) in info.support.iter() {
            stats.total_targets += 1;
            match support.level {
                SupportLevel::Full => stats.full_count += 1,
                SupportLevel::Partial => stats.partial_count += 1,
                SupportLevel::None => stats.none_count += 1,
                SupportLevel::Unknown => stats.unknown_count += 1,
            }
        }

        // Unknown targets leave the denominator; none-level targets stay in it.
        let tested = (stats.total_targets - stats.unknown_count).max(1) as f64;
        let weighted = stats.full_count as f64 + stats.partial_count as f64 * 0.5;
        stats.score = (100.0 * weighted / tested).round().clamp(0.0, 100.0) as u8;

        stats.level_bucket = if stats.unknown_count == stats.total_targets {
            LevelBucket::Unknown
        } else if stats.score >= 75 {
            LevelBucket::High
        } else if stats.score >= 40 {
            LevelBucket::Medium
        } else {
            LevelBucket::Low
        };

        stats
    }
}

/// One feature's record for a specific client
#[derive(Debug, Clone, Serialize)]
pub struct ClientFeatureSupport<'kb> {
    pub feature: &'kb str,
    pub support: &'kb PropertySupport,
}

/// Worst-case support per platform group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportSummary {
    pub feature: String,
    pub groups: BTreeMap<PlatformGroup, SupportLevel>,
}

/// Aggregate numbers for one feature category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: FeatureCategory,
    pub features: usize,
    pub average_score: u8,
}

/// Composable feature filters; every set field must match
#[derive(Debug, Clone, Default)]
pub struct FeatureQuery {
    pub category: Option<FeatureCategory>,
    pub min_score: Option<u8>,
    pub level_bucket: Option<LevelBucket>,
    /// Keep features this client renders at least partially (or untested)
    pub client: Option<EmailClient>,
    /// Case-insensitive substring of the feature name
    pub search: Option<String>,
}

impl FeatureQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: FeatureCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn min_score(mut self, score: u8) -> Self {
        self.min_score = Some(score);
        self
    }

    pub fn level_bucket(mut self, bucket: LevelBucket) -> Self {
        self.level_bucket = Some(bucket);
        self
    }

    pub fn client(mut self, client: EmailClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn search(mut self, needle: &str) -> Self {
        self.search = Some(needle.to_string());
        self
    }
}

/// Query interface over a [`KnowledgeBase`]
#[derive(Debug, Clone, Copy)]
pub struct SupportQuery<'kb> {
    kb: &'kb KnowledgeBase,
}

impl Default for SupportQuery<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SupportQuery<'static> {
    /// Queries over the compiled-in dataset
    pub fn builtin() -> Self {
        Self {
            kb: KnowledgeBase::builtin(),
        }
    }
}

impl<'kb> SupportQuery<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self { kb }
    }

    pub fn knowledge_base(&self) -> &'kb KnowledgeBase {
        self.kb
    }

    pub fn feature_info(&self, feature: &str) -> Option<&'kb CompatibilityInfo> {
        self.kb.feature_info(feature)
    }

    pub fn support_for_client(
        &self,
        feature: &str,
        client: EmailClient,
    ) -> Option<&'kb PropertySupport> {
        self.kb.feature_info(feature).map(|info| info.support.get(client))
    }

    /// Counts, weighted score and bucket for a feature
    pub fn compute_statistics(&self, feature: &str) -> Option<SupportStatistics> {
        self.kb.feature_info(feature).map(SupportStatistics::from_info)
    }

    /// Every feature paired with its record for `client`, unsupported ones included
    pub fn client_supported_features(&self, client: EmailClient) -> Vec<ClientFeatureSupport<'kb>> {
        self.kb
            .entries()
            .iter()
            .map(|info| ClientFeatureSupport {
                feature: info.feature.as_str(),
                support: info.support.get(client),
            })
            .collect()
    }

    /// Safe alternatives followed by client workarounds, without duplicates
    ///
    /// With no client, workarounds from every client are merged in catalog order.
    pub fn workarounds(&self, feature: &str, client: Option<EmailClient>) -> Vec<String> {
        let Some(info) = self.kb.feature_info(feature) else {
            return Vec::new();
        };

        let client_workarounds: Vec<&String> = match client {
            Some(client) => info.support.get(client).workarounds.iter().collect(),
            None => info
                .support
                .iter()
                .flat_map(|(_, s)| s.workarounds.iter())
                .collect(),
        };

        let mut result: Vec<String> = Vec::new();
        for workaround in info.safe_alternatives.iter().chain(client_workarounds) {
            if !result.contains(workaround) {
                result.push(workaround.clone());
            }
        }
        result
    }

    /// Features scoring at least `min_score`, best first
    pub fn safe_features(&self, min_score: u8) -> Vec<SupportStatistics> {
        let mut stats: Vec<_> = self
            .all_statistics()
            .filter(|s| s.score >= min_score)
            .collect();
        stats.sort_by(|a, b| b.score.cmp(&a.score));
        stats
    }

    /// Features scoring at most `max_score`, worst first
    pub fn problematic_features(&self, max_score: u8) -> Vec<SupportStatistics> {
        let mut stats: Vec<_> = self
            .all_statistics()
            .filter(|s| s.score <= max_score)
            .collect();
        stats.sort_by_key(|s| s.score);
        stats
    }

    /// Features matching every filter set on `query`, in definition order
    pub fn query_features(&self, query: &FeatureQuery) -> Vec<&'kb CompatibilityInfo> {
        let needle = query.search.as_ref().map(|s| s.to_lowercase());

        self.kb
            .entries()
            .iter()
            .filter(|info| query.category.map_or(true, |c| info.category == c))
            .filter(|info| {
                query
                    .client
                    .map_or(true, |c| info.support.get(c).level != SupportLevel::None)
            })
            .filter(|info| {
                needle
                    .as_deref()
                    .map_or(true, |n| info.feature.to_lowercase().contains(n))
            })
            .filter(|info| {
                if query.min_score.is_none() && query.level_bucket.is_none() {
                    return true;
                }
                let stats = SupportStatistics::from_info(info);
                query.min_score.map_or(true, |m| stats.score >= m)
                    && query.level_bucket.map_or(true, |b| stats.level_bucket == b)
            })
            .collect()
    }

    /// Worst support level in each platform group
    pub fn support_summary(&self, feature: &str) -> Option<SupportSummary> {
        let info = self.kb.feature_info(feature)?;

        let groups = PlatformGroup::ALL
            .iter()
            .map(|group| {
                let worst = group
                    .members()
                    .iter()
                    .map(|c| info.support.get(*c).level)
                    .fold(SupportLevel::Full, worse_level);
                (*group, worst)
            })
            .collect();

        Some(SupportSummary {
            feature: info.feature.clone(),
            groups,
        })
    }

    /// Human label for a client id, falling back to the id itself
    pub fn client_label(&self, id: &str) -> String {
        super::clients::client_label(id)
    }

    /// Feature count and mean score per category
    pub fn category_summary(&self) -> Vec<CategorySummary> {
        FeatureCategory::ALL
            .iter()
            .filter_map(|category| {
                let scores: Vec<u32> = self
                    .kb
                    .features_by_category(*category)
                    .into_iter()
                    .map(|info| SupportStatistics::from_info(info).score as u32)
                    .collect();
                if scores.is_empty() {
                    return None;
                }
                let average = scores.iter().sum::<u32>() as f64 / scores.len() as f64;
                Some(CategorySummary {
                    category: *category,
                    features: scores.len(),
                    average_score: average.round() as u8,
                })
            })
            .collect()
    }

    /// Known feature names close to `name`, best match first
    pub fn closest_features(&self, name: &str, limit: usize) -> Vec<&'kb str> {
        let wanted = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .kb
            .entries()
            .iter()
            .map(|info| (jaro_winkler(&wanted, &info.feature), info.feature.as_str()))
            .filter(|(score, _)| *score >= 0.75)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(limit).map(|(_, f)| f).collect()
    }

    /// Render the knowledge base as Markdown
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("# Email Client Compatibility Database\n\n");
        output.push_str(&format!(
            "**Features:** {} | **Clients:** {}\n\n",
            self.kb.len(),
            EmailClient::COUNT
        ));

        output.push_str("## Support by Category\n\n");
        output.push_str("| Category | Features | Average score |\n");
        output.push_str("|----------|----------|---------------|\n");
        for summary in self.category_summary() {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                summary.category, summary.features, summary.average_score
            ));
        }
        output.push('\n');

        for category in FeatureCategory::ALL {
            let features = self.kb.features_by_category(category);
            if features.is_empty() {
                continue;
            }
            output.push_str(&format!("## {}\n\n", category));

            for info in features {
                let stats = SupportStatistics::from_info(info);
                output.push_str(&format!(
                    "### {} [score {}, {}]\n\n",
                    info.feature, stats.score, stats.level_bucket
                ));
                output.push_str(&format!("**Description:** {}\n\n", info.description));
                output.push_str("| Client | Support | Notes |\n");
                output.push_str("|--------|---------|-------|\n");
                for (client, support) in info.support.iter() {
                    output.push_str(&format!(
                        "| {} | {} | {} |\n",
                        client.label(),
                        support.level,
                        support.notes.join("; ")
                    ));
                }
                output.push('\n');

                let workarounds = self.workarounds(&info.feature, None);
                if !workarounds.is_empty() {
                    output.push_str(&format!("**Workarounds:** {}\n\n", workarounds.join("; ")));
                }
                for note in &info.general_notes {
                    output.push_str(&format!("**Note:** {}\n\n", note));
                }
            }
        }

        output
    }

    fn all_statistics(&self) -> impl Iterator<Item = SupportStatistics> + 'kb {
        self.kb.entries().iter().map(SupportStatistics::from_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::features::{full, none, partial, unknown, SupportMatrix};
    use std::collections::HashSet;

    fn kb_with(support: SupportMatrix) -> KnowledgeBase {
        KnowledgeBase::from_entries(vec![CompatibilityInfo::new(
            "probe",
            FeatureCategory::Effects,
            "test entry",
            support,
        )])
        .unwrap()
    }

    #[test]
    fn test_statistics_counts_sum_to_total() {
        let query = SupportQuery::builtin();
        for feature in query.knowledge_base().all_features() {
            let s = query.compute_statistics(feature).unwrap();
            assert_eq!(
                s.full_count + s.partial_count + s.none_count + s.unknown_count,
                s.total_targets
            );
            assert_eq!(s.total_targets, EmailClient::COUNT);
            assert!(s.score <= 100);
        }
    }

    #[test]
    fn test_score_weights_partial_half() {
        let kb = kb_with(
            SupportMatrix::uniform(full())
                .set(&EmailClient::ALL[..6], partial())
                .set(&EmailClient::ALL[6..9], none()),
        );
        let stats = SupportQuery::new(&kb).compute_statistics("probe").unwrap();
        // 9 full, 6 partial, 3 none: (9 + 3) / 18
        assert_eq!(stats.score, 67);
        assert_eq!(stats.level_bucket, LevelBucket::Medium);
    }

    #[test]
    fn test_unknown_targets_leave_denominator() {
        let kb = kb_with(SupportMatrix::uniform(unknown()).set(&[EmailClient::GmailWeb], full()));
        let stats = SupportQuery::new(&kb).compute_statistics("probe").unwrap();
        assert_eq!(stats.unknown_count, EmailClient::COUNT - 1);
        assert_eq!(stats.score, 100);
        assert_eq!(stats.level_bucket, LevelBucket::High);
    }

    #[test]
    fn test_all_unknown_scores_zero_with_unknown_bucket() {
        let kb = kb_with(SupportMatrix::uniform(unknown()));
        let stats = SupportQuery::new(&kb).compute_statistics("probe").unwrap();
        assert_eq!(stats.score, 0);
        assert_eq!(stats.level_bucket, LevelBucket::Unknown);
    }

    #[test]
    fn test_all_none_is_low() {
        let kb = kb_with(SupportMatrix::uniform(none()));
        let stats = SupportQuery::new(&kb).compute_statistics("probe").unwrap();
        assert_eq!(stats.score, 0);
        assert_eq!(stats.level_bucket, LevelBucket::Low);
    }

    #[test]
    fn test_missing_feature_is_none() {
        let query = SupportQuery::builtin();
        assert!(query.compute_statistics("position").is_none());
        assert!(query.feature_info("nope").is_none());
        assert!(query.support_for_client("nope", EmailClient::GmailWeb).is_none());
        assert!(query.support_summary("nope").is_none());
    }

    #[test]
    fn test_worse_level_precedence() {
        use SupportLevel::*;
        assert_eq!(worse_level(Full, Unknown), Unknown);
        assert_eq!(worse_level(Unknown, Partial), Partial);
        assert_eq!(worse_level(Partial, None), None);
        assert_eq!(worse_level(None, Full), None);
        assert_eq!(worse_level(Full, Full), Full);
    }

    #[test]
    fn test_workarounds_deduplicated() {
        let query = SupportQuery::builtin();
        let all = query.workarounds("border-radius", None);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
        // Five Word-engine clients share one workaround
        assert_eq!(all.iter().filter(|w| w.contains("v:roundrect")).count(), 1);
        assert_eq!(all[0], "Square corners");
    }

    #[test]
    fn test_workarounds_for_client_without_any() {
        let query = SupportQuery::builtin();
        let w = query.workarounds("border-radius", Some(EmailClient::AppleMailIos));
        assert_eq!(w, vec!["Square corners", "VML roundrect in MSO conditionals"]);
        assert!(query.workarounds("unknown-feature", None).is_empty());
    }

    #[test]
    fn test_level_bucket_parse() {
        assert_eq!("HIGH".parse::<LevelBucket>().unwrap(), LevelBucket::High);
        assert!("great".parse::<LevelBucket>().is_err());
    }

    #[test]
    fn test_closest_features_suggests_typos() {
        let query = SupportQuery::builtin();
        let suggestions = query.closest_features("box-shadw", 3);
        assert_eq!(suggestions.first(), Some(&"box-shadow"));
    }

    #[test]
    fn test_markdown_mentions_every_feature() {
        let query = SupportQuery::builtin();
        let md = query.to_markdown();
        for feature in query.knowledge_base().all_features() {
            assert!(md.contains(&format!("### {} ", feature)), "{}", feature);
        }
    }
}
