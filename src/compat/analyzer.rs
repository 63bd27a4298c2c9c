//! Document compliance checker
//!
//! Walks a document tree once, applies the per-node checks and collects every
//! issue into a single report. Issue ids come from a counter that lives for
//! one top-level call, so they are unique across the whole report.

use super::database::SupportQuery;
use super::fixes;
use super::report::{CompatibilityIssue, CompatibilityReport, IssueCategory, Severity};
use crate::document::{Node, NodeKind};
use tracing::{debug, info};

/// Style properties that are checked against the knowledge base
pub const RISKY_PROPERTIES: &[&str] = &[
    "display",
    "position",
    "float",
    "z-index",
    "transform",
    "animation",
    "transition",
    "box-shadow",
    "text-shadow",
    "opacity",
    "flex",
    "flex-direction",
    "flex-wrap",
    "justify-content",
    "align-items",
    "gap",
    "grid",
    "grid-template-columns",
    "grid-template-rows",
];

// Fixed figures for the display and position rules.
const FLEX_GRID_AFFECTED_CLIENTS: usize = 15;
const FLEX_GRID_SUPPORT_SCORE: u8 = 20;
const POSITION_AFFECTED_CLIENTS: usize = 12;
const POSITION_SUPPORT_SCORE: u8 = 35;

/// Thresholds used by the checks
#[derive(Debug, Clone, PartialEq)]
pub struct CheckerConfig {
    /// Scores below this raise a critical issue
    pub critical_below: u8,
    /// Scores below this (and not critical) raise a warning
    pub warning_below: u8,
    /// Text nodes longer than this (in characters) get a suggestion
    pub max_text_length: usize,
}

impl CheckerConfig {
    /// Reject thresholds that leave no warning band
    pub fn validate(&self) -> Result<(), String> {
        if self.critical_below > self.warning_below {
            return Err(format!(
                "critical threshold {} is above warning threshold {}",
                self.critical_below, self.warning_below
            ));
        }
        Ok(())
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            critical_below: 50,
            warning_below: 90,
            max_text_length: 1000,
        }
    }
}

/// Sequential issue ids for one check
#[derive(Debug, Default)]
struct IssueIds {
    next: usize,
}

impl IssueIds {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("issue-{}", self.next)
    }
}

/// Issues and id counter threaded through one traversal
struct Walk {
    ids: IssueIds,
    issues: Vec<CompatibilityIssue>,
    nodes_visited: usize,
}

impl Walk {
    fn push(&mut self, node: &Node, draft: IssueDraft) {
        self.issues.push(CompatibilityIssue {
            id: self.ids.next_id(),
            severity: draft.severity,
            category: draft.category,
            component_id: node.id.clone(),
            component_type: node.node_type.clone(),
            property: draft.property,
            value: draft.value,
            message: draft.message,
            details: draft.details,
            auto_fix_available: draft.auto_fix_available,
            suggested_fix: draft.suggested_fix,
            affected_clients: draft.affected_clients,
            support_score: draft.support_score,
        });
    }
}

/// Issue fields before an id and component are attached
struct IssueDraft {
    severity: Severity,
    category: IssueCategory,
    property: Option<String>,
    value: Option<String>,
    message: String,
    details: Option<String>,
    auto_fix_available: bool,
    suggested_fix: Option<String>,
    affected_clients: Option<usize>,
    support_score: Option<u8>,
}

impl IssueDraft {
    fn new(severity: Severity, category: IssueCategory, message: String) -> Self {
        Self {
            severity,
            category,
            property: None,
            value: None,
            message,
            details: None,
            auto_fix_available: false,
            suggested_fix: None,
            affected_clients: None,
            support_score: None,
        }
    }

    fn property(mut self, property: &str) -> Self {
        self.property = Some(property.to_string());
        self
    }

    fn details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    /// Style issue fields shared by every style rule
    fn style_fix(mut self, property: &str, value: &str) -> Self {
        self.property = Some(property.to_string());
        self.value = Some(value.to_string());
        self.auto_fix_available = fixes::is_auto_fixable(property);
        self.suggested_fix = Some(fixes::suggested_fix(property, Some(value)).to_string());
        self
    }

    fn figures(mut self, affected_clients: usize, support_score: u8) -> Self {
        self.affected_clients = Some(affected_clients);
        self.support_score = Some(support_score);
        self
    }
}

/// Checks document trees against the knowledge base
#[derive(Debug, Clone)]
pub struct ComplianceChecker<'kb> {
    query: SupportQuery<'kb>,
    config: CheckerConfig,
}

impl Default for ComplianceChecker<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceChecker<'static> {
    /// Checker over the builtin knowledge base with default thresholds
    pub fn new() -> Self {
        Self {
            query: SupportQuery::builtin(),
            config: CheckerConfig::default(),
        }
    }
}

impl<'kb> ComplianceChecker<'kb> {
    pub fn with_query(query: SupportQuery<'kb>) -> Self {
        Self {
            query,
            config: CheckerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Check a list of top-level nodes and everything below them
    pub fn check_template(&self, nodes: &[Node]) -> CompatibilityReport {
        let mut walk = Walk {
            ids: IssueIds::default(),
            issues: Vec::new(),
            nodes_visited: 0,
        };

        self.walk_nodes(nodes, &mut walk);

        let report = CompatibilityReport::from_issues(walk.issues, nodes.len(), walk.nodes_visited);
        info!(
            components = report.components_checked,
            nodes = report.nodes_visited,
            critical = report.issues.critical.len(),
            warnings = report.issues.warnings.len(),
            suggestions = report.issues.suggestions.len(),
            score = report.overall_score,
            "template checked"
        );
        report
    }

    /// Siblings first, then each sibling's children in order
    fn walk_nodes(&self, nodes: &[Node], walk: &mut Walk) {
        for node in nodes {
            walk.nodes_visited += 1;
            self.check_node(node, walk);
        }
        for node in nodes {
            if !node.children.is_empty() {
                self.walk_nodes(&node.children, walk);
            }
        }
    }

    fn check_node(&self, node: &Node, walk: &mut Walk) {
        debug!(id = %node.id, node_type = %node.node_type, "checking node");
        self.check_styles(node, walk);
        match node.kind() {
            NodeKind::Image => self.check_image(node, walk),
            NodeKind::Button | NodeKind::Link => self.check_accessibility(node, walk),
            NodeKind::Text => self.check_content(node, walk),
            NodeKind::Other => {}
        }
    }

    fn check_styles(&self, node: &Node, walk: &mut Walk) {
        for &property in RISKY_PROPERTIES {
            let Some(value) = node.style_value(property) else {
                continue;
            };
            let value = value.as_text();

            if let Some(stats) = self.query.compute_statistics(property) {
                let affected = stats.partial_count + stats.none_count;
                let severity = if stats.score < self.config.critical_below {
                    Some(Severity::Critical)
                } else if stats.score < self.config.warning_below {
                    Some(Severity::Warning)
                } else {
                    None
                };

                if let Some(severity) = severity {
                    let tested = stats.total_targets - stats.unknown_count;
                    let message = match severity {
                        Severity::Critical => format!(
                            "'{}' has poor email client support ({}% support score)",
                            property, stats.score
                        ),
                        _ => format!(
                            "'{}' has limited email client support ({}% support score)",
                            property, stats.score
                        ),
                    };
                    let details = format!(
                        "Fully supported in {} of {} tested clients, partially in {}, not at all in {}",
                        stats.full_count, tested, stats.partial_count, stats.none_count
                    );
                    debug!(property, score = stats.score, %severity, "style support issue");
                    walk.push(
                        node,
                        IssueDraft::new(severity, IssueCategory::Css, message)
                            .details(details)
                            .style_fix(property, &value)
                            .figures(affected, stats.score),
                    );
                }
            }

            let normalized = value.trim().to_lowercase();
            if property == "display" && matches!(normalized.as_str(), "flex" | "grid") {
                walk.push(
                    node,
                    IssueDraft::new(
                        Severity::Critical,
                        IssueCategory::Css,
                        format!("display: {} is not supported by most email clients", normalized),
                    )
                    .details(
                        "Outlook for Windows and several webmail clients ignore flexbox and grid, \
                         collapsing the layout into stacked blocks"
                            .to_string(),
                    )
                    .style_fix(property, &value)
                    .figures(FLEX_GRID_AFFECTED_CLIENTS, FLEX_GRID_SUPPORT_SCORE),
                );
            }
            if property == "position" && normalized != "static" {
                walk.push(
                    node,
                    IssueDraft::new(
                        Severity::Warning,
                        IssueCategory::Css,
                        format!("position: {} is unreliable in email clients", normalized),
                    )
                    .details(
                        "Most webmail clients strip positioning, so elements fall back into normal flow"
                            .to_string(),
                    )
                    .style_fix(property, &value)
                    .figures(POSITION_AFFECTED_CLIENTS, POSITION_SUPPORT_SCORE),
                );
            }
        }
    }

    fn check_image(&self, node: &Node, walk: &mut Walk) {
        if node.attr_value("alt").is_none() {
            walk.push(
                node,
                IssueDraft::new(
                    Severity::Warning,
                    IssueCategory::Accessibility,
                    "Image is missing alt text".to_string(),
                )
                .property("alt")
                .details("Screen readers and clients that block images show the alt text instead".to_string()),
            );
        }

        for dimension in ["width", "height"] {
            if node.attr_value(dimension).is_some() {
                continue;
            }
            walk.push(
                node,
                IssueDraft::new(
                    Severity::Suggestion,
                    IssueCategory::Images,
                    format!("Image is missing an explicit {}", dimension),
                )
                .property(dimension)
                .details("Outlook renders images at their intrinsic size without explicit dimensions".to_string()),
            );
        }

        let src = node.attr_value("src").map(|v| v.as_text()).unwrap_or_default();
        if !(src.starts_with("http://") || src.starts_with("https://")) {
            let mut draft = IssueDraft::new(
                Severity::Critical,
                IssueCategory::Images,
                "Image source must be an absolute http(s) URL".to_string(),
            )
            .property("src")
            .details("Relative paths and data URIs do not resolve once the email is delivered".to_string());
            if !src.is_empty() {
                draft.value = Some(src);
            }
            walk.push(node, draft);
        }
    }

    fn check_accessibility(&self, node: &Node, walk: &mut Walk) {
        if node.attr_value("text").is_some() || !node.children.is_empty() {
            return;
        }
        walk.push(
            node,
            IssueDraft::new(
                Severity::Warning,
                IssueCategory::Accessibility,
                format!("{} has no text content", capitalize(&node.node_type)),
            )
            .property("text")
            .details("Interactive elements need a readable label for screen readers".to_string()),
        );
    }

    fn check_content(&self, node: &Node, walk: &mut Walk) {
        let Some(content) = node.attr_value("content") else {
            return;
        };
        let length = content.as_text().chars().count();
        if length <= self.config.max_text_length {
            return;
        }
        walk.push(
            node,
            IssueDraft::new(
                Severity::Suggestion,
                IssueCategory::Content,
                format!(
                    "Text block is {} characters long (over {})",
                    length, self.config.max_text_length
                ),
            )
            .property("content")
            .details("Gmail clips messages over 102KB; long copy also hurts mobile readability".to_string()),
        );
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(nodes: &[Node]) -> CompatibilityReport {
        ComplianceChecker::new().check_template(nodes)
    }

    #[test]
    fn test_empty_tree() {
        let report = check(&[]);
        assert_eq!(report.total_issues, 0);
        assert_eq!(report.overall_score, 100);
        assert!(report.safe_to_export);
        assert_eq!(report.components_checked, 0);
        assert_eq!(report.nodes_visited, 0);
    }

    #[test]
    fn test_display_flex_raises_fixed_critical() {
        let report = check(&[Node::new("row", "container").style("display", "flex")]);
        let fixed = report
            .issues
            .critical
            .iter()
            .find(|i| i.affected_clients == Some(15))
            .expect("fixed display rule");
        assert_eq!(fixed.property.as_deref(), Some("display"));
        assert_eq!(fixed.value.as_deref(), Some("flex"));
        assert_eq!(fixed.support_score, Some(20));
        assert!(fixed.auto_fix_available);
        assert!(!report.safe_to_export);
    }

    #[test]
    fn test_display_block_only_gets_score_verdict() {
        let report = check(&[Node::new("row", "container").style("display", "block")]);
        assert!(report.issues.critical.is_empty());
        // display scores 78 in the builtin data
        assert_eq!(report.issues.warnings.len(), 1);
        assert_eq!(report.issues.warnings[0].support_score, Some(78));
    }

    #[test]
    fn test_position_static_is_fine() {
        let report = check(&[Node::new("box", "container").style("position", "static")]);
        assert_eq!(report.total_issues, 0);
    }

    #[test]
    fn test_blank_style_values_are_ignored() {
        let report = check(&[Node::new("box", "container")
            .style("box-shadow", "  ")
            .style("animation", "")]);
        assert_eq!(report.total_issues, 0);
    }

    #[test]
    fn test_low_score_is_critical() {
        let report = check(&[Node::new("card", "container").style("box-shadow", "0 1px 2px #000")]);
        assert_eq!(report.issues.critical.len(), 1);
        let issue = &report.issues.critical[0];
        assert_eq!(issue.category, IssueCategory::Css);
        assert_eq!(issue.support_score, Some(42));
        assert_eq!(issue.affected_clients, Some(12));
        assert!(issue.message.contains("42%"));
        assert!(issue.suggested_fix.as_deref().unwrap().contains("border"));
    }

    #[test]
    fn test_score_at_critical_boundary_is_warning() {
        // transform scores exactly 50
        let report = check(&[Node::new("icon", "container").style("transform", "rotate(45deg)")]);
        assert!(report.issues.critical.is_empty());
        assert_eq!(report.issues.warnings.len(), 1);
        assert_eq!(report.issues.warnings[0].support_score, Some(50));
    }

    #[test]
    fn test_numeric_style_values_count_as_present() {
        let report = check(&[Node::new("layer", "container").style("z-index", 10.0)]);
        assert_eq!(report.issues.warnings.len(), 1);
        assert_eq!(report.issues.warnings[0].value.as_deref(), Some("10"));
    }

    #[test]
    fn test_button_without_label() {
        let report = check(&[Node::new("cta", "button")]);
        assert_eq!(report.issues.warnings.len(), 1);
        assert_eq!(report.issues.warnings[0].category, IssueCategory::Accessibility);
        assert_eq!(report.issues.warnings[0].message, "Button has no text content");
    }

    #[test]
    fn test_link_with_children_is_labelled() {
        let link = Node::new("logo-link", "link").child(
            Node::new("logo", "image")
                .attr("src", "https://cdn.test/logo.png")
                .attr("alt", "Logo")
                .attr("width", 120.0)
                .attr("height", 40.0),
        );
        let report = check(&[link]);
        assert_eq!(report.total_issues, 0);
        assert_eq!(report.nodes_visited, 2);
        assert_eq!(report.components_checked, 1);
    }

    #[test]
    fn test_long_text_suggestion_counts_chars() {
        let exactly = "é".repeat(1000);
        let report = check(&[Node::new("copy", "text").attr("content", exactly.as_str())]);
        assert_eq!(report.total_issues, 0);

        let over = "a".repeat(1001);
        let report = check(&[Node::new("copy", "text").attr("content", over.as_str())]);
        assert_eq!(report.issues.suggestions.len(), 1);
        assert_eq!(report.issues.suggestions[0].category, IssueCategory::Content);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = CheckerConfig {
            critical_below: 80,
            warning_below: 95,
            max_text_length: 10,
        };
        let checker = ComplianceChecker::new().with_config(config);
        let report = checker.check_template(&[
            Node::new("row", "container").style("display", "block"),
            Node::new("copy", "text").attr("content", "eleven char"),
        ]);
        assert_eq!(report.issues.critical.len(), 1);
        assert_eq!(report.issues.suggestions.len(), 1);
    }

    #[test]
    fn test_ids_unique_across_levels() {
        let tree = vec![
            Node::new("a", "button").child(Node::new("a1", "image")),
            Node::new("b", "image").child(Node::new("b1", "button").child(Node::new("b2", "button"))),
        ];
        let report = check(&tree);
        let mut ids: Vec<&str> = report.issues.iter().map(|i| i.id.as_str()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(report.nodes_visited, 5);
    }

    #[test]
    fn test_siblings_checked_before_children() {
        let tree = vec![
            Node::new("parent", "container").child(Node::new("child", "button")),
            Node::new("sibling", "button"),
        ];
        let report = check(&tree);
        let order: Vec<&str> = report
            .issues
            .warnings
            .iter()
            .map(|i| i.component_id.as_str())
            .collect();
        assert_eq!(order, vec!["sibling", "child"]);
        assert_eq!(report.issues.warnings[0].id, "issue-1");
        assert_eq!(report.issues.warnings[1].id, "issue-2");
    }

    #[test]
    fn test_threshold_validation() {
        assert!(CheckerConfig::default().validate().is_ok());
        let inverted = CheckerConfig {
            critical_below: 95,
            warning_below: 60,
            ..CheckerConfig::default()
        };
        assert!(inverted.validate().unwrap_err().contains("95"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("link"), "Link");
        assert_eq!(capitalize(""), "");
    }
}
