//! Compatibility report
//!
//! Severity-classified issues for a checked document, the derived overall
//! score and the export gate, plus human-readable and JSON renderings.

use super::fixes;
use chrono::{DateTime, Utc};
use nu_ansi_term::Color;
use serde::Serialize;

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

impl Severity {
    /// Points deducted from the overall score per issue
    pub fn penalty(self) -> i64 {
        match self {
            Severity::Critical => 10,
            Severity::Warning => 3,
            Severity::Suggestion => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Warning => write!(f, "warning"),
            Severity::Suggestion => write!(f, "suggestion"),
        }
    }
}

/// What kind of check raised an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Css,
    Images,
    Accessibility,
    Content,
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueCategory::Css => write!(f, "css"),
            IssueCategory::Images => write!(f, "images"),
            IssueCategory::Accessibility => write!(f, "accessibility"),
            IssueCategory::Content => write!(f, "content"),
        }
    }
}

/// A single problem attached to one document node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityIssue {
    /// Unique within one report
    pub id: String,
    pub severity: Severity,
    pub category: IssueCategory,
    pub component_id: String,
    pub component_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub auto_fix_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    /// Clients that render the property badly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_clients: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_score: Option<u8>,
}

/// Issues partitioned by severity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueBuckets {
    pub critical: Vec<CompatibilityIssue>,
    pub warnings: Vec<CompatibilityIssue>,
    pub suggestions: Vec<CompatibilityIssue>,
}

impl IssueBuckets {
    /// Partition issues, keeping traversal order within each severity
    pub fn partition(issues: Vec<CompatibilityIssue>) -> Self {
        let mut buckets = IssueBuckets::default();
        for issue in issues {
            match issue.severity {
                Severity::Critical => buckets.critical.push(issue),
                Severity::Warning => buckets.warnings.push(issue),
                Severity::Suggestion => buckets.suggestions.push(issue),
            }
        }
        buckets
    }

    pub fn len(&self) -> usize {
        self.critical.len() + self.warnings.len() + self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All issues, critical first
    pub fn iter(&self) -> impl Iterator<Item = &CompatibilityIssue> {
        self.critical
            .iter()
            .chain(self.warnings.iter())
            .chain(self.suggestions.iter())
    }
}

/// Overall score for the given issue counts, clamped to 0-100
pub fn overall_score(critical: usize, warnings: usize, suggestions: usize) -> u8 {
    let deduction = critical as i64 * Severity::Critical.penalty()
        + warnings as i64 * Severity::Warning.penalty()
        + suggestions as i64 * Severity::Suggestion.penalty();
    (100 - deduction).clamp(0, 100) as u8
}

/// Result of checking a document tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityReport {
    pub overall_score: u8,
    pub total_issues: usize,
    pub issues: IssueBuckets,
    /// Top-level nodes passed to the check
    pub components_checked: usize,
    /// Every node visited, children included
    pub nodes_visited: usize,
    pub timestamp: DateTime<Utc>,
    pub safe_to_export: bool,
}

impl CompatibilityReport {
    /// Build a report from collected issues
    pub fn from_issues(
        issues: Vec<CompatibilityIssue>,
        components_checked: usize,
        nodes_visited: usize,
    ) -> Self {
        let issues = IssueBuckets::partition(issues);
        let overall_score = overall_score(
            issues.critical.len(),
            issues.warnings.len(),
            issues.suggestions.len(),
        );
        let safe_to_export = issues.critical.is_empty();

        Self {
            overall_score,
            total_issues: issues.len(),
            issues,
            components_checked,
            nodes_visited,
            timestamp: Utc::now(),
            safe_to_export,
        }
    }

    /// Determine exit code based on the report
    /// 0: No issues
    /// 1: Warnings or suggestions only
    /// 2: Critical issues, not safe to export
    pub fn exit_code(&self) -> i32 {
        if !self.safe_to_export {
            2
        } else if self.total_issues > 0 {
            1
        } else {
            0
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format the report as human-readable text
    pub fn format_report(&self, use_colors: bool) -> String {
        let paint = |color: Color, text: String| {
            if use_colors {
                color.paint(text).to_string()
            } else {
                text
            }
        };

        let mut output = String::new();
        output.push_str("Email Compatibility Report\n");
        output.push_str("═════════════════════════════════════════\n\n");

        let score_color = if self.overall_score >= 90 {
            Color::Green
        } else if self.overall_score >= 70 {
            Color::Yellow
        } else {
            Color::Red
        };
        output.push_str(&format!(
            "Overall score: {}\n",
            paint(score_color, format!("{}/100", self.overall_score))
        ));
        output.push_str(&format!(
            "Components checked: {} ({} nodes)\n",
            self.components_checked, self.nodes_visited
        ));
        output.push_str(&format!(
            "Checked at: {}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        for (title, color, issues) in [
            ("✗ CRITICAL", Color::Red, &self.issues.critical),
            ("⚠ WARNINGS", Color::Yellow, &self.issues.warnings),
            ("• SUGGESTIONS", Color::Cyan, &self.issues.suggestions),
        ] {
            if issues.is_empty() {
                continue;
            }
            output.push_str(&format!(
                "{} ({}):\n",
                paint(color, title.to_string()),
                issues.len()
            ));
            for issue in issues {
                output.push_str(&format!(
                    "  [{}] {} ({}): {}\n",
                    issue.id, issue.component_id, issue.component_type, issue.message
                ));
                if let Some(details) = &issue.details {
                    output.push_str(&format!("    {}\n", details));
                }
                if let Some(fix) = &issue.suggested_fix {
                    let marker = if issue.auto_fix_available { " (auto-fix available)" } else { "" };
                    output.push_str(&format!("    Fix{}: {}\n", marker, fix));
                }
            }
            output.push('\n');
        }

        if self.issues.is_empty() {
            output.push_str(&paint(Color::Green, "No compatibility issues found.".to_string()));
            output.push('\n');
        } else {
            output.push_str("Summary:\n");
            output.push_str(&format!("  {} critical\n", self.issues.critical.len()));
            output.push_str(&format!("  {} warnings\n", self.issues.warnings.len()));
            output.push_str(&format!("  {} suggestions\n", self.issues.suggestions.len()));

            let with_fixes: Vec<&CompatibilityIssue> = self
                .issues
                .iter()
                .filter(|i| i.suggested_fix.is_some())
                .collect();
            if !with_fixes.is_empty() {
                output.push('\n');
                output.push_str(&fixes::format_fix_plan(&with_fixes, use_colors));
            }
        }

        output.push('\n');
        if self.safe_to_export {
            output.push_str(&paint(Color::Green, "✓ Safe to export".to_string()));
        } else {
            output.push_str(&paint(
                Color::Red,
                "✗ Not safe to export: resolve critical issues first".to_string(),
            ));
        }
        output.push('\n');

        output
    }
}
