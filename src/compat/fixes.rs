//! Fix advice for compatibility issues
//!
//! Advisory only: the engine never rewrites a document. Each risky style
//! property maps to a suggested fix and a rough effort estimate.

use super::report::CompatibilityIssue;
use nu_ansi_term::Color;
use serde::Serialize;

/// Properties a host editor knows how to rewrite automatically
pub const AUTO_FIXABLE_PROPERTIES: &[&str] = &[
    "display",
    "position",
    "float",
    "box-shadow",
    "text-shadow",
    "border-radius",
    "opacity",
    "flex",
    "flex-direction",
    "flex-wrap",
    "justify-content",
    "align-items",
    "gap",
];

const TABLE_LAYOUT_FIX: &str = "Rebuild the layout with nested tables: one <tr> per row, one <td> per \
     column, widths set with the width attribute";
const SHADOW_FIX: &str = "Use a solid border to suggest depth, or draw the shadow with VML inside \
     <!--[if mso]> conditionals";
const RADIUS_FIX: &str = "Accept square corners in Outlook for Windows, or draw the shape with a VML \
     v:roundrect inside <!--[if mso]> conditionals";
const POSITION_FIX: &str = "Remove positioning and place content in table cells; stack layers that \
     would overlap";
const GENERIC_FIX: &str = "Use a widely supported alternative, or make sure the design still works \
     when the property is ignored";

/// Effort needed to apply a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixComplexity {
    /// Straight property swap
    Simple,
    /// Needs a visual check afterwards
    Moderate,
    /// Restructures markup
    Complex,
}

impl std::fmt::Display for FixComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixComplexity::Simple => write!(f, "simple"),
            FixComplexity::Moderate => write!(f, "moderate"),
            FixComplexity::Complex => write!(f, "complex"),
        }
    }
}

/// Suggested fix for one property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixAdvice {
    pub suggestion: &'static str,
    pub complexity: FixComplexity,
}

/// Whether the property is on the auto-fix allow-list
pub fn is_auto_fixable(property: &str) -> bool {
    AUTO_FIXABLE_PROPERTIES.contains(&property)
}

fn is_flex_or_grid(property: &str, value: Option<&str>) -> bool {
    if property.starts_with("flex")
        || property.starts_with("grid")
        || matches!(property, "justify-content" | "align-items" | "gap")
    {
        return true;
    }
    property == "display"
        && matches!(
            value,
            Some("flex") | Some("grid") | Some("inline-flex") | Some("inline-grid")
        )
}

/// Pick the fix for a property, optionally considering its value
pub fn advise(property: &str, value: Option<&str>) -> FixAdvice {
    let normalized = value.map(|v| v.trim().to_lowercase());
    let value = normalized.as_deref();

    if is_flex_or_grid(property, value) {
        return FixAdvice {
            suggestion: TABLE_LAYOUT_FIX,
            complexity: FixComplexity::Complex,
        };
    }

    match property {
        "box-shadow" => FixAdvice {
            suggestion: SHADOW_FIX,
            complexity: FixComplexity::Simple,
        },
        "border-radius" => FixAdvice {
            suggestion: RADIUS_FIX,
            complexity: FixComplexity::Simple,
        },
        "position" => FixAdvice {
            suggestion: POSITION_FIX,
            complexity: FixComplexity::Complex,
        },
        _ => FixAdvice {
            suggestion: GENERIC_FIX,
            complexity: FixComplexity::Moderate,
        },
    }
}

/// Suggested fix text for a property
pub fn suggested_fix(property: &str, value: Option<&str>) -> &'static str {
    advise(property, value).suggestion
}

/// Group issues that carry a style fix by effort and render them
pub fn format_fix_plan(issues: &[&CompatibilityIssue], use_colors: bool) -> String {
    let mut simple = Vec::new();
    let mut moderate = Vec::new();
    let mut complex = Vec::new();

    for issue in issues {
        let Some(property) = issue.property.as_deref() else {
            continue;
        };
        if issue.suggested_fix.is_none() {
            continue;
        }
        match advise(property, issue.value.as_deref()).complexity {
            FixComplexity::Simple => simple.push(*issue),
            FixComplexity::Moderate => moderate.push(*issue),
            FixComplexity::Complex => complex.push(*issue),
        }
    }

    if simple.is_empty() && moderate.is_empty() && complex.is_empty() {
        return "No fix suggestions.\n".to_string();
    }

    let paint = |color: Color, text: &str| {
        if use_colors {
            color.bold().paint(text).to_string()
        } else {
            text.to_string()
        }
    };

    let mut output = String::new();
    output.push_str(&paint(Color::Cyan, "Fix Plan"));
    output.push('\n');
    output.push_str("═════════════════════════════════════════\n\n");

    for (title, color, group) in [
        ("QUICK SWAPS", Color::Green, simple),
        ("REVIEW AFTER FIXING", Color::Yellow, moderate),
        ("LAYOUT REWORK", Color::Purple, complex),
    ] {
        if group.is_empty() {
            continue;
        }
        output.push_str(&format!("{} ({} issues):\n", paint(color, title), group.len()));
        for issue in group {
            output.push_str(&format!(
                "  • {} [{}] {}: {}\n",
                issue.component_id,
                issue.component_type,
                issue.property.as_deref().unwrap_or_default(),
                issue.value.as_deref().unwrap_or_default()
            ));
            if let Some(fix) = &issue.suggested_fix {
                output.push_str(&format!("    {}\n", fix));
            }
        }
        output.push('\n');
    }

    output
}
