//! Builtin compatibility dataset
//!
//! Support data for the CSS features most likely to break in email. Levels
//! follow published client test results; where a client was never tested the
//! record is `unknown` and does not count against the score.

use super::clients::EmailClient::*;
use super::clients::{BROWSER_ENGINE, GMAIL, WORD_ENGINE};
use super::features::{
    full, none, partial, unknown, CompatibilityInfo, FeatureCategory, PropertySupport,
    SupportMatrix,
};

const CANIEMAIL: &str = "https://www.caniemail.com/features/";

fn reference(slug: &str) -> String {
    format!("{}{}/", CANIEMAIL, slug)
}

fn word_none(workaround: &str) -> PropertySupport {
    none()
        .note("Word rendering engine ignores the property")
        .workaround(workaround)
}

/// Shared matrix for the flexbox family
fn flexbox(slug: &str) -> SupportMatrix {
    let r = reference(slug);
    SupportMatrix::uniform(partial().note("Only in the default container context").reference(&r))
        .set(BROWSER_ENGINE, full().reference(&r))
        .set(WORD_ENGINE, word_none("Build rows and columns with nested tables"))
        .set(
            GMAIL,
            partial()
                .note("Flex values are kept only inside embedded <style> blocks")
                .workaround("Build rows and columns with nested tables")
                .reference(&r),
        )
        .set(&[AolMail], none().note("Stripped by the sanitizer"))
}

/// Shared matrix for the grid family
fn grid(slug: &str) -> SupportMatrix {
    let r = reference(slug);
    SupportMatrix::uniform(none().workaround("Use a fixed-width table grid").reference(&r))
        .set(BROWSER_ENGINE, full().reference(&r))
        .set(&[OutlookCom], partial().note("Explicit tracks only, no named areas"))
        .set(&[AolMail], unknown())
}

pub(crate) fn builtin_entries() -> Vec<CompatibilityInfo> {
    let mut entries = Vec::new();

    // Layout
    entries.push(
        CompatibilityInfo::new(
            "display",
            FeatureCategory::Layout,
            "Controls the box type an element generates",
            SupportMatrix::uniform(full().reference(&reference("css-display")))
                .set(
                    WORD_ENGINE,
                    partial()
                        .note("Only block, inline and none are honoured")
                        .workaround("Use tables for multi-column layout"),
                )
                .set(
                    GMAIL,
                    partial().note("flex and grid values are dropped in non-Google accounts"),
                ),
        )
        .with_notes(&["display: none is widely honoured and safe for hiding preheaders"])
        .with_alternatives(&["Nested <table> layout", "align attribute on <td>"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "float",
            FeatureCategory::Layout,
            "Takes an element out of flow and wraps content around it",
            SupportMatrix::uniform(full())
                .set(WORD_ENGINE, word_none("Use align=\"left\" or align=\"right\" on tables")),
        )
        .with_alternatives(&["align attribute on <table> or <img>"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "z-index",
            FeatureCategory::Layout,
            "Stacking order of positioned elements",
            SupportMatrix::uniform(full())
                .set(WORD_ENGINE, word_none("Avoid overlapping content"))
                .set(GMAIL, partial().note("Only effective on elements Gmail keeps positioned")),
        )
        .with_alternatives(&["Design without overlapping layers"]),
    );

    for (feature, description, slug) in [
        ("flex", "Shorthand for flex-grow, flex-shrink and flex-basis", "css-flex"),
        ("flex-direction", "Main axis direction of a flex container", "css-flex-direction"),
        ("flex-wrap", "Whether flex items wrap onto new lines", "css-flex-wrap"),
        ("justify-content", "Distribution of items along the main axis", "css-justify-content"),
        ("align-items", "Cross-axis alignment of flex items", "css-align-items"),
    ] {
        entries.push(
            CompatibilityInfo::new(feature, FeatureCategory::Layout, description, flexbox(slug))
                .with_notes(&["Outlook for Windows renders flex items as stacked blocks"])
                .with_alternatives(&["Nested <table> layout", "Hybrid fluid columns with inline-block"]),
        );
    }

    entries.push(
        CompatibilityInfo::new(
            "gap",
            FeatureCategory::Layout,
            "Gutters between flex or grid items",
            flexbox("css-gap").set(GMAIL, none().workaround("Use cell padding for gutters")),
        )
        .with_alternatives(&["Padding on table cells", "Spacer cells"]),
    );

    for (feature, description, slug) in [
        ("grid", "Shorthand for explicit grid definitions", "css-grid"),
        ("grid-template-columns", "Column track sizes of a grid", "css-grid-template-columns"),
        ("grid-template-rows", "Row track sizes of a grid", "css-grid-template-rows"),
    ] {
        entries.push(
            CompatibilityInfo::new(feature, FeatureCategory::Layout, description, grid(slug))
                .with_notes(&["Grid layout is unsupported in every Gmail and Outlook for Windows build"])
                .with_alternatives(&["Nested <table> layout"]),
        );
    }

    // Box model
    entries.push(CompatibilityInfo::new(
        "width",
        FeatureCategory::BoxModel,
        "Content width of an element",
        SupportMatrix::uniform(full())
            .set(WORD_ENGINE, partial().note("Ignored on <div>; use the width attribute on tables and images")),
    ));

    entries.push(
        CompatibilityInfo::new(
            "max-width",
            FeatureCategory::BoxModel,
            "Upper bound on element width",
            SupportMatrix::uniform(full()).set(
                WORD_ENGINE,
                partial()
                    .note("Only honoured on table cells")
                    .workaround("Wrap content in a fixed-width ghost table inside MSO conditionals"),
            ),
        )
        .with_alternatives(&["Fixed width attribute on the outer table"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "margin",
            FeatureCategory::BoxModel,
            "Outer spacing of an element",
            SupportMatrix::uniform(full())
                .set(
                    WORD_ENGINE,
                    partial()
                        .note("Ignored on inline elements and background colours bleed")
                        .workaround("Use padding on table cells"),
                )
                .set(&[OutlookCom], partial().note("Negative and auto margins are removed")),
        )
        .with_alternatives(&["Padding on a wrapping <td>"]),
    );

    entries.push(CompatibilityInfo::new(
        "padding",
        FeatureCategory::BoxModel,
        "Inner spacing of an element",
        SupportMatrix::uniform(full()).set(
            WORD_ENGINE,
            partial()
                .note("Only reliable on <td>")
                .workaround("Use padding on table cells"),
        ),
    ));

    entries.push(CompatibilityInfo::new(
        "min-height",
        FeatureCategory::BoxModel,
        "Lower bound on element height",
        SupportMatrix::uniform(full())
            .set(WORD_ENGINE, word_none("Set height on the table cell instead"))
            .set(&[AolMail, SamsungEmail], unknown()),
    ));

    // Typography
    entries.push(
        CompatibilityInfo::new(
            "font-family",
            FeatureCategory::Typography,
            "Typeface stack for text",
            SupportMatrix::uniform(full()).set(
                WORD_ENGINE,
                partial()
                    .note("Falls back to Times New Roman when the first font is missing")
                    .workaround("Add an mso-font-alt declaration"),
            ),
        )
        .with_alternatives(&["Web-safe font stacks such as Arial, Helvetica, sans-serif"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "@font-face",
            FeatureCategory::Typography,
            "Custom web fonts",
            SupportMatrix::uniform(none().workaround("Provide a web-safe fallback stack"))
                .set(BROWSER_ENGINE, full().reference(&reference("css-at-font-face"))),
        )
        .with_notes(&["Always pair web fonts with a web-safe fallback"])
        .with_alternatives(&["Web-safe font stacks", "Text rendered into images with alt text"]),
    );

    entries.push(CompatibilityInfo::new(
        "line-height",
        FeatureCategory::Typography,
        "Height of a line box",
        SupportMatrix::uniform(full()).set(
            WORD_ENGINE,
            partial()
                .note("Rounded unless mso-line-height-rule is exactly")
                .workaround("Add mso-line-height-rule: exactly"),
        ),
    ));

    entries.push(CompatibilityInfo::new(
        "letter-spacing",
        FeatureCategory::Typography,
        "Spacing between characters",
        SupportMatrix::uniform(full()).set(WORD_ENGINE, partial().note("Whole pixel values only")),
    ));

    entries.push(CompatibilityInfo::new(
        "text-align",
        FeatureCategory::Typography,
        "Horizontal alignment of inline content",
        SupportMatrix::uniform(full()),
    ));

    entries.push(CompatibilityInfo::new(
        "color",
        FeatureCategory::Typography,
        "Foreground text colour",
        SupportMatrix::uniform(full()),
    ));

    // Backgrounds
    entries.push(CompatibilityInfo::new(
        "background-color",
        FeatureCategory::Backgrounds,
        "Solid background fill",
        SupportMatrix::uniform(full()),
    ));

    entries.push(
        CompatibilityInfo::new(
            "background-image",
            FeatureCategory::Backgrounds,
            "Image painted behind element content",
            SupportMatrix::uniform(full().reference(&reference("css-background-image")))
                .set(
                    WORD_ENGINE,
                    partial()
                        .note("Only through VML fills")
                        .workaround("Use a VML v:rect with v:fill"),
                )
                .set(&[GmailAndroid], partial().note("Not shown for non-Google accounts")),
        )
        .with_notes(&["Always set a fallback background-color"])
        .with_alternatives(&["background-color fallback", "bgcolor attribute on the table cell"]),
    );

    // Borders
    entries.push(
        CompatibilityInfo::new(
            "border-radius",
            FeatureCategory::Borders,
            "Rounded element corners",
            SupportMatrix::uniform(full().reference(&reference("css-border-radius")))
                .set(WORD_ENGINE, word_none("Use a VML v:roundrect")),
        )
        .with_alternatives(&["Square corners", "VML roundrect in MSO conditionals"]),
    );

    entries.push(CompatibilityInfo::new(
        "border",
        FeatureCategory::Borders,
        "Element border shorthand",
        SupportMatrix::uniform(full())
            .set(WORD_ENGINE, partial().note("Borders on <div> and <span> are dropped")),
    ));

    // Effects
    entries.push(
        CompatibilityInfo::new(
            "box-shadow",
            FeatureCategory::Effects,
            "Drop shadows around an element box",
            SupportMatrix::uniform(none().workaround("Use a solid border instead"))
                .set(&[AppleMailMacos, OutlookMac, Thunderbird, AppleMailIos, SamsungEmail, OutlookIos], full())
                .set(&[GmailWeb, OutlookCom, YahooMail], partial().note("Inset shadows are removed"))
                .set(WORD_ENGINE, word_none("Use a VML shadow or a solid border")),
        )
        .with_alternatives(&["Solid border", "Shadow baked into an image"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "text-shadow",
            FeatureCategory::Effects,
            "Shadows behind text glyphs",
            SupportMatrix::uniform(full())
                .set(WORD_ENGINE, word_none("Use a contrasting text colour"))
                .set(GMAIL, none().note("Stripped by the sanitizer"))
                .set(&[OutlookIos, OutlookAndroid], none()),
        )
        .with_alternatives(&["Contrasting text colour"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "opacity",
            FeatureCategory::Effects,
            "Element transparency",
            SupportMatrix::uniform(full())
                .set(WORD_ENGINE, word_none("Pre-blend colours against the background"))
                .set(&[OutlookCom], partial().note("Only on images")),
        )
        .with_alternatives(&["Pre-blended solid colours"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "transform",
            FeatureCategory::Effects,
            "2D and 3D element transforms",
            SupportMatrix::uniform(full())
                .set(WORD_ENGINE, word_none("Rotate or scale the asset before sending"))
                .set(&[YahooMail, AolMail], none())
                .set(GMAIL, partial().note("Only 2D transforms survive"))
                .set(&[OutlookCom], partial().note("Only 2D transforms survive")),
        )
        .with_alternatives(&["Pre-transformed images"]),
    );

    // Animation
    entries.push(
        CompatibilityInfo::new(
            "animation",
            FeatureCategory::Animation,
            "Keyframe animations",
            SupportMatrix::uniform(none().workaround("Use an animated GIF"))
                .set(BROWSER_ENGINE, full())
                .set(&[AolMail], unknown()),
        )
        .with_notes(&["Design the first frame to stand on its own"])
        .with_alternatives(&["Animated GIF"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "transition",
            FeatureCategory::Animation,
            "Animated changes between property values",
            SupportMatrix::uniform(none())
                .set(BROWSER_ENGINE, full())
                .set(&[OutlookIos], partial().note("Only on :hover for links")),
        )
        .with_alternatives(&["Static hover-free design"]),
    );

    // Media
    entries.push(
        CompatibilityInfo::new(
            "@media",
            FeatureCategory::Media,
            "Media queries for responsive layouts",
            SupportMatrix::uniform(full())
                .set(WORD_ENGINE, word_none("Build mobile-first fluid layouts"))
                .set(&[GmailAndroid], partial().note("Not applied for non-Google accounts"))
                .set(&[YahooMail], partial().note("Only min-width and max-width queries")),
        )
        .with_alternatives(&["Fluid hybrid layout"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "object-fit",
            FeatureCategory::Media,
            "How replaced content fits its box",
            SupportMatrix::uniform(none().workaround("Crop images to their display size"))
                .set(BROWSER_ENGINE, full())
                .set(&[AolMail, OutlookAndroid], unknown()),
        )
        .with_alternatives(&["Images exported at display size"]),
    );

    entries.push(
        CompatibilityInfo::new(
            "@container",
            FeatureCategory::Media,
            "Container queries",
            SupportMatrix::uniform(unknown().note("No published test results")),
        )
        .with_notes(&["Treat as unsupported until clients are tested"])
        .with_alternatives(&["@media queries"]),
    );

    entries
}

/// Clients with the given level for a builtin feature; handy in tests
#[cfg(test)]
pub(crate) fn clients_with(
    info: &CompatibilityInfo,
    level: super::features::SupportLevel,
) -> Vec<super::clients::EmailClient> {
    info.support
        .iter()
        .filter(|(_, s)| s.level == level)
        .map(|(c, _)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::clients::EmailClient;
    use crate::compat::features::{KnowledgeBase, SupportLevel};

    #[test]
    fn test_builtin_entries_are_unique() {
        let entries = builtin_entries();
        assert!(KnowledgeBase::from_entries(entries).is_ok());
    }

    #[test]
    fn test_position_is_not_tracked() {
        assert!(!KnowledgeBase::builtin().has_feature("position"));
    }

    #[test]
    fn test_word_engine_drops_border_radius() {
        let kb = KnowledgeBase::builtin();
        let info = kb.feature_info("border-radius").unwrap();
        let missing = clients_with(info, SupportLevel::None);
        assert_eq!(missing, WORD_ENGINE.to_vec());
        assert!(info.support.get(Outlook2019).workarounds[0].contains("VML"));
    }

    #[test]
    fn test_container_queries_are_untested_everywhere() {
        let kb = KnowledgeBase::builtin();
        let info = kb.feature_info("@container").unwrap();
        assert_eq!(clients_with(info, SupportLevel::Unknown).len(), EmailClient::COUNT);
    }

    #[test]
    fn test_every_entry_has_description() {
        for entry in KnowledgeBase::builtin().entries() {
            assert!(!entry.description.is_empty(), "{}", entry.feature);
        }
    }
}
