//! Property tests for statistics, scoring and the checker

use mailcompat::compat::report::overall_score;
use mailcompat::compat::{ComplianceChecker, EmailClient, LevelBucket, SupportQuery};
use mailcompat::document::Node;
use proptest::prelude::*;
use std::collections::HashSet;

fn style_entry() -> impl Strategy<Value = (String, String)> {
    let property = prop::sample::select(vec![
        "display",
        "position",
        "float",
        "z-index",
        "transform",
        "box-shadow",
        "opacity",
        "flex-wrap",
        "gap",
        "grid",
        "color",
        "margin",
    ]);
    let value = prop::sample::select(vec!["flex", "grid", "block", "absolute", "static", "", "1"]);
    (property, value).prop_map(|(p, v)| (p.to_string(), v.to_string()))
}

fn attr_entry() -> impl Strategy<Value = (String, String)> {
    let name = prop::sample::select(vec!["src", "alt", "width", "height", "text", "content"]);
    let value = prop::sample::select(vec![
        "https://cdn.test/a.png".to_string(),
        "/local.png".to_string(),
        "".to_string(),
        "Label".to_string(),
        "y".repeat(1200),
    ]);
    (name, value).prop_map(|(n, v)| (n.to_string(), v))
}

fn leaf() -> impl Strategy<Value = Node> {
    let node_type = prop::sample::select(vec!["container", "image", "button", "link", "text", "divider"]);
    (
        "[a-z]{1,6}",
        node_type,
        prop::collection::vec(style_entry(), 0..4),
        prop::collection::vec(attr_entry(), 0..4),
    )
        .prop_map(|(id, node_type, styles, attrs)| {
            let mut node = Node::new(&id, node_type);
            for (property, value) in styles {
                node = node.style(&property, value);
            }
            for (name, value) in attrs {
                node = node.attr(&name, value);
            }
            node
        })
}

fn tree() -> impl Strategy<Value = Vec<Node>> {
    let node = leaf().prop_recursive(4, 40, 4, |inner| {
        (leaf(), prop::collection::vec(inner, 0..4)).prop_map(|(mut node, children)| {
            node.children = children;
            node
        })
    });
    prop::collection::vec(node, 0..5)
}

#[test]
fn statistics_counts_cover_catalog() {
    let query = SupportQuery::builtin();
    for feature in query.knowledge_base().all_features() {
        let stats = query.compute_statistics(feature).unwrap();
        assert_eq!(stats.total_targets, EmailClient::COUNT);
        assert_eq!(
            stats.full_count + stats.partial_count + stats.none_count + stats.unknown_count,
            stats.total_targets
        );
        assert!(stats.score <= 100);
        assert_eq!(
            stats.level_bucket == LevelBucket::Unknown,
            stats.unknown_count == stats.total_targets
        );
    }
}

#[test]
fn client_workarounds_are_subset_of_all() {
    let query = SupportQuery::builtin();
    for feature in query.knowledge_base().all_features() {
        let all = query.workarounds(feature, None);
        let unique: HashSet<&String> = all.iter().collect();
        assert_eq!(unique.len(), all.len(), "duplicates for {}", feature);
        for client in EmailClient::ALL {
            for workaround in query.workarounds(feature, Some(client)) {
                assert!(all.contains(&workaround));
            }
        }
    }
}

proptest! {
    #[test]
    fn overall_score_is_bounded_and_monotonic(
        critical in 0usize..20,
        warnings in 0usize..40,
        suggestions in 0usize..120,
    ) {
        let score = overall_score(critical, warnings, suggestions);
        prop_assert!(score <= 100);
        prop_assert!(overall_score(critical + 1, warnings, suggestions) <= score);
        prop_assert!(overall_score(critical, warnings + 1, suggestions) <= score);
        prop_assert!(overall_score(critical, warnings, suggestions + 1) <= score);
    }

    #[test]
    fn report_invariants_hold(nodes in tree()) {
        let report = ComplianceChecker::new().check_template(&nodes);

        prop_assert!(report.overall_score <= 100);
        prop_assert_eq!(report.safe_to_export, report.issues.critical.is_empty());
        prop_assert_eq!(report.total_issues, report.issues.len());
        prop_assert_eq!(report.components_checked, nodes.len());
        prop_assert_eq!(
            report.nodes_visited,
            nodes.iter().map(Node::subtree_len).sum::<usize>()
        );

        let ids: HashSet<&str> = report.issues.iter().map(|i| i.id.as_str()).collect();
        prop_assert_eq!(ids.len(), report.total_issues);
    }

    #[test]
    fn check_is_idempotent(nodes in tree()) {
        let checker = ComplianceChecker::new();
        let first = checker.check_template(&nodes);
        let mut second = checker.check_template(&nodes);
        second.timestamp = first.timestamp;
        prop_assert_eq!(first, second);
    }
}
