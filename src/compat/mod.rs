//! Email-client compatibility analysis
//!
//! This module answers one question: will a composed document render
//! acceptably across the supported email clients?
//!
//! - `features`: the static knowledge base of per-client support
//! - `database`: statistics and queries over the knowledge base
//! - `analyzer`: walks a document tree and raises issues
//! - `report`: severity buckets, overall score and export gate

pub mod clients;
pub mod features;
mod catalog;
pub mod database;
pub mod analyzer;
pub mod report;
pub mod fixes;

pub use clients::{EmailClient, PlatformGroup};
pub use features::{CompatibilityInfo, FeatureCategory, KnowledgeBase, PropertySupport, SupportLevel};
pub use database::{FeatureQuery, LevelBucket, SupportQuery, SupportStatistics, SupportSummary};
pub use analyzer::{CheckerConfig, ComplianceChecker};
pub use report::{CompatibilityIssue, CompatibilityReport, IssueCategory, Severity};
