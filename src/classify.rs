//! Keyword classification of articles.
//!
//! Severity and category assignment are both driven by static keyword
//! tables so the lexicons stay testable in isolation. Severity groups are
//! evaluated in strict priority order — the first group with any match
//! wins. Category groups are independent: a text may match any number of
//! them, and matching none of them leaves the fallback to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slug assigned when no category keywords match, provided it exists in
/// storage at persist time.
pub const FALLBACK_CATEGORY: &str = "general";

/// Severity level of an article, default `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    /// Parse a stored severity value. Unknown strings read back as `Info`,
    /// the enumeration's default level.
    pub fn from_db(s: &str) -> Self {
        match s {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity keyword groups, highest priority first.
const SEVERITY_RULES: &[(Severity, &[&str])] = &[
    (
        Severity::Critical,
        &["critical", "emergency", "zero-day", "ransomware", "major breach"],
    ),
    (
        Severity::High,
        &["high severity", "vulnerability", "exploit", "breach", "attack"],
    ),
    (
        Severity::Medium,
        &["medium severity", "update", "patch", "security issue"],
    ),
    (Severity::Low, &["low severity", "minor", "informational"]),
];

/// Category keyword groups, keyed by slug. Order here only determines the
/// order of the returned slugs — groups are not mutually exclusive.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "vulnerabilities",
        &["vulnerability", "cve", "exploit", "zero-day", "patch"],
    ),
    (
        "data-breaches",
        &["breach", "leak", "exposed", "stolen", "compromised"],
    ),
    (
        "malware",
        &["malware", "ransomware", "trojan", "virus", "botnet"],
    ),
    (
        "security-tools",
        &["tool", "software", "solution", "platform", "scanner"],
    ),
    (
        "best-practices",
        &["best practice", "guideline", "recommendation", "tips", "how to"],
    ),
    (
        "threats",
        &["threat", "attack", "campaign", "actor", "apt"],
    ),
];

/// Derive a severity level from article text (title + description).
///
/// Case-insensitive substring match against the severity groups in priority
/// order; the first group with any hit wins. No hit yields `Info`.
pub fn classify_severity(text: &str) -> Severity {
    let lower = text.to_lowercase();
    for (severity, keywords) in SEVERITY_RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *severity;
        }
    }
    Severity::Info
}

/// Derive the set of matching category slugs from article text.
///
/// Every group is evaluated independently; the result preserves table order
/// and contains no duplicates. An empty result means the caller should fall
/// back to [`FALLBACK_CATEGORY`].
pub fn classify_categories(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    CATEGORY_RULES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(slug, _)| *slug)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_critical_keywords() {
        assert_eq!(classify_severity("Zero-day found in router firmware"), Severity::Critical);
        assert_eq!(classify_severity("new RANSOMWARE strain"), Severity::Critical);
        assert_eq!(classify_severity("major breach at hosting provider"), Severity::Critical);
    }

    #[test]
    fn test_severity_precedence_critical_over_high() {
        // Contains both a critical keyword (zero-day) and a high keyword (exploit)
        let text = "zero-day exploit chain detailed";
        assert_eq!(classify_severity(text), Severity::Critical);
    }

    #[test]
    fn test_severity_high() {
        assert_eq!(classify_severity("vulnerability disclosed in VPN client"), Severity::High);
        assert_eq!(classify_severity("supply chain attack hits registry"), Severity::High);
    }

    #[test]
    fn test_severity_medium() {
        assert_eq!(classify_severity("vendor ships security issue fix"), Severity::Medium);
        assert_eq!(classify_severity("monthly update released"), Severity::Medium);
    }

    #[test]
    fn test_severity_low() {
        assert_eq!(classify_severity("minor configuration change"), Severity::Low);
        assert_eq!(classify_severity("informational advisory published"), Severity::Low);
    }

    #[test]
    fn test_severity_default_info() {
        assert_eq!(classify_severity("company announces new office"), Severity::Info);
        assert_eq!(classify_severity(""), Severity::Info);
    }

    #[test]
    fn test_severity_case_insensitive() {
        assert_eq!(classify_severity("CRITICAL flaw"), Severity::Critical);
    }

    #[test]
    fn test_categories_non_exclusive() {
        let slugs = classify_categories("ransomware exploit leak");
        assert!(slugs.contains(&"malware"));
        assert!(slugs.contains(&"vulnerabilities"));
        assert!(slugs.contains(&"data-breaches"));
    }

    #[test]
    fn test_categories_single_match() {
        let slugs = classify_categories("new scanner released");
        assert_eq!(slugs, vec!["security-tools"]);
    }

    #[test]
    fn test_categories_no_match_is_empty() {
        assert!(classify_categories("quarterly earnings report").is_empty());
    }

    #[test]
    fn test_categories_multiword_keyword() {
        let slugs = classify_categories("best practice for key rotation");
        assert!(slugs.contains(&"best-practices"));
    }

    #[test]
    fn test_categories_no_duplicates() {
        // Two keywords from the same group must yield the slug once
        let slugs = classify_categories("trojan and botnet activity");
        assert_eq!(slugs.iter().filter(|s| **s == "malware").count(), 1);
    }

    #[test]
    fn test_severity_from_db_roundtrip() {
        for s in [Severity::Critical, Severity::High, Severity::Medium, Severity::Low, Severity::Info] {
            assert_eq!(Severity::from_db(s.as_str()), s);
        }
        assert_eq!(Severity::from_db("garbage"), Severity::Info);
    }
}
