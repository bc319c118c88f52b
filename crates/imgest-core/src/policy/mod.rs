//! Download eligibility gate.
//!
//! A pure predicate over the source URL, the site's own origin, and the
//! configured exclusion list. It runs before any network access: local media
//! is never re-downloaded and excluded hosts are never contacted.

use std::fmt;

use crate::url_model::{host_of, host_of_lenient, normalize_host};

/// Why a URL was allowed or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyReason {
    Allowed,
    /// The URL has no extractable host (relative, `data:`, unparseable).
    MissingHost,
    /// The URL points at the site itself.
    SameHost,
    /// The URL's host matches an exclusion entry.
    Excluded { domain: String },
}

impl fmt::Display for PolicyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyReason::Allowed => write!(f, "allowed"),
            PolicyReason::MissingHost => write!(f, "URL has no host"),
            PolicyReason::SameHost => write!(f, "URL points at the site's own host"),
            PolicyReason::Excluded { domain } => write!(f, "host {domain} is excluded"),
        }
    }
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: PolicyReason,
}

impl PolicyDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: PolicyReason::Allowed,
        }
    }

    fn reject(reason: PolicyReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// Decides whether `url` may be downloaded.
///
/// `excluded_domains` is newline-delimited; entries are trimmed, blank lines
/// are ignored, and both sides are compared after stripping a leading `www.`.
/// Matching is exact: `notexample.com` is not excluded by `example.com`.
pub fn evaluate(url: &str, site_origin: &str, excluded_domains: &str) -> PolicyDecision {
    let Some(target) = host_of(url).map(|h| normalize_host(&h)) else {
        return PolicyDecision::reject(PolicyReason::MissingHost);
    };

    if let Some(site) = host_of_lenient(site_origin).map(|h| normalize_host(&h)) {
        if site == target {
            return PolicyDecision::reject(PolicyReason::SameHost);
        }
    }

    if let Some(domain) = excluded_hosts(excluded_domains).find(|d| *d == target) {
        return PolicyDecision::reject(PolicyReason::Excluded { domain });
    }

    PolicyDecision::allow()
}

/// Normalized hosts from a newline-delimited exclusion list. Entries may be
/// bare hosts, `host:port`, or full URLs; all normalize like a fetched URL's
/// host (punycode, no port).
pub fn excluded_hosts(list: &str) -> impl Iterator<Item = String> + '_ {
    list.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| host_of_lenient(line).unwrap_or_else(|| line.to_string()))
        .map(|host| normalize_host(&host))
}
