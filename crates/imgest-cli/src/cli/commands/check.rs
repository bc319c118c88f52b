//! `imgest check` – print the policy decision for a URL.

use imgest_core::config::IngestConfig;
use imgest_core::policy;

/// One-line verdict, e.g. `rejected: https://x/a.png (host x is excluded)`.
pub fn verdict(site_origin: &str, ingest: &IngestConfig, url: &str) -> String {
    let decision = policy::evaluate(url, site_origin, &ingest.excluded_domains);
    let verdict = if decision.allowed { "allowed" } else { "rejected" };
    format!("{verdict}: {} ({})", url, decision.reason)
}

pub fn run_check(site_origin: &str, ingest: &IngestConfig, url: &str) {
    println!("{}", verdict(site_origin, ingest, url));
}
