//! Per-request token table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::source::{Clock, TokenSource};
use crate::url_model::{file_stem, filename_from_url_path, origin_of};

/// Length of the `%random%` token.
const RANDOM_TOKEN_LEN: usize = 8;
/// Length of the token used when a filename resolves to nothing.
const FALLBACK_TOKEN_LEN: usize = 16;

/// The document an image is being ingested for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContext {
    pub id: u64,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Resolved values for every supported placeholder, built fresh per request.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    values: Vec<(&'static str, String)>,
    fallback: String,
}

impl TemplateContext {
    /// Build the token table. Clock and token source are read exactly once
    /// here; resolution afterwards is pure.
    pub fn build(
        source_url: &str,
        alt_hint: &str,
        document: &DocumentContext,
        site_origin: &str,
        clock: &dyn Clock,
        tokens: &dyn TokenSource,
    ) -> Self {
        let now = clock.now();
        let created = document.created_at;
        let stem = filename_from_url_path(source_url)
            .map(|name| file_stem(&name).to_string())
            .unwrap_or_default();

        let values = vec![
            ("%filename%", stem),
            ("%image_alt%", alt_hint.to_string()),
            ("%today_date%", now.format("%Y-%m-%d").to_string()),
            ("%today_day%", now.format("%d").to_string()),
            ("%year%", now.format("%Y").to_string()),
            ("%month%", now.format("%m").to_string()),
            ("%post_date%", created.format("%Y-%m-%d").to_string()),
            ("%post_year%", created.format("%Y").to_string()),
            ("%post_month%", created.format("%m").to_string()),
            ("%post_day%", created.format("%d").to_string()),
            ("%random%", tokens.token(RANDOM_TOKEN_LEN)),
            ("%timestamp%", now.timestamp().to_string()),
            ("%post_name%", document.slug.clone()),
            ("%post_id%", document.id.to_string()),
            ("%url%", origin_of(site_origin).unwrap_or_default()),
        ];

        Self {
            values,
            fallback: tokens.token(FALLBACK_TOKEN_LEN),
        }
    }

    /// Value for a full token such as `%post_id%`.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, value)| value.as_str())
    }

    /// Non-empty name used when a filename template sanitizes to nothing.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub(super) fn match_at(&self, rest: &str) -> Option<(&'static str, &str)> {
        self.values
            .iter()
            .find(|(name, _)| rest.starts_with(*name))
            .map(|(name, value)| (*name, value.as_str()))
    }
}
