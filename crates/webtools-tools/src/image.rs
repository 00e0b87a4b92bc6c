//! Conversion between CDN image keys and their delivery URLs.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

pub const KEY_PREFIX: &str = "flippop/image/";
const IMAGE_PROCESSING: &str = "cdn-cgi/image/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdnConfig {
    pub base: String,
    pub alternate: String,
    pub webp_q75: String,
    pub width_400_q75: String,
    pub width_800_q85: String,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            base: "https://cdn.lokboxes.ai/".to_string(),
            alternate: "https://cdn.flippop.fun/".to_string(),
            webp_q75: "cdn-cgi/image/quality=75,format=webp/".to_string(),
            width_400_q75: "cdn-cgi/image/width=400,quality=75/".to_string(),
            width_800_q85: "cdn-cgi/image/width=800,quality=85/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlItem {
    pub label: &'static str,
    pub url: String,
    pub icon: &'static str,
}

impl CdnConfig {
    pub fn key_to_urls(&self, key: &str) -> Result<Vec<UrlItem>> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ToolError::EmptyInput);
        }
        let item = |label, prefix: &str, preset: &str, icon| UrlItem {
            label,
            url: format!("{prefix}{preset}{key}"),
            icon,
        };
        Ok(vec![
            item("Original CDN", &self.base, "", "globe"),
            item("French CDN", &self.alternate, "", "flag"),
            item("Optimized (WebP, quality 75)", &self.base, &self.webp_q75, "compress"),
            item("Optimized (width 400)", &self.base, &self.width_400_q75, "expand-arrows-alt"),
            item("Optimized (width 800)", &self.base, &self.width_800_q85, "tv"),
        ])
    }
}

fn cdn_host_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^cdn\.(lokboxes|flippop)\.(ai|fun)/").unwrap())
}

/// All delivery URLs for a key, using the default CDNs.
pub fn key_to_urls(key: &str) -> Result<Vec<UrlItem>> {
    CdnConfig::default().key_to_urls(key)
}

/// Recover the storage key from any of the URLs produced by [`key_to_urls`].
pub fn url_to_key(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ToolError::EmptyInput);
    }
    if url.starts_with(KEY_PREFIX) {
        return Ok(url.to_string());
    }

    let without_suffix = url.split(['?', '#']).next().unwrap_or(url);
    let without_scheme = without_suffix
        .strip_prefix("https://")
        .or_else(|| without_suffix.strip_prefix("http://"))
        .unwrap_or(without_suffix);
    let mut key = match without_scheme.find('/') {
        Some(i) => &without_scheme[i + 1..],
        None => without_scheme,
    }
    .to_string();

    // cdn-cgi/image/<options>/<key>
    if key.contains(IMAGE_PROCESSING) {
        let parts: Vec<&str> = key.split('/').collect();
        if let Some(idx) = parts.iter().position(|p| p.contains("cdn-cgi")) {
            key = parts.get(idx + 3..).map(|rest| rest.join("/")).unwrap_or_default();
        }
    }

    let key = cdn_host_regex().replace(&key, "").into_owned();
    if !key.starts_with(KEY_PREFIX) {
        return Err(ToolError::InvalidUrl(url.to_string()));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const KEY: &str = "flippop/image/item/story/1996218524934668288/202512040537/6b3b2b76167b42c6a7ecfbb480e78219.jpeg";

    #[test]
    fn test_key_to_urls() {
        let urls = key_to_urls(KEY).unwrap();
        let got: Vec<&str> = urls.iter().map(|u| u.url.as_str()).collect();
        assert_eq!(
            got,
            vec![
                format!("https://cdn.lokboxes.ai/{KEY}"),
                format!("https://cdn.flippop.fun/{KEY}"),
                format!("https://cdn.lokboxes.ai/cdn-cgi/image/quality=75,format=webp/{KEY}"),
                format!("https://cdn.lokboxes.ai/cdn-cgi/image/width=400,quality=75/{KEY}"),
                format!("https://cdn.lokboxes.ai/cdn-cgi/image/width=800,quality=85/{KEY}"),
            ]
        );
        assert_eq!(urls[4].icon, "tv");
    }

    #[test]
    fn test_every_generated_url_maps_back() {
        for item in key_to_urls(KEY).unwrap() {
            assert_eq!(url_to_key(&item.url).unwrap(), KEY, "url {}", item.url);
        }
    }

    #[test]
    fn test_url_to_key_variants() {
        assert_eq!(url_to_key(KEY).unwrap(), KEY);
        assert_eq!(url_to_key(&format!("http://cdn.flippop.fun/{KEY}?v=2#top")).unwrap(), KEY);
    }

    #[test]
    fn test_url_to_key_rejects_foreign_paths() {
        assert!(matches!(
            url_to_key("https://example.com/images/cat.png"),
            Err(ToolError::InvalidUrl(_))
        ));
        assert!(matches!(
            url_to_key("https://cdn.lokboxes.ai/cdn-cgi/image/quality=75"),
            Err(ToolError::InvalidUrl(_))
        ));
        assert!(matches!(url_to_key("  "), Err(ToolError::EmptyInput)));
    }
}
