//! Free-text helpers shared by the builtin plugins.

use std::sync::LazyLock;

use regex::Regex;
use vigil_core::constants::{CVE_ID_PATTERN, CVE_STRIP_PATTERN, LINE_BREAK_MARKER};

static CVE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(CVE_ID_PATTERN).ok());
static CVE_STRIP_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(CVE_STRIP_PATTERN).ok());
static TAG_ENTRY_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]\s*:\s*['"]([^'"]*)['"]"#).ok());

/// Tag keys that can name a host, most specific first.
const HOST_TAG_KEYS: [&str; 6] = [
    "Name",
    "Hostname",
    "FQDN",
    "Application",
    "karpenter.sh/nodepool",
    "karpenter.k8s.aws/ec2nodeclass",
];

/// Replace embedded line breaks with the storage-safe marker.
pub fn sanitize_breaks(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', LINE_BREAK_MARKER)
}

/// Pull the first CVE identifier out of a finding title.
pub fn extract_cve(title: &str) -> Option<String> {
    CVE_RE
        .as_ref()?
        .find(title)
        .map(|m| m.as_str().to_string())
}

/// Remove CVE identifiers and their trailing separators from a title.
pub fn strip_cve(title: &str) -> String {
    match CVE_STRIP_RE.as_ref() {
        Some(re) => re.replace_all(title, "").trim().to_string(),
        None => title.trim().to_string(),
    }
}

/// Resolve a display host from an AWS resource-tags blob.
///
/// Tags arrive as a dict-style literal (`{'Name': 'web-1', ...}`). The
/// first key from [`HOST_TAG_KEYS`] present in the blob wins; when none
/// match, the caller-supplied fallback (normally the resource id) is
/// used.
pub fn host_from_tags(tags: &str, fallback: &str) -> String {
    let entries = parse_tag_map(tags);
    for key in HOST_TAG_KEYS {
        if let Some((_, value)) = entries.iter().find(|(k, _)| k == key) {
            return value.clone();
        }
    }
    fallback.to_string()
}

fn parse_tag_map(tags: &str) -> Vec<(String, String)> {
    match TAG_ENTRY_RE.as_ref() {
        Some(re) => re
            .captures_iter(tags)
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .collect(),
        None => Vec::new(),
    }
}
