// Identifier value objects

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(pub String);

impl ScanId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScanId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Prefixes `https://` when the target does not already carry an http(s) scheme.
pub fn normalize_target_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_https_scheme() {
        assert_eq!(normalize_target_url("example.com"), "https://example.com");
    }

    #[test]
    fn existing_scheme_is_kept() {
        assert_eq!(
            normalize_target_url("http://localhost:8080/app"),
            "http://localhost:8080/app"
        );
        assert_eq!(normalize_target_url(" https://a.test "), "https://a.test");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(ScanId::generate(), ScanId::generate());
    }
}
