use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde_json::Value;
use tokio::fs;

use backend_domain::{ReportDocument, ScanId};

pub fn default_report_path(extension: &str) -> PathBuf {
    PathBuf::from(format!("scan_report.{}", extension))
}

/// Object storage key a report is uploaded under.
pub fn upload_key(scan_id: &ScanId, extension: &str) -> String {
    format!("reports/{}.{}", scan_id, extension)
}

pub async fn write_report(path: &Path, document: &ReportDocument) -> Result<()> {
    let content = serde_json::to_vec_pretty(document)?;
    write_bytes(path, &content).await
}

/// Writes a report the engine rendered itself, unchanged.
pub async fn write_report_text(path: &Path, content: &str) -> Result<()> {
    write_bytes(path, content.as_bytes()).await
}

async fn write_bytes(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, content)
        .await
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(())
}

/// Reads a persisted JSON report, gunzipping it when it carries the gzip magic bytes.
pub async fn read_report(path: &Path) -> Result<Value> {
    let raw = fs::read(path)
        .await
        .with_context(|| format!("failed to read report {}", path.display()))?;
    let bytes = maybe_gunzip(raw)?;
    let document = serde_json::from_slice(&bytes)
        .with_context(|| format!("report {} is not valid JSON", path.display()))?;
    Ok(document)
}

pub fn maybe_gunzip(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if bytes.len() < 2 || bytes[0] != 0x1f || bytes[1] != 0x8b {
        return Ok(bytes);
    }
    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use backend_domain::{build_report, Finding, ReportFormat, RiskLevel};
    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;

    fn finding() -> Finding {
        Finding {
            alert: "XSS".to_string(),
            risk: RiskLevel::Medium,
            confidence: "Low".to_string(),
            description: "reflected".to_string(),
            solution: "encode".to_string(),
            url: "https://a.test/?q=1".to_string(),
            cweid: Some("79".to_string()),
            wascid: Some("8".to_string()),
            reported_risk: None,
        }
    }

    #[test]
    fn paths_and_keys_follow_format_extension() {
        let id = ScanId::from("abc");
        assert_eq!(
            default_report_path(ReportFormat::Sarif.extension()),
            PathBuf::from("scan_report.sarif")
        );
        assert_eq!(upload_key(&id, "html"), "reports/abc.html");
    }

    #[tokio::test]
    async fn engine_report_text_is_written_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("scan_report.json");
        let native = r#"{"site":[{"alerts":[{"name":"A","riskcode":"2"}]}]}"#;
        write_report_text(&path, native).await.expect("write");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), native);
        let value = read_report(&path).await.expect("parse");
        assert_eq!(value["site"][0]["alerts"][0]["name"], "A");
    }

    #[tokio::test]
    async fn written_report_reads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("report.sarif");
        let document = build_report(ReportFormat::Sarif, &ScanId::from("abc"), vec![finding()]);
        write_report(&path, &document).await.expect("write");

        let value = read_report(&path).await.expect("read");
        assert_eq!(value["version"], "2.1.0");
        assert_eq!(value["runs"][0]["results"][0]["ruleId"], "79");
    }

    #[tokio::test]
    async fn gzipped_report_is_decoded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"{\"site\": []}").expect("gzip");
        std::fs::write(&path, encoder.finish().expect("finish")).expect("write");

        let value = read_report(&path).await.expect("read");
        assert!(value["site"].is_array());
    }

    #[test]
    fn plain_bytes_pass_through() {
        assert_eq!(maybe_gunzip(b"{}".to_vec()).expect("plain"), b"{}".to_vec());
    }
}
