//! OpenDART corporate directory (`CORPCODE.xml`).
//!
//! The service publishes its directory as a zip archive containing a single
//! XML document:
//!
//! ```xml
//! <result>
//!   <list>
//!     <corp_code>00126380</corp_code>
//!     <corp_name>삼성전자</corp_name>
//!     <stock_code>005930</stock_code>
//!     <modify_date>20230110</modify_date>
//!   </list>
//! </result>
//! ```

use async_trait::async_trait;
use finstate_core::{CorporateDirectoryEntry, DirectorySource, FinstateError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::check_status;

/// Zip local-file-header magic.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Parses a `CORPCODE.xml` document into directory entries, in document order.
///
/// The service answers a rejected download with a `<result>` document that
/// carries `<status>` and `<message>` instead of `<list>` entries; a non-success
/// status is returned as the matching error.
pub fn parse_corp_codes(xml: &str) -> Result<Vec<CorporateDirectoryEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<CorporateDirectoryEntry> = None;
    let mut field: Option<Vec<u8>> = None;
    let mut status: Option<String> = None;
    let mut message = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                if name == b"list" {
                    current = Some(CorporateDirectoryEntry::default());
                } else {
                    field = Some(name);
                }
            }
            Ok(Event::Text(t)) => {
                let Some(name) = field.as_deref() else {
                    continue;
                };
                let text = t
                    .unescape()
                    .map_err(|e| FinstateError::Parse(format!("corp code XML: {e}")))?;
                let text = text.trim();
                match (current.as_mut(), name) {
                    (Some(entry), b"corp_code") => entry.identifier = text.to_string(),
                    (Some(entry), b"corp_name") => entry.display_name = text.to_string(),
                    (Some(entry), b"stock_code") if !text.is_empty() => {
                        entry.stock_code = Some(text.to_string());
                    }
                    (Some(entry), b"modify_date") => entry.modify_date = Some(text.to_string()),
                    (None, b"status") => status = Some(text.to_string()),
                    (None, b"message") => message = text.to_string(),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"list" {
                    if let Some(entry) = current.take() {
                        if !entry.identifier.is_empty() {
                            entries.push(entry);
                        }
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(FinstateError::Parse(format!(
                    "corp code XML error at position {}: {e}",
                    reader.error_position()
                )));
            }
        }
    }

    if let Some(status) = status {
        check_status(&status, &message)?;
    }

    debug!("Parsed {} corporate directory entries", entries.len());
    Ok(entries)
}

/// Extracts the first XML document from a corp code zip archive.
pub fn extract_corp_code_xml(archive: &[u8]) -> Result<String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| FinstateError::Parse(format!("corp code archive: {e}")))?;

    for i in 0..zip.len() {
        let mut file = zip
            .by_index(i)
            .map_err(|e| FinstateError::Parse(format!("corp code archive entry: {e}")))?;
        if !file.name().to_ascii_lowercase().ends_with(".xml") {
            continue;
        }

        let mut xml = String::new();
        file.read_to_string(&mut xml)?;
        return Ok(xml);
    }

    Err(FinstateError::Parse(
        "corp code archive contains no XML document".to_string(),
    ))
}

/// Parses a corp code payload that may be either the zip archive or bare XML.
pub fn parse_corp_code_payload(payload: &[u8]) -> Result<Vec<CorporateDirectoryEntry>> {
    if payload.starts_with(ZIP_MAGIC) {
        let xml = extract_corp_code_xml(payload)?;
        return parse_corp_codes(&xml);
    }

    let xml = std::str::from_utf8(payload)
        .map_err(|e| FinstateError::Parse(format!("corp code XML is not UTF-8: {e}")))?;
    parse_corp_codes(xml)
}

/// Corporate directory read from a local `CORPCODE.xml` or `corpCode.zip`.
#[derive(Debug, Clone)]
pub struct CorpCodeFile {
    path: PathBuf,
}

impl CorpCodeFile {
    /// Creates a directory source backed by the given file.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DirectorySource for CorpCodeFile {
    async fn load_directory(&self) -> Result<Vec<CorporateDirectoryEntry>> {
        debug!("Loading corporate directory from {}", self.path.display());
        let payload = tokio::fs::read(&self.path).await?;
        parse_corp_code_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<result>
    <list>
        <corp_code>00126380</corp_code>
        <corp_name>삼성전자</corp_name>
        <stock_code>005930</stock_code>
        <modify_date>20230110</modify_date>
    </list>
    <list>
        <corp_code>00434003</corp_code>
        <corp_name>다코</corp_name>
        <stock_code> </stock_code>
        <modify_date>20170630</modify_date>
    </list>
    <list>
        <corp_code>00164779</corp_code>
        <corp_name>에스케이하이닉스&amp;Co</corp_name>
        <stock_code>000660</stock_code>
        <modify_date>20230303</modify_date>
    </list>
</result>"#;

    #[test]
    fn test_parse_corp_codes() {
        let entries = parse_corp_codes(SAMPLE).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].identifier, "00126380");
        assert_eq!(entries[0].display_name, "삼성전자");
        assert_eq!(entries[0].stock_code.as_deref(), Some("005930"));
        assert_eq!(entries[0].modify_date.as_deref(), Some("20230110"));
        assert!(!entries[1].is_listed());
        assert_eq!(entries[2].display_name, "에스케이하이닉스&Co");
    }

    #[test]
    fn test_parse_malformed_xml() {
        let result = parse_corp_codes("<result><list><corp_code>1</corp_name></list>");
        assert!(matches!(result, Err(FinstateError::Parse(_))));
    }

    #[test]
    fn test_payload_from_zip() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file("CORPCODE.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(SAMPLE.as_bytes()).unwrap();
            writer.finish().unwrap();
        }

        let entries = parse_corp_code_payload(buf.get_ref()).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_payload_from_plain_xml() {
        let entries = parse_corp_code_payload(SAMPLE.as_bytes()).unwrap();
        assert_eq!(entries[1].identifier, "00434003");
    }

    #[test]
    fn test_status_document_is_an_error() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<result>
    <status>010</status>
    <message>등록되지 않은 키입니다.</message>
</result>"#;

        let result = parse_corp_code_payload(xml.as_bytes());
        match result {
            Err(FinstateError::AuthenticationFailed { message, .. }) => {
                assert_eq!(message, "등록되지 않은 키입니다.");
            }
            other => panic!("expected AuthenticationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_status_document_other_codes() {
        let limited = parse_corp_codes(
            "<result><status>020</status><message>요청 제한을 초과하였습니다.</message></result>",
        );
        assert!(matches!(limited, Err(FinstateError::RateLimited { .. })));

        let outage =
            parse_corp_codes("<result><status>800</status><message>시스템 점검 중</message></result>");
        assert!(matches!(outage, Err(FinstateError::Api { .. })));
    }

    #[test]
    fn test_success_status_with_entries() {
        let xml = "<result><status>000</status><message>정상</message>\
                   <list><corp_code>00126380</corp_code><corp_name>삼성전자</corp_name></list></result>";
        let entries = parse_corp_codes(xml).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_corp_code_file_missing() {
        let source = CorpCodeFile::new("/nonexistent/CORPCODE.xml");
        let result = source.load_directory().await;
        assert!(matches!(result, Err(FinstateError::Io(_))));
    }
}
