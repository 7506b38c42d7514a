use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{DocumentError, DocumentFormat};

const BODY_PART: &str = "word/document.xml";

/// Pull the body text out of a `.docx` archive, one line per paragraph.
///
/// `max_body_bytes` bounds the decompressed size of the body part, independent of
/// the size of the archive itself.
pub(super) fn extract_text(bytes: &[u8], max_body_bytes: usize) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(corrupt)?;
    let part = archive.by_name(BODY_PART).map_err(corrupt)?;

    let declared = usize::try_from(part.size()).unwrap_or(usize::MAX);
    if declared > max_body_bytes {
        return Err(DocumentError::TooLarge {
            size: declared,
            limit: max_body_bytes,
        });
    }

    // The declared size can lie; never inflate past the limit.
    let mut buffer = Vec::new();
    part.take(max_body_bytes as u64 + 1)
        .read_to_end(&mut buffer)
        .map_err(|err| corrupt(zip::result::ZipError::Io(err)))?;
    if buffer.len() > max_body_bytes {
        return Err(DocumentError::TooLarge {
            size: buffer.len(),
            limit: max_body_bytes,
        });
    }

    let xml = String::from_utf8(buffer).map_err(|err| DocumentError::Corrupt {
        format: DocumentFormat::Docx,
        detail: err.to_string(),
    })?;
    body_text(&xml)
}

fn corrupt(err: zip::result::ZipError) -> DocumentError {
    DocumentError::Corrupt {
        format: DocumentFormat::Docx,
        detail: err.to_string(),
    }
}

fn xml_error(err: quick_xml::Error) -> DocumentError {
    DocumentError::Corrupt {
        format: DocumentFormat::Docx,
        detail: err.to_string(),
    }
}

/// Visible run text only: `w:t` content, with paragraph, break and tab markers.
///
/// Deleted revisions (`w:delText`) and field codes (`w:instrText`) are skipped.
fn body_text(xml: &str) -> Result<String, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::with_capacity(xml.len() / 4);
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(element) => match element.name().as_ref() {
                b"w:t" => in_run_text = true,
                b"w:br" | b"w:cr" => text.push('\n'),
                b"w:tab" => text.push('\t'),
                _ => {}
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"w:p" | b"w:br" | b"w:cr" => text.push('\n'),
                b"w:tab" => text.push('\t'),
                _ => {}
            },
            Event::End(element) => match element.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(content) if in_run_text => {
                text.push_str(&content.unescape().map_err(xml_error)?);
            }
            Event::CData(content) if in_run_text => {
                text.push_str(&String::from_utf8_lossy(&content));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LIMIT: usize = 1024 * 1024;

    fn docx_with_body(xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file(BODY_PART, zip::write::SimpleFileOptions::default())
                .expect("part starts");
            writer.write_all(xml.as_bytes()).expect("part written");
            writer.finish().expect("archive finishes");
        }
        buffer.into_inner()
    }

    #[test]
    fn paragraphs_become_lines() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>AML Policy Drafting</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve">Risk &amp; Controls</w:t><w:tab/><w:t>v2</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_text(&docx_with_body(xml), LIMIT).expect("docx decodes");
        assert_eq!(text, "AML Policy Drafting\nRisk & Controls\tv2");
    }

    #[test]
    fn archive_without_body_is_corrupt() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file("word/styles.xml", zip::write::SimpleFileOptions::default())
                .expect("part starts");
            writer.finish().expect("archive finishes");
        }

        let err = extract_text(&buffer.into_inner(), LIMIT).expect_err("missing body fails");
        assert!(matches!(err, DocumentError::Corrupt { format: DocumentFormat::Docx, .. }));
    }

    #[test]
    fn non_zip_bytes_are_corrupt() {
        let err = extract_text(b"plain bytes", LIMIT).expect_err("not a zip");
        assert!(matches!(err, DocumentError::Corrupt { .. }));
    }

    #[test]
    fn deleted_revisions_and_field_codes_are_skipped() {
        let xml = r#"<w:document><w:body><w:p><w:del><w:r><w:delText>AML Policy Drafting</w:delText></w:r></w:del><w:r><w:instrText> HYPERLINK "x" </w:instrText></w:r><w:r><w:t>Caf&#233; plan</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_text(&docx_with_body(xml), LIMIT).expect("docx decodes");
        assert_eq!(text, "Café plan");
    }

    #[test]
    fn breaks_and_empty_paragraphs_become_newlines() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>QCB</w:t><w:br/><w:t>Engagement</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>&#x41;WS</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_text(&docx_with_body(xml), LIMIT).expect("docx decodes");
        assert_eq!(text, "QCB\nEngagement\n\nAWS");
    }

    #[test]
    fn expanded_body_is_bounded() {
        let paragraph = "<w:p><w:r><w:t>Transaction Monitoring</w:t></w:r></w:p>".repeat(2_000);
        let xml = format!("<w:document><w:body>{paragraph}</w:body></w:document>");
        let archive = docx_with_body(&xml);
        assert!(archive.len() < 4096, "body compresses well below the limit");

        let err = extract_text(&archive, 4096).expect_err("expanded body over limit");
        assert!(matches!(err, DocumentError::TooLarge { limit: 4096, .. }));
    }

    #[test]
    fn malformed_body_xml_is_corrupt() {
        let xml = "<w:document><w:body><w:p><w:t>open</w:p></w:body>";
        let err = extract_text(&docx_with_body(xml), LIMIT).expect_err("mismatched tags");
        assert!(matches!(err, DocumentError::Corrupt { format: DocumentFormat::Docx, .. }));
    }
}
