use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::{FailureKind, FetchError};

/// How far into the document a `<meta charset>` declaration is looked for.
const META_SNIFF_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

/// Decode a response body into UTF-8.
///
/// Order: BOM, Content-Type charset, `<meta charset>`, chardetng guess.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedHtml, FetchError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    let declared = content_type
        .and_then(charset_param)
        .or_else(|| meta_charset(bytes))
        .and_then(|label| Encoding::for_label(label.as_bytes()));
    if let Some(encoding) = declared {
        return decode_with(bytes, encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    (!label.is_empty()).then_some(label)
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedHtml, FetchError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(FetchError::new(
            FailureKind::Decode {
                encoding: encoding.name().to_string(),
            },
            "malformed byte sequence",
        ));
    }
    Ok(DecodedHtml {
        html: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{charset_param, decode_html, meta_charset};

    #[test]
    fn header_charset_wins_over_detection() {
        let decoded = decode_html(b"caf\xe9", Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(decoded.html, "café");
    }

    #[test]
    fn bom_is_honoured() {
        let decoded = decode_html(b"\xEF\xBB\xBFhello", Some("text/html")).unwrap();
        assert_eq!(decoded.html, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn meta_charset_is_used_without_header() {
        let html = b"<html><head><meta charset=\"windows-1252\"></head><body>caf\xe9</body></html>";
        let decoded = decode_html(html, None).unwrap();
        assert!(decoded.html.contains("café"));
        assert_eq!(decoded.encoding_label, "windows-1252");
    }

    #[test]
    fn charset_lookups() {
        assert_eq!(charset_param("text/html; Charset=\"utf-8\"").as_deref(), Some("utf-8"));
        assert_eq!(charset_param("text/html"), None);
        assert_eq!(
            meta_charset(br#"<meta http-equiv="Content-Type" content="text/html; charset=UTF-8">"#)
                .as_deref(),
            Some("utf-8")
        );
    }

    #[test]
    fn invalid_utf8_is_a_decode_failure() {
        let err = decode_html(b"ok \xc3\x28", Some("text/html; charset=utf-8")).unwrap_err();
        assert!(matches!(err.kind, crate::FailureKind::Decode { .. }));
    }
}
