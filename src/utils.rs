use std::path::Path;

use time::OffsetDateTime;

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape HTML attribute values
pub fn escape_attr(text: &str) -> String {
    escape_html(text)
}

/// Reverse of [`escape_html`] for text that went through it exactly once.
/// `&amp;` must be handled last so sequences like `&amp;lt;` decode to the
/// single level they encoded.
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Uppercase the first character ("notes" -> "Notes")
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derive a human-readable label from a file stem
/// ("getting-started" -> "Getting Started")
pub fn display_name(stem: &str) -> String {
    stem.split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate last-modified metadata HTML, empty on any stat failure
pub fn last_modified_html(path: &Path) -> String {
    let Ok(mtime) = std::fs::metadata(path).and_then(|m| m.modified()) else {
        return String::new();
    };
    let Ok(dur) = mtime.duration_since(std::time::UNIX_EPOCH) else {
        return String::new();
    };
    let Ok(datetime) = OffsetDateTime::from_unix_timestamp(dur.as_secs() as i64) else {
        return String::new();
    };
    let fmt = time::format_description::well_known::Rfc3339;
    match datetime.format(&fmt) {
        Ok(s) => format!("<p class=\"meta\">Last updated: {}</p>", escape_html(&s)),
        Err(_) => String::new(),
    }
}

/// Extract and percent-decode one query string parameter.
/// Returns None when the parameter is absent.
pub fn parse_query_param(query: &str, param: &str) -> Option<String> {
    let query = query.trim_start_matches('?');
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == param {
            return Some(percent_decode(value));
        }
    }
    None
}

fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi * 16 + lo) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Determine the content type for a file from its extension
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "txt" => "text/plain",
        "md" => "text/markdown",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_and_unescape_round_trip() {
        let raw = "a < b && c > \"d\" 'e'";
        assert_eq!(unescape_html(&escape_html(raw)), raw);
    }

    #[test]
    fn unescape_decodes_one_level_only() {
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
        assert_eq!(unescape_html("&amp;amp;"), "&amp;");
    }

    #[test]
    fn display_name_title_cases_stems() {
        assert_eq!(display_name("getting-started"), "Getting Started");
        assert_eq!(display_name("notes"), "Notes");
        assert_eq!(display_name("a--b"), "A B");
    }

    #[test]
    fn capitalize_handles_empty_input() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("wiki"), "Wiki");
    }

    #[test]
    fn query_param_is_percent_decoded() {
        assert_eq!(
            parse_query_param("?file=categories%2Fnotes.md", "file").as_deref(),
            Some("categories/notes.md")
        );
        assert_eq!(
            parse_query_param("q=hello+world&x=1", "q").as_deref(),
            Some("hello world")
        );
        assert_eq!(parse_query_param("q=abc", "file"), None);
    }

    #[test]
    fn malformed_percent_escapes_pass_through() {
        assert_eq!(parse_query_param("q=100%", "q").as_deref(), Some("100%"));
        assert_eq!(parse_query_param("q=%zz", "q").as_deref(), Some("%zz"));
    }

    #[test]
    fn content_types_cover_wiki_assets() {
        assert_eq!(content_type_for(Path::new("a/style.css")), "text/css");
        assert_eq!(content_type_for(Path::new("pic.PNG")), "image/png");
        assert_eq!(
            content_type_for(Path::new("unknown.bin")),
            "application/octet-stream"
        );
    }
}
