use unicode_normalization::UnicodeNormalization;

use super::document::Section;

pub const ABSTRACT_KEY: &str = "Abstract";

/// Map key for a section, safe as a document-store field name.
///
/// Titled sections use their escaped title. The untitled lead section is `Abstract`, and any other
/// untitled section falls back to `Section <index>`.
pub fn section_key(section: &Section) -> String {
    if !section.title.is_empty() {
        return escape_key(&section.title);
    }

    if section.index == 0 {
        return ABSTRACT_KEY.to_string();
    }

    format!("Section {}", section.index)
}

/// Key under which a section with this raw title is stored. An empty title means the lead section;
/// other untitled sections are reached by passing their `Section <index>` key as the title.
pub fn lookup_key(title: &str) -> String {
    if title.is_empty() {
        return ABSTRACT_KEY.to_string();
    }

    escape_key(title)
}

/// Escapes `\`, `$` and `.` for use in a field name. Backslashes go first so the
/// escape sequences introduced afterwards are never escaped again.
pub fn escape_key(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('$', "\\u0024")
        .replace('.', "\\u002e")
}

/// Exact inverse of [`escape_key`].
pub fn unescape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut rest = key;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("\\\\") {
            out.push('\\');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("\\u0024") {
            out.push('$');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("\\u002e") {
            out.push('.');
            rest = after;
        } else {
            out.push('\\');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Reads a stored key or title back into display form: NFKD, key unescaping, then the two HTML
/// entities the parser leaves behind.
pub fn decode_key(key: &str) -> String {
    let normalized = key.nfkd().collect::<String>();
    unescape_key(&normalized)
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, index: u32) -> Section {
        Section {
            title: title.to_string(),
            index,
            ..Section::default()
        }
    }

    #[test]
    fn escapes_in_order_without_double_escaping() {
        assert_eq!(escape_key("a$b"), "a\\u0024b");
        assert_eq!(escape_key("v1.2"), "v1\\u002e2");
        assert_eq!(escape_key("a\\b"), "a\\\\b");
        assert_eq!(escape_key("$.\\"), "\\u0024\\u002e\\\\");
    }

    #[test]
    fn unescape_recovers_original_titles() {
        let titles = [
            "a$b",
            "St. Louis",
            "C:\\Windows",
            "literal \\u0024 text",
            "trailing \\",
            "$$..\\\\",
            "plain",
        ];

        for title in titles {
            assert_eq!(unescape_key(&escape_key(title)), title, "title {title:?}");
        }
    }

    #[test]
    fn untitled_sections_use_structural_keys() {
        assert_eq!(section_key(&section("", 0)), "Abstract");
        assert_eq!(section_key(&section("", 5)), "Section 5");
        assert_eq!(section_key(&section("History", 1)), "History");
        assert_eq!(section_key(&section("U.S. history", 2)), "U\\u002eS\\u002e history");
    }

    #[test]
    fn titled_section_can_match_structural_key() {
        assert_eq!(section_key(&section("Abstract", 3)), section_key(&section("", 0)));
        assert_eq!(section_key(&section("Section 4", 1)), section_key(&section("", 4)));
    }

    #[test]
    fn lookup_key_maps_empty_title_to_lead_section() {
        assert_eq!(lookup_key(""), "Abstract");
        assert_eq!(lookup_key("Section 5"), section_key(&section("", 5)));
        assert_eq!(lookup_key("U.S."), "U\\u002eS\\u002e");
    }

    #[test]
    fn decode_key_normalizes_and_unescapes() {
        assert_eq!(decode_key("Rock &amp; Roll"), "Rock & Roll");
        assert_eq!(decode_key("&quot;Q&quot; \\u0024 1\\u002e0"), "\"Q\" $ 1.0");
        assert_eq!(decode_key("caf\u{e9}"), "cafe\u{301}");
    }
}
