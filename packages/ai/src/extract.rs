// ABOUTME: Pulls the JSON payload out of a raw provider reply
// ABOUTME: Strips markdown code fences and tolerates prose around a single object

const FENCE: &str = "```";

/// Extract the candidate payload from a raw reply.
///
/// A reply that already starts like a JSON document is used as-is, so fence
/// markers inside its string values are left alone. Otherwise, if the reply
/// contains code-fence markers, the fenced block is used (with any language
/// tag such as `json` removed). When the candidate still does not start like
/// a JSON document but contains a `{ ... }` span, that span is returned.
pub fn extract_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }

    let candidate = strip_fences(trimmed);

    if candidate.starts_with('{') || candidate.starts_with('[') {
        return candidate;
    }

    match (candidate.find('{'), candidate.rfind('}')) {
        (Some(start), Some(end)) if end > start => &candidate[start..=end],
        _ => candidate,
    }
}

fn strip_fences(text: &str) -> &str {
    let Some(open) = text.find(FENCE) else {
        return text;
    };

    let after_open = &text[open + FENCE.len()..];
    let body = skip_language_tag(after_open);

    // The last marker closes the block; earlier ones may sit inside string values
    let inner = match body.rfind(FENCE) {
        Some(close) => &body[..close],
        None => body,
    };

    inner.trim()
}

/// Drop a language tag like `json` directly after the opening fence, but only
/// when it is followed by whitespace or the start of the payload
fn skip_language_tag(text: &str) -> &str {
    let tag_len = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphanumeric())
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    if tag_len == 0 {
        return text;
    }

    match text[tag_len..].chars().next() {
        Some(c) if c.is_whitespace() || c == '{' || c == '[' => &text[tag_len..],
        None => &text[tag_len..],
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_is_untouched() {
        assert_eq!(extract_payload("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_multiline_json_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_payload(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_single_line_json_fence() {
        let raw = "```json {\"business_objective\":\"X\"} ```";
        assert_eq!(extract_payload(raw), "{\"business_objective\":\"X\"}");
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n{\"a\": [1, 2]}\n```";
        assert_eq!(extract_payload(raw), "{\"a\": [1, 2]}");
    }

    #[test]
    fn test_prose_around_fenced_block() {
        let raw = "Here is the result:\n```json\n{\"a\": 1}\n```\nLet me know!";
        assert_eq!(extract_payload(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_unterminated_fence() {
        let raw = "```json\n{\"a\": 1}";
        assert_eq!(extract_payload(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_prose_around_bare_object() {
        let raw = "Sure! {\"a\": {\"b\": 2}} Hope this helps.";
        assert_eq!(extract_payload(raw), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn test_free_text_is_returned_verbatim() {
        assert_eq!(extract_payload("I cannot help with that."), "I cannot help with that.");
    }

    #[test]
    fn test_bare_object_with_fenced_string_is_untouched() {
        let raw = "{\"file_content\": \"Run:\\n```sql\\nSELECT 1;\\n```\"}";
        assert_eq!(extract_payload(raw), raw);
        assert!(serde_json::from_str::<serde_json::Value>(extract_payload(raw)).is_ok());
    }

    #[test]
    fn test_fenced_reply_with_fences_inside_strings() {
        let raw = "Result:\n```json\n{\"file_content\": \"```sql\\nSELECT 1;\\n```\"}\n```";
        assert_eq!(
            extract_payload(raw),
            "{\"file_content\": \"```sql\\nSELECT 1;\\n```\"}"
        );
    }

    #[test]
    fn test_array_payload_in_fence() {
        assert_eq!(extract_payload("```json\n[1, 2]\n```"), "[1, 2]");
    }
}
