/// Sanitizes article HTML before it is stored.
///
/// Whitelist-based: formatting tags such as <p>, <b> and <ul> survive, while
/// <script>, <iframe> and event-handler attributes are stripped. Article
/// bodies are rendered as HTML by the front end, so this runs on import,
/// never on read.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_keeps_formatting() {
        let cleaned = clean_html("<p>Save <b>early</b></p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>Save <b>early</b></p>");
    }

    #[test]
    fn test_strips_event_handlers() {
        let cleaned = clean_html(r#"<a href="https://example.com" onclick="steal()">link</a>"#);
        assert!(!cleaned.contains("onclick"));
        assert!(cleaned.contains("link"));
    }
}
