//! Server-rendered HTML for the prediction page.
//!
//! Every string that originated from a request goes through [`escape_html`]
//! before it is written into markup.

pub mod chart;
pub mod form;
pub mod history;
pub mod page;

pub use form::FormInput;
pub use page::{render_page, PageView, Panel};

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("Tom & Jerry's"), "Tom &amp; Jerry&#39;s");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_html("formerly smoked"), "formerly smoked");
        assert_eq!(escape_html(""), "");
    }
}
