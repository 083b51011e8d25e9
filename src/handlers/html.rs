//! Shared HTML building blocks.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::{error, warn};

use crate::state::StateError;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = "proctor - process inspection for Linux";

/// Generate HTML header with title and navigation.
pub fn html_header(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Proctor</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
        .container {{ max-width: 1400px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        h1 {{ color: #333; border-bottom: 3px solid #007bff; padding-bottom: 10px; }}
        h2 {{ color: #555; margin-top: 30px; }}
        nav {{ background: #007bff; padding: 15px; border-radius: 4px; margin-bottom: 20px; }}
        nav a {{ color: white; text-decoration: none; margin-right: 20px; font-weight: 500; }}
        nav a:hover {{ text-decoration: underline; }}
        table {{ border-collapse: collapse; width: 100%; margin: 20px 0; }}
        th {{ background: #007bff; color: white; padding: 12px; text-align: left; font-weight: 600; }}
        td {{ padding: 10px; border-bottom: 1px solid #ddd; }}
        tr:hover {{ background: #f8f9fa; }}
        .metric {{ display: inline-block; margin: 10px 20px 10px 0; padding: 10px 15px; background: #e9ecef; border-radius: 4px; }}
        .metric-label {{ font-weight: 600; color: #555; }}
        .metric-value {{ font-size: 1.2em; color: #007bff; }}
        .footer {{ margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; color: #666; font-size: 0.9em; }}
        .status-error {{ color: #dc3545; font-weight: 600; }}
        a {{ color: #007bff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        code {{ background: #f8f9fa; padding: 2px 6px; border-radius: 3px; font-family: 'Courier New', monospace; word-break: break-all; }}
    </style>
</head>
<body>
<div class="container">
<nav>
    <a href="/">Processes</a>
    <a href="/refresh">Refresh</a>
</nav>
"#,
        title = escape(title)
    )
}

/// Generate HTML footer.
pub fn html_footer() -> String {
    format!(
        r#"<div class="footer">
    <p>{}</p>
</div>
</div>
</body>
</html>"#,
        FOOTER_TEXT
    )
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Renders a store failure as an error page.
impl IntoResponse for StateError {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            warn!("Request failed: {}", self);
            StatusCode::NOT_FOUND
        } else {
            error!("Request failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = format!(
            "{}<h1>Error</h1>\n<p class=\"status-error\">{}</p>\n<p><a href=\"/\">Back to process list</a></p>\n{}",
            html_header("Error"),
            escape(&self.to_string()),
            html_footer()
        );
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proctor::InspectError;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
        assert_eq!(escape("(Thunar)"), "(Thunar)");
    }

    #[test]
    fn test_error_status_codes() {
        let not_found = StateError::Inspect(InspectError::ProcessNotFound { pid: 1 }).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let internal = StateError::Poisoned.into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
