//! HTTP response handlers.

use crate::embed::serve::{CLIENT_JS, CLIENT_PATH, ClientVars, WELCOME_HTML, WelcomeVars};
use crate::utils::mime::{self, types};
use anyhow::{Context, Result, anyhow};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with a static file, injecting the client script into HTML.
pub fn respond_file(request: Request, path: &Path, inject: bool) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = if inject && mime::is_html(content_type) {
        inject_client_script(&body)
    } else {
        body
    };

    send_body(request, 200, content_type, body)
}

/// Respond with 404 page (`404.html` under the preview root, or plain text).
pub fn respond_not_found(request: Request, serve_root: &Path, inject: bool) -> Result<()> {
    let custom_404 = serve_root.join("404.html");
    let has_custom = custom_404.is_file();

    if is_head_request(&request) {
        let mime = if has_custom { types::HTML } else { types::PLAIN };
        return send_head(request, 404, mime);
    }

    if has_custom && let Ok(body) = fs::read(&custom_404) {
        let body = if inject { inject_client_script(&body) } else { body };
        return send_body(request, 404, types::HTML, body);
    }

    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with the welcome page (preview root has no index.html).
///
/// The client script is injected so the page reloads after the next build.
pub fn respond_welcome(request: Request, root: &str, inject: bool) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, types::HTML);
    }

    let body = WELCOME_HTML.render(&WelcomeVars {
        title: "modkit",
        root,
        version: env!("CARGO_PKG_VERSION"),
    });
    let body = if inject {
        inject_client_script(body.as_bytes())
    } else {
        body.into_bytes()
    };
    send_body(request, 200, types::HTML, body)
}

/// Respond with client.js rendered for the live WebSocket port.
pub fn respond_client_js(request: Request, ws_port: u16) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, types::JAVASCRIPT);
    }
    let body = CLIENT_JS.render(&ClientVars { ws_port });
    send_body(request, 200, types::JAVASCRIPT, body.into_bytes())
}

/// Insert the client `<script>` before the last `</body>`, or append it.
pub(super) fn inject_client_script(content: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = format!(r#"<script type="module" src="{CLIENT_PATH}"></script>"#);
    let script = script.as_bytes();

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", "no-cache")?);
    request.respond(response)?;
    Ok(())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", "no-cache")?);
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inject(html: &str) -> String {
        String::from_utf8(inject_client_script(html.as_bytes())).unwrap()
    }

    #[test]
    fn test_inject_before_body_close() {
        let html = inject("<html><body><p>hi</p></body></html>");
        assert_eq!(
            html,
            r#"<html><body><p>hi</p><script type="module" src="/@modkit/client.js"></script></body></html>"#
        );
    }

    #[test]
    fn test_inject_uses_last_body_close() {
        let html = inject("<body><pre></body></pre></BODY>");
        assert!(html.ends_with(r#"</script></BODY>"#));
        assert!(html.starts_with("<body><pre></body></pre>"));
    }

    #[test]
    fn test_inject_appends_without_body() {
        let html = inject("<p>fragment</p>");
        assert!(html.starts_with("<p>fragment</p><script"));
    }
}
