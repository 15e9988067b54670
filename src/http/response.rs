//! HTTP response building module
//!
//! Turns a resolution [`Outcome`] into a response. Status, `Content-Type`
//! and `Content-Length` are derived here for every terminal branch so no
//! stage sets headers on its own.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::handler::Outcome;
use crate::http::mime;
use crate::pages;

const HTML: &str = "text/html; charset=utf-8";

/// Build the response for a terminal outcome
///
/// HEAD requests keep every header, including `Content-Length`, and drop
/// the body.
pub fn finalize(outcome: Outcome, is_head: bool) -> Response<Full<Bytes>> {
    let status = outcome.status();
    match outcome {
        Outcome::Compiled { body, output } => {
            build_response(status, &output.content_type(), Bytes::from(body), None, is_head)
        }
        Outcome::StaticFile { body, extension } => {
            let content_type = mime::content_type_for(extension.as_deref());
            build_response(status, &content_type, body, None, is_head)
        }
        Outcome::NotFound { body, output } => {
            build_response(status, &output.content_type(), body, None, is_head)
        }
        Outcome::Redirect { target } => {
            let body = format!("Redirecting to {}", escape_html(&target));
            build_response(status, HTML, Bytes::from(body), Some(&target), is_head)
        }
        Outcome::ServerError(details) => {
            let body = pages::server_error(&details);
            build_response(status, HTML, Bytes::from(body), None, is_head)
        }
    }
}

/// Build 401 Unauthorized response with a Basic challenge
pub fn build_401_response(realm: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(401)
        .header("WWW-Authenticate", format!("Basic realm=\"{realm}\""))
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", "12")
        .body(Full::new(Bytes::from_static(b"Unauthorized")))
        .unwrap_or_else(|e| {
            log_build_error("401", &e);
            Response::new(Full::new(Bytes::from_static(b"Unauthorized")))
        })
}

fn build_response(
    status: u16,
    content_type: &str,
    body: Bytes,
    location: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { body };

    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length);
    if let Some(location) = location {
        builder = builder.header("Location", location);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(&status.to_string(), &e);
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

/// Escape text for embedding in HTML
pub fn escape_html(s: &str) -> String {
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

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!(status, error = %error, "failed to build response");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::OutputType;
    use http_body_util::BodyExt;

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn header<'a>(resp: &'a Response<Full<Bytes>>, name: &str) -> &'a str {
        resp.headers().get(name).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_compiled_html_response() {
        let resp = finalize(
            Outcome::Compiled {
                body: "<h1>About</h1>".to_string(),
                output: OutputType::Html,
            },
            false,
        );
        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "content-type"), "text/html; charset=utf-8");
        assert_eq!(header(&resp, "content-length"), "14");
        assert_eq!(body_of(resp).await, "<h1>About</h1>");
    }

    #[tokio::test]
    async fn test_content_length_counts_bytes() {
        let resp = finalize(
            Outcome::Compiled {
                body: "héllo".to_string(),
                output: OutputType::Html,
            },
            false,
        );
        assert_eq!(header(&resp, "content-length"), "6");
    }

    #[tokio::test]
    async fn test_redirect_escapes_body() {
        let resp = finalize(
            Outcome::Redirect {
                target: "/a%3Cb%3E/\"x\"/".to_string(),
            },
            false,
        );
        assert_eq!(resp.status(), 301);
        assert_eq!(header(&resp, "location"), "/a%3Cb%3E/\"x\"/");
        assert_eq!(
            body_of(resp).await,
            "Redirecting to /a%3Cb%3E/&quot;x&quot;/"
        );
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let resp = finalize(
            Outcome::StaticFile {
                body: Bytes::from_static(b"body { color: red }"),
                extension: Some("css".to_string()),
            },
            true,
        );
        assert_eq!(header(&resp, "content-type"), "text/css; charset=utf-8");
        assert_eq!(header(&resp, "content-length"), "19");
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let resp = finalize(
            Outcome::NotFound {
                body: Bytes::from_static(b"gone"),
                output: OutputType::Html,
            },
            false,
        );
        assert_eq!(resp.status(), 404);
        assert_eq!(body_of(resp).await, "gone");
    }

    #[test]
    fn test_unauthorized_challenge() {
        let resp = build_401_response("Authorization Required");
        assert_eq!(resp.status(), 401);
        assert_eq!(
            header(&resp, "www-authenticate"),
            "Basic realm=\"Authorization Required\""
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
    }
}
