use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;

use crate::error::ApiError;

/// Timeout for ordinary metadata requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Deep analysis reads the media file, so give the server much longer.
const ANALYZE_TIMEOUT: Duration = Duration::from_secs(600);

/// Identifies an item for section-scoped edits (collection tags, summaries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTarget {
    pub section_id: i64,
    pub item_id: i64,
    /// Plex `metadata_type` of the item (1 = movie, 2 = show, 18 = collection).
    pub metadata_type: i64,
}

/// Metadata actions against a media server.
///
/// Every action succeeds only on HTTP 200. Nothing is retried.
pub trait MediaServer {
    /// Ask the server to refresh an item's metadata from its agents.
    fn refresh_item(&self, item_id: i64) -> Result<(), ApiError>;

    /// Ask the server to run media analysis on an item.
    fn analyze_item(&self, item_id: i64) -> Result<(), ApiError>;

    /// Add an item to the named collection (creating the collection if needed).
    fn set_collection(&self, target: ItemTarget, collection: &str) -> Result<(), ApiError>;

    /// Replace an item's summary and lock the field.
    fn set_summary(&self, target: ItemTarget, summary: &str) -> Result<(), ApiError>;

    /// Set an item's poster from a remote image URL.
    fn set_poster(&self, item_id: i64, url: &str) -> Result<(), ApiError>;
}

/// Blocking HTTP client for a Plex Media Server.
pub struct PlexClient {
    http: Client,
    base_url: String,
    token: String,
}

impl PlexClient {
    /// Create a client for the server at `base_url`.
    ///
    /// With `verify_tls` off, invalid certificates are accepted. Plex's
    /// `*.plex.direct` certificates don't match LAN addresses.
    pub fn new(base_url: &str, token: &str, verify_tls: bool) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::invalid_url(format!(
                "'{base_url}' must start with http:// or https://"
            )));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!verify_tls)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and require an HTTP 200 response.
    fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        log::debug!("Sending {} request to: {}", method, url);

        let resp = self
            .http
            .request(method, &url)
            .query(&[("X-Plex-Token", self.token.as_str())])
            .query(params)
            .timeout(timeout)
            .send()?;

        let status = resp.status();
        log::trace!("Response: {} {}", status.as_u16(), status.canonical_reason().unwrap_or(""));

        if status != reqwest::StatusCode::OK {
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(())
    }
}

impl MediaServer for PlexClient {
    fn refresh_item(&self, item_id: i64) -> Result<(), ApiError> {
        self.send(
            Method::PUT,
            &format!("/library/metadata/{item_id}/refresh"),
            &[],
            REQUEST_TIMEOUT,
        )
    }

    fn analyze_item(&self, item_id: i64) -> Result<(), ApiError> {
        self.send(
            Method::PUT,
            &format!("/library/metadata/{item_id}/analyze"),
            &[],
            ANALYZE_TIMEOUT,
        )
    }

    fn set_collection(&self, target: ItemTarget, collection: &str) -> Result<(), ApiError> {
        self.send(
            Method::PUT,
            &format!("/library/sections/{}/all", target.section_id),
            &[
                ("type", target.metadata_type.to_string()),
                ("id", target.item_id.to_string()),
                ("collection[0].tag.tag", collection.to_string()),
                ("collection.locked", "1".to_string()),
            ],
            REQUEST_TIMEOUT,
        )
    }

    fn set_summary(&self, target: ItemTarget, summary: &str) -> Result<(), ApiError> {
        self.send(
            Method::PUT,
            &format!("/library/sections/{}/all", target.section_id),
            &[
                ("type", target.metadata_type.to_string()),
                ("id", target.item_id.to_string()),
                ("summary.value", summary.to_string()),
                ("summary.locked", "1".to_string()),
            ],
            REQUEST_TIMEOUT,
        )
    }

    fn set_poster(&self, item_id: i64, url: &str) -> Result<(), ApiError> {
        self.send(
            Method::POST,
            &format!("/library/metadata/{item_id}/posters"),
            &[("url", url.to_string())],
            REQUEST_TIMEOUT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve a single request with the given status line, returning the
    /// base URL and a receiver for the request line the client sent.
    fn one_shot_server(status_line: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            // Drain headers
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            tx.send(request_line.trim_end().to_string()).unwrap();
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            )
            .unwrap();
        });

        (format!("http://{addr}"), rx)
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let err = PlexClient::new("plex.local:32400", "token", true).err().unwrap();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_url_join_strips_slashes() {
        let client = PlexClient::new("http://plex.local:32400/", "token", true).unwrap();
        assert_eq!(
            client.url("/library/metadata/1/refresh"),
            "http://plex.local:32400/library/metadata/1/refresh"
        );
    }

    #[test]
    fn test_refresh_sends_put_with_token() {
        let (base, rx) = one_shot_server("200 OK");
        let client = PlexClient::new(&base, "secret", true).unwrap();
        client.refresh_item(42).unwrap();

        let request = rx.recv().unwrap();
        assert!(request.starts_with("PUT /library/metadata/42/refresh?X-Plex-Token=secret "));
    }

    #[test]
    fn test_poster_is_posted_with_url() {
        let (base, rx) = one_shot_server("200 OK");
        let client = PlexClient::new(&base, "secret", true).unwrap();
        client
            .set_poster(7, "https://image.tmdb.org/t/p/original/abc.jpg")
            .unwrap();

        let request = rx.recv().unwrap();
        assert!(request.starts_with("POST /library/metadata/7/posters?"));
        assert!(request.contains("url=https%3A%2F%2Fimage.tmdb.org%2Ft%2Fp%2Foriginal%2Fabc.jpg"));
    }

    #[test]
    fn test_collection_tag_is_section_scoped() {
        let (base, rx) = one_shot_server("200 OK");
        let client = PlexClient::new(&base, "secret", true).unwrap();
        let target = ItemTarget {
            section_id: 3,
            item_id: 99,
            metadata_type: 1,
        };
        client.set_collection(target, "Alien").unwrap();

        let request = rx.recv().unwrap();
        assert!(request.starts_with("PUT /library/sections/3/all?"));
        assert!(request.contains("type=1"));
        assert!(request.contains("id=99"));
        assert!(request.contains("tag.tag=Alien"));
    }

    #[test]
    fn test_non_200_is_an_error() {
        let (base, _rx) = one_shot_server("500 Internal Server Error");
        let client = PlexClient::new(&base, "secret", true).unwrap();
        let target = ItemTarget {
            section_id: 1,
            item_id: 5,
            metadata_type: 18,
        };
        let err = client.set_summary(target, "A summary").unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_other_success_codes_are_errors() {
        let (base, _rx) = one_shot_server("204 No Content");
        let client = PlexClient::new(&base, "secret", true).unwrap();
        let err = client.analyze_item(5).unwrap_err();
        assert_eq!(err.status(), Some(204));
    }

    #[test]
    fn test_connection_refused_is_an_error() {
        // Bind then drop to get a port nothing listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = PlexClient::new(&format!("http://127.0.0.1:{port}"), "secret", true).unwrap();
        let err = client.refresh_item(1).unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }
}
