use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

use crate::core::config::DownloadSettings;

/// Build the shared HTTP client. Every request carries the configured user
/// agent; compression is disabled so `Content-Length` and byte ranges refer to
/// the bytes written on disk.
pub fn build_http_client(settings: &DownloadSettings) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(settings.user_agent.clone())
        .default_headers(default_headers)
        .connect_timeout(settings.timeout())
        .build()
}
