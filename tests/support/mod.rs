//! File server for download tests, built on `mockito`.
//!
//! Every helper returns an uncreated [`Mock`] so tests can attach hit
//! expectations before calling `create_async`. Mocks stay mounted only while
//! the returned value is alive.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use launchpad_lib::core::downloader::DownloadRange;
use mockito::{Matcher, Mock, Server, ServerGuard};

pub const USER_AGENT: &str = "Launchpad-Test/1.0";

/// What a HEAD answer advertises about the payload.
#[derive(Debug, Clone, Copy)]
pub struct Advertise {
    /// Send `Content-Length`.
    pub length: bool,
    /// Send `Accept-Ranges: bytes`.
    pub ranges: bool,
}

impl Default for Advertise {
    fn default() -> Self {
        Self {
            length: true,
            ranges: true,
        }
    }
}

/// One payload served under whatever paths the test mounts.
pub struct FileServer {
    server: ServerGuard,
    payload: Arc<Vec<u8>>,
}

impl FileServer {
    pub async fn start(payload: Vec<u8>) -> Self {
        Self {
            server: Server::new_async().await,
            payload: Arc::new(payload),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.server.url(), path.trim_start_matches('/'))
    }

    pub fn len(&self) -> u64 {
        self.payload.len() as u64
    }

    pub fn head(&mut self, path: &str, advertise: Advertise) -> Mock {
        let mut mock = self.server.mock("HEAD", path).with_status(200);
        if advertise.length {
            mock = mock.with_header("content-length", &self.payload.len().to_string());
        }
        if advertise.ranges {
            mock = mock.with_header("accept-ranges", "bytes");
        }
        mock
    }

    /// The whole payload, for GETs without a `Range` header.
    pub fn get(&mut self, path: impl Into<Matcher>) -> Mock {
        self.server
            .mock("GET", path)
            .match_header("range", Matcher::Missing)
            .with_status(200)
            .with_body(self.payload.as_slice())
    }

    /// The whole payload, written after `delay`.
    pub fn slow_get(&mut self, path: impl Into<Matcher>, delay: Duration) -> Mock {
        let body = self.payload.clone();
        self.server
            .mock("GET", path)
            .match_header("range", Matcher::Missing)
            .with_status(200)
            .with_chunked_body(move |w| {
                std::thread::sleep(delay);
                w.write_all(&body)
            })
    }

    /// 206 answer carrying the bytes of `range`.
    pub fn range(&mut self, path: &str, range: &DownloadRange) -> Mock {
        let body = self.slice(range);
        let content_range = self.content_range(range);
        self.range_mock(path, range)
            .with_status(206)
            .with_header("content-range", &content_range)
            .with_body(body)
    }

    /// 206 answer for `range` whose body only arrives after `delay`.
    pub fn slow_range(&mut self, path: &str, range: &DownloadRange, delay: Duration) -> Mock {
        let body = self.slice(range);
        let content_range = self.content_range(range);
        self.range_mock(path, range)
            .with_status(206)
            .with_header("content-range", &content_range)
            .with_chunked_body(move |w| {
                std::thread::sleep(delay);
                w.write_all(&body)
            })
    }

    pub fn failing_range(&mut self, path: &str, range: &DownloadRange) -> Mock {
        self.range_mock(path, range).with_status(500)
    }

    pub fn not_found(&mut self, path: &str) -> Mock {
        self.server.mock("GET", path).with_status(404)
    }

    /// Mount a ranged HEAD plus one 206 answer per range of a `parts`-way
    /// split, each expected exactly once.
    pub async fn ranged(&mut self, path: &str, parts: usize) -> Vec<Mock> {
        let mut mocks = vec![
            self.head(path, Advertise::default())
                .expect(1)
                .create_async()
                .await,
        ];
        for range in DownloadRange::partition(self.len(), parts) {
            mocks.push(self.range(path, &range).expect(1).create_async().await);
        }
        mocks
    }

    fn range_mock(&mut self, path: &str, range: &DownloadRange) -> Mock {
        self.server
            .mock("GET", path)
            .match_header("range", Matcher::Exact(range.header_value()))
    }

    fn slice(&self, range: &DownloadRange) -> Vec<u8> {
        self.payload[range.start as usize..range.end as usize].to_vec()
    }

    fn content_range(&self, range: &DownloadRange) -> String {
        format!(
            "bytes {}-{}/{}",
            range.start,
            range.end - 1,
            self.payload.len()
        )
    }
}

pub async fn assert_all(mocks: &[Mock]) {
    for mock in mocks {
        mock.assert_async().await;
    }
}

/// Deterministic pseudo-random payload.
pub fn payload(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x9e37_79b9;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .user_agent(USER_AGENT)
        .build()
        .unwrap()
}
