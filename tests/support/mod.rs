//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod archives;
pub mod socket_guard;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DOWNLOAD_PATH: &str = "/app/geoip_download";

/// `Last-Modified` value for 2024-01-01T00:00:00Z.
pub const JAN_1_2024: &str = "Mon, 01 Jan 2024 00:00:00 GMT";
pub const JAN_1_2024_SECS: u64 = 1_704_067_200;

pub fn download_url(server: &MockServer) -> String {
    format!("{}{DOWNLOAD_PATH}", server.uri())
}

/// Serves `archive` for `edition`: a HEAD probe and a GET download.
pub async fn mount_edition(
    server: &MockServer,
    edition: &str,
    suffix: &str,
    last_modified: &str,
    archive: Vec<u8>,
) {
    Mock::given(method("HEAD"))
        .and(path(DOWNLOAD_PATH))
        .and(query_param("edition_id", edition))
        .and(query_param("suffix", suffix))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    format!("attachment; filename={edition}_20240101.{suffix}").as_str(),
                )
                .insert_header("Last-Modified", last_modified),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(DOWNLOAD_PATH))
        .and(query_param("edition_id", edition))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(server)
        .await;
}

/// Answers every request for `edition` with `status`.
pub async fn mount_status(server: &MockServer, edition: &str, status: u16) {
    Mock::given(path(DOWNLOAD_PATH))
        .and(query_param("edition_id", edition))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
