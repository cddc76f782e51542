//! Mock listing/archive/upload server and config helpers

use dltins_etl::Config;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock listing is served from
pub const LISTING_PATH: &str = "/solr/select";

/// Mock ESMA endpoint plus a scratch work directory
pub struct TestEnv {
    pub server: MockServer,
    pub work_dir: TempDir,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            work_dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Absolute URL on the mock server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Serve `body` for GET `path`
    pub async fn serve(&self, at: &str, body: impl Into<Vec<u8>>) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
            .mount(&self.server)
            .await;
    }

    /// Answer GET `path` with a bare status
    pub async fn fail(&self, at: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Local file the default destination resolves to
    pub fn bucket_file(&self) -> std::path::PathBuf {
        self.work_dir.path().join("bucket").join("output.csv")
    }

    /// Config pointed at the mock listing, uploading to a file:// bucket
    pub fn config(&self) -> Config {
        Config {
            listing_url: self.url(LISTING_PATH),
            work_dir: self.work_dir.path().to_path_buf(),
            destination_uri: Some(
                Url::from_file_path(self.bucket_file())
                    .expect("absolute temp path")
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
