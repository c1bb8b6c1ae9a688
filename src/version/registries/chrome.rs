//! Chrome release feed source

use tracing::debug;

use crate::parser::ChromeFeedParser;
use crate::version::error::SourceError;
use crate::version::registries::http::HttpFetcher;
use crate::version::registry::ReleaseSource;
use crate::version::types::CurrentRelease;

pub const CHROME: &str = "chrome";

/// Release source reading the mac/stable row of the Chrome CSV feed
pub struct ChromeSource {
    fetcher: HttpFetcher,
    url: String,
    parser: ChromeFeedParser,
}

impl ChromeSource {
    pub fn new(fetcher: HttpFetcher, url: &str) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
            parser: ChromeFeedParser::default(),
        }
    }
}

#[async_trait::async_trait]
impl ReleaseSource for ChromeSource {
    fn software(&self) -> &'static str {
        CHROME
    }

    async fn fetch_current(&self) -> Result<CurrentRelease, SourceError> {
        let body = self.fetcher.get_text(&self.url).await?;
        let release = self.parser.parse(&body)?;

        debug!(
            "Chrome feed reports {} released at {}",
            release.version, release.released
        );
        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use reqwest::Client;

    fn source(server: &Server) -> ChromeSource {
        ChromeSource::new(
            HttpFetcher::new(Client::new(), 5_000),
            &format!("{}/all", server.url()),
        )
    }

    #[tokio::test]
    async fn fetch_current_returns_mac_stable_release() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/all")
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body(
                "os,channel,current_version,previous_version,current_reldate,previous_reldate\n\
                 mac,stable,65.0.3325.181,65.0.3325.162,03/06/18,02/27/18\n",
            )
            .create_async()
            .await;

        let release = source(&server).fetch_current().await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            release,
            CurrentRelease {
                version: "65.0.3325.181".to_string(),
                released: 1520294400,
            }
        );
    }

    #[tokio::test]
    async fn fetch_current_reports_upstream_format_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/all")
            .with_status(200)
            .with_body("os,channel,current_version\nwin,stable,65.0.3325.181\n")
            .create_async()
            .await;

        let result = source(&server).fetch_current().await;

        assert!(matches!(result, Err(SourceError::UpstreamFormat(_))));
    }

    #[tokio::test]
    async fn fetch_current_returns_status_error_on_server_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/all")
            .with_status(500)
            .create_async()
            .await;

        let result = source(&server).fetch_current().await;

        assert!(matches!(
            result,
            Err(SourceError::Status { status: 500, .. })
        ));
    }
}
