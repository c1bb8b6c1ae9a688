//! Firefox release directory source
//!
//! Two requests: the releases directory gives the newest stable version, and
//! that version's own directory gives its release date.

use tracing::debug;

use crate::parser::FirefoxListingParser;
use crate::version::error::SourceError;
use crate::version::registries::http::HttpFetcher;
use crate::version::registry::ReleaseSource;
use crate::version::types::CurrentRelease;

pub const FIREFOX: &str = "firefox";

/// Release source scraping the Firefox releases directory listing
pub struct FirefoxSource {
    fetcher: HttpFetcher,
    base_url: String,
    parser: FirefoxListingParser,
}

impl FirefoxSource {
    pub fn new(fetcher: HttpFetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            parser: FirefoxListingParser::new(),
        }
    }

    /// Fetches every stable release, lowest first.
    pub async fn fetch_stable_versions(&self) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/", self.base_url);
        let body = self.fetcher.get_text(&url).await?;
        Ok(self.parser.stable_versions(&body))
    }

    /// Fetches the release date of one version from its directory listing.
    pub async fn fetch_release_date(&self, version: &str) -> Result<i64, SourceError> {
        let url = format!("{}/{}/", self.base_url, version);
        let body = self.fetcher.get_text(&url).await?;
        Ok(self.parser.latest_date(&body)?)
    }
}

#[async_trait::async_trait]
impl ReleaseSource for FirefoxSource {
    fn software(&self) -> &'static str {
        FIREFOX
    }

    async fn fetch_current(&self) -> Result<CurrentRelease, SourceError> {
        let url = format!("{}/", self.base_url);
        let body = self.fetcher.get_text(&url).await?;
        let version = self.parser.latest_stable_version(&body)?;

        let released = self.fetch_release_date(&version).await?;
        debug!("Firefox {} released at {}", version, released);

        Ok(CurrentRelease { version, released })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use reqwest::Client;

    const RELEASES: &str = r#"<html><body><table>
<tr>
    <td>Dir</td>
    <td><a href="/pub/firefox/releases/58.0.2/">58.0.2/</a></td>
</tr>
<tr>
    <td>Dir</td>
    <td><a href="/pub/firefox/releases/59.0/">59.0/</a></td>
</tr>
<tr>
    <td>Dir</td>
    <td><a href="/pub/firefox/releases/60.0b3/">60.0b3/</a></td>
</tr>
<tr>
    <td>Dir</td>
    <td><a href="/pub/firefox/releases/52.7.2esr/">52.7.2esr/</a></td>
</tr>
</table></body></html>"#;

    const RELEASE_59: &str = r#"<html><body><table>
<tr>
    <td>Dir</td>
    <td><a href="/pub/firefox/releases/59.0/linux-x86_64/">linux-x86_64/</a></td>
    <td></td>
    <td></td>
</tr>
<tr>
    <td>File</td>
    <td><a href="/pub/firefox/releases/59.0/SHA512SUMS">SHA512SUMS</a></td>
    <td>1M</td>
    <td>1-Mar-2018</td>
</tr>
</table></body></html>"#;

    fn source(server: &Server) -> FirefoxSource {
        FirefoxSource::new(
            HttpFetcher::new(Client::new(), 5_000),
            &format!("{}/pub/firefox/releases/", server.url()),
        )
    }

    #[tokio::test]
    async fn fetch_current_returns_latest_stable_release_and_its_date() {
        let mut server = Server::new_async().await;
        let listing = server
            .mock("GET", "/pub/firefox/releases/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(RELEASES)
            .create_async()
            .await;
        let release_dir = server
            .mock("GET", "/pub/firefox/releases/59.0/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(RELEASE_59)
            .create_async()
            .await;

        let release = source(&server).fetch_current().await.unwrap();

        listing.assert_async().await;
        release_dir.assert_async().await;
        assert_eq!(
            release,
            CurrentRelease {
                version: "59.0".to_string(),
                released: 1519862400,
            }
        );
    }

    #[tokio::test]
    async fn fetch_stable_versions_lists_releases_in_order() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/pub/firefox/releases/")
            .with_status(200)
            .with_body(RELEASES)
            .create_async()
            .await;

        let versions = source(&server).fetch_stable_versions().await.unwrap();

        assert_eq!(versions, vec!["58.0.2", "59.0"]);
    }

    #[tokio::test]
    async fn fetch_current_fails_when_release_directory_is_missing() {
        let mut server = Server::new_async().await;
        let _listing = server
            .mock("GET", "/pub/firefox/releases/")
            .with_status(200)
            .with_body(RELEASES)
            .create_async()
            .await;
        let _release_dir = server
            .mock("GET", "/pub/firefox/releases/59.0/")
            .with_status(404)
            .create_async()
            .await;

        let result = source(&server).fetch_current().await;

        assert!(matches!(
            result,
            Err(SourceError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn fetch_current_reports_listing_without_releases() {
        let mut server = Server::new_async().await;
        let _listing = server
            .mock("GET", "/pub/firefox/releases/")
            .with_status(200)
            .with_body("<html><body>latest/</body></html>")
            .create_async()
            .await;

        let result = source(&server).fetch_current().await;

        assert!(matches!(result, Err(SourceError::UpstreamFormat(_))));
    }
}
