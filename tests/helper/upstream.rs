//! mockito fixtures standing in for the real upstream hosts

use mockito::{Mock, ServerGuard};
use tempfile::TempDir;

use version_age::config::{EngineConfig, SourcesConfig};

/// Config pointing every source at `server` and the cache into `temp_dir`
pub fn test_config(temp_dir: &TempDir, server: &ServerGuard) -> EngineConfig {
    EngineConfig {
        cache_dir: temp_dir.path().to_path_buf(),
        fetch_timeout_ms: 5_000,
        sources: SourcesConfig {
            canonical_url: format!("{}/data.json", server.url()),
            chrome_feed_url: format!("{}/all", server.url()),
            firefox_releases_url: format!("{}/pub/firefox/releases/", server.url()),
        },
        ..EngineConfig::default()
    }
}

#[allow(dead_code)]
pub async fn mock_canonical(server: &mut ServerGuard, status: usize, body: &str) -> Mock {
    server
        .mock("GET", "/data.json")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// CSV feed whose mac/stable row reports `version` released on `date` (MM/DD/YY)
#[allow(dead_code)]
pub async fn mock_chrome_feed(server: &mut ServerGuard, version: &str, date: &str) -> Mock {
    let body = format!(
        "os,channel,current_version,previous_version,current_reldate,previous_reldate\n\
         win,stable,{version},0.0.0.0,{date},01/01/18\n\
         mac,beta,99.0.0.0,0.0.0.0,{date},01/01/18\n\
         mac,stable,{version},0.0.0.0,{date},01/01/18\n"
    );
    server
        .mock("GET", "/all")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body(body)
        .create_async()
        .await
}

fn listing_row(kind: &str, name: &str, date: &str) -> String {
    format!(
        "<tr>\n<td>{kind}</td>\n<td><a href=\"{name}\">{name}</a></td>\n<td></td>\n<td>{date}</td>\n</tr>"
    )
}

/// Releases directory listing `versions`, plus the directory of `latest` dated `date`
#[allow(dead_code)]
pub async fn mock_firefox_releases(
    server: &mut ServerGuard,
    versions: &[&str],
    latest: &str,
    date: &str,
) -> (Mock, Mock) {
    let rows: Vec<String> = versions
        .iter()
        .map(|v| listing_row("Dir", &format!("{}/", v), ""))
        .collect();
    let listing = server
        .mock("GET", "/pub/firefox/releases/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(format!(
            "<html><body><table>\n{}\n</table></body></html>",
            rows.join("\n")
        ))
        .create_async()
        .await;

    let release_dir = server
        .mock("GET", format!("/pub/firefox/releases/{}/", latest).as_str())
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(format!(
            "<html><body><table>\n{}\n{}\n</table></body></html>",
            listing_row("Dir", "linux-x86_64/", ""),
            listing_row("File", "SHA512SUMS", date)
        ))
        .create_async()
        .await;

    (listing, release_dir)
}
