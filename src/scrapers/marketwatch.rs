//! MarketWatch newsviewer spider.
//!
//! Fetches the "latest news" listing from the
//! [newsviewer](http://www.marketwatch.com/newsviewer) with a single GET.
//! Requests are refused before they leave the process when the URL's host is
//! not on the allow-list, and redirects are only followed to allowed hosts.

use crate::utils::{is_allowed_domain, truncate_for_log};
use reqwest::redirect::Policy;
use std::error::Error;
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

/// Listing page scraped when no URL is given.
pub const START_URL: &str = "http://www.marketwatch.com/newsviewer";

/// Domain the spider may fetch from by default.
pub const ALLOWED_DOMAIN: &str = "marketwatch.com";

/// A URL whose host is outside the allow-list.
#[derive(Debug, thiserror::Error)]
#[error("refusing to fetch {url}: host is not in allowed domains [{}]", .allowed.join(", "))]
pub struct OffsiteUrl {
    pub url: String,
    pub allowed: Vec<String>,
}

/// Redirect hops followed before giving up, as in reqwest's default policy.
const MAX_REDIRECTS: usize = 10;

/// HTTP client whose redirect policy applies the same allow-list as the
/// initial request.
fn listing_client(allowed_domains: &[String]) -> reqwest::Result<reqwest::Client> {
    let allowed = allowed_domains.to_vec();
    let policy = Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        if is_allowed_domain(attempt.url(), &allowed) {
            return attempt.follow();
        }
        let offsite = OffsiteUrl {
            url: attempt.url().to_string(),
            allowed: allowed.clone(),
        };
        attempt.error(offsite)
    });
    reqwest::Client::builder().redirect(policy).build()
}

/// Download the listing page at `page_url`.
///
/// # Errors
///
/// Returns an error if the URL does not parse, its host (or the host of
/// any redirect target) is not allowed, the request fails, or the server
/// answers with a non-success status.
#[instrument(level = "info", skip(allowed_domains))]
pub async fn fetch_listing(
    page_url: &str,
    allowed_domains: &[String],
) -> Result<String, Box<dyn Error>> {
    let url = Url::parse(page_url)?;
    if !is_allowed_domain(&url, allowed_domains) {
        return Err(Box::new(OffsiteUrl {
            url: page_url.to_string(),
            allowed: allowed_domains.to_vec(),
        }));
    }

    let response = listing_client(allowed_domains)?
        .get(url)
        .send()
        .await?
        .error_for_status()?;
    let status = response.status();
    let html = response.text().await?;

    info!(%status, bytes = html.len(), "Fetched listing page");
    debug!(preview = %truncate_for_log(&html, 200), "Listing body");
    Ok(html)
}

/// Read a previously saved listing page from disk.
#[instrument(level = "info")]
pub async fn read_listing(path: &str) -> Result<String, Box<dyn Error>> {
    let html = fs::read_to_string(path).await?;
    info!(bytes = html.len(), "Read listing page from file");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn error_chain(err: &(dyn Error + 'static)) -> Vec<String> {
        let mut chain = vec![err.to_string()];
        let mut source = err.source();
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }
        chain
    }

    #[tokio::test]
    async fn test_redirect_to_offsite_host_refused() {
        let server = MockServer::start_async().await;
        let _redirect = server
            .mock_async(|when, then| {
                when.method(GET).path("/newsviewer");
                then.status(302)
                    .header("Location", "http://offsite.invalid/newsviewer");
            })
            .await;

        let allowed = vec!["127.0.0.1".to_string()];
        let err = fetch_listing(&server.url("/newsviewer"), &allowed)
            .await
            .unwrap_err();

        let chain = error_chain(&*err);
        assert!(
            chain.iter().any(|msg| msg.contains("refusing to fetch http://offsite.invalid/")),
            "unexpected error chain: {chain:?}"
        );
    }

    #[tokio::test]
    async fn test_redirect_within_allowed_host_followed() {
        let server = MockServer::start_async().await;
        let target = server.url("/latest");
        let _redirect = server
            .mock_async(|when, then| {
                when.method(GET).path("/newsviewer");
                then.status(301).header("Location", &target);
            })
            .await;
        let _page = server
            .mock_async(|when, then| {
                when.method(GET).path("/latest");
                then.status(200).body("<ul></ul>");
            })
            .await;

        let allowed = vec!["127.0.0.1".to_string()];
        let html = fetch_listing(&server.url("/newsviewer"), &allowed)
            .await
            .unwrap();
        assert_eq!(html, "<ul></ul>");
    }

    #[tokio::test]
    async fn test_offsite_url_refused_without_request() {
        let allowed = vec![ALLOWED_DOMAIN.to_string()];
        let err = fetch_listing("http://example.invalid/newsviewer", &allowed)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("refusing to fetch"));
        assert!(err.to_string().contains("marketwatch.com"));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let allowed = vec![ALLOWED_DOMAIN.to_string()];
        assert!(fetch_listing("not a url", &allowed).await.is_err());
    }

    #[tokio::test]
    async fn test_read_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newsviewer.html");
        std::fs::write(&path, "<html></html>").unwrap();

        let html = read_listing(path.to_str().unwrap()).await.unwrap();
        assert_eq!(html, "<html></html>");
    }

    #[test]
    fn test_start_url_is_allowed() {
        let url = Url::parse(START_URL).unwrap();
        assert!(is_allowed_domain(&url, &[ALLOWED_DOMAIN.to_string()]));
    }
}
