//! Low-level HTTP helpers shared by the provider clients.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::DiscoveryError;

/// Builds the shared `reqwest::Client` with a per-request timeout and the
/// descriptive `User-Agent` the public OSM services require.
///
/// # Errors
///
/// Returns [`DiscoveryError::Http`] if the client cannot be constructed.
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, DiscoveryError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// GET `url` with `query` and parse the body as JSON.
pub(crate) async fn get_json(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<serde_json::Value, DiscoveryError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .query(query)
        .send()
        .await?;
    read_json(response, url).await
}

/// POST `form` to `url` as `application/x-www-form-urlencoded` and parse the
/// body as JSON.
pub(crate) async fn post_form_json(
    client: &Client,
    url: &str,
    form: &[(&str, &str)],
) -> Result<serde_json::Value, DiscoveryError> {
    let response = client
        .post(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(form)
        .send()
        .await?;
    read_json(response, url).await
}

async fn read_json(response: Response, url: &str) -> Result<serde_json::Value, DiscoveryError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(DiscoveryError::RateLimited {
            url: url.to_owned(),
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(DiscoveryError::HttpStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| DiscoveryError::Deserialize {
        context: format!("response from {url}"),
        source,
    })
}

/// Joins a base URL and a path without doubling or dropping the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
