use log::info;
use url::Url;

use super::types::PhotoOfTheDay;
use crate::error::{Result, WhosInSpaceError};
use crate::sources::http::{base_url, HttpFetcher};

/// Client for NASA's Astronomy Picture of the Day endpoint.
pub struct PhotoOfTheDayClient {
    http: HttpFetcher,
    apod_url: Url,
}

impl PhotoOfTheDayClient {
    pub fn new(http: HttpFetcher, nasa_url: &str, api_key: &str) -> Result<Self> {
        let mut apod_url = base_url(nasa_url)?
            .join("planetary/apod")
            .map_err(|e| WhosInSpaceError::Config(format!("Invalid NASA URL: {e}")))?;
        apod_url.query_pairs_mut().append_pair("api_key", api_key);

        Ok(Self { http, apod_url })
    }

    pub async fn fetch_photo_of_the_day(&self) -> Result<PhotoOfTheDay> {
        let photo: PhotoOfTheDay = self.http.get_json(&self.apod_url).await?;
        info!(
            "Photo of the day: {}",
            photo.title.as_deref().unwrap_or("(untitled)")
        );
        Ok(photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::http::test_fetch_config;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_fetch_photo_of_the_day_sends_api_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/planetary/apod")
            .match_query(mockito::Matcher::UrlEncoded(
                "api_key".into(),
                "secret".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"title": "Pillars", "url": "https://apod.test/p.jpg", "media_type": "image"}"#,
            )
            .create_async()
            .await;

        let http = HttpFetcher::new(
            &test_fetch_config(Duration::from_secs(5), 1),
            CancellationToken::new(),
        )
        .unwrap();
        let client = PhotoOfTheDayClient::new(http, &server.url(), "secret").unwrap();
        let photo = client.fetch_photo_of_the_day().await.unwrap();

        assert_eq!(photo.title.as_deref(), Some("Pillars"));
        assert_eq!(photo.backdrop_url(), Some("https://apod.test/p.jpg"));
        mock.assert_async().await;
    }
}
