//! Probe client for Gelbooru-compatible APIs.
//!
//! The window math upstream only ever asks one question: "give me page N
//! of this search, at most L posts". [`SearchClient`] is that single
//! operation, and [`GelbooruClient`] answers it over the DAPI JSON post
//! index. Sort direction and ID bounds travel as ordinary tag tokens
//! (`sort:id:asc`, `id:>N`), the only way the DAPI can express them.
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use tokio::time::sleep;

use crate::config::ServerConfig;
use crate::join_tags;

use self::error::ClientError;
use self::models::{Post, PostListResponse};

pub mod error;
pub mod models;

/// Single operation the deep search core consumes: fetch one page of an
/// ordered search. Pages beyond the available data come back empty; a
/// page as long as `limit` is the only hint that more data may follow.
#[async_trait]
pub trait SearchClient {
    async fn search(&self, tags: &[String], limit: u64, page: u64)
        -> Result<Vec<Post>, ClientError>;
}

/// How often a failed request may be re-sent before giving up, with the
/// delay doubling after every failure.
///
/// The default is a single attempt: a transient network failure aborts
/// the whole partition computation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(500),
        }
    }
}

/// Client for the post index of one Gelbooru-compatible website.
#[derive(Debug)]
pub struct GelbooruClient {
    client: Client,
    post_list_url: String,
    debounce: Duration,
    retry: RetryPolicy,
}

impl GelbooruClient {
    pub fn new(config: &ServerConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(config.client_user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            post_list_url: config.post_list_url.clone(),
            debounce: Duration::from_millis(500),
            retry: RetryPolicy::default(),
        })
    }

    /// Sets the pause inserted after every API call.
    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn search_url(&self, tags: &[String]) -> String {
        let tag_string = join_tags!(tags);
        format!("{}&tags={}", self.post_list_url, tag_string)
    }

    async fn fetch_page(&self, url: &str, limit: u64, page: u64) -> Result<Vec<Post>, ClientError> {
        let items = self
            .client
            .get(url)
            .query(&[("limit", limit), ("pid", page)])
            .send()
            .await?
            .error_for_status()?
            .json::<PostListResponse>()
            .await?;

        items.into_posts()
    }
}

#[async_trait]
impl SearchClient for GelbooruClient {
    async fn search(
        &self,
        tags: &[String],
        limit: u64,
        page: u64,
    ) -> Result<Vec<Post>, ClientError> {
        let url = self.search_url(tags);

        let mut delay = self.retry.initial_delay;
        let mut attempt = 1;

        loop {
            debug!("Fetching posts from page {}", page);

            match self.fetch_page(&url, limit, page).await {
                Ok(posts) => {
                    debug!("List size: {}", posts.len());

                    if !self.debounce.is_zero() {
                        debug!("Debouncing API calls by {:?}", self.debounce);
                        sleep(self.debounce).await;
                    }

                    return Ok(posts);
                }
                Err(e) if attempt < self.retry.max_attempts => {
                    warn!("Request failed ({}), retrying in {:?}", e, delay);
                    sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::SearchLimits;
    use mockito::{mock, Matcher};

    // Each test talks to its own path on the shared mock server so the
    // mocks never shadow each other across parallel tests.
    fn test_config(base_url: &str, path: &str) -> ServerConfig {
        ServerConfig {
            name: "test".to_string(),
            pretty_name: "Test".to_string(),
            client_user_agent: "booru_deep_search/unit_test".to_string(),
            post_list_url: format!("{base_url}{path}?page=dapi&s=post&q=index&json=1"),
            limits: SearchLimits::new(200, 100).unwrap(),
        }
    }

    #[test]
    fn search_url_appends_joined_tags() {
        let config = test_config("https://gelbooru.com", "/index.php");
        let client = GelbooruClient::new(&config).unwrap();

        let tags = vec![
            "kroos_(arknights)".to_string(),
            "sort:id:asc".to_string(),
            "id:>7".to_string(),
        ];

        assert_eq!(
            client.search_url(&tags),
            "https://gelbooru.com/index.php?page=dapi&s=post&q=index&json=1\
             &tags=kroos_(arknights)+sort:id:asc+id:>7"
        );
    }

    #[tokio::test]
    async fn search_maps_a_page_of_posts() {
        let _m = mock("GET", Matcher::Regex("^/posts/index.php".to_string()))
            .with_body(r#"{"post": [{"id": 8}, {"id": 9}]}"#)
            .create();

        let client = GelbooruClient::new(&test_config(&mockito::server_url(), "/posts/index.php"))
            .unwrap()
            .debounce(Duration::ZERO);

        let posts = client
            .search(&["kroos_(arknights)".to_string()], 100, 0)
            .await
            .unwrap();

        assert_eq!(posts, vec![Post { id: 8 }, Post { id: 9 }]);
    }

    #[tokio::test]
    async fn failed_requests_are_retried_up_to_the_attempt_cap() {
        let m = mock("GET", Matcher::Regex("^/retry/index.php".to_string()))
            .with_status(503)
            .expect(3)
            .create();

        let client = GelbooruClient::new(&test_config(&mockito::server_url(), "/retry/index.php"))
            .unwrap()
            .debounce(Duration::ZERO)
            .retry_policy(RetryPolicy {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
            });

        let result = client.search(&["solo".to_string()], 100, 0).await;

        assert!(matches!(result, Err(ClientError::ConnectionError(_))));
        m.assert();
    }

    #[tokio::test]
    async fn single_attempt_policy_fails_fast() {
        let m = mock("GET", Matcher::Regex("^/once/index.php".to_string()))
            .with_status(503)
            .expect(1)
            .create();

        let client = GelbooruClient::new(&test_config(&mockito::server_url(), "/once/index.php"))
            .unwrap()
            .debounce(Duration::ZERO);

        let result = client.search(&["solo".to_string()], 100, 0).await;

        assert!(matches!(result, Err(ClientError::ConnectionError(_))));
        m.assert();
    }
}
