use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::warn;

use crate::models::blog::{BlogPost, BlogPostList};
use crate::services::client::{ProviderAuth, ProviderClient};

pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const MAX_RESULTS_CAP: u32 = 50;

#[derive(Error, Debug)]
pub enum BloggerError {
    #[error("Blog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Post not found")]
    NotFound,
    #[error("Blog platform returned {status}: {detail}")]
    Api { status: u16, detail: String },
}

pub struct BloggerClient {
    client: ProviderClient,
    blog_id: String,
    label: String,
}

impl BloggerClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        blog_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            client: ProviderClient::new(http, base_url, ProviderAuth::query_key(api_key)),
            blog_id: blog_id.into(),
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Posts carrying the site label, newest first.
    pub async fn list_posts(
        &self,
        page_token: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<BlogPostList, BloggerError> {
        let max_results = max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_CAP);
        let mut query = vec![
            ("labels", self.label.clone()),
            ("maxResults", max_results.to_string()),
            ("fetchImages", "true".to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(&format!("/blogs/{}/posts", self.blog_id), &query)
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await?;
            warn!("Blog platform error {}: {}", status, detail);
            return Err(BloggerError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response.json().await?)
    }

    /// A post that exists but lacks the site label is reported as not found.
    pub async fn get_post(&self, post_id: &str) -> Result<BlogPost, BloggerError> {
        let response = self
            .client
            .get(
                &format!("/blogs/{}/posts/{}", self.blog_id, post_id),
                &[("fetchImages", "true")],
            )
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BloggerError::NotFound);
        }
        if !status.is_success() {
            let detail = response.text().await?;
            return Err(BloggerError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let post: BlogPost = response.json().await?;
        if !post.has_label(&self.label) {
            return Err(BloggerError::NotFound);
        }
        Ok(post)
    }
}
