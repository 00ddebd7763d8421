use futures_util::future::try_join_all;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::event::{HumanitixEvent, HumanitixEventsPage};
use crate::services::client::{ProviderAuth, ProviderClient};

pub const UPSTREAM_PAGE_SIZE: usize = 100;
pub const MAX_UPSTREAM_PAGES: usize = 20;

#[derive(Error, Debug)]
pub enum HumanitixError {
    #[error("Ticketing request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Ticketing platform returned {status}: {detail}")]
    Api { status: u16, detail: String },
}

pub struct HumanitixClient {
    client: ProviderClient,
}

impl HumanitixClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: ProviderClient::new(http, base_url, ProviderAuth::header("x-api-key", api_key)),
        }
    }

    pub async fn events_page(&self, page: usize) -> Result<HumanitixEventsPage, HumanitixError> {
        let query = [
            ("page", page.to_string()),
            ("pageSize", UPSTREAM_PAGE_SIZE.to_string()),
        ];
        let response = self.client.get("/events", &query[..]).await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await?;
            warn!("Ticketing platform error {}: {}", status, detail);
            return Err(HumanitixError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response.json().await?)
    }

    /// Reads the first page for the total, then the rest concurrently.
    pub async fn all_events(&self) -> Result<Vec<HumanitixEvent>, HumanitixError> {
        let first = self.events_page(1).await?;
        let page_size = first.page_size.unwrap_or(UPSTREAM_PAGE_SIZE).max(1);
        let pages = first.total.div_ceil(page_size).clamp(1, MAX_UPSTREAM_PAGES);
        if first.total > pages * page_size {
            warn!(
                "Ticketing platform reports {} events; only the first {} are read",
                first.total,
                pages * page_size
            );
        }

        let mut events = first.events;
        if pages > 1 {
            let rest = try_join_all((2..=pages).map(|page| self.events_page(page))).await?;
            for page in rest {
                events.extend(page.events);
            }
        }

        info!("Fetched {} events from the ticketing platform", events.len());
        Ok(events)
    }
}
