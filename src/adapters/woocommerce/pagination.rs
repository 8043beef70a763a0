//! Pull-based pagination over list endpoints
//!
//! Pages are requested strictly one after another. The total page count is
//! taken from the first response and never revised, so a later response that
//! reports a different count cannot cause extra requests.

use super::client::WooCommerceClient;
use crate::domain::ids::Endpoint;
use crate::domain::FetchError;
use serde_json::Value;

/// One page of raw records
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number
    pub number: u32,

    /// Records in response order
    pub records: Vec<Value>,

    /// Total page count reported by this response, if any
    pub total_pages: Option<u32>,
}

/// Lazy sequence of pages for one endpoint and filter
pub struct Paginator<'a> {
    client: &'a WooCommerceClient,
    endpoint: Endpoint,
    params: Vec<(String, String)>,
    next_page: u32,
    total_pages: Option<u32>,
}

impl<'a> Paginator<'a> {
    pub(crate) fn new(
        client: &'a WooCommerceClient,
        endpoint: Endpoint,
        params: Vec<(String, String)>,
    ) -> Self {
        Self {
            client,
            endpoint,
            params,
            next_page: 1,
            total_pages: None,
        }
    }

    /// Fetch the next page, or `None` once every page has been returned
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] that survives the retry policy. The paginator should
    /// not be polled again after an error.
    pub async fn next_page(&mut self) -> Result<Option<Page>, FetchError> {
        if let Some(total) = self.total_pages {
            if self.next_page > total {
                return Ok(None);
            }
        }

        let page = self
            .client
            .get_page(self.endpoint, &self.params, self.next_page)
            .await?;

        let total = *self
            .total_pages
            .get_or_insert(page.total_pages.unwrap_or(1).max(1));

        if page.total_pages.is_some_and(|reported| reported != total) {
            tracing::debug!(
                endpoint = %self.endpoint,
                page = page.number,
                reported = page.total_pages,
                total_pages = total,
                "Ignoring changed page count"
            );
        }

        crate::log_page_fetched!(self.endpoint, page.number, total, page.records.len());

        self.next_page += 1;
        Ok(Some(page))
    }

    /// Total page count, known after the first page
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Endpoint being paginated
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }
}
