//! Paginated result collection
//!
//! ARL list endpoints all share one contract: `page`/`size` query
//! parameters, 1-indexed pages, and a `{items, total, code}` JSON body.
//! A page shorter than the requested size is the last page; an empty page
//! means the walk is over. Page N+1 is only requested after page N has
//! been inspected, so walks are strictly sequential.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::client::{ArlApi, READ_TIMEOUT};
use crate::modules::ModuleSpec;
use crate::{Error, Result};

/// Default items per page on list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Cap on sequential round trips for one walk. There is no aggregate
/// deadline across pages, so this bounds a pathological backend that
/// keeps producing full pages.
pub const MAX_PAGES: usize = 500;

/// One paginated walk: which endpoint, which filter, which field to keep.
#[derive(Debug, Clone)]
pub struct PageQuery<'a> {
    pub path: &'a str,
    pub filter_param: &'a str,
    pub filter_value: &'a str,
    pub item_field: &'a str,
    pub page_size: usize,
    pub dedup: bool,
}

impl<'a> PageQuery<'a> {
    /// Walk configuration for one scan module's result endpoint.
    pub fn for_module(spec: &'static ModuleSpec, filter_value: &'a str) -> Self {
        Self {
            path: spec.endpoint,
            filter_param: spec.filter_param,
            filter_value,
            item_field: spec.item_field,
            page_size: DEFAULT_PAGE_SIZE,
            dedup: spec.dedup,
        }
    }
}

/// Decoded list page. `code` is the backend's application-level status,
/// distinct from the HTTP status.
pub struct ListPage {
    pub items: Vec<Value>,
    pub total: u64,
    pub code: i64,
}

impl ListPage {
    /// Interpret a list-endpoint response body.
    ///
    /// A missing `code` is tolerated (older backends omit it); a present
    /// non-200 code is a protocol failure carrying the backend message.
    pub fn parse(body: &Value) -> Result<Self> {
        let code = body["code"].as_i64().unwrap_or(200);
        if code != 200 {
            let message = body["message"].as_str().unwrap_or("").to_string();
            return Err(Error::Http {
                status: code as u16,
                body: message,
            });
        }
        let items = body["items"]
            .as_array()
            .ok_or_else(|| Error::Decode("list response missing `items` array".to_string()))?
            .clone();
        let total = body["total"].as_u64().unwrap_or(0);
        Ok(Self { items, total, code })
    }
}

/// Fetch one page of a list endpoint.
pub async fn fetch_page(
    api: &dyn ArlApi,
    query: &PageQuery<'_>,
    page: usize,
) -> Result<ListPage> {
    let params = [
        (query.filter_param, query.filter_value.to_string()),
        ("page", page.to_string()),
        ("size", query.page_size.to_string()),
    ];
    let body = api.get_json(query.path, &params, READ_TIMEOUT).await?;
    ListPage::parse(&body)
}

/// Walk an endpoint to exhaustion, accumulating the extracted field from
/// every item where it is present and non-empty.
///
/// Any transport/HTTP/decode failure mid-walk aborts the walk with that
/// error; partial data is never returned as if it were complete.
pub async fn collect_all(api: &dyn ArlApi, query: &PageQuery<'_>) -> Result<Vec<String>> {
    let mut collected = Vec::new();
    let mut seen = HashSet::new();
    let mut page = 1;

    loop {
        if page > MAX_PAGES {
            return Err(Error::PageBudget {
                path: query.path.to_string(),
                pages: MAX_PAGES,
            });
        }

        let list = fetch_page(api, query, page).await?;
        if list.items.is_empty() {
            break;
        }

        let item_count = list.items.len();
        for item in &list.items {
            let Some(value) = item[query.item_field].as_str() else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            if query.dedup && !seen.insert(value.to_string()) {
                continue;
            }
            collected.push(value.to_string());
        }

        if item_count < query.page_size {
            break;
        }
        page += 1;
    }

    debug!(
        path = query.path,
        pages = page,
        count = collected.len(),
        "paginated walk complete"
    );
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Backend fake that serves a scripted sequence of pages.
    struct PagedApi {
        pages: Vec<Value>,
        served: Mutex<usize>,
    }

    impl PagedApi {
        fn new(pages: Vec<Value>) -> Self {
            Self {
                pages,
                served: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ArlApi for PagedApi {
        async fn get_json(
            &self,
            _path: &str,
            query: &[(&str, String)],
            _timeout: Duration,
        ) -> Result<Value> {
            let page: usize = query
                .iter()
                .find(|(k, _)| *k == "page")
                .map(|(_, v)| v.parse().unwrap())
                .unwrap();
            *self.served.lock().unwrap() += 1;
            Ok(self
                .pages
                .get(page - 1)
                .cloned()
                .unwrap_or_else(|| json!({"items": [], "total": 0, "code": 200})))
        }

        async fn post_json(&self, _path: &str, _body: Value, _timeout: Duration) -> Result<Value> {
            unreachable!("collector never posts")
        }

        async fn get_raw(&self, _path: &str, _timeout: Duration) -> Result<String> {
            unreachable!("collector never fetches raw bodies")
        }
    }

    fn domain_page(domains: &[&str]) -> Value {
        let items: Vec<Value> = domains.iter().map(|d| json!({"domain": d})).collect();
        let total = items.len();
        json!({"items": items, "total": total, "code": 200})
    }

    fn query(size: usize, dedup: bool) -> PageQuery<'static> {
        PageQuery {
            path: "/api/domain/",
            filter_param: "domain",
            filter_value: "example.com",
            item_field: "domain",
            page_size: size,
            dedup,
        }
    }

    #[tokio::test]
    async fn test_short_page_is_final() {
        let api = PagedApi::new(vec![domain_page(&["a.example.com", "b.example.com"])]);
        let result = collect_all(&api, &query(3, false)).await.unwrap();
        assert_eq!(result, vec!["a.example.com", "b.example.com"]);
        assert_eq!(*api.served.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_full_page_then_empty_terminates() {
        let api = PagedApi::new(vec![
            domain_page(&["a.example.com", "b.example.com"]),
            json!({"items": [], "total": 2, "code": 200}),
        ]);
        let result = collect_all(&api, &query(2, false)).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(*api.served.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dedup_preserves_first_seen_order() {
        let api = PagedApi::new(vec![
            domain_page(&["a.example.com", "b.example.com"]),
            domain_page(&["a.example.com"]),
        ]);
        let result = collect_all(&api, &query(2, true)).await.unwrap();
        assert_eq!(result, vec!["a.example.com", "b.example.com"]);
    }

    #[tokio::test]
    async fn test_no_dedup_keeps_duplicates() {
        let api = PagedApi::new(vec![
            domain_page(&["a.example.com", "b.example.com"]),
            domain_page(&["a.example.com"]),
        ]);
        let result = collect_all(&api, &query(2, false)).await.unwrap();
        assert_eq!(
            result,
            vec!["a.example.com", "b.example.com", "a.example.com"]
        );
    }

    #[tokio::test]
    async fn test_items_missing_field_are_skipped() {
        let api = PagedApi::new(vec![json!({
            "items": [
                {"domain": "a.example.com"},
                {"ip": "1.2.3.4"},
                {"domain": ""}
            ],
            "total": 3,
            "code": 200
        })]);
        let result = collect_all(&api, &query(100, false)).await.unwrap();
        assert_eq!(result, vec!["a.example.com"]);
    }

    #[tokio::test]
    async fn test_backend_code_failure_aborts_walk() {
        let api = PagedApi::new(vec![json!({"code": 401, "message": "token invalid"})]);
        let result = collect_all(&api, &query(100, false)).await;
        assert!(matches!(result, Err(Error::Http { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_page_budget_bounds_endless_backend() {
        // Every page is exactly full, so the walk would never end without
        // the budget.
        let pages = (0..=MAX_PAGES)
            .map(|_| domain_page(&["x.example.com"]))
            .collect();
        let api = PagedApi::new(pages);
        let result = collect_all(&api, &query(1, false)).await;
        assert!(matches!(result, Err(Error::PageBudget { .. })));
    }
}
