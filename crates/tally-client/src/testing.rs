//! In-memory backends for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tally_core::{
    Category, CategoryDraft, InvoiceRequest, Money, Page, PageMeta, PageRequest, Product,
    ProductDraft, ProductId,
};

use crate::backend::{
    CatalogApi, CategoryFilter, CreatedRecord, ProductFilter, ProductQuery, SalesApi,
};
use crate::error::{ClientError, ClientResult};
use crate::http::HttpBackend;
use crate::reports::{ChartPoint, SaleRecord, SalesFilter, SalesSummary};
use crate::session::Session;

type ErrorFactory = Box<dyn Fn() -> ClientError + Send + Sync>;

pub(crate) fn product(id: &str, name: &str, price_cents: i64, stock: i64) -> Product {
    Product::new(ProductId::from(id), name, Money::from_cents(price_cents), stock)
}

fn not_used<T>() -> ClientResult<T> {
    Err(ClientError::UnexpectedResponse("not used in tests".into()))
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Default)]
pub(crate) struct FakeCatalog {
    products: Vec<Product>,
    search_error: Option<ErrorFactory>,
    lookup_error: Option<ErrorFactory>,
    search_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
    last_query: Mutex<Option<ProductQuery>>,
}

impl FakeCatalog {
    pub(crate) fn with_products(products: Vec<Product>) -> Self {
        FakeCatalog {
            products,
            ..FakeCatalog::default()
        }
    }

    pub(crate) fn failing_search(
        make_error: impl Fn() -> ClientError + Send + Sync + 'static,
    ) -> Self {
        FakeCatalog {
            search_error: Some(Box::new(make_error)),
            ..FakeCatalog::default()
        }
    }

    pub(crate) fn failing_lookup(
        make_error: impl Fn() -> ClientError + Send + Sync + 'static,
    ) -> Self {
        FakeCatalog {
            lookup_error: Some(Box::new(make_error)),
            ..FakeCatalog::default()
        }
    }

    pub(crate) fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_query(&self) -> Option<ProductQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn search_products(
        &self,
        _session: &Session,
        query: &ProductQuery,
    ) -> ClientResult<Vec<Product>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        if let Some(make_error) = &self.search_error {
            return Err(make_error());
        }
        let needle = query.text.to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .take(query.page_size as usize)
            .cloned()
            .collect())
    }

    async fn get_product(&self, _session: &Session, id: &ProductId) -> ClientResult<Product> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make_error) = &self.lookup_error {
            return Err(make_error());
        }
        self.products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or(ClientError::Rejected {
                status: 404,
                message: Some("Not Found".into()),
            })
    }

    async fn list_products(
        &self,
        _session: &Session,
        page: &PageRequest,
        _filter: &ProductFilter,
    ) -> ClientResult<Page<Product>> {
        Ok(Page {
            items: self.products.clone(),
            meta: PageMeta {
                page: page.page,
                page_size: page.page_size,
                page_count: 1,
                total: self.products.len() as u64,
            },
        })
    }

    async fn save_product(
        &self,
        _session: &Session,
        _document_id: Option<&str>,
        _draft: &ProductDraft,
    ) -> ClientResult<Product> {
        not_used()
    }

    async fn delete_product(&self, _session: &Session, _document_id: &str) -> ClientResult<()> {
        not_used()
    }

    async fn list_categories(
        &self,
        _session: &Session,
        _page: &PageRequest,
        _filter: &CategoryFilter,
    ) -> ClientResult<Page<Category>> {
        not_used()
    }

    async fn save_category(
        &self,
        _session: &Session,
        _document_id: Option<&str>,
        _draft: &CategoryDraft,
    ) -> ClientResult<Category> {
        not_used()
    }

    async fn delete_category(&self, _session: &Session, _document_id: &str) -> ClientResult<()> {
        not_used()
    }
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Default)]
pub(crate) struct FakeSales {
    created_id: Option<String>,
    error: Option<ErrorFactory>,
    failures_left: Option<AtomicUsize>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<InvoiceRequest>>,
}

impl FakeSales {
    /// Accepts every sale and reports `id`.
    pub(crate) fn accepting(id: &str) -> Self {
        FakeSales {
            created_id: Some(id.to_string()),
            ..FakeSales::default()
        }
    }

    /// Answers 2xx without an id.
    pub(crate) fn without_id() -> Self {
        FakeSales::default()
    }

    pub(crate) fn rejecting(make_error: impl Fn() -> ClientError + Send + Sync + 'static) -> Self {
        FakeSales {
            error: Some(Box::new(make_error)),
            ..FakeSales::default()
        }
    }

    /// Fails the first call with `make_error`, then accepts with `id`.
    pub(crate) fn failing_once(
        make_error: impl Fn() -> ClientError + Send + Sync + 'static,
        id: &str,
    ) -> Self {
        FakeSales {
            created_id: Some(id.to_string()),
            error: Some(Box::new(make_error)),
            failures_left: Some(AtomicUsize::new(1)),
            ..FakeSales::default()
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<InvoiceRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl SalesApi for FakeSales {
    async fn create_sale_transaction(
        &self,
        _session: &Session,
        request: &InvoiceRequest,
    ) -> ClientResult<CreatedRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(make_error) = &self.error {
            let fail = match &self.failures_left {
                Some(left) => left
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok(),
                None => true,
            };
            if fail {
                return Err(make_error());
            }
        }
        self.created_id
            .clone()
            .map(|id| CreatedRecord {
                id,
                document_id: None,
            })
            .ok_or(ClientError::SaleNotCreated)
    }

    async fn get_sale(&self, _session: &Session, _document_id: &str) -> ClientResult<SaleRecord> {
        not_used()
    }

    async fn list_sales(
        &self,
        _session: &Session,
        _page: &PageRequest,
        _filter: &SalesFilter,
    ) -> ClientResult<Page<SaleRecord>> {
        not_used()
    }

    async fn delete_sale(&self, _session: &Session, _document_id: &str) -> ClientResult<()> {
        not_used()
    }

    async fn sales_summary(&self, _session: &Session) -> ClientResult<SalesSummary> {
        Ok(SalesSummary::default())
    }

    async fn sales_chart(&self, _session: &Session) -> ClientResult<Vec<ChartPoint>> {
        Ok(Vec::new())
    }
}

// =============================================================================
// Canned HTTP Backend
// =============================================================================

/// One request as the canned server received it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub(crate) fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

struct Canned {
    /// Served in order; the last one repeats.
    responses: Mutex<VecDeque<(u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Local HTTP server answering with fixed responses and recording requests.
pub(crate) struct CannedServer {
    base_url: String,
    canned: Arc<Canned>,
}

impl CannedServer {
    pub(crate) async fn answering(status: u16, body: &str) -> Self {
        CannedServer::answering_in_turn(&[(status, body)]).await
    }

    pub(crate) async fn answering_in_turn(responses: &[(u16, &str)]) -> Self {
        let canned = Arc::new(Canned {
            responses: Mutex::new(
                responses
                    .iter()
                    .map(|(status, body)| (*status, body.to_string()))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(answer).with_state(canned.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        CannedServer {
            base_url: format!("http://{}", addr),
            canned,
        }
    }

    pub(crate) fn backend(&self) -> HttpBackend {
        HttpBackend::unproxied(&self.base_url)
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.canned.requests.lock().unwrap().clone()
    }

    pub(crate) fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests[0].clone()
    }
}

async fn answer(
    State(canned): State<Arc<Canned>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    canned.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let (status, body) = {
        let mut responses = canned.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap()
        }
    };
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
