//! # HTTP Backend
//!
//! [`HttpBackend`] implements the backend traits against the content
//! backend's REST API using `reqwest`.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  endpoint(["api", "products"]) ──► base URL + path segments             │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  request(method, url, &session)                                         │
//! │          │   Authorization: Bearer <jwt>   only if session has a token  │
//! │          ▼                                                              │
//! │  send ──► transport error? ──────────────► ClientError::Network         │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  status 2xx? ── no ──► body.error.message ► ClientError::Rejected       │
//! │          │                                                              │
//! │         yes                                                             │
//! │          ▼                                                              │
//! │  decode JSON ── fails ───────────────────► UnexpectedResponse           │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  wire record ──► domain type (Decimal → Money, once)                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No request is retried.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tally_core::validation::{validate_category_draft, validate_product_draft};
use tally_core::{
    Category, CategoryDraft, InvoiceRequest, Page, PageRequest, Product, ProductDraft, ProductId,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::backend::{
    page_pairs, AuthApi, CatalogApi, CategoryFilter, CreatedRecord, ProductFilter, ProductQuery,
    SalesApi,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::reports::{ChartPoint, SaleRecord, SalesFilter, SalesSummary};
use crate::session::{Credentials, Registration, Session, SessionUser};
use crate::wire::{
    error_message, into_page, AuthResponse, CategoryPayload, CategoryRecord, ChartResponse,
    CreatedRecordWire, DataEnvelope, ListEnvelope, ProductPayload, ProductRecord,
    RegisterPayload, SaleRecordWire, SaleTransactionPayload, SummaryWire, UserNamesPayload,
};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// Populates each sale line's product and that product's image.
const SALE_POPULATE: (&str, &str) = ("populate[products][populate][product][populate]", "image");

/// Content backend client.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Builds a client from validated configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = config.base_url()?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.backend.url.clone()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("tally/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        info!(base_url = %base_url, "HTTP backend ready");
        Ok(HttpBackend { client, base_url })
    }

    /// Client for a local test server, bypassing any system proxy.
    #[cfg(test)]
    pub(crate) fn unproxied(base_url: &str) -> Self {
        HttpBackend {
            client: Client::builder().no_proxy().build().unwrap(),
            base_url: Url::parse(base_url).unwrap(),
        }
    }

    /// Base URL with the given path segments appended (segments are escaped).
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, session: &Session) -> RequestBuilder {
        debug!(method = %method, path = url.path(), "Backend request");
        let builder = self.client.request(method, url);
        match session.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and decodes a 2xx JSON body.
    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::rejected(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(status = status.as_u16(), error = %e, "Undecodable backend response");
            ClientError::UnexpectedResponse(e.to_string())
        })
    }

    /// Sends the request and ignores any 2xx body.
    async fn send_empty(builder: RequestBuilder) -> ClientResult<()> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::rejected(status, &body))
    }

    fn rejected(status: StatusCode, body: &str) -> ClientError {
        let message = error_message(body);
        warn!(
            status = status.as_u16(),
            message = message.as_deref().unwrap_or("-"),
            "Backend rejected request"
        );
        ClientError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    /// Supplies a default message for a rejection that came without one.
    fn with_fallback(err: ClientError, fallback: &str) -> ClientError {
        match err {
            ClientError::Rejected {
                status,
                message: None,
            } => ClientError::Rejected {
                status,
                message: Some(fallback.to_string()),
            },
            other => other,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[async_trait]
impl CatalogApi for HttpBackend {
    async fn search_products(
        &self,
        session: &Session,
        query: &ProductQuery,
    ) -> ClientResult<Vec<Product>> {
        let url = self.endpoint(&["api", "products"])?;
        let builder = self
            .request(Method::GET, url, session)
            .query(&query.query_pairs());

        let envelope: ListEnvelope<ProductRecord> = Self::send(builder).await?;
        envelope
            .data
            .into_iter()
            .map(ProductRecord::into_product)
            .collect()
    }

    async fn get_product(&self, session: &Session, id: &ProductId) -> ClientResult<Product> {
        let url = self.endpoint(&["api", "products", id.as_str()])?;
        let builder = self
            .request(Method::GET, url, session)
            .query(&[("populate", "*")]);

        let envelope: DataEnvelope<ProductRecord> = Self::send(builder).await?;
        envelope.data.into_product()
    }

    async fn list_products(
        &self,
        session: &Session,
        page: &PageRequest,
        filter: &ProductFilter,
    ) -> ClientResult<Page<Product>> {
        let url = self.endpoint(&["api", "products"])?;
        let builder = self
            .request(Method::GET, url, session)
            .query(&page_pairs(page))
            .query(&filter.query_pairs())
            .query(&[("populate", "*")]);

        let envelope: ListEnvelope<ProductRecord> = Self::send(builder).await?;
        into_page(envelope, ProductRecord::into_product)
    }

    async fn save_product(
        &self,
        session: &Session,
        document_id: Option<&str>,
        draft: &ProductDraft,
    ) -> ClientResult<Product> {
        validate_product_draft(draft)?;
        let (method, url) = match document_id {
            Some(doc) => (Method::PUT, self.endpoint(&["api", "products", doc])?),
            None => (Method::POST, self.endpoint(&["api", "products"])?),
        };
        let body = DataEnvelope {
            data: ProductPayload::from(draft),
        };

        let envelope: DataEnvelope<ProductRecord> =
            Self::send(self.request(method, url, session).json(&body)).await?;
        let product = envelope.data.into_product()?;
        info!(product_id = %product.id, name = %product.name, "Product saved");
        Ok(product)
    }

    async fn delete_product(&self, session: &Session, document_id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["api", "products", document_id])?;
        Self::send_empty(self.request(Method::DELETE, url, session)).await?;
        info!(document_id, "Product deleted");
        Ok(())
    }

    async fn list_categories(
        &self,
        session: &Session,
        page: &PageRequest,
        filter: &CategoryFilter,
    ) -> ClientResult<Page<Category>> {
        let url = self.endpoint(&["api", "categories"])?;
        let builder = self
            .request(Method::GET, url, session)
            .query(&page_pairs(page))
            .query(&filter.query_pairs());

        let envelope: ListEnvelope<CategoryRecord> = Self::send(builder).await?;
        into_page(envelope, |record| Ok(record.into_category()))
    }

    async fn save_category(
        &self,
        session: &Session,
        document_id: Option<&str>,
        draft: &CategoryDraft,
    ) -> ClientResult<Category> {
        validate_category_draft(draft)?;
        let (method, url) = match document_id {
            Some(doc) => (Method::PUT, self.endpoint(&["api", "categories", doc])?),
            None => (Method::POST, self.endpoint(&["api", "categories"])?),
        };
        let body = DataEnvelope {
            data: CategoryPayload::from(draft),
        };

        let envelope: DataEnvelope<CategoryRecord> =
            Self::send(self.request(method, url, session).json(&body)).await?;
        let category = envelope.data.into_category();
        info!(category_id = %category.id, name = %category.name, "Category saved");
        Ok(category)
    }

    async fn delete_category(&self, session: &Session, document_id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["api", "categories", document_id])?;
        Self::send_empty(self.request(Method::DELETE, url, session)).await?;
        info!(document_id, "Category deleted");
        Ok(())
    }
}

// =============================================================================
// Sales
// =============================================================================

#[async_trait]
impl SalesApi for HttpBackend {
    async fn create_sale_transaction(
        &self,
        session: &Session,
        request: &InvoiceRequest,
    ) -> ClientResult<CreatedRecord> {
        let url = self.endpoint(&["api", "sale-transactions"])?;
        let body = DataEnvelope {
            data: SaleTransactionPayload::from(request),
        };

        let envelope: DataEnvelope<Option<CreatedRecordWire>> =
            Self::send(self.request(Method::POST, url, session).json(&body)).await?;

        let record = envelope
            .data
            .and_then(CreatedRecordWire::into_record)
            .ok_or(ClientError::SaleNotCreated)?;
        info!(
            sale_id = %record.id,
            invoice_number = %request.invoice_number,
            total = %request.totals.total,
            "Sale transaction created"
        );
        Ok(record)
    }

    async fn get_sale(&self, session: &Session, document_id: &str) -> ClientResult<SaleRecord> {
        let url = self.endpoint(&["api", "sales", document_id])?;
        let builder = self
            .request(Method::GET, url, session)
            .query(&[SALE_POPULATE]);

        let envelope: DataEnvelope<SaleRecordWire> = Self::send(builder).await?;
        envelope.data.into_record()
    }

    async fn list_sales(
        &self,
        session: &Session,
        page: &PageRequest,
        filter: &SalesFilter,
    ) -> ClientResult<Page<SaleRecord>> {
        let url = self.endpoint(&["api", "sales"])?;
        let builder = self
            .request(Method::GET, url, session)
            .query(&page_pairs(page))
            .query(&filter.query_pairs());

        let envelope: ListEnvelope<SaleRecordWire> = Self::send(builder).await?;
        into_page(envelope, SaleRecordWire::into_record)
    }

    async fn delete_sale(&self, session: &Session, document_id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["api", "sales", document_id])?;
        Self::send_empty(self.request(Method::DELETE, url, session)).await?;
        info!(document_id, "Sale deleted");
        Ok(())
    }

    async fn sales_summary(&self, session: &Session) -> ClientResult<SalesSummary> {
        let url = self.endpoint(&["api", "sales", "summary"])?;
        let envelope: DataEnvelope<SummaryWire> =
            Self::send(self.request(Method::GET, url, session)).await?;
        envelope.data.into_summary()
    }

    async fn sales_chart(&self, session: &Session) -> ClientResult<Vec<ChartPoint>> {
        let url = self.endpoint(&["api", "sales", "chartData"])?;
        let response: ChartResponse = Self::send(self.request(Method::GET, url, session)).await?;
        response.into_points()
    }
}

// =============================================================================
// Auth
// =============================================================================

#[async_trait]
impl AuthApi for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> ClientResult<Session> {
        let url = self.endpoint(&["api", "auth", "local"])?;
        let builder = self
            .request(Method::POST, url, &Session::anonymous())
            .json(credentials);

        let response: AuthResponse = Self::send(builder)
            .await
            .map_err(|e| Self::with_fallback(e, LOGIN_FAILED))?;

        let session = response.into_session().ok_or(ClientError::Rejected {
            status: StatusCode::OK.as_u16(),
            message: Some(LOGIN_FAILED.to_string()),
        })?;
        info!(identifier = %credentials.identifier, "Logged in");
        Ok(session)
    }

    async fn register(&self, registration: &Registration) -> ClientResult<Session> {
        let url = self.endpoint(&["api", "auth", "local", "register"])?;
        let payload = RegisterPayload {
            username: &registration.email,
            email: &registration.email,
            password: &registration.password,
        };
        let builder = self
            .request(Method::POST, url, &Session::anonymous())
            .json(&payload);

        let response: AuthResponse = Self::send(builder)
            .await
            .map_err(|e| Self::with_fallback(e, REGISTRATION_FAILED))?;
        let registered = response.into_session().ok_or_else(registration_failed)?;
        let (user_id, token) = registered_identity(&registered)?;

        let url = self.endpoint(&["api", "users", &user_id])?;
        let names = UserNamesPayload {
            first_name: &registration.first_name,
            last_name: &registration.last_name,
        };
        let user: SessionUser =
            Self::send(self.request(Method::PUT, url, &registered).json(&names)).await?;

        info!(user_id = user.id, "Registered new user");
        Ok(Session::authenticated(token, user))
    }
}

fn registration_failed() -> ClientError {
    ClientError::Rejected {
        status: StatusCode::OK.as_u16(),
        message: Some(REGISTRATION_FAILED.to_string()),
    }
}

/// User id and token of a freshly registered session; both are required
/// before the profile update can be addressed.
fn registered_identity(session: &Session) -> ClientResult<(String, String)> {
    match (session.user(), session.bearer()) {
        (Some(user), Some(token)) => Ok((user.id.to_string(), token.to_string())),
        _ => {
            warn!("Registration response without user or token");
            Err(registration_failed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedServer;
    use chrono::{TimeZone, Utc};
    use tally_core::{Cart, CategoryId, InvoiceDetails, Money, PricingPolicy, TaxRate};

    const PRODUCT_BODY: &str = r#"{"data":{"id":7,"documentId":"k2xq","name":"Cola 330ml",
        "price":1.5,"stock":24,"barcode":"5449000000996","category":{"id":2,"name":"Drinks"}}}"#;

    fn invoice() -> InvoiceRequest {
        let mut cart = Cart::new();
        let widget = Product::new(ProductId::from("1"), "Widget", Money::from_cents(1000), 5);
        cart.add(&widget);
        cart.add(&widget);
        cart.add(&Product::new(ProductId::from("2"), "Gadget", Money::from_cents(500), 5));
        let details = InvoiceDetails {
            customer_name: "Ada Lovelace".to_string(),
            invoice_number: "INV-001".to_string(),
            customer_email: "ada@example.com".to_string(),
            customer_phone: "555-0100".to_string(),
            date: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            notes: None,
        };
        let policy = PricingPolicy::point_of_sale(Money::from_cents(500), TaxRate::from_bps(800));
        InvoiceRequest::build(&details, &cart, &policy).unwrap()
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: " Cola 330ml ".to_string(),
            description: None,
            price: Money::from_cents(150),
            stock: 24,
            barcode: "5449000000996".to_string(),
            category: Some(CategoryId::from("2")),
        }
    }

    fn user(id: u64) -> SessionUser {
        SessionUser {
            id,
            username: "ada@example.com".to_string(),
            email: "ada@example.com".to_string(),
            first_name: None,
            last_name: None,
        }
    }

    fn backend(url: &str) -> HttpBackend {
        let mut config = ClientConfig::default();
        config.backend.url = url.to_string();
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let http = backend("http://localhost:1337");
        assert_eq!(
            http.endpoint(&["api", "products"]).unwrap().as_str(),
            "http://localhost:1337/api/products"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_escapes() {
        let http = backend("https://example.com/cms/");
        assert_eq!(
            http.endpoint(&["api", "sales", "a/b"]).unwrap().as_str(),
            "https://example.com/cms/api/sales/a%2Fb"
        );
    }

    #[test]
    fn test_bearer_only_with_token() {
        let http = backend("http://localhost:1337");
        let url = http.endpoint(&["api", "products"]).unwrap();

        let anonymous = http
            .request(Method::GET, url.clone(), &Session::anonymous())
            .build()
            .unwrap();
        assert!(anonymous.headers().get("authorization").is_none());

        let signed_in = http
            .request(Method::GET, url, &Session::with_token("jwt-123"))
            .build()
            .unwrap();
        assert_eq!(
            signed_in.headers().get("authorization").unwrap(),
            "Bearer jwt-123"
        );
    }

    #[test]
    fn test_search_query_string() {
        let http = backend("http://localhost:1337");
        let query = ProductQuery {
            text: "cola zero".to_string(),
            category: None,
            page_size: 25,
        };
        let request = http
            .request(
                Method::GET,
                http.endpoint(&["api", "products"]).unwrap(),
                &Session::anonymous(),
            )
            .query(&query.query_pairs())
            .build()
            .unwrap();

        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("filters[name][$containsi]".into(), "cola zero".into())));
        assert!(pairs.contains(&("pagination[pageSize]".into(), "25".into())));
    }

    #[test]
    fn test_rejected_uses_backend_message() {
        let err = HttpBackend::rejected(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"status":400,"message":"Insufficient stock"}}"#,
        );
        assert_eq!(err.user_message(), "Insufficient stock");

        let err = HttpBackend::rejected(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn test_login_fallback_message() {
        let err = HttpBackend::with_fallback(
            ClientError::Rejected {
                status: 400,
                message: None,
            },
            LOGIN_FAILED,
        );
        assert_eq!(err.user_message(), "Login failed");

        let kept = HttpBackend::with_fallback(
            ClientError::Rejected {
                status: 400,
                message: Some("Invalid identifier or password".into()),
            },
            LOGIN_FAILED,
        );
        assert_eq!(kept.user_message(), "Invalid identifier or password");
    }

    #[test]
    fn test_registered_identity_requires_user_and_token() {
        let session = Session::authenticated("tok".to_string(), user(9));
        assert_eq!(
            registered_identity(&session).unwrap(),
            ("9".to_string(), "tok".to_string())
        );

        for incomplete in [Session::with_token("tok"), Session::anonymous()] {
            let err = registered_identity(&incomplete).unwrap_err();
            assert_eq!(err.user_message(), REGISTRATION_FAILED);
        }
    }

    // =========================================================================
    // Exchanges against a local canned backend
    // =========================================================================

    #[tokio::test]
    async fn test_sale_rejection_carries_backend_message() {
        let server = CannedServer::answering(
            400,
            r#"{"data":null,"error":{"status":400,"name":"ApplicationError","message":"Insufficient stock"}}"#,
        )
        .await;

        let err = server
            .backend()
            .create_sale_transaction(&Session::with_token("jwt-123"), &invoice())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Rejected { status: 400, .. }));
        assert_eq!(err.user_message(), "Insufficient stock");

        let sent = server.only_request();
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.path, "/api/sale-transactions");
        assert_eq!(sent.authorization.as_deref(), Some("Bearer jwt-123"));

        let body = sent.json();
        assert_eq!(body["data"]["invoice_number"], "INV-001");
        assert_eq!(body["data"]["products"][0]["product"], "1");
        assert_eq!(body["data"]["products"][0]["quantity"], 2);
        let total = body["data"]["total"].as_f64().unwrap();
        assert!((total - 21.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sale_without_id_is_not_created() {
        let server = CannedServer::answering_in_turn(&[
            (200, r#"{"data":null}"#),
            (200, r#"{"data":{"documentId":"abc"}}"#),
        ])
        .await;
        let backend = server.backend();
        let session = Session::with_token("jwt-123");

        for _ in 0..2 {
            let err = backend
                .create_sale_transaction(&session, &invoice())
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::SaleNotCreated));
        }
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_sale_created_reports_id() {
        let server = CannedServer::answering(200, r#"{"data":{"id":42,"documentId":"s42"}}"#).await;

        let created = server
            .backend()
            .create_sale_transaction(&Session::with_token("jwt-123"), &invoice())
            .await
            .unwrap();

        assert_eq!(
            created,
            CreatedRecord {
                id: "42".to_string(),
                document_id: Some("s42".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_save_product_posts_new_and_puts_existing() {
        let server = CannedServer::answering(200, PRODUCT_BODY).await;
        let backend = server.backend();
        let session = Session::with_token("jwt-123");

        let created = backend.save_product(&session, None, &draft()).await.unwrap();
        backend
            .save_product(&session, Some("k2xq"), &draft())
            .await
            .unwrap();

        assert_eq!(created.id, ProductId::from("7"));
        assert_eq!(created.price.cents(), 150);

        let requests = server.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/api/products");
        assert_eq!(requests[1].method, "PUT");
        assert_eq!(requests[1].path, "/api/products/k2xq");

        let body = requests[0].json();
        assert_eq!(body["data"]["name"], "Cola 330ml");
        assert_eq!(body["data"]["price"], 1.5);
        assert_eq!(body["data"]["stock"], 24);
        assert_eq!(body["data"]["category"], "2");
        assert!(body["data"].get("description").is_none());
    }

    #[tokio::test]
    async fn test_invalid_product_draft_sends_nothing() {
        let server = CannedServer::answering(200, PRODUCT_BODY).await;
        let mut draft = draft();
        draft.name = "  ".to_string();

        let err = server
            .backend()
            .save_product(&Session::with_token("jwt-123"), None, &draft)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_delete_product_addresses_document() {
        let server = CannedServer::answering(204, "").await;

        server
            .backend()
            .delete_product(&Session::with_token("jwt-123"), "k2xq")
            .await
            .unwrap();

        let sent = server.only_request();
        assert_eq!(sent.method, "DELETE");
        assert_eq!(sent.path, "/api/products/k2xq");
    }

    #[tokio::test]
    async fn test_delete_rejection_is_surfaced() {
        let server =
            CannedServer::answering(404, r#"{"data":null,"error":{"status":404,"message":"Not Found"}}"#)
                .await;

        let err = server
            .backend()
            .delete_category(&Session::with_token("jwt-123"), "gone")
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Not Found");
        assert_eq!(server.only_request().path, "/api/categories/gone");
    }

    #[tokio::test]
    async fn test_list_products_sends_paging_and_reads_meta() {
        let server = CannedServer::answering(
            200,
            r#"{"data":[{"id":7,"documentId":"k2xq","name":"Cola 330ml","price":1.5,"stock":24}],
                "meta":{"pagination":{"page":2,"pageSize":5,"pageCount":3,"total":11}}}"#,
        )
        .await;
        let filter = ProductFilter {
            name: Some(" cola ".to_string()),
            barcode: Some("   ".to_string()),
        };

        let page = server
            .backend()
            .list_products(
                &Session::with_token("jwt-123"),
                &PageRequest {
                    page: 2,
                    page_size: 5,
                },
                &filter,
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].price.cents(), 150);
        assert_eq!(page.meta.page_count, 3);
        assert_eq!(page.meta.total, 11);

        let sent = server.only_request();
        assert_eq!(sent.method, "GET");
        assert_eq!(sent.path, "/api/products");
        assert_eq!(sent.param("pagination[page]"), Some("2"));
        assert_eq!(sent.param("pagination[pageSize]"), Some("5"));
        assert_eq!(sent.param("filters[name][$containsi]"), Some("cola"));
        assert_eq!(sent.param("filters[barcode][$containsi]"), None);
        assert_eq!(sent.param("populate"), Some("*"));
    }

    #[tokio::test]
    async fn test_list_sales_sends_filters() {
        let server = CannedServer::answering(
            200,
            r#"{"data":[{"id":5,"documentId":"s5","invoice_number":"INV-9",
                "customer_name":"Ada Lovelace","date":"2026-10-18","total":21.6,"products":[]}],
                "meta":{"pagination":{"page":1,"pageSize":10,"pageCount":1,"total":1}}}"#,
        )
        .await;
        let from = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap();
        let filter = SalesFilter {
            invoice_number: Some("inv-9".to_string()),
            date_from: Some(from),
            date_to: Some(to),
            ..SalesFilter::default()
        };

        let page = server
            .backend()
            .list_sales(&Session::with_token("jwt-123"), &PageRequest::default(), &filter)
            .await
            .unwrap();

        assert_eq!(page.items[0].id, "5");
        assert_eq!(page.items[0].invoice_number, "INV-9");
        assert_eq!(page.items[0].total.cents(), 2160);

        let sent = server.only_request();
        assert_eq!(sent.path, "/api/sales");
        assert_eq!(sent.param("filters[invoice_number][$eqi]"), Some("inv-9"));
        assert_eq!(
            sent.param("filters[date][$gte]"),
            Some(from.to_rfc3339().as_str())
        );
        assert_eq!(sent.param("filters[date][$lt]"), Some(to.to_rfc3339().as_str()));
        assert_eq!(sent.param("pagination[page]"), Some("1"));
    }

    #[tokio::test]
    async fn test_get_sale_populates_line_products() {
        let server = CannedServer::answering(
            200,
            r#"{"data":{"id":5,"documentId":"s5","invoice_number":"INV-9","customer_name":"Ada",
                "total":3,"products":[{"price":1.5,"quantity":2,
                "product":{"id":7,"name":"Cola 330ml","price":1.5}}]}}"#,
        )
        .await;

        let sale = server
            .backend()
            .get_sale(&Session::with_token("jwt-123"), "s5")
            .await
            .unwrap();

        assert_eq!(sale.lines.len(), 1);
        assert_eq!(sale.lines[0].product_name.as_deref(), Some("Cola 330ml"));
        assert_eq!(sale.lines[0].quantity, 2);

        let sent = server.only_request();
        assert_eq!(sent.path, "/api/sales/s5");
        assert_eq!(sent.param(SALE_POPULATE.0), Some(SALE_POPULATE.1));
    }

    #[tokio::test]
    async fn test_register_updates_names_with_new_token() {
        let server = CannedServer::answering_in_turn(&[
            (
                200,
                r#"{"jwt":"tok","user":{"id":9,"username":"ada@example.com","email":"ada@example.com"}}"#,
            ),
            (
                200,
                r#"{"id":9,"username":"ada@example.com","email":"ada@example.com",
                    "firstName":"Ada","lastName":"Lovelace"}"#,
            ),
        ])
        .await;
        let registration = Registration {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };

        let session = server.backend().register(&registration).await.unwrap();

        assert_eq!(session.bearer(), Some("tok"));
        assert_eq!(session.user().unwrap().display_name(), "Ada Lovelace");

        let requests = server.requests();
        assert_eq!(requests[0].path, "/api/auth/local/register");
        assert!(requests[0].authorization.is_none());
        assert_eq!(requests[1].method, "PUT");
        assert_eq!(requests[1].path, "/api/users/9");
        assert_eq!(requests[1].authorization.as_deref(), Some("Bearer tok"));
        assert_eq!(requests[1].json()["firstName"], "Ada");
    }

    #[tokio::test]
    async fn test_register_without_token_stops_before_profile_update() {
        let server = CannedServer::answering(
            200,
            r#"{"jwt":"","user":{"id":9,"username":"ada@example.com","email":"ada@example.com"}}"#,
        )
        .await;
        let registration = Registration {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };

        let err = server.backend().register(&registration).await.unwrap_err();

        assert_eq!(err.user_message(), REGISTRATION_FAILED);
        assert_eq!(server.only_request().path, "/api/auth/local/register");
    }
}
