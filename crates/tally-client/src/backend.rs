//! # Backend Contracts
//!
//! The operations Tally needs from the headless content backend, expressed
//! as traits so the search and submission logic can run against either the
//! real HTTP backend or an in-memory fake.
//!
//! ## Contract Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Trait        Operation                  Endpoint                       │
//! │  ─────        ─────────                  ────────                       │
//! │  CatalogApi   search_products            GET    /api/products?filters…  │
//! │               get_product                GET    /api/products/{id}      │
//! │               list_products              GET    /api/products?pagin…    │
//! │               save_product               POST   /api/products           │
//! │                                          PUT    /api/products/{doc}     │
//! │               delete_product             DELETE /api/products/{doc}     │
//! │               list_categories            GET    /api/categories?…       │
//! │               save_category / delete     POST/PUT/DELETE categories     │
//! │                                                                         │
//! │  SalesApi     create_sale_transaction    POST   /api/sale-transactions  │
//! │               get_sale                   GET    /api/sales/{doc}?popul… │
//! │               list_sales                 GET    /api/sales?filters…     │
//! │               delete_sale                DELETE /api/sales/{doc}        │
//! │               sales_summary              GET    /api/sales/summary      │
//! │               sales_chart                GET    /api/sales/chartData    │
//! │                                                                         │
//! │  AuthApi      login                      POST   /api/auth/local         │
//! │               register                   POST   /api/auth/local/register│
//! │                                          PUT    /api/users/{id}         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method takes the [`Session`] explicitly. The sale-transaction
//! endpoint is trusted to check stock, decrement it and record the sale
//! atomically; nothing here tries to replicate that.

use async_trait::async_trait;
use tally_core::{
    Category, CategoryDraft, CategoryId, InvoiceRequest, Page, PageRequest, Product, ProductDraft,
    ProductId,
};

use crate::error::ClientResult;
use crate::reports::{ChartPoint, SaleRecord, SalesFilter, SalesSummary};
use crate::session::{Credentials, Registration, Session};

// =============================================================================
// Query Types
// =============================================================================

/// A product search as typed into the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Trimmed, non-empty search text (name contains, case-insensitive).
    pub text: String,
    pub category: Option<CategoryId>,
    pub page_size: u32,
}

impl ProductQuery {
    /// Backend query parameters.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("filters[name][$containsi]".to_string(), self.text.clone()),
            ("pagination[pageSize]".to_string(), self.page_size.to_string()),
            ("populate".to_string(), "*".to_string()),
        ];
        if let Some(category) = &self.category {
            pairs.push((
                "filters[category][id][$eq]".to_string(),
                category.to_string(),
            ));
        }
        pairs
    }
}

/// Column filters of the products screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub barcode: Option<String>,
}

impl ProductFilter {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_contains(&mut pairs, "name", &self.name);
        push_contains(&mut pairs, "barcode", &self.barcode);
        pairs
    }
}

/// Column filters of the categories screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryFilter {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_contains(&mut pairs, "name", &self.name);
        push_contains(&mut pairs, "description", &self.description);
        pairs
    }
}

/// Adds `filters[field][$containsi]=value` when the value is not blank.
pub(crate) fn push_contains(pairs: &mut Vec<(String, String)>, field: &str, value: &Option<String>) {
    if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((format!("filters[{}][$containsi]", field), value.to_string()));
    }
}

/// Pagination parameters for list endpoints.
pub fn page_pairs(page: &PageRequest) -> Vec<(String, String)> {
    vec![
        ("pagination[page]".to_string(), page.page.to_string()),
        ("pagination[pageSize]".to_string(), page.page_size.to_string()),
    ]
}

// =============================================================================
// Result Types
// =============================================================================

/// Identifier of a record the backend just created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRecord {
    pub id: String,
    pub document_id: Option<String>,
}

// =============================================================================
// Traits
// =============================================================================

/// Products and categories.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Bounded page of candidates for the search box.
    async fn search_products(&self, session: &Session, query: &ProductQuery)
        -> ClientResult<Vec<Product>>;

    /// Single product with live stock.
    async fn get_product(&self, session: &Session, id: &ProductId) -> ClientResult<Product>;

    async fn list_products(
        &self,
        session: &Session,
        page: &PageRequest,
        filter: &ProductFilter,
    ) -> ClientResult<Page<Product>>;

    /// Creates a product (`document_id == None`) or updates an existing one.
    async fn save_product(
        &self,
        session: &Session,
        document_id: Option<&str>,
        draft: &ProductDraft,
    ) -> ClientResult<Product>;

    async fn delete_product(&self, session: &Session, document_id: &str) -> ClientResult<()>;

    async fn list_categories(
        &self,
        session: &Session,
        page: &PageRequest,
        filter: &CategoryFilter,
    ) -> ClientResult<Page<Category>>;

    /// Creates a category (`document_id == None`) or updates an existing one.
    async fn save_category(
        &self,
        session: &Session,
        document_id: Option<&str>,
        draft: &CategoryDraft,
    ) -> ClientResult<Category>;

    async fn delete_category(&self, session: &Session, document_id: &str) -> ClientResult<()>;
}

/// Sales: invoice creation and reporting.
#[async_trait]
pub trait SalesApi: Send + Sync {
    /// Sends the invoice. The backend validates and decrements stock and
    /// records the sale atomically, or rejects the whole request.
    async fn create_sale_transaction(
        &self,
        session: &Session,
        request: &InvoiceRequest,
    ) -> ClientResult<CreatedRecord>;

    /// One sale with its lines and products populated.
    async fn get_sale(&self, session: &Session, document_id: &str) -> ClientResult<SaleRecord>;

    async fn list_sales(
        &self,
        session: &Session,
        page: &PageRequest,
        filter: &SalesFilter,
    ) -> ClientResult<Page<SaleRecord>>;

    async fn delete_sale(&self, session: &Session, document_id: &str) -> ClientResult<()>;

    async fn sales_summary(&self, session: &Session) -> ClientResult<SalesSummary>;

    async fn sales_chart(&self, session: &Session) -> ClientResult<Vec<ChartPoint>>;
}

/// Authentication.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ClientResult<Session>;

    /// Registers, then stores first/last name on the new user.
    async fn register(&self, registration: &Registration) -> ClientResult<Session>;
}
