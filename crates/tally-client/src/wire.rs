//! # Wire Format
//!
//! JSON shapes spoken by the content backend, and their conversion into
//! domain types.
//!
//! ## Envelope Conventions
//! ```text
//! Request body      { "data": { ...fields... } }
//! Single record     { "data": { "id": 7, "documentId": "k2x…", ... } }
//! List              { "data": [ ... ], "meta": { "pagination": { page, pageSize,
//!                                                               pageCount, total } } }
//! Error             { "error": { "status": 400, "name": "...", "message": "..." } }
//! ```
//!
//! Monetary fields are decimal JSON numbers. They become [`Money`] here and
//! nowhere else; an amount that does not fit is an
//! [`ClientError::UnexpectedResponse`], never a silent truncation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_core::{
    Category, CategoryDraft, CategoryId, CategoryRef, InvoiceRequest, Money, Page, PageMeta,
    Product, ProductDraft, ProductId, RawId,
};

use crate::backend::CreatedRecord;
use crate::error::{ClientError, ClientResult};
use crate::reports::{ChartPoint, PeriodSummary, SaleRecord, SaleRecordLine, SalesSummary};
use crate::session::{Session, SessionUser};

// =============================================================================
// Envelopes
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: ListMeta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListMeta {
    #[serde(default)]
    pub pagination: PageMeta,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// `error.message` of an error body, if the body has one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
}

fn to_money(amount: Option<Decimal>, field: &str) -> ClientResult<Money> {
    Money::from_decimal(amount.unwrap_or_default())
        .ok_or_else(|| ClientError::UnexpectedResponse(format!("{} out of range", field)))
}

/// Plain text from a field that may hold a string or rich-text blocks.
fn plain_text(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

pub(crate) fn into_page<W, T>(
    envelope: ListEnvelope<W>,
    convert: impl Fn(W) -> ClientResult<T>,
) -> ClientResult<Page<T>> {
    let items = envelope
        .data
        .into_iter()
        .map(convert)
        .collect::<ClientResult<Vec<T>>>()?;
    Ok(Page {
        items,
        meta: envelope.meta.pagination,
    })
}

// =============================================================================
// Catalog Records
// =============================================================================

#[derive(Debug, Deserialize)]
struct MediaFormat {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct MediaFormats {
    #[serde(default)]
    thumbnail: Option<MediaFormat>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaRecord {
    url: String,
    #[serde(default)]
    formats: Option<MediaFormats>,
}

impl MediaRecord {
    /// Thumbnail when available, otherwise the original.
    fn preferred_url(self) -> String {
        self.formats
            .and_then(|f| f.thumbnail)
            .map(|t| t.url)
            .unwrap_or(self.url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryRecord {
    id: CategoryId,
    #[serde(default)]
    document_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<Value>,
}

impl CategoryRecord {
    pub(crate) fn into_category(self) -> Category {
        Category {
            id: self.id,
            document_id: self.document_id,
            name: self.name,
            description: plain_text(self.description),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductRecord {
    id: ProductId,
    #[serde(default)]
    document_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    barcode: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default)]
    category: Option<CategoryRecord>,
    #[serde(default)]
    image: Option<MediaRecord>,
}

impl ProductRecord {
    pub(crate) fn into_product(self) -> ClientResult<Product> {
        Ok(Product {
            price: to_money(self.price, "price")?,
            id: self.id,
            document_id: self.document_id,
            name: self.name,
            description: plain_text(self.description),
            barcode: self.barcode.filter(|b| !b.is_empty()),
            stock: self.stock.unwrap_or(0),
            category: self.category.map(|c| CategoryRef {
                id: c.id,
                name: c.name,
            }),
            image: self.image.map(MediaRecord::preferred_url),
        })
    }
}

/// Product form body.
#[derive(Debug, Serialize)]
pub(crate) struct ProductPayload<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    stock: i64,
    barcode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
}

impl<'a> From<&'a ProductDraft> for ProductPayload<'a> {
    fn from(draft: &'a ProductDraft) -> Self {
        ProductPayload {
            name: draft.name.trim(),
            description: draft.description.as_deref(),
            price: draft.price.to_decimal(),
            stock: draft.stock,
            barcode: draft.barcode.trim(),
            category: draft.category.as_ref().map(CategoryId::as_str),
        }
    }
}

/// Category form body.
#[derive(Debug, Serialize)]
pub(crate) struct CategoryPayload<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a CategoryDraft> for CategoryPayload<'a> {
    fn from(draft: &'a CategoryDraft) -> Self {
        CategoryPayload {
            name: draft.name.trim(),
            description: draft.description.as_deref(),
        }
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

#[derive(Debug, Serialize)]
struct SaleLinePayload<'a> {
    product: &'a str,
    quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
}

/// Body of `POST /api/sale-transactions` (inside `data`).
#[derive(Debug, Serialize)]
pub(crate) struct SaleTransactionPayload<'a> {
    customer_name: &'a str,
    invoice_number: &'a str,
    customer_email: &'a str,
    customer_phone: &'a str,
    date: DateTime<Utc>,
    notes: Option<&'a str>,
    products: Vec<SaleLinePayload<'a>>,
    #[serde(with = "rust_decimal::serde::float")]
    subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
}

impl<'a> From<&'a InvoiceRequest> for SaleTransactionPayload<'a> {
    fn from(request: &'a InvoiceRequest) -> Self {
        SaleTransactionPayload {
            customer_name: &request.customer_name,
            invoice_number: &request.invoice_number,
            customer_email: &request.customer_email,
            customer_phone: &request.customer_phone,
            date: request.date,
            notes: request.notes.as_deref(),
            products: request
                .lines
                .iter()
                .map(|line| SaleLinePayload {
                    product: line.product_id.as_str(),
                    quantity: line.quantity,
                    price: line.price.to_decimal(),
                })
                .collect(),
            subtotal: request.totals.subtotal.to_decimal(),
            discount_amount: request.totals.discount.to_decimal(),
            tax_amount: request.totals.tax.to_decimal(),
            total: request.totals.total.to_decimal(),
        }
    }
}

/// `data` of a create response. Either field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedRecordWire {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    document_id: Option<String>,
}

impl CreatedRecordWire {
    /// `None` when the backend did not report an id.
    pub(crate) fn into_record(self) -> Option<CreatedRecord> {
        let document_id = self.document_id;
        self.id.map(|id| CreatedRecord {
            id: id.into_string(),
            document_id,
        })
    }
}

// =============================================================================
// Sales Records
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct SaleLineWire {
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    quantity: i64,
    #[serde(default)]
    product: Option<ProductRecord>,
}

/// Sale record. Field names are snake_case on this content type.
#[derive(Debug, Deserialize)]
pub(crate) struct SaleRecordWire {
    id: RawId,
    #[serde(default, rename = "documentId")]
    document_id: Option<String>,
    #[serde(default)]
    invoice_number: String,
    #[serde(default)]
    customer_name: String,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    customer_phone: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    subtotal: Option<Decimal>,
    #[serde(default)]
    discount_amount: Option<Decimal>,
    #[serde(default)]
    tax_amount: Option<Decimal>,
    #[serde(default)]
    total: Option<Decimal>,
    #[serde(default)]
    products: Vec<SaleLineWire>,
}

/// Accepts a full timestamp or a bare `YYYY-MM-DD` date.
fn parse_sale_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl SaleRecordWire {
    pub(crate) fn into_record(self) -> ClientResult<SaleRecord> {
        let lines = self
            .products
            .into_iter()
            .map(|line| {
                let product = line.product.map(ProductRecord::into_product).transpose()?;
                Ok(SaleRecordLine {
                    price: to_money(line.price, "line price")?,
                    quantity: line.quantity,
                    product_id: product.as_ref().map(|p| p.id.clone()),
                    product_name: product.as_ref().map(|p| p.name.clone()),
                    image: product.and_then(|p| p.image),
                })
            })
            .collect::<ClientResult<Vec<_>>>()?;

        Ok(SaleRecord {
            id: self.id.into_string(),
            document_id: self.document_id,
            invoice_number: self.invoice_number,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            date: self.date.as_deref().and_then(parse_sale_date),
            notes: self.notes,
            subtotal: to_money(self.subtotal, "subtotal")?,
            discount: to_money(self.discount_amount, "discount_amount")?,
            tax: to_money(self.tax_amount, "tax_amount")?,
            total: to_money(self.total, "total")?,
            lines,
        })
    }
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeriodWire {
    #[serde(default)]
    total_revenue: Option<Decimal>,
    #[serde(default)]
    total_sales: Option<Decimal>,
    #[serde(default)]
    total_discount: Option<Decimal>,
    #[serde(default)]
    count: Option<u64>,
}

impl PeriodWire {
    fn into_summary(self) -> ClientResult<PeriodSummary> {
        Ok(PeriodSummary {
            total_revenue: to_money(self.total_revenue, "totalRevenue")?,
            total_sales: to_money(self.total_sales, "totalSales")?,
            total_discount: to_money(self.total_discount, "totalDiscount")?,
            count: self.count.unwrap_or(0),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SummaryWire {
    #[serde(default)]
    week: PeriodWire,
    #[serde(default, rename = "two-weeks")]
    two_weeks: PeriodWire,
    #[serde(default)]
    month: PeriodWire,
    #[serde(default, rename = "last-month")]
    last_month: PeriodWire,
}

impl SummaryWire {
    pub(crate) fn into_summary(self) -> ClientResult<SalesSummary> {
        Ok(SalesSummary {
            week: self.week.into_summary()?,
            two_weeks: self.two_weeks.into_summary()?,
            month: self.month.into_summary()?,
            last_month: self.last_month.into_summary()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartPointWire {
    date: String,
    #[serde(default)]
    total: Option<Decimal>,
}

impl ChartPointWire {
    pub(crate) fn into_point(self) -> ClientResult<ChartPoint> {
        let date = parse_sale_date(&self.date)
            .map(|ts| ts.date_naive())
            .ok_or_else(|| {
                ClientError::UnexpectedResponse(format!("invalid chart date: {}", self.date))
            })?;
        Ok(ChartPoint {
            date,
            total: to_money(self.total, "total")?,
        })
    }
}

/// The chart endpoint answers with a bare array; some deployments wrap it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ChartResponse {
    Wrapped { data: Vec<ChartPointWire> },
    Bare(Vec<ChartPointWire>),
}

impl ChartResponse {
    pub(crate) fn into_points(self) -> ClientResult<Vec<ChartPoint>> {
        let points = match self {
            ChartResponse::Wrapped { data } => data,
            ChartResponse::Bare(points) => points,
        };
        points.into_iter().map(ChartPointWire::into_point).collect()
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub jwt: Option<String>,
    pub user: SessionUser,
}

impl AuthResponse {
    /// `None` when no token was issued.
    pub(crate) fn into_session(self) -> Option<Session> {
        let user = self.user;
        self.jwt
            .filter(|jwt| !jwt.is_empty())
            .map(|jwt| Session::authenticated(jwt, user))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterPayload<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserNamesPayload<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
}
