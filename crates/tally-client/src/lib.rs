//! # tally-client: Backend Layer for Tally
//!
//! Everything in Tally that talks to the headless content backend or waits
//! on a timer lives here. The arithmetic and cart rules come from
//! `tally-core`; this crate only moves them across the wire.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Client Layer                                   │
//! │                                                                         │
//! │   search box                cart + invoice form          dashboard      │
//! │       │                            │                         │          │
//! │       ▼                            ▼                         ▼          │
//! │  ┌──────────────┐        ┌──────────────────┐       ┌──────────────┐   │
//! │  │ProductSearch │        │ InvoiceSubmitter │       │   reports    │   │
//! │  │ debounce +   │        │ Idle/Submitting/ │       │ summary,     │   │
//! │  │ cancellation │        │ Succeeded/Failed │       │ chart, month │   │
//! │  └──────┬───────┘        └────────┬─────────┘       └──────┬───────┘   │
//! │         │ CatalogApi              │ SalesApi               │ SalesApi  │
//! │         └──────────────┬──────────┴────────────────────────┘           │
//! │                        ▼                                                │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ HttpBackend (reqwest)   &Session on every call, bearer iff token │  │
//! │  │ wire: {"data": …} envelopes, Decimal ──► Money                   │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ClientConfig: defaults → tally.toml → TALLY_* env → validate()         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`backend`] - Collaborator traits and query types
//! - [`config`] - Client configuration
//! - [`error`] - Client error types and user-facing messages
//! - [`http`] - `reqwest` implementation of the backend traits
//! - [`reports`] - Dashboard summary, chart and monthly sales listing
//! - [`search`] - Debounced product search
//! - [`session`] - Explicit authentication context
//! - [`submission`] - Invoice submission state machine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tally_client::{ClientConfig, HttpBackend, InvoiceSubmitter, Session};
//!
//! let config = ClientConfig::load_or_default(None);
//! let backend = Arc::new(HttpBackend::new(&config)?);
//! let session = Session::with_token(token);
//!
//! let submitter = InvoiceSubmitter::new(backend.clone());
//! let receipt = submitter
//!     .submit(&session, &mut cart, &details, &config.invoice_policy())
//!     .await?;
//! println!("Recorded sale {}", receipt.sale_id);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod reports;
pub mod search;
pub mod session;
pub mod submission;

mod wire;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{
    AuthApi, CatalogApi, CategoryFilter, CreatedRecord, ProductFilter, ProductQuery, SalesApi,
};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use reports::{
    month_bounds, ChartPoint, ChartSeries, PeriodSummary, SaleRecord, SaleRecordLine,
    SalesFilter, SalesSummary,
};
pub use search::{ProductSearch, SearchEvent};
pub use session::{Credentials, Registration, Session, SessionUser};
pub use submission::{
    recheck_stock, InvoiceSubmitter, SaleReceipt, StockCheck, StockShortfall, SubmissionState,
};
