//! # Invoice Submission
//!
//! Sends a cart to the sale-transaction endpoint exactly once per attempt.
//!
//! ## State Machine
//! ```text
//!                 submit()                 backend ok
//!    ┌──────┐   (cart valid)  ┌────────────┐  with id  ┌───────────────┐
//!    │ Idle │ ──────────────► │ Submitting │ ────────► │ Succeeded{id} │
//!    └──────┘                 └────────────┘           └───────────────┘
//!        ▲                       │      ▲                      │
//!        │ local validation      │      │ submit() again       │ submit()
//!        │ error: no change      │      │                      │ (next invoice)
//!        │                       ▼      │                      ▼
//!        │                    ┌────────────────┐         Submitting ...
//!        └─ ─ ─ ─ ─ ─ ─ ─ ─ ─ │ Failed{message}│
//!                             └────────────────┘
//!
//!  While Submitting, a second submit() is refused: a duplicate request would
//!  create a second invoice and decrement stock twice.
//! ```
//!
//! The cart is cleared only after the backend confirms the sale with an id.
//! On any failure it is left exactly as it was so the operator can fix the
//! problem and resubmit.
//!
//! If the `submit` future is dropped while the request is outstanding (a
//! timeout, a cancelled task) the state moves to
//! `Failed { "Submission interrupted" }` so the next attempt is not refused.

use std::sync::Arc;

use serde::Serialize;
use tally_core::{
    Cart, CoreError, InvoiceDetails, InvoiceRequest, PricingPolicy, ProductId, Totals,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::backend::{CatalogApi, SalesApi};
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Shown when the post-failure stock check itself fails.
pub const STOCK_UNVERIFIED_MESSAGE: &str = "couldn't verify stock";

/// Failure message left behind by an abandoned attempt.
pub const SUBMISSION_INTERRUPTED_MESSAGE: &str = "Submission interrupted";

/// Where the submitter is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded { sale_id: String },
    Failed { message: String },
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }
}

/// What the caller gets back for a recorded sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleReceipt {
    pub sale_id: String,
    pub document_id: Option<String>,
    pub invoice_number: String,
    pub totals: Totals,
}

/// Submits invoices and tracks the outstanding attempt.
///
/// Cloning shares the state, so a UI can keep one clone to observe
/// [`SubmissionState::Submitting`] while another drives the request.
pub struct InvoiceSubmitter<S: SalesApi> {
    api: Arc<S>,
    state: Arc<RwLock<SubmissionState>>,
}

impl<S: SalesApi> Clone for InvoiceSubmitter<S> {
    fn clone(&self) -> Self {
        InvoiceSubmitter {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S: SalesApi> InvoiceSubmitter<S> {
    pub fn new(api: Arc<S>) -> Self {
        InvoiceSubmitter {
            api,
            state: Arc::new(RwLock::new(SubmissionState::Idle)),
        }
    }

    /// Current state.
    pub async fn state(&self) -> SubmissionState {
        self.state.read().await.clone()
    }

    /// Builds the invoice from `cart` and sends it.
    ///
    /// ## Errors
    /// - Validation errors (empty cart first, then missing header fields)
    ///   before any request; the state is not touched
    /// - [`ClientError::SubmissionInProgress`] while another attempt is
    ///   outstanding
    /// - Whatever the backend call failed with; the state becomes
    ///   [`SubmissionState::Failed`] carrying [`ClientError::user_message`]
    pub async fn submit(
        &self,
        session: &Session,
        cart: &mut Cart,
        details: &InvoiceDetails,
        policy: &PricingPolicy,
    ) -> ClientResult<SaleReceipt> {
        let request = InvoiceRequest::build(details, cart, policy)?;

        let in_flight = {
            let mut state = self.state.write().await;
            if state.is_submitting() {
                warn!(invoice_number = %request.invoice_number, "Submission already in progress");
                return Err(ClientError::SubmissionInProgress);
            }
            *state = SubmissionState::Submitting;
            InFlight::new(self.state.clone())
        };

        debug!(
            invoice_number = %request.invoice_number,
            lines = request.lines.len(),
            units = request.unit_count(),
            total = %request.totals.total,
            "Submitting invoice"
        );

        match self.api.create_sale_transaction(session, &request).await {
            Ok(created) => {
                in_flight
                    .finish(SubmissionState::Succeeded {
                        sale_id: created.id.clone(),
                    })
                    .await;
                cart.clear();
                info!(
                    sale_id = %created.id,
                    invoice_number = %request.invoice_number,
                    "Invoice submitted"
                );
                Ok(SaleReceipt {
                    sale_id: created.id,
                    document_id: created.document_id,
                    invoice_number: request.invoice_number,
                    totals: request.totals,
                })
            }
            Err(e) => {
                let message = e.user_message();
                warn!(
                    invoice_number = %request.invoice_number,
                    error = %e,
                    "Invoice submission failed"
                );
                in_flight.finish(SubmissionState::Failed { message }).await;
                Err(e)
            }
        }
    }

    /// Returns to `Idle` unless a request is outstanding.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        if !state.is_submitting() {
            *state = SubmissionState::Idle;
        }
    }
}

/// Owns the `Submitting` state for one attempt.
///
/// Dropped without [`InFlight::finish`], it records the attempt as
/// interrupted.
struct InFlight {
    state: Arc<RwLock<SubmissionState>>,
    armed: bool,
}

impl InFlight {
    fn new(state: Arc<RwLock<SubmissionState>>) -> Self {
        InFlight { state, armed: true }
    }

    async fn finish(mut self, next: SubmissionState) {
        *self.state.write().await = next;
        self.armed = false;
    }
}

fn mark_interrupted(state: &mut SubmissionState) {
    if state.is_submitting() {
        *state = SubmissionState::Failed {
            message: SUBMISSION_INTERRUPTED_MESSAGE.to_string(),
        };
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Submission dropped before the backend answered");

        match self.state.try_write() {
            Ok(mut state) => mark_interrupted(&mut state),
            Err(_) => {
                // A reader holds the lock; finish the transition on the runtime.
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let state = self.state.clone();
                    handle.spawn(async move {
                        mark_interrupted(&mut *state.write().await);
                    });
                }
            }
        }
    }
}

// =============================================================================
// Post-Failure Stock Check
// =============================================================================

/// A cart line asking for more than is on hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    pub product_id: ProductId,
    pub name: String,
    pub requested: i64,
    pub available: i64,
}

impl From<StockShortfall> for CoreError {
    fn from(shortfall: StockShortfall) -> Self {
        CoreError::InsufficientStock {
            name: shortfall.name,
            available: shortfall.available,
            requested: shortfall.requested,
        }
    }
}

/// Result of [`recheck_stock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockCheck {
    /// Live stock was read for every line. Empty means nothing is short.
    Verified(Vec<StockShortfall>),

    /// Live stock could not be read.
    Unverified(String),
}

/// Re-reads live stock for every cart line after a failed submission.
///
/// Best effort: a failed lookup degrades to [`StockCheck::Unverified`]
/// rather than becoming a second error for the operator.
pub async fn recheck_stock<C: CatalogApi + ?Sized>(
    catalog: &C,
    session: &Session,
    cart: &Cart,
) -> StockCheck {
    let mut shortfalls = Vec::new();

    for line in cart.lines() {
        match catalog.get_product(session, &line.product_id).await {
            Ok(product) if product.stock < line.quantity => shortfalls.push(StockShortfall {
                product_id: line.product_id.clone(),
                name: product.name,
                requested: line.quantity,
                available: product.stock,
            }),
            Ok(_) => {}
            Err(e) => {
                debug!(product_id = %line.product_id, error = %e, "Stock re-check failed");
                return StockCheck::Unverified(STOCK_UNVERIFIED_MESSAGE.to_string());
            }
        }
    }

    StockCheck::Verified(shortfalls)
}
