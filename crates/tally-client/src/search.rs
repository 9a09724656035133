//! # Product Search
//!
//! Debounced product lookup for the search box and the invoice product
//! picker.
//!
//! ## Debounce Timeline
//! ```text
//!  keystroke:   c      co     col        cola
//!  t (ms):      0      90     180        300                       700
//!               │      │      │          │                          │
//!  pending:     [──x   [──x   [────x     [─────────── 400 ms ──────►│ GET
//!                  │      │        │                                │
//!               cancel  cancel   cancel                     Results{"cola"}
//! ```
//!
//! Each [`ProductSearch::input`] cancels the pending task before scheduling
//! a new one, so at most one timer is alive and only the latest query
//! reaches the backend. Every task is stamped with a generation number and
//! [`ProductSearch::next_event`] drops anything from an older generation,
//! so a request that was already in flight when the user kept typing can
//! never surface stale results.

use std::sync::Arc;
use std::time::Duration;

use tally_core::validation::validate_search_query;
use tally_core::{Cart, CategoryId, CoreResult, Product};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::{CatalogApi, ProductQuery};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::session::Session;

/// Outcome of a search as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// Input became blank. No request was made.
    Cleared,

    /// Candidates for `query`.
    Results { query: String, products: Vec<Product> },

    /// The backend call for `query` failed. Not retried.
    Failed { query: String, message: String },
}

struct PendingSearch {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Debounced search over a [`CatalogApi`].
pub struct ProductSearch<C: CatalogApi + 'static> {
    catalog: Arc<C>,
    session: Session,
    window: Duration,
    page_size: u32,
    generation: u64,
    events_tx: mpsc::UnboundedSender<(u64, SearchEvent)>,
    events_rx: mpsc::UnboundedReceiver<(u64, SearchEvent)>,
    pending: Option<PendingSearch>,
}

impl<C: CatalogApi + 'static> ProductSearch<C> {
    /// Search using the configured debounce window and page size.
    pub fn new(catalog: Arc<C>, session: Session, config: &ClientConfig) -> Self {
        Self::with_settings(
            catalog,
            session,
            config.debounce_window(),
            config.search.page_size,
        )
    }

    pub fn with_settings(
        catalog: Arc<C>,
        session: Session,
        window: Duration,
        page_size: u32,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        ProductSearch {
            catalog,
            session,
            window,
            page_size,
            generation: 0,
            events_tx,
            events_rx,
            pending: None,
        }
    }

    /// Feeds the current contents of the search box.
    ///
    /// Returns an error only for input that fails local validation (too
    /// long); the pending search is cancelled either way.
    pub fn input(&mut self, text: &str, category: Option<CategoryId>) -> ClientResult<()> {
        self.cancel_pending();
        self.generation += 1;
        let generation = self.generation;

        if text.trim().is_empty() {
            let _ = self.events_tx.send((generation, SearchEvent::Cleared));
            return Ok(());
        }

        let query = ProductQuery {
            text: validate_search_query(text)?,
            category,
            page_size: self.page_size,
        };

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let handle = tokio::spawn(Self::run_search(
            self.catalog.clone(),
            self.session.clone(),
            self.window,
            query,
            generation,
            cancel_rx,
            self.events_tx.clone(),
        ));

        self.pending = Some(PendingSearch {
            cancel: cancel_tx,
            handle,
        });
        Ok(())
    }

    /// Next event for the current input. Stale events are discarded.
    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        loop {
            let (generation, event) = self.events_rx.recv().await?;
            if generation == self.generation {
                return Some(event);
            }
            debug!(generation, current = self.generation, "Dropping stale search event");
        }
    }

    /// Cancels the pending search, if any.
    pub fn cancel(&mut self) {
        self.cancel_pending();
        self.generation += 1;
    }

    /// Returns true while a debounce timer or request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|p| !p.handle.is_finished())
            .unwrap_or(false)
    }

    /// Adds a picked candidate to an invoice cart.
    ///
    /// A product that is already in the cart is rejected and the cart is
    /// left unchanged.
    pub fn select(cart: &mut Cart, product: &Product) -> CoreResult<()> {
        cart.add_unique(product)
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            let _ = pending.cancel.send(());
            pending.handle.abort();
        }
    }

    async fn run_search(
        catalog: Arc<C>,
        session: Session,
        window: Duration,
        query: ProductQuery,
        generation: u64,
        cancel_rx: oneshot::Receiver<()>,
        events_tx: mpsc::UnboundedSender<(u64, SearchEvent)>,
    ) {
        let search = async {
            tokio::time::sleep(window).await;
            debug!(query = %query.text, generation, "Sending product search");
            catalog.search_products(&session, &query).await
        };

        let outcome = tokio::select! {
            _ = cancel_rx => {
                debug!(query = %query.text, generation, "Search superseded");
                return;
            }
            outcome = search => outcome,
        };

        let event = match outcome {
            Ok(products) => {
                debug!(query = %query.text, count = products.len(), "Search results");
                SearchEvent::Results {
                    query: query.text,
                    products,
                }
            }
            Err(e) => {
                warn!(query = %query.text, error = %e, "Product search failed");
                SearchEvent::Failed {
                    query: query.text,
                    message: e.user_message(),
                }
            }
        };
        let _ = events_tx.send((generation, event));
    }
}

impl<C: CatalogApi + 'static> Drop for ProductSearch<C> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
