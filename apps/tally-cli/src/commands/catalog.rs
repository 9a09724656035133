//! # Catalog Commands

use std::sync::Arc;

use tally_client::{
    CatalogApi, CategoryFilter, ClientConfig, ClientError, ClientResult, HttpBackend,
    ProductSearch, SearchEvent, Session,
};
use tally_core::{CategoryId, PageRequest, Product};
use tracing::debug;

/// Runs one search through the debounced client, as the search box would.
pub async fn search(
    config: &ClientConfig,
    session: Session,
    text: &str,
    category: Option<String>,
) -> ClientResult<()> {
    debug!(text, ?category, "search command");
    let backend = Arc::new(HttpBackend::new(config)?);
    let mut search = ProductSearch::new(backend, session, config);

    search.input(text, category.as_deref().map(CategoryId::from))?;

    match search.next_event().await {
        Some(SearchEvent::Results { products, .. }) if products.is_empty() => {
            println!("No products match \"{}\"", text.trim());
        }
        Some(SearchEvent::Results { products, .. }) => print_products(&products),
        Some(SearchEvent::Failed { message, .. }) => {
            return Err(ClientError::SearchFailed(message))
        }
        Some(SearchEvent::Cleared) | None => {}
    }
    Ok(())
}

pub async fn categories(config: &ClientConfig, session: &Session) -> ClientResult<()> {
    debug!("categories command");
    let backend = HttpBackend::new(config)?;

    let mut page = PageRequest {
        page: 1,
        page_size: 100,
    };
    loop {
        let listing = backend
            .list_categories(session, &page, &CategoryFilter::default())
            .await?;

        for category in &listing.items {
            println!(
                "{:>6}  {:<30}  {}",
                category.id,
                category.name,
                category.description.as_deref().unwrap_or("")
            );
        }

        if !listing.has_next() {
            break;
        }
        page.page += 1;
    }
    Ok(())
}

fn print_products(products: &[Product]) {
    println!("{:>6}  {:<30}  {:>10}  {:>6}  CATEGORY", "ID", "NAME", "PRICE", "STOCK");
    for product in products {
        println!(
            "{:>6}  {:<30}  {:>10}  {:>6}  {}",
            product.id,
            product.name,
            product.price.to_string(),
            product.stock,
            product
                .category
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or("-")
        );
    }
}
