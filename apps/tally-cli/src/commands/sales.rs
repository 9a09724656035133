//! # Sales Commands

use std::sync::Arc;

use chrono::Utc;
use clap::ValueEnum;
use tally_client::{
    recheck_stock, CatalogApi, ChartSeries, ClientConfig, ClientResult, HttpBackend,
    InvoiceSubmitter, PeriodSummary, SaleReceipt, SalesApi, Session, StockCheck,
};
use tally_core::validation::validate_quantity;
use tally_core::{Cart, CoreError, InvoiceDetails, InvoiceNumber, PricingPolicy, ProductId};
use tracing::{debug, warn};

/// `--item` value: product id and quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemArg {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Parses `7` or `7:3`.
pub fn parse_item(raw: &str) -> Result<ItemArg, String> {
    let (id, quantity) = match raw.split_once(':') {
        Some((id, qty)) => {
            let quantity = qty
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid quantity in '{}'", raw))?;
            (id, quantity)
        }
        None => (raw, 1),
    };

    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing product id in '{}'", raw));
    }
    validate_quantity(quantity).map_err(|e| e.to_string())?;

    Ok(ItemArg {
        product_id: ProductId::from(id),
        quantity,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PricingMode {
    /// Flat discount, point-of-sale tax
    PointOfSale,
    /// Percentage discount, invoice tax
    Invoice,
}

impl PricingMode {
    fn policy(self, config: &ClientConfig) -> PricingPolicy {
        match self {
            PricingMode::PointOfSale => config.point_of_sale_policy(),
            PricingMode::Invoice => config.invoice_policy(),
        }
    }
}

/// Everything `tally sell` was given.
pub struct Order {
    pub customer: String,
    pub invoice: Option<String>,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
    pub items: Vec<ItemArg>,
    pub pricing: PricingMode,
}

pub async fn sell(config: &ClientConfig, session: &Session, order: Order) -> ClientResult<()> {
    let backend = Arc::new(HttpBackend::new(config)?);

    let mut cart = Cart::new();
    for item in &order.items {
        let product = backend.get_product(session, &item.product_id).await?;
        let already = cart.line(&product.id).map(|l| l.quantity).unwrap_or(0);
        cart.add(&product);
        cart.set_quantity(&product.id, already + item.quantity);
    }
    for line in cart.over_stock_lines() {
        warn!(
            product_id = %line.product_id,
            requested = line.quantity,
            available = line.available_stock,
            "Quantity exceeds listed stock"
        );
    }

    let now = Utc::now();
    let details = InvoiceDetails {
        customer_name: order.customer,
        invoice_number: order
            .invoice
            .unwrap_or_else(|| InvoiceNumber::generate(now).into()),
        customer_email: order.email,
        customer_phone: order.phone,
        date: now,
        notes: order.notes,
    };
    let policy = order.pricing.policy(config);
    debug!(lines = cart.len(), pricing = ?order.pricing, "sell command");

    let submitter = InvoiceSubmitter::new(backend.clone());
    match submitter.submit(session, &mut cart, &details, &policy).await {
        Ok(receipt) => {
            print_receipt(&receipt);
            Ok(())
        }
        Err(e) => {
            if e.is_rejected() {
                match recheck_stock(backend.as_ref(), session, &cart).await {
                    StockCheck::Verified(shortfalls) => {
                        for shortfall in shortfalls {
                            eprintln!("{}", CoreError::from(shortfall));
                        }
                    }
                    StockCheck::Unverified(message) => eprintln!("({})", message),
                }
            }
            Err(e)
        }
    }
}

pub async fn summary(config: &ClientConfig, session: &Session) -> ClientResult<()> {
    debug!("summary command");
    let backend = HttpBackend::new(config)?;

    let summary = backend.sales_summary(session).await?;
    print_period("This week", &summary.week);
    print_period("Two weeks", &summary.two_weeks);
    print_period("This month", &summary.month);
    print_period("Last month", &summary.last_month);

    let series = ChartSeries::new(backend.sales_chart(session).await?);
    let week = series.trailing(Utc::now().date_naive(), 7);
    println!();
    for point in week.points() {
        println!("{}  {:>12}", point.date, point.total.to_string());
    }
    println!("{:<10}  {:>12}", "7 days", week.total().to_string());
    Ok(())
}

fn print_period(label: &str, period: &PeriodSummary) {
    println!(
        "{:<11} revenue {:>12}  sales {:>12}  discount {:>10}  invoices {:>5}  avg {:>10}",
        label,
        period.total_revenue.to_string(),
        period.total_sales.to_string(),
        period.total_discount.to_string(),
        period.count,
        period.average_ticket().to_string()
    );
}

fn print_receipt(receipt: &SaleReceipt) {
    println!("Invoice {} recorded (sale {})", receipt.invoice_number, receipt.sale_id);
    println!("  Subtotal {:>12}", receipt.totals.subtotal.to_string());
    println!("  Discount {:>12}", receipt.totals.discount.to_string());
    println!("  Tax      {:>12}", receipt.totals.tax.to_string());
    println!("  Total    {:>12}", receipt.totals.total.to_string());
}
