//! Receipt

use std::{
    fmt::Write as _,
    io::{self, Write as _},
};

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cart::LineItem,
    checkout::{Payment, PaymentMethod, Sale},
    customers::{CustomerDirectory, CustomerKey, Customers},
    discounts::{DiscountPercent, percent_points},
    ledger::SalesSummary,
    pricing::{PricingError, to_money},
    products::Catalog,
};

/// Errors that can occur when building or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Totals could not be rounded into money.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
}

/// Printable receipt for a completed sale. All amounts are rounded to currency precision.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    sale_id: Uuid,
    completed_at: Timestamp,
    cashier: Option<String>,
    customer: Option<CustomerKey>,
    lines: Vec<LineItem<'a>>,
    subtotal: Money<'a, Currency>,
    discount: DiscountPercent,
    discount_amount: Money<'a, Currency>,
    tax_rate: Percentage,
    tax: Money<'a, Currency>,
    total: Money<'a, Currency>,
    payment: Payment<'a>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a completed sale.
    ///
    /// Subtotal and tax are rounded on their own and the total is the amount
    /// due. The printed discount is what remains, so the printed lines always
    /// add up to the printed total.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if any total cannot be rounded into money.
    pub fn from_sale(sale: &Sale<'a>) -> Result<Self, ReceiptError> {
        let totals = sale.totals();
        let currency = sale.currency();

        let subtotal = to_money(totals.subtotal(), currency)?;
        let tax = to_money(totals.tax(), currency)?;
        let total = sale.amount_due();

        let discount_minor = subtotal
            .to_minor_units()
            .saturating_add(tax.to_minor_units())
            .saturating_sub(total.to_minor_units());

        Ok(Self {
            sale_id: sale.id(),
            completed_at: sale.completed_at(),
            cashier: sale.cashier().map(str::to_string),
            customer: sale.customer(),
            lines: sale.items().to_vec(),
            subtotal,
            discount: sale.discount(),
            discount_amount: Money::from_minor(discount_minor, currency),
            tax_rate: sale.tax_rate(),
            tax,
            total,
            payment: *sale.payment(),
        })
    }

    /// Subtotal before discount and tax
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Amount taken off by the cart discount
    #[must_use]
    pub fn discount_amount(&self) -> Money<'a, Currency> {
        self.discount_amount
    }

    /// Tax charged
    #[must_use]
    pub fn tax(&self) -> Money<'a, Currency> {
        self.tax
    }

    /// Amount paid
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Print the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to<'c, C>(&self, mut out: impl io::Write, customers: &C) -> Result<(), ReceiptError>
    where
        C: CustomerDirectory<'c> + ?Sized,
    {
        writeln!(out, "\n Sale {}", self.sale_id)?;
        writeln!(out, " {}", self.completed_at)?;

        if let Some(cashier) = &self.cashier {
            writeln!(out, " Cashier: {cashier}")?;
        }

        if let Some(customer) = self.customer.and_then(|key| customers.customer(key)) {
            writeln!(
                out,
                " Customer: {} ({} pts, {} visits)",
                customer.name, customer.loyalty_points, customer.visits
            )?;
        }

        write_lines_table(&mut out, &self.lines)?;
        write_totals(&mut out, self)?;

        Ok(())
    }
}

fn write_lines_table(out: &mut impl io::Write, lines: &[LineItem<'_>]) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();
    let mut color_ops: SmallVec<[(usize, usize, Color); 16]> = SmallVec::new();

    builder.push_record(["", "Item", "Qty", "Unit Price", "Line Total"]);

    for (idx, line) in lines.iter().enumerate() {
        builder.push_record([
            format!("#{:<3}", idx + 1),
            line.name().to_string(),
            line.quantity().to_string(),
            format!("{}", line.unit_price()),
            format!("{}", line.line_total()),
        ]);

        // header is row 0
        color_ops.push((idx + 1, 3, color_dark_grey()));
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    writeln!(out, "\n{}", colorize_borders(&table.to_string()))?;

    Ok(())
}

fn write_totals(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let mut rows: SmallVec<[(String, String); 8]> = SmallVec::new();

    rows.push((" Subtotal:".to_string(), format!("{}", receipt.subtotal)));

    if !receipt.discount.is_zero() {
        rows.push((
            format!(" Discount ({}):", receipt.discount),
            format!("-{}", receipt.discount_amount),
        ));
    }

    rows.push((
        format!(" Tax ({}%):", percent_points(receipt.tax_rate)),
        format!("{}", receipt.tax),
    ));

    rows.push((
        " \x1b[1mTotal:\x1b[0m".to_string(),
        format!("\x1b[1m{}\x1b[0m", receipt.total),
    ));

    rows.push((" Payment:".to_string(), receipt.payment.method().to_string()));

    if receipt.payment.method() == PaymentMethod::Cash {
        if let Some(tendered) = receipt.payment.tendered() {
            rows.push((" Cash received:".to_string(), format!("{tendered}")));
        }

        if let Some(change) = receipt.payment.change() {
            rows.push((" Change:".to_string(), format!("{change}")));
        }
    }

    write_aligned(out, &rows)?;
    writeln!(out)?;

    Ok(())
}

/// Print dashboard figures, store counts and the products with stock below
/// `low_stock_threshold`.
///
/// # Errors
///
/// Returns an error if the summary cannot be written.
pub fn write_summary(
    mut out: impl io::Write,
    summary: &SalesSummary,
    catalog: &Catalog<'_>,
    customers: &Customers<'_>,
    low_stock_threshold: u32,
) -> Result<(), ReceiptError> {
    let rows = [
        (" Transactions:".to_string(), summary.transactions.to_string()),
        (" Revenue:".to_string(), format!("{}", summary.revenue)),
        (" Average sale:".to_string(), format!("{}", summary.average_sale)),
        (
            " Customers served:".to_string(),
            summary.customers_served.to_string(),
        ),
        (
            " Cash / Card / QR:".to_string(),
            format!("{} / {} / {}", summary.cash, summary.card, summary.qr),
        ),
        (" Products:".to_string(), catalog.len().to_string()),
        (" Customers:".to_string(), customers.len().to_string()),
    ];

    writeln!(out, "\n \x1b[1mToday's Sales\x1b[0m")?;
    write_aligned(&mut out, &rows)?;

    let mut builder = Builder::default();
    builder.push_record(["Low Stock", "SKU", "Stock"]);

    let mut any = false;

    for (_, product) in catalog.low_stock(low_stock_threshold) {
        any = true;
        builder.push_record([
            product.name.clone(),
            product.sku.clone(),
            product.stock.to_string(),
        ]);
    }

    if any {
        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::last(), Alignment::right());

        writeln!(out, "\n{}", colorize_borders(&table.to_string()))?;
    }

    Ok(())
}

/// Writes label/value pairs with labels right-aligned and values right-aligned.
fn write_aligned(out: &mut impl io::Write, rows: &[(String, String)]) -> Result<(), ReceiptError> {
    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in rows {
        let label_pad = label_width.saturating_sub(visible_width(label));
        let value_pad = value_width.saturating_sub(visible_width(value));

        writeln!(
            out,
            "{}{label}  {}{value}",
            " ".repeat(label_pad),
            " ".repeat(value_pad)
        )?;
    }

    Ok(())
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
