//! Teddy Bear POS
//!
//! Replays a scripted sale session from fixtures through a register, printing
//! a receipt for every completed sale and the day's sales summary.
//!
//! Run with: `cargo run -- --set teddy-bears --session demo`

use std::io::{self, Write};

use anyhow::Result;
use tracing::{info, warn};

use teddy_pos::{
    cart::CartAction,
    config::PosConfig,
    fixtures::Fixture,
    ledger::SalesLedger,
    observability::init_subscriber,
    receipt::{Receipt, write_summary},
    register::Register,
};

fn main() -> Result<()> {
    let config = PosConfig::load().unwrap_or_else(|err| err.exit());

    init_subscriber(&config)?;

    let fixture = Fixture::with_base_path(&config.fixtures).load_set(&config.set)?;
    let catalog = fixture.catalog()?;
    let sales = fixture.session(&config.session)?;

    info!(
        set = %config.set,
        session = %config.session,
        products = catalog.len(),
        sales = sales.len(),
        "replaying session"
    );

    let mut register = Register::with_tax_rate(
        catalog,
        config.tax_rate,
        SalesLedger::new(catalog.currency()),
    );

    let mut out = io::stdout().lock();

    for (number, script) in (1_usize..).zip(sales) {
        for action in script.actions {
            register.dispatch(action);
        }

        match register.complete_sale(script.tender, script.cashier.as_deref()) {
            Ok(sale) => Receipt::from_sale(&sale)?.write_to(&mut out, fixture.customers())?,
            Err(err) => {
                warn!(sale = number, "sale abandoned: {err}");
                register.dispatch(CartAction::Clear);
            }
        }
    }

    let summary = register.sink().summary()?;

    write_summary(
        &mut out,
        &summary,
        catalog,
        fixture.customers(),
        config.low_stock_threshold,
    )?;
    out.flush()?;

    Ok(())
}
