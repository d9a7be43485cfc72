//! Line and cart totals
//!
//! `line_total = (unit_price + Σ addon.price) × quantity`,
//! `subtotal = Σ line_total`, `total = subtotal − discount`.

use crate::utils::money::{round, to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::models::{CartLine, CartLineView, LineAddon, OrderLine};

/// Total of one line
pub fn line_total(unit_price: f64, addons: &[LineAddon], quantity: i32) -> Decimal {
    let unit = addons
        .iter()
        .fold(to_decimal(unit_price), |acc, a| acc + to_decimal(a.price));
    round(unit * Decimal::from(quantity))
}

/// Sum of line totals
pub fn subtotal<'a>(lines: impl IntoIterator<Item = &'a CartLine>) -> Decimal {
    lines
        .into_iter()
        .map(|l| line_total(l.unit_price, &l.addons, l.quantity))
        .sum()
}

/// Subtotal minus discount, never negative
pub fn total(subtotal: Decimal, discount: Decimal) -> Decimal {
    (subtotal - discount).max(Decimal::ZERO)
}

pub fn line_view(line: CartLine) -> CartLineView {
    let line_total = to_f64(line_total(line.unit_price, &line.addons, line.quantity));
    CartLineView { line, line_total }
}

/// Snapshot a cart line for an order request
pub fn order_line(line: &CartLine) -> OrderLine {
    OrderLine {
        kind: line.kind,
        ref_id: line.ref_id,
        name: line.name.clone(),
        unit_price: line.unit_price,
        addons: line.addons.clone(),
        quantity: line.quantity,
        note: line.note.clone(),
        line_total: to_f64(line_total(line.unit_price, &line.addons, line.quantity)),
    }
}
