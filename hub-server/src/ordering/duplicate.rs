//! Duplicate order request detection
//!
//! Two requests are duplicates when they agree field by field on order
//! type, scheduled slot, delivery address, coupon code and the multiset of
//! lines. A line is identified by kind, reference, quantity, sorted addon
//! ids and note; line order does not matter.

use shared::models::{LineKind, OrderLine, OrderRequest};

type LineKey<'a> = (LineKind, i64, i32, Vec<i64>, Option<&'a str>);

fn line_key(line: &OrderLine) -> LineKey<'_> {
    let mut addons: Vec<i64> = line.addons.iter().map(|a| a.id).collect();
    addons.sort_unstable();
    (line.kind, line.ref_id, line.quantity, addons, line.note.as_deref())
}

fn line_multiset(lines: &[OrderLine]) -> Vec<LineKey<'_>> {
    let mut keys: Vec<LineKey<'_>> = lines.iter().map(line_key).collect();
    keys.sort();
    keys
}

/// Trimmed, case-insensitive comparison of optional free text
fn same_text(a: Option<&str>, b: Option<&str>) -> bool {
    let norm = |s: Option<&str>| {
        s.map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    };
    norm(a) == norm(b)
}

pub fn is_duplicate(existing: &OrderRequest, candidate: &OrderRequest) -> bool {
    existing.customer_id == candidate.customer_id
        && existing.restaurant_id == candidate.restaurant_id
        && existing.order_type == candidate.order_type
        && existing.scheduled_for == candidate.scheduled_for
        && same_text(
            existing.delivery_address.as_deref(),
            candidate.delivery_address.as_deref(),
        )
        && existing.coupon_code == candidate.coupon_code
        && line_multiset(&existing.lines) == line_multiset(&candidate.lines)
}

/// First open request among `open` that `candidate` duplicates
pub fn find_duplicate<'a>(open: &'a [OrderRequest], candidate: &OrderRequest) -> Option<&'a OrderRequest> {
    open.iter()
        .filter(|r| r.status.is_open())
        .find(|r| is_duplicate(r, candidate))
}
