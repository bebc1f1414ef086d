//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted
//! to `f64` for storage/serialization.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Effective unit price after the whole-percentage discount.
///
/// `discount` is a 0-100 whole percentage; 0 means no reduction.
pub fn effective_price(price: f64, discount: i64) -> Decimal {
    let price = Decimal::from_f64(price).unwrap_or_default();
    if discount <= 0 {
        return price;
    }
    let discount_amount = Decimal::from(discount) / Decimal::from(100) * price;
    price - discount_amount
}

/// Subtotal for one line item: effective price × quantity
pub fn line_subtotal(price: f64, discount: i64, qty: i64) -> Decimal {
    effective_price(price, discount) * Decimal::from(qty)
}

/// Total for an order: sum of line subtotals, rounded to 2 decimal
/// places half-up at the very end.
pub fn order_total(lines: impl IntoIterator<Item = (f64, i64, i64)>) -> f64 {
    lines
        .into_iter()
        .fold(Decimal::ZERO, |total, (price, discount, qty)| {
            total + line_subtotal(price, discount, qty)
        })
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_reduces_unit_price() {
        // 20000 with 10% off -> 18000
        assert_eq!(effective_price(20000.0, 10), Decimal::from(18000));
    }

    #[test]
    fn zero_discount_keeps_price() {
        assert_eq!(effective_price(20000.0, 0), Decimal::from(20000));
    }

    #[test]
    fn line_subtotal_scales_by_quantity() {
        // 20000 @ 10% x 2 -> 36000
        assert_eq!(line_subtotal(20000.0, 10, 2), Decimal::from(36000));
    }

    #[test]
    fn order_total_sums_lines_exactly() {
        let total = order_total([(20000.0, 10, 2), (5000.0, 0, 3)]);
        assert_eq!(total, 51000.0);
    }

    #[test]
    fn order_total_rounds_to_two_places() {
        // 9.99 @ 33% = 6.6933 per unit, x3 = 20.0799 -> 20.08
        let total = order_total([(9.99, 33, 3)]);
        assert_eq!(total, 20.08);
    }

    #[test]
    fn empty_order_totals_zero() {
        assert_eq!(order_total(Vec::<(f64, i64, i64)>::new()), 0.0);
    }
}
