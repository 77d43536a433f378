//! Admission rules applied to raw form input before an event is appended.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainError, DomainResult, ProductName, Timestamp};

use crate::aggregator::DerivedState;
use crate::event::{BalanceOperation, LedgerEvent, Trade, is_storable};

/// Raw purchase/sale form fields, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeForm {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub quantity: String,
}

/// Raw balance form fields, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceForm {
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub amount: String,
}

/// Admit a purchase: price >= 0, quantity > 0, product non-empty.
pub fn validate_purchase(form: &TradeForm, occurred_at: Timestamp) -> DomainResult<LedgerEvent> {
    let trade = parse_trade(form, occurred_at)?;
    Ok(LedgerEvent::Purchase(trade))
}

/// Admit a sale: the purchase rules plus enough derivable stock on hand.
///
/// `current` must be derived from the full log immediately before the call.
pub fn validate_sale(
    form: &TradeForm,
    current: &DerivedState,
    occurred_at: Timestamp,
) -> DomainResult<LedgerEvent> {
    let trade = parse_trade(form, occurred_at)?;

    let requested = i64::from(trade.quantity);
    let available = current.available(&trade.product);
    if available < requested {
        return Err(DomainError::insufficient_stock(
            trade.product.as_str(),
            requested,
            available,
        ));
    }

    Ok(LedgerEvent::Sale(trade))
}

/// Admit a balance adjustment: operation is `add`/`subtract`, amount >= 0.
pub fn validate_balance_op(form: &BalanceForm, occurred_at: Timestamp) -> DomainResult<LedgerEvent> {
    let operation = BalanceOperation::from_str(&form.operation)?;
    let amount = parse_decimal(&form.amount, "amount")?;
    if amount < Decimal::ZERO {
        return Err(DomainError::invalid_input("amount must be >= 0"));
    }
    ensure_storable(amount, "amount")?;

    Ok(LedgerEvent::balance(operation, amount, Some(occurred_at)))
}

fn parse_trade(form: &TradeForm, occurred_at: Timestamp) -> DomainResult<Trade> {
    let unit_price = parse_decimal(&form.price, "price")?;
    if unit_price < Decimal::ZERO {
        return Err(DomainError::invalid_input("price must be >= 0"));
    }
    ensure_storable(unit_price, "price")?;

    let quantity: i64 = form
        .quantity
        .trim()
        .parse()
        .map_err(|_| DomainError::invalid_input("quantity must be a whole number"))?;
    if quantity < 1 {
        return Err(DomainError::invalid_input("quantity must be > 0"));
    }
    let quantity = u32::try_from(quantity)
        .map_err(|_| DomainError::invalid_input("quantity is too large"))?;

    let product = ProductName::parse(&form.product)?;

    let trade = Trade {
        product,
        unit_price,
        quantity,
        timestamp: Some(occurred_at),
    };
    if trade.line_total().is_none() {
        return Err(DomainError::invalid_input("price × quantity is too large"));
    }

    Ok(trade)
}

fn ensure_storable(value: Decimal, field: &str) -> DomainResult<()> {
    if !is_storable(value) {
        return Err(DomainError::invalid_input(format!(
            "{field} has more digits than the ledger can store"
        )));
    }
    Ok(())
}

fn parse_decimal(raw: &str, field: &str) -> DomainResult<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|_| DomainError::invalid_input(format!("{field} must be a decimal number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::derive_balance_and_stock;
    use crate::event::LogEntry;
    use rust_decimal_macros::dec;

    fn now() -> Timestamp {
        Timestamp::from("2024-06-01T12:00:00Z".to_string())
    }

    fn form(product: &str, price: &str, quantity: &str) -> TradeForm {
        TradeForm {
            product: product.to_string(),
            price: price.to_string(),
            quantity: quantity.to_string(),
        }
    }

    fn balance_form(operation: &str, amount: &str) -> BalanceForm {
        BalanceForm {
            operation: operation.to_string(),
            amount: amount.to_string(),
        }
    }

    fn invalid(res: DomainResult<LedgerEvent>) -> String {
        match res {
            Err(DomainError::InvalidInput(msg)) => msg,
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    fn stocked(product: &str, quantity: u32) -> DerivedState {
        let event = validate_purchase(&form(product, "1", &quantity.to_string()), now()).unwrap();
        derive_balance_and_stock(&[LogEntry::from(event)])
    }

    #[test]
    fn purchase_becomes_event_with_ingestion_time() {
        let event = validate_purchase(&form(" widget ", "10.50", " 4 "), now()).unwrap();
        match event {
            LedgerEvent::Purchase(t) => {
                assert_eq!(t.product.as_str(), "widget");
                assert_eq!(t.unit_price, dec!(10.50));
                assert_eq!(t.quantity, 4);
                assert_eq!(t.timestamp, Some(now()));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn zero_price_is_allowed() {
        assert!(validate_purchase(&form("freebie", "0", "1"), now()).is_ok());
    }

    #[test]
    fn purchase_rejects_bad_numbers() {
        assert_eq!(invalid(validate_purchase(&form("w", "abc", "1"), now())), "price must be a decimal number");
        assert_eq!(invalid(validate_purchase(&form("w", "-0.01", "1"), now())), "price must be >= 0");
        assert_eq!(invalid(validate_purchase(&form("w", "1", "1.5"), now())), "quantity must be a whole number");
        assert_eq!(invalid(validate_purchase(&form("w", "1", "0"), now())), "quantity must be > 0");
        assert_eq!(invalid(validate_purchase(&form("w", "1", "-3"), now())), "quantity must be > 0");
        assert_eq!(invalid(validate_purchase(&form("w", "1", "99999999999"), now())), "quantity is too large");
    }

    #[test]
    fn purchase_requires_a_product() {
        assert_eq!(invalid(validate_purchase(&form("  ", "1", "1"), now())), "product cannot be empty");
    }

    #[test]
    fn overflowing_line_total_is_rejected() {
        let huge = "50000000000000000000000000000";
        assert_eq!(
            invalid(validate_purchase(&form("w", huge, "2"), now())),
            "price × quantity is too large"
        );
    }

    #[test]
    fn values_that_would_change_on_disk_are_rejected() {
        assert_eq!(
            invalid(validate_purchase(&form("w", "0.1234567890123456789", "1"), now())),
            "price has more digits than the ledger can store"
        );
        assert_eq!(
            invalid(validate_purchase(&form("w", &Decimal::MAX.to_string(), "1"), now())),
            "price has more digits than the ledger can store"
        );
        assert_eq!(
            invalid(validate_balance_op(&balance_form("add", "1.00000000000000000001"), now())),
            "amount has more digits than the ledger can store"
        );
        assert!(validate_balance_op(&balance_form("add", "1234.56"), now()).is_ok());
    }

    #[test]
    fn sale_within_stock_is_admitted() {
        let current = stocked("widget", 5);
        let event = validate_sale(&form("widget", "20", "5"), &current, now()).unwrap();
        assert!(matches!(event, LedgerEvent::Sale(ref t) if t.quantity == 5));
    }

    #[test]
    fn sale_beyond_stock_reports_exact_availability() {
        let current = stocked("widget", 2);
        assert_eq!(
            validate_sale(&form("widget", "20", "5"), &current, now()),
            Err(DomainError::insufficient_stock("widget", 5, 2))
        );
    }

    #[test]
    fn sale_of_unknown_product_has_zero_available() {
        assert_eq!(
            validate_sale(&form("nothing", "1", "1"), &DerivedState::default(), now()),
            Err(DomainError::insufficient_stock("nothing", 1, 0))
        );
    }

    #[test]
    fn sale_input_errors_win_over_stock_check() {
        let current = DerivedState::default();
        assert_eq!(invalid(validate_sale(&form("w", "1", "0"), &current, now())), "quantity must be > 0");
        assert_eq!(invalid(validate_sale(&form("", "1", "1"), &current, now())), "product cannot be empty");
    }

    #[test]
    fn balance_operations_map_to_canonical_events() {
        let add = validate_balance_op(&balance_form("add", "100"), now()).unwrap();
        assert_eq!(add.as_adjustment(), Some((BalanceOperation::Add, dec!(100))));
        assert!(matches!(add, LedgerEvent::BalanceAdd(_)));

        let sub = validate_balance_op(&balance_form("subtract", "0"), now()).unwrap();
        assert!(matches!(sub, LedgerEvent::BalanceSubtract(_)));
    }

    #[test]
    fn balance_rejects_unknown_operation_and_negative_amount() {
        assert_eq!(
            invalid(validate_balance_op(&balance_form("steal", "1"), now())),
            "operation must be one of: add, subtract"
        );
        assert_eq!(invalid(validate_balance_op(&balance_form("add", "-5"), now())), "amount must be >= 0");
        assert_eq!(
            invalid(validate_balance_op(&balance_form("add", ""), now())),
            "amount must be a decimal number"
        );
    }
}
