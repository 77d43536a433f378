use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use stockbook_core::{DomainError, ProductName, Timestamp};
use stockbook_events::Event;

/// Direction of a cash balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceOperation {
    Add,
    Subtract,
}

impl FromStr for BalanceOperation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "add" => Ok(BalanceOperation::Add),
            "subtract" => Ok(BalanceOperation::Subtract),
            _ => Err(DomainError::invalid_input(
                "operation must be one of: add, subtract",
            )),
        }
    }
}

/// Payload of a purchase or sale: `quantity` units of `product` at `unit_price` each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub product: ProductName,
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "codec::non_negative"
    )]
    pub unit_price: Decimal,
    #[serde(deserialize_with = "codec::positive_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl Trade {
    /// `unit_price × quantity`, or `None` when it leaves the decimal range.
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Payload of a canonical balance adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "codec::non_negative"
    )]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

/// Older balance shape: one `balance` type with the direction in `operation`.
///
/// Read-only compatibility; new adjustments are written as `balance_add` /
/// `balance_subtract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyAdjustment {
    pub operation: BalanceOperation,
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "codec::non_negative"
    )]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

/// One immutable ledger record, tagged by its `type` field on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    Purchase(Trade),
    Sale(Trade),
    BalanceAdd(Adjustment),
    BalanceSubtract(Adjustment),
    #[serde(rename = "balance")]
    LegacyBalance(LegacyAdjustment),
}

impl LedgerEvent {
    /// Canonical balance event for `operation`.
    pub fn balance(operation: BalanceOperation, amount: Decimal, timestamp: Option<Timestamp>) -> Self {
        let adjustment = Adjustment { amount, timestamp };
        match operation {
            BalanceOperation::Add => LedgerEvent::BalanceAdd(adjustment),
            BalanceOperation::Subtract => LedgerEvent::BalanceSubtract(adjustment),
        }
    }

    /// Direction and amount of a balance adjustment, whichever shape it was stored in.
    pub fn as_adjustment(&self) -> Option<(BalanceOperation, Decimal)> {
        match self {
            LedgerEvent::BalanceAdd(a) => Some((BalanceOperation::Add, a.amount)),
            LedgerEvent::BalanceSubtract(a) => Some((BalanceOperation::Subtract, a.amount)),
            LedgerEvent::LegacyBalance(a) => Some((a.operation, a.amount)),
            LedgerEvent::Purchase(_) | LedgerEvent::Sale(_) => None,
        }
    }
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::Purchase(_) => "purchase",
            LedgerEvent::Sale(_) => "sale",
            LedgerEvent::BalanceAdd(_) => "balance_add",
            LedgerEvent::BalanceSubtract(_) => "balance_subtract",
            LedgerEvent::LegacyBalance(_) => "balance",
        }
    }

    fn occurred_at(&self) -> Option<&Timestamp> {
        match self {
            LedgerEvent::Purchase(t) | LedgerEvent::Sale(t) => t.timestamp.as_ref(),
            LedgerEvent::BalanceAdd(a) | LedgerEvent::BalanceSubtract(a) => a.timestamp.as_ref(),
            LedgerEvent::LegacyBalance(a) => a.timestamp.as_ref(),
        }
    }
}

/// A record of the persisted log.
///
/// Records are decoded from the raw JSON value and keep that value, so a full
/// rewrite of the document reproduces every existing record byte for byte
/// (modulo key order). Records that do not decode as a [`LedgerEvent`] are kept
/// as [`LogEntry::Malformed`] and take no part in derivation.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    /// Event accepted in this process and not yet read back from storage.
    Event(LedgerEvent),
    /// Event decoded from storage, with the record exactly as stored.
    Recorded { event: LedgerEvent, raw: JsonValue },
    Malformed(JsonValue),
}

impl LogEntry {
    pub fn as_event(&self) -> Option<&LedgerEvent> {
        match self {
            LogEntry::Event(e) | LogEntry::Recorded { event: e, .. } => Some(e),
            LogEntry::Malformed(_) => None,
        }
    }

    /// Timestamp text of the record, also for records that failed to decode.
    pub fn timestamp(&self) -> Option<&str> {
        match self {
            LogEntry::Event(e) | LogEntry::Recorded { event: e, .. } => e.occurred_at().map(Timestamp::as_str),
            LogEntry::Malformed(raw) => raw.get("timestamp").and_then(JsonValue::as_str),
        }
    }
}

impl From<LedgerEvent> for LogEntry {
    fn from(value: LedgerEvent) -> Self {
        LogEntry::Event(value)
    }
}

impl Serialize for LogEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            LogEntry::Event(event) => event.serialize(serializer),
            LogEntry::Recorded { raw, .. } | LogEntry::Malformed(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for LogEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = JsonValue::deserialize(deserializer)?;
        Ok(match LedgerEvent::deserialize(&raw) {
            Ok(event) => LogEntry::Recorded { event, raw },
            Err(_) => LogEntry::Malformed(raw),
        })
    }
}

/// Whether `value` reads back unchanged after being stored as a JSON number.
///
/// Amounts are persisted as `f64`, which holds roughly 15 significant digits.
pub fn is_storable(value: Decimal) -> bool {
    value
        .to_f64()
        .and_then(|f| Decimal::from_str(&f.to_string()).ok())
        == Some(value)
}

mod codec {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn non_negative<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = rust_decimal::serde::float::deserialize(deserializer)?;
        if value < Decimal::ZERO {
            return Err(D::Error::custom("value must be >= 0"));
        }
        Ok(value)
    }

    pub fn positive_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        if value == 0 {
            return Err(D::Error::custom("quantity must be > 0"));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn decode(value: JsonValue) -> LogEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn purchase_record_decodes_and_ignores_extra_fields() {
        let entry = decode(json!({
            "type": "purchase",
            "product": "widget",
            "unit_price": 10.0,
            "quantity": 5,
            "total": 50.0
        }));

        match entry {
            LogEntry::Recorded { event: LedgerEvent::Purchase(t), .. } => {
                assert_eq!(t.product.as_str(), "widget");
                assert_eq!(t.unit_price, dec!(10));
                assert_eq!(t.quantity, 5);
                assert_eq!(t.timestamp, None);
            }
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn integer_amounts_decode() {
        let entry = decode(json!({"type": "balance_add", "amount": 100}));
        assert_eq!(
            entry.as_event().and_then(LedgerEvent::as_adjustment),
            Some((BalanceOperation::Add, dec!(100)))
        );
    }

    #[test]
    fn legacy_balance_shape_is_recognised() {
        let entry = decode(json!({"type": "balance", "operation": "subtract", "amount": 12.5}));
        assert_eq!(
            entry.as_event().and_then(LedgerEvent::as_adjustment),
            Some((BalanceOperation::Subtract, dec!(12.5)))
        );
    }

    #[test]
    fn records_missing_required_fields_are_kept_as_malformed() {
        let raw = json!({"type": "sale", "product": "widget", "quantity": 2});
        assert_eq!(decode(raw.clone()), LogEntry::Malformed(raw));
    }

    #[test]
    fn out_of_range_values_are_malformed() {
        for raw in [
            json!({"type": "purchase", "product": "w", "unit_price": -1.0, "quantity": 1}),
            json!({"type": "purchase", "product": "w", "unit_price": 1.0, "quantity": 0}),
            json!({"type": "sale", "product": "", "unit_price": 1.0, "quantity": 1}),
            json!({"type": "balance_subtract", "amount": -3}),
            json!({"type": "refund", "amount": 3}),
        ] {
            assert!(matches!(decode(raw), LogEntry::Malformed(_)));
        }
    }

    #[test]
    fn canonical_balance_serializes_as_flat_record() {
        let event = LedgerEvent::balance(
            BalanceOperation::Subtract,
            dec!(7.25),
            Some(Timestamp::from("2024-01-02T03:04:05Z".to_string())),
        );
        let value = serde_json::to_value(LogEntry::from(event)).unwrap();
        assert_eq!(
            value,
            json!({"type": "balance_subtract", "amount": 7.25, "timestamp": "2024-01-02T03:04:05Z"})
        );
    }

    #[test]
    fn malformed_timestamp_is_still_readable() {
        let entry = decode(json!({"type": "mystery", "timestamp": "2022-02-02T10:00:00"}));
        assert_eq!(entry.timestamp(), Some("2022-02-02T10:00:00"));
    }

    #[test]
    fn stored_record_is_written_back_verbatim() {
        let raw = json!({
            "type": "purchase",
            "product": " lamp ",
            "unit_price": 3,
            "quantity": 4,
            "total": 12.0
        });
        let entry = decode(raw.clone());

        assert!(entry.as_event().is_some());
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn storable_values_survive_the_float_encoding() {
        assert!(is_storable(dec!(10.50)));
        assert!(is_storable(dec!(0.1)));
        assert!(is_storable(Decimal::ZERO));
        assert!(!is_storable(dec!(0.1234567890123456789)));
        assert!(!is_storable(Decimal::MAX));
    }

    #[test]
    fn operation_parses_from_form_text() {
        assert_eq!("add".parse::<BalanceOperation>(), Ok(BalanceOperation::Add));
        assert_eq!(" subtract ".parse::<BalanceOperation>(), Ok(BalanceOperation::Subtract));
        assert!("multiply".parse::<BalanceOperation>().is_err());
    }
}
