use serde_json::Value;

/// One table row, already in display form.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinRow {
    pub display_name: String,
    pub price_usd: String,
    pub change_24h: String,
    /// Numeric 24h change when the API sent one, used for colouring.
    pub change_pct: Option<f64>,
    pub coin_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub index: usize,
    pub price_usd: f64,
}

const MISSING: &str = "N/A";

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_text(coin: &Value, key: &str, default: &str) -> String {
    coin.get(key).map(text_of).unwrap_or_else(|| default.to_string())
}

/// Listing or detail payloads to rows. Entries that are not JSON objects are
/// dropped; missing fields fall back to `"N/A"` (or an empty id).
pub fn coin_rows(coins: &[Value]) -> Vec<CoinRow> {
    coins
        .iter()
        .filter(|coin| coin.is_object())
        .map(|coin| {
            let (change_24h, change_pct) = match coin.get("price_change_percentage_24h") {
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(pct) => (format!("{:.2}%", pct), Some(pct)),
                    None => (n.to_string(), None),
                },
                Some(other) => (text_of(other), None),
                None => (MISSING.to_string(), None),
            };

            CoinRow {
                display_name: field_text(coin, "name", MISSING),
                price_usd: field_text(coin, "current_price", MISSING),
                change_24h,
                change_pct,
                coin_id: field_text(coin, "id", ""),
            }
        })
        .collect()
}

/// `[timestamp, price]` pairs to ordinal points. The timestamp is dropped and
/// the point keeps its position in the input as its index; malformed pairs
/// are skipped.
pub fn price_points(prices: &[Value]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .filter_map(|(index, pair)| {
            let price_usd = pair.as_array()?.get(1)?.as_f64()?;
            Some(PricePoint { index, price_usd })
        })
        .collect()
}
