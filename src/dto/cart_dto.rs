use crate::model::cart::CartItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/cart/{menuItemId}`.
///
/// Fields arrive loosely typed from the front end (numbers or numeric
/// strings), so they stay as raw JSON until the service parses them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddToCartRequest {
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub restaurant: Option<String>,
}

impl AddToCartRequest {
    /// Missing, non-numeric or non-positive quantities become 1.
    /// Numeric strings are read up to their first non-digit.
    pub fn quantity(&self) -> u32 {
        let parsed: Option<i64> = match &self.quantity {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Some(Value::String(s)) => leading_integer(s),
            _ => None,
        };
        match parsed {
            Some(q) if q > 0 => u32::try_from(q).unwrap_or(u32::MAX),
            _ => 1,
        }
    }

    /// Price as a positive finite number, if one was given.
    pub fn price(&self) -> Option<f64> {
        let parsed = match &self.price {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|p| p.is_finite() && *p > 0.0)
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|v| sign * v)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub menu_item: String,
    pub quantity: u32,
    pub price: f64,
    pub restaurant: String,
}

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        CartItemResponse {
            menu_item: item.menu_item.to_hex(),
            quantity: item.quantity,
            price: item.price,
            restaurant: item.restaurant.to_hex(),
        }
    }
}

/// Cart line with display data pulled from the menu catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedCartItem {
    #[serde(flatten)]
    pub item: CartItemResponse,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub cart: Vec<CartItemResponse>,
}

impl CartResponse {
    pub fn from_items(items: &[CartItem]) -> Self {
        CartResponse { cart: items.iter().map(CartItemResponse::from).collect() }
    }
}
