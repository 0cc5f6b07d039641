//! Checkout endpoint: validate the cart against stock, decrement stock,
//! accrue member points, and mark the device session paid.
//!
//! Validation is total before any write; a rejected cart leaves every
//! document untouched. The three writes that follow (stock, members,
//! sessions) are individually atomic but not one transaction, so a crash
//! mid-sequence can leave stock decremented without the later updates.
//! Concurrent checkouts are likewise not serialized against each other:
//! two overlapping carts can both pass validation before either
//! decrement lands. Both gaps are accepted at kiosk-network scale.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use doc_store::StoreError;

use crate::documents::{CartLine, Member, StockItem, MEMBERS_DOC, SESSIONS_DOC, STOCK_DOC};
use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::{error_response, Ack};
use crate::ServiceState;

/// Points accrue at 5% of the cart total, rounded to cents.
const POINT_RATE: f64 = 0.05;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub device_id: Option<String>,
    #[serde(default)]
    pub cart: Vec<CartLine>,
    pub member_id: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, CheckoutError> {
    let stock: Vec<StockItem> = state.store().read(STOCK_DOC, Vec::new()).await?;
    let mut stock = IndexedStock::new(stock);

    validate_cart(&req.cart, &stock)?;

    stock.apply(&req.cart);
    state.store().write(STOCK_DOC, stock.items()).await?;

    if let Some(member_id) = req.member_id.as_deref() {
        accrue_points(&state, member_id, &req.cart, &stock).await?;
    }

    if let Some(device_id) = req.device_id.as_deref() {
        mark_paid(&state, device_id).await?;
    }

    tracing::info!(
        lines = req.cart.len(),
        member = req.member_id.as_deref().unwrap_or("-"),
        "checkout completed"
    );
    Ok((StatusCode::OK, Json(Ack::ok())).into_response())
}

/// Stock indexed by sku.
///
/// Duplicate skus collapse the way the original service's dict
/// comprehension did: the entry keeps the position of the first
/// occurrence and the value of the last, and the list written back after
/// checkout carries one entry per sku. Duplicates in storage are
/// unspecified input; this preserves the observed behavior rather than
/// deduplicating it away.
struct IndexedStock {
    items: Vec<StockItem>,
    by_sku: HashMap<String, usize>,
}

impl IndexedStock {
    fn new(stock: Vec<StockItem>) -> Self {
        let mut items: Vec<StockItem> = Vec::with_capacity(stock.len());
        let mut by_sku = HashMap::new();
        for item in stock {
            match by_sku.get(&item.sku) {
                Some(&pos) => items[pos] = item,
                None => {
                    by_sku.insert(item.sku.clone(), items.len());
                    items.push(item);
                }
            }
        }
        Self { items, by_sku }
    }

    fn get(&self, sku: &str) -> Option<&StockItem> {
        self.by_sku.get(sku).map(|&pos| &self.items[pos])
    }

    /// Decrement every cart line's matching entry. Callers validate
    /// first; lines are known to match and to be covered by stock.
    fn apply(&mut self, cart: &[CartLine]) {
        for line in cart {
            if let Some(&pos) = self.by_sku.get(&line.sku) {
                self.items[pos].qty -= line.qty;
            }
        }
    }

    fn items(&self) -> &[StockItem] {
        &self.items
    }
}

fn validate_cart(cart: &[CartLine], stock: &IndexedStock) -> Result<(), CheckoutError> {
    for line in cart {
        let item = stock
            .get(&line.sku)
            .ok_or_else(|| CheckoutError::UnknownSku(line.sku.clone()))?;
        if item.qty < line.qty {
            return Err(CheckoutError::InsufficientStock(line.sku.clone()));
        }
    }
    Ok(())
}

fn cart_total(cart: &[CartLine], stock: &IndexedStock) -> f64 {
    cart.iter()
        .filter_map(|line| stock.get(&line.sku).map(|item| item.price * line.qty as f64))
        .sum()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

async fn accrue_points(
    state: &ServiceState,
    member_id: &str,
    cart: &[CartLine],
    stock: &IndexedStock,
) -> Result<(), CheckoutError> {
    let mut members: Vec<Member> = state.store().read(MEMBERS_DOC, Vec::new()).await?;
    let Some(member) = members.iter_mut().find(|m| m.id == member_id) else {
        // Unknown member ids skip accrual silently; checkout still succeeds.
        return Ok(());
    };

    let points_add = round2(cart_total(cart, stock) * POINT_RATE);
    member.points += points_add;
    state.store().write(MEMBERS_DOC, &members).await?;

    tracing::debug!(member = %member_id, points_add, "points accrued");
    Ok(())
}

async fn mark_paid(state: &ServiceState, device_id: &str) -> Result<(), CheckoutError> {
    let mut sessions: Map<String, Value> = state.store().read(SESSIONS_DOC, Map::new()).await?;
    let Some(session) = sessions.get_mut(device_id).and_then(Value::as_object_mut) else {
        // No session for this device: checkout neither fails nor
        // creates one.
        return Ok(());
    };

    session.insert("last_step".to_string(), Value::from("paid"));
    session.insert("cart".to_string(), Value::Array(Vec::new()));
    state.store().write(SESSIONS_DOC, &sessions).await?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("unknown sku {0}")]
    UnknownSku(String),
    #[error("insufficient stock for {0}")]
    InsufficientStock(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        match self {
            CheckoutError::UnknownSku(_) | CheckoutError::InsufficientStock(_) => {
                error_response(StatusCode::BAD_REQUEST, self)
            }
            CheckoutError::Store(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

impl ApiRequest for CheckoutRequest {
    type Response = Ack;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/checkout").unwrap();
        client.post(full_url).json(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sku: &str, qty: i64, price: f64) -> StockItem {
        StockItem {
            sku: sku.to_string(),
            qty,
            price,
            extra: Map::new(),
        }
    }

    fn line(sku: &str, qty: i64) -> CartLine {
        CartLine {
            sku: sku.to_string(),
            qty,
        }
    }

    #[test]
    fn unknown_sku_is_rejected() {
        let stock = IndexedStock::new(vec![item("A", 10, 2.0)]);
        let err = validate_cart(&[line("B", 1)], &stock).unwrap_err();
        assert_eq!(err.to_string(), "unknown sku B");
    }

    #[test]
    fn insufficient_stock_is_rejected() {
        let stock = IndexedStock::new(vec![item("A", 2, 2.0)]);
        let err = validate_cart(&[line("A", 3)], &stock).unwrap_err();
        assert_eq!(err.to_string(), "insufficient stock for A");
    }

    #[test]
    fn validation_reports_the_first_failing_line() {
        let stock = IndexedStock::new(vec![item("A", 1, 2.0)]);
        let err = validate_cart(&[line("A", 5), line("B", 1)], &stock).unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientStock(sku) if sku == "A"));
    }

    #[test]
    fn apply_decrements_every_line() {
        let mut stock = IndexedStock::new(vec![item("A", 10, 2.0), item("B", 4, 1.5)]);
        stock.apply(&[line("A", 3), line("B", 4)]);
        assert_eq!(stock.get("A").unwrap().qty, 7);
        assert_eq!(stock.get("B").unwrap().qty, 0);
    }

    #[test]
    fn total_and_rounding_match_the_point_rate() {
        let stock = IndexedStock::new(vec![item("A", 10, 2.0), item("B", 10, 0.33)]);
        let cart = [line("A", 3), line("B", 1)];
        let total = cart_total(&cart, &stock);
        assert!((total - 6.33).abs() < 1e-9);
        assert_eq!(round2(total * POINT_RATE), 0.32);
    }

    #[test]
    fn duplicate_sku_keeps_first_position_last_value() {
        let stock = IndexedStock::new(vec![
            item("A", 10, 2.0),
            item("B", 5, 1.0),
            item("A", 3, 9.0),
        ]);
        assert_eq!(stock.items().len(), 2);
        assert_eq!(stock.items()[0].sku, "A");
        assert_eq!(stock.items()[0].qty, 3);
        assert_eq!(stock.items()[0].price, 9.0);
        assert_eq!(stock.items()[1].sku, "B");
    }
}
