//! Document names, defaults, and typed models.
//!
//! Every document the hub persists is one JSON file in the data
//! directory. The storage layer treats bodies as opaque values; only the
//! session and checkout endpoints impose the field contracts below.
//! Typed models flatten unknown fields into an `extra` map so documents
//! written by other tools survive a read-modify-write cycle intact.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Beacon coordinates and floor-map dimensions (singleton document).
pub const BEACON_MAP_DOC: &str = "config_beacon_map.json";
/// Path-finding node sequence, structure defined by the kiosk UI.
pub const PATH_NODES_DOC: &str = "setup_path_config.json";
/// Stock item sequence.
pub const STOCK_DOC: &str = "stock.json";
/// Member sequence.
pub const MEMBERS_DOC: &str = "members.json";
/// Per-device session records, keyed by device id.
pub const SESSIONS_DOC: &str = "sessions.json";

/// Default beacon map: the dimensions of the original store floor plan.
pub fn beacon_map_default() -> Value {
    json!({
        "beacons": {},
        "real_width_m": 45.0,
        "real_height_m": 29.8,
        "pixel_width": 675,
        "pixel_height": 437
    })
}

/// One stock entry. `sku` is the unique key within the stock list;
/// uniqueness is enforced by checkout indexing, not by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub sku: String,
    pub qty: i64,
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A loyalty member. Absent `points` reads as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub points: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One cart line in a checkout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub sku: String,
    pub qty: i64,
}

/// Per-device session state.
///
/// Stored sessions are persisted verbatim as sent by the device; this
/// type defines the default returned for a never-seen device (which is
/// never persisted implicitly).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub cart: Vec<Value>,
    pub mode: String,
    pub member_id: Option<String>,
    pub last_step: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            cart: Vec::new(),
            mode: "guest".to_string(),
            member_id: None,
            last_step: "browse".to_string(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_shape() {
        let session = serde_json::to_value(Session::default()).unwrap();
        assert_eq!(
            session,
            json!({"cart": [], "mode": "guest", "member_id": null, "last_step": "browse"})
        );
    }

    #[test]
    fn beacon_default_dimensions() {
        let map = beacon_map_default();
        assert_eq!(map["real_width_m"], json!(45.0));
        assert_eq!(map["real_height_m"], json!(29.8));
        assert_eq!(map["pixel_width"], json!(675));
        assert_eq!(map["pixel_height"], json!(437));
        assert_eq!(map["beacons"], json!({}));
    }

    #[test]
    fn stock_item_preserves_unknown_fields() {
        let raw = json!({"sku": "A", "qty": 3, "price": 2.5, "label": "coffee"});
        let item: StockItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.extra["label"], json!("coffee"));
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn member_points_default_to_zero() {
        let member: Member = serde_json::from_value(json!({"id": "m1"})).unwrap();
        assert_eq!(member.points, 0.0);
    }
}
