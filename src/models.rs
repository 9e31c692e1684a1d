//! Core data structures for partner inventory sync
//!
//! Wire types mirror the partner API's JSON (camelCase); the same structs
//! double as the domain records the reconciler persists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive calendar date range, both endpoints normalized to midnight
/// by virtue of being plain dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A fetch request: which products, over which window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub product_ids: Vec<String>,
    pub window: FetchWindow,
}

/// Price value object, content-addressed: two prices are the same entity
/// iff all four fields are equal. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub original_price: f64,
    pub discount: f64,
    pub final_price: f64,
    pub currency_code: String,
}

/// Per-passenger-type availability line attached to a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaxAvailability {
    /// Stable passenger type code (e.g. "ADULT", "CHILD").
    #[serde(rename = "type")]
    pub type_id: String,
    pub name: String,
    pub description: String,
    pub min: u32,
    pub max: u32,
    pub remaining: u32,
    #[serde(default)]
    pub is_primary: bool,
    pub price: Price,
}

/// One availability slot as returned by the partner API.
///
/// `provider_slot_id` is the external identity; all other fields except
/// `product_id` are overwritten on every observation. `product_id` is
/// tagged by the fetch pipeline with the effective product id used for
/// the call, not necessarily the one the caller requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub provider_slot_id: String,
    #[serde(default)]
    pub product_id: String,
    pub start_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub variant_id: i64,
    pub remaining: u32,
    pub currency_code: String,
    #[serde(default)]
    pub pax_availability: Vec<PaxAvailability>,
}

/// Passenger type entity. Identity = id; fields are immutable after first
/// creation (first-seen name/description win).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub is_primary: bool,
}

/// Lifecycle status of one lane's most recent execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Idle,
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Per-lane sync state record. Created on a lane's first execution,
/// mutated in place by that lane, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub status: SyncStatus,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Completion percentage 0-100.
    pub progress: u8,
    pub interrupted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncState {
    /// Fresh state for a lane execution that just started.
    pub fn running(start_time: DateTime<Utc>) -> Self {
        Self {
            status: SyncStatus::Running,
            start_time,
            end_time: None,
            progress: 0,
            interrupted: false,
            error: None,
        }
    }
}

/// Reconciliation counts. Additive across records, chunks and lanes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOutcome {
    pub saved: u64,
    pub updated: u64,
    pub skipped: u64,
}

impl StoreOutcome {
    /// Fold another outcome into this one.
    pub fn merge(&mut self, other: &StoreOutcome) {
        self.saved += other.saved;
        self.updated += other.updated;
        self.skipped += other.skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTNER_SLOT_JSON: &str = r#"{
        "providerSlotId": "slot-8841",
        "startDate": "2026-09-01",
        "startTime": "10:00",
        "endTime": "11:30",
        "variantId": 3,
        "remaining": 12,
        "currencyCode": "USD",
        "paxAvailability": [
            {
                "type": "ADULT",
                "name": "Adult",
                "description": "Ages 13+",
                "min": 1,
                "max": 10,
                "remaining": 12,
                "isPrimary": true,
                "price": {
                    "originalPrice": 50.0,
                    "discount": 5.0,
                    "finalPrice": 45.0,
                    "currencyCode": "USD"
                }
            }
        ]
    }"#;

    #[test]
    fn test_partner_slot_deserialization() {
        let slot: SlotAvailability = serde_json::from_str(PARTNER_SLOT_JSON).unwrap();

        assert_eq!(slot.provider_slot_id, "slot-8841");
        assert_eq!(slot.start_date, NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());
        assert_eq!(slot.variant_id, 3);
        // product_id is absent on the wire; the pipeline tags it later
        assert!(slot.product_id.is_empty());

        let pax = &slot.pax_availability[0];
        assert_eq!(pax.type_id, "ADULT");
        assert!(pax.is_primary);
        assert_eq!(pax.price.final_price, 45.0);
    }

    #[test]
    fn test_pax_is_primary_defaults_false() {
        let json = r#"{
            "type": "CHILD",
            "name": "Child",
            "description": "Ages 3-12",
            "min": 0,
            "max": 4,
            "remaining": 4,
            "price": {"originalPrice": 25.0, "discount": 0.0, "finalPrice": 25.0, "currencyCode": "USD"}
        }"#;

        let pax: PaxAvailability = serde_json::from_str(json).unwrap();
        assert!(!pax.is_primary);
    }

    #[test]
    fn test_price_value_equality() {
        let a = Price {
            original_price: 50.0,
            discount: 5.0,
            final_price: 45.0,
            currency_code: "USD".to_string(),
        };
        let mut b = a.clone();
        assert_eq!(a, b);

        b.currency_code = "EUR".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_store_outcome_merge() {
        let mut total = StoreOutcome::default();
        total.merge(&StoreOutcome {
            saved: 2,
            updated: 1,
            skipped: 0,
        });
        total.merge(&StoreOutcome {
            saved: 0,
            updated: 3,
            skipped: 1,
        });

        assert_eq!(
            total,
            StoreOutcome {
                saved: 2,
                updated: 4,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_sync_state_serialization_skips_empty_fields() {
        let state = SyncState::running(Utc::now());
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["status"], "running");
        assert_eq!(json["progress"], 0);
        assert!(json.get("endTime").is_none());
        assert!(json.get("error").is_none());
    }
}
