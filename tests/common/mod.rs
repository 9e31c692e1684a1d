//! Common test utilities

use chrono::NaiveDate;
use serde_json::{json, Value};

/// Partner-wire JSON for one slot with a single adult pax line.
pub fn slot_json(provider_slot_id: &str, date: NaiveDate) -> Value {
    json!({
        "providerSlotId": provider_slot_id,
        "startDate": date.format("%Y-%m-%d").to_string(),
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
    })
}

/// A one-slot response body keyed to the requested date.
#[allow(dead_code)]
pub fn day_body(date: NaiveDate) -> Value {
    json!([slot_json(&format!("slot-{date}"), date)])
}
