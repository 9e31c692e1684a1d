//! Fetch pipeline: products × window fan-out through the admission gate
//!
//! Per product, the window is expanded into one gate-scheduled call per
//! calendar day, all running concurrently. The failure policy is
//! asymmetric: within one
//! product's day-list, any single failed day aborts the remaining pending
//! days of that product (fail-fast join), and the propagated failure is
//! then swallowed into an empty result at the per-product boundary. One
//! bad day therefore silently zeroes a whole product's contribution for
//! the call while sibling products are unaffected.

use chrono::{Datelike, NaiveDate, Weekday};
use futures::future::{join_all, try_join_all};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::gate::AdmissionGate;
use crate::models::{FetchRequest, FetchWindow, SlotAvailability};
use crate::sync::client::InventoryApi;

/// Product id requested on ordinary weekdays.
pub const DEFAULT_PRODUCT_ID: &str = "14";

/// Fixed alternate product id used for any Sunday date, regardless of the
/// originally requested id. Hard business rule, not caller-configurable.
pub const SUNDAY_PRODUCT_ID: &str = "15";

/// Resolve the effective product id for a date.
pub fn effective_product_id(requested: &str, date: NaiveDate) -> &str {
    if date.weekday() == Weekday::Sun {
        tracing::debug!(
            date = %date,
            "using Sunday product id ({SUNDAY_PRODUCT_ID}) instead of {requested}"
        );
        SUNDAY_PRODUCT_ID
    } else {
        requested
    }
}

/// Turns fetch requests into flat lists of availability records.
pub struct FetchPipeline {
    api: Arc<dyn InventoryApi>,
    gate: Arc<AdmissionGate>,
}

impl FetchPipeline {
    pub fn new(api: Arc<dyn InventoryApi>, gate: Arc<AdmissionGate>) -> Self {
        Self { api, gate }
    }

    /// Fetch availability for all requested products over the window.
    ///
    /// Products are fetched independently and in parallel; a product
    /// whose fetch fails contributes an empty list. Ordering across
    /// products and days is not guaranteed.
    pub async fn fetch_inventory(&self, request: &FetchRequest) -> Vec<SlotAvailability> {
        tracing::info!(
            products = request.product_ids.len(),
            start = %request.window.start_date,
            end = %request.window.end_date,
            "fetching inventory in parallel"
        );

        let fetches = request.product_ids.iter().map(|product_id| async move {
            match self.fetch_product_window(product_id, &request.window).await {
                Ok(slots) => slots,
                Err(e) => {
                    tracing::error!(
                        product_id = %product_id,
                        error = %e,
                        "failed to fetch inventory for product"
                    );
                    Vec::new()
                }
            }
        });

        join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Fetch one product across every day of the window.
    ///
    /// Fail-fast join: the first failed day cancels the remaining pending
    /// days for this product and propagates.
    async fn fetch_product_window(
        &self,
        product_id: &str,
        window: &FetchWindow,
    ) -> Result<Vec<SlotAvailability>> {
        let calls = window
            .days()
            .into_iter()
            .map(|date| self.fetch_day_gated(product_id, date));

        let per_day = try_join_all(calls).await.map_err(|e| {
            tracing::error!(
                product_id = %product_id,
                error = %e,
                "error fetching inventory for product window"
            );
            e
        })?;

        Ok(per_day.into_iter().flatten().collect())
    }

    /// One per-day call through the admission gate, with the weekday
    /// substitution applied and results tagged with the effective id.
    async fn fetch_day_gated(
        &self,
        product_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>> {
        let effective_id = effective_product_id(product_id, date);

        self.gate
            .schedule(async {
                let mut slots = self
                    .api
                    .fetch_day(effective_id, date)
                    .await
                    .map_err(Error::from)?;

                for slot in &mut slots {
                    slot.product_id = effective_id.to_string();
                }

                Ok(slots)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sunday_substitution() {
        // 2026-09-06 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2026, 9, 6).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(effective_product_id("14", sunday), SUNDAY_PRODUCT_ID);

        // The substitution applies regardless of the requested id
        assert_eq!(effective_product_id("99", sunday), SUNDAY_PRODUCT_ID);
    }

    #[test]
    fn test_weekday_keeps_requested_id() {
        // 2026-09-07 is a Monday
        let monday = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert_eq!(effective_product_id("14", monday), "14");
    }
}
