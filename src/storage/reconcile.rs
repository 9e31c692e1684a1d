//! Reconciliation of fetched slots into the store
//!
//! Each slot record gets its own transaction: a failure while persisting
//! one slot rolls that slot back fully and leaves every other record's
//! outcome untouched. Batch counts are additive across records.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{SlotAvailability, StoreOutcome};
use crate::storage::repository::InventoryStore;

/// Applies fetched availability records to the store.
pub struct Reconciler {
    store: Arc<dyn InventoryStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Persist a batch of fetched slots, one transaction per record.
    ///
    /// A record that fails is counted as skipped and logged; the batch
    /// continues. Counts cover the slot and its pax lines: each created
    /// entity increments `saved`, each overwritten one increments
    /// `updated`. Passenger types and prices are reference data and stay
    /// out of the counts.
    pub fn store_slot_availabilities(&self, slots: &[SlotAvailability]) -> StoreOutcome {
        let mut total = StoreOutcome::default();

        for slot in slots {
            match self.store_slot(slot) {
                Ok(outcome) => total.merge(&outcome),
                Err(e) => {
                    tracing::error!(
                        provider_slot_id = %slot.provider_slot_id,
                        product_id = %slot.product_id,
                        error = %e,
                        "Failed to persist slot, skipping record"
                    );
                    total.skipped += 1;
                }
            }
        }

        tracing::info!(
            saved = total.saved,
            updated = total.updated,
            skipped = total.skipped,
            records = slots.len(),
            "Reconciliation batch complete"
        );

        crate::metrics::record_outcome(&total);
        total
    }

    /// Reconcile a single slot atomically.
    fn store_slot(&self, slot: &SlotAvailability) -> Result<StoreOutcome> {
        self.store.with_transaction(&mut |tx| {
            let mut outcome = StoreOutcome::default();

            if tx.slot_exists(&slot.provider_slot_id)? {
                tx.update_slot(slot)?;
                outcome.updated += 1;
            } else {
                tx.create_slot(slot)?;
                outcome.saved += 1;
            }

            for pax in &slot.pax_availability {
                // first-seen passenger type wins; later lines never mutate it
                if !tx.passenger_type_exists(&pax.type_id)? {
                    tx.create_passenger_type(pax)?;
                }

                let price_id = match tx.find_price(&pax.price)? {
                    Some(id) => id,
                    None => tx.create_price(&pax.price)?,
                };

                match tx.find_pax_line(&slot.provider_slot_id, &pax.type_id)? {
                    Some(line_id) => {
                        tx.update_pax_line(line_id, pax.remaining, price_id)?;
                        outcome.updated += 1;
                    }
                    None => {
                        tx.create_pax_line(
                            &slot.provider_slot_id,
                            &slot.product_id,
                            pax,
                            price_id,
                        )?;
                        outcome.saved += 1;
                    }
                }
            }

            Ok(outcome)
        })
    }
}
