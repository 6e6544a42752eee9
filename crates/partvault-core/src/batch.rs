use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::key::RecordKey;
use crate::store::PartVault;

/// Shared cooperative-cancellation flag. Worker tasks set it; the batch loop
/// checks it between records and stops after the item in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: usize,
    pub total: usize,
    pub cancelled: bool,
}

/// Applies one column update per record, on the single-writer context that
/// owns the store. Updates addressed at unknown keys are skipped without
/// counting as completed. Returns how far the batch got.
pub fn apply_field_updates(
    vault: &mut PartVault,
    column: &str,
    updates: &[(RecordKey, String)],
    cancel: &CancelFlag,
) -> BatchReport {
    let total = updates.len();
    let mut completed = 0;
    for (key, value) in updates {
        if cancel.is_cancelled() {
            debug!(completed, total, "batch cancelled");
            return BatchReport {
                completed,
                total,
                cancelled: true,
            };
        }
        if vault.set_field(key, column, value) {
            completed += 1;
        }
    }
    BatchReport {
        completed,
        total,
        cancelled: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::PartName;
    use crate::record::Record;

    fn vault() -> PartVault {
        let mut record = Record::new(PartName::parse("BOLT_B-1"));
        record.set_hierarchy("Hardware", "Fasteners", "Screws");
        let mut other = Record::new(PartName::parse("AXLE_A-1"));
        other.set_hierarchy("Hardware", "Fasteners", "Screws");
        let mut vault = PartVault::new();
        vault.load(vec![record, other], None);
        vault
    }

    #[test]
    fn full_batch_applies_all_updates() {
        let mut vault = vault();
        let updates: Vec<(crate::RecordKey, String)> = vault
            .records()
            .iter()
            .map(|r| (r.key(), "Acme".to_string()))
            .collect();

        let report = apply_field_updates(&mut vault, "Manufacturer", &updates, &CancelFlag::new());
        assert_eq!(
            report,
            BatchReport {
                completed: 2,
                total: 2,
                cancelled: false
            }
        );
        for row in vault.effective() {
            assert_eq!(row.record.scalar("Manufacturer"), Some("Acme"));
        }
    }

    #[test]
    fn cancelled_flag_stops_before_first_item() {
        let mut vault = vault();
        let updates = vec![(vault.records()[0].key(), "Acme".to_string())];
        let cancel = CancelFlag::new();
        cancel.cancel();

        let report = apply_field_updates(&mut vault, "Manufacturer", &updates, &cancel);
        assert_eq!(
            report,
            BatchReport {
                completed: 0,
                total: 1,
                cancelled: true
            }
        );
        assert!(vault.overlay().is_empty());
    }

    #[test]
    fn unknown_keys_do_not_count_as_completed() {
        let mut vault = vault();
        let updates = vec![
            (vault.records()[0].key(), "Acme".to_string()),
            (
                crate::RecordKey::new("GHOST", "X", "Y", "Z"),
                "Acme".to_string(),
            ),
        ];
        let report = apply_field_updates(&mut vault, "Manufacturer", &updates, &CancelFlag::new());
        assert_eq!(report.completed, 1);
        assert_eq!(report.total, 2);
        assert!(!report.cancelled);
    }
}
