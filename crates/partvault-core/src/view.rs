use uuid::Uuid;

use crate::filter::NormalizedFilter;
use crate::record::KeyedRecord;

/// Recompute counters, exposed for diagnostics and for pinning the cache
/// invalidation contract in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub effective_recomputes: u64,
    pub filtered_recomputes: u64,
}

#[derive(Debug)]
struct EffectiveEntry {
    token: Uuid,
    version: u64,
    rows: Vec<KeyedRecord>,
}

#[derive(Debug)]
struct FilteredEntry {
    token: Uuid,
    version: u64,
    signature: Vec<NormalizedFilter>,
    rows: Vec<KeyedRecord>,
}

/// Single-slot memo for the effective and filtered row lists. Entries are
/// valid only for the exact (dataset token, version stamp) they were stored
/// under; the filtered slot additionally keys on the canonical filter
/// signature.
#[derive(Debug, Default)]
pub(crate) struct ViewCache {
    effective: Option<EffectiveEntry>,
    filtered: Option<FilteredEntry>,
    stats: CacheStats,
}

impl ViewCache {
    pub(crate) fn effective(&self, token: Uuid, version: u64) -> Option<Vec<KeyedRecord>> {
        self.effective
            .as_ref()
            .filter(|entry| entry.token == token && entry.version == version)
            .map(|entry| entry.rows.clone())
    }

    pub(crate) fn store_effective(&mut self, token: Uuid, version: u64, rows: &[KeyedRecord]) {
        self.stats.effective_recomputes += 1;
        self.effective = Some(EffectiveEntry {
            token,
            version,
            rows: rows.to_vec(),
        });
    }

    pub(crate) fn filtered(
        &self,
        token: Uuid,
        version: u64,
        signature: &[NormalizedFilter],
    ) -> Option<Vec<KeyedRecord>> {
        self.filtered
            .as_ref()
            .filter(|entry| {
                entry.token == token && entry.version == version && entry.signature == signature
            })
            .map(|entry| entry.rows.clone())
    }

    pub(crate) fn store_filtered(
        &mut self,
        token: Uuid,
        version: u64,
        signature: Vec<NormalizedFilter>,
        rows: &[KeyedRecord],
    ) {
        self.stats.filtered_recomputes += 1;
        self.filtered = Some(FilteredEntry {
            token,
            version,
            signature,
            rows: rows.to_vec(),
        });
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }
}
