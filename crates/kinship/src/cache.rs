//! Memoization of the most recent layout.

use std::rc::Rc;

use log::debug;

use kinship_core::record::IndividualRecord;

use crate::{LayoutEngine, config::AppConfig, error::KinshipError, layout::PedigreeLayout};

struct Entry {
    records: Rc<[IndividualRecord]>,
    config: AppConfig,
    layout: Rc<PedigreeLayout>,
}

/// Remembers the last layout computed for a shared record list.
///
/// A hit requires the very same `Rc` allocation and an equal engine
/// configuration. Holding the `Rc` keeps the allocation alive, so its address
/// cannot be reused by a different list while cached.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
///
/// use kinship::{LayoutCache, LayoutEngine, record::IndividualRecord};
///
/// let mut proband = IndividualRecord::new("1");
/// proband.is_proband = true;
/// let records: Rc<[IndividualRecord]> = Rc::from(vec![proband]);
///
/// let engine = LayoutEngine::default();
/// let mut cache = LayoutCache::new();
/// let first = cache.layout(&engine, &records).unwrap();
/// let second = cache.layout(&engine, &records).unwrap();
/// assert!(Rc::ptr_eq(&first, &second));
/// ```
#[derive(Default)]
pub struct LayoutCache {
    entry: Option<Entry>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached layout for `records` or computes and caches a new one.
    ///
    /// # Errors
    ///
    /// Propagates any error of [`LayoutEngine::layout`]. Failures are not cached.
    pub fn layout(
        &mut self,
        engine: &LayoutEngine,
        records: &Rc<[IndividualRecord]>,
    ) -> Result<Rc<PedigreeLayout>, KinshipError> {
        let hit = self.entry.as_ref().filter(|entry| {
            Rc::ptr_eq(&entry.records, records) && entry.config == *engine.config()
        });
        if let Some(entry) = hit {
            debug!("Layout cache hit");
            return Ok(Rc::clone(&entry.layout));
        }

        let layout = Rc::new(engine.layout(records)?);
        self.entry = Some(Entry {
            records: Rc::clone(records),
            config: engine.config().clone(),
            layout: Rc::clone(&layout),
        });
        Ok(layout)
    }

    /// Drops the cached layout.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;

    fn records() -> Rc<[IndividualRecord]> {
        let mut proband = IndividualRecord::new("1");
        proband.is_proband = true;
        proband.parents = vec!["2".into(), "3".into()];
        Rc::from(vec![
            proband,
            IndividualRecord::new("2"),
            IndividualRecord::new("3"),
        ])
    }

    #[test]
    fn test_equal_content_in_new_allocation_misses() {
        let engine = LayoutEngine::default();
        let mut cache = LayoutCache::new();

        let first = cache.layout(&engine, &records()).unwrap();
        let second = cache.layout(&engine, &records()).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_config_change_misses() {
        let shared = records();
        let mut cache = LayoutCache::new();

        let narrow = cache.layout(&LayoutEngine::default(), &shared).unwrap();
        let wide_config = AppConfig::new(LayoutConfig::default().with_spacing(80.0, 40.0));
        let wide = cache
            .layout(&LayoutEngine::new(wide_config), &shared)
            .unwrap();

        assert!(!Rc::ptr_eq(&narrow, &wide));
        assert!(wide.width() > narrow.width());
    }

    #[test]
    fn test_clear() {
        let shared = records();
        let engine = LayoutEngine::default();
        let mut cache = LayoutCache::new();

        let first = cache.layout(&engine, &shared).unwrap();
        cache.clear();
        let second = cache.layout(&engine, &shared).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(first.width(), second.width());
    }
}
