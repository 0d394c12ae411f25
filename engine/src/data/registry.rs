// Per-timeframe in-memory datasets owned by one chart session.
use shared::models::{Bar, Dataset, TimeFrame, VolumeBar};
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;

use super::generator;
use crate::config::{EngineSettings, WindowCounts};
use crate::error::EngineResult;

struct Slot {
    dataset: Dataset,
    // Backward batches loaded since the last replace; drives the seed offset.
    load_count: u32,
}

pub struct DatasetRegistry {
    base_price: f64,
    window_counts: WindowCounts,
    entries: HashMap<TimeFrame, Slot>,
}

impl DatasetRegistry {
    /// Fails when `settings` would generate invalid bars.
    pub fn new(settings: &EngineSettings) -> EngineResult<Self> {
        settings.validate()?;
        Ok(DatasetRegistry {
            base_price: settings.base_price,
            window_counts: settings.window_counts,
            entries: HashMap::new(),
        })
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    /// Fresh seeded window for `timeframe`, not stored.
    pub fn pristine(&self, timeframe: TimeFrame) -> EngineResult<Dataset> {
        generator::seed_window(
            timeframe,
            self.base_price,
            self.window_counts.for_timeframe(timeframe),
        )
    }

    fn entry(&mut self, timeframe: TimeFrame) -> EngineResult<&mut Slot> {
        match self.entries.entry(timeframe) {
            MapEntry::Occupied(slot) => Ok(slot.into_mut()),
            MapEntry::Vacant(vacant) => {
                let dataset = generator::seed_window(
                    timeframe,
                    self.base_price,
                    self.window_counts.for_timeframe(timeframe),
                )?;
                tracing::info!(%timeframe, bars = dataset.len(), "Created dataset on first access");
                Ok(vacant.insert(Slot { dataset, load_count: 0 }))
            }
        }
    }

    /// Dataset for `timeframe`, seeding it on first access.
    pub fn get(&mut self, timeframe: TimeFrame) -> EngineResult<&Dataset> {
        Ok(&self.entry(timeframe)?.dataset)
    }

    /// Dataset for `timeframe` if it has been created.
    pub fn peek(&self, timeframe: TimeFrame) -> Option<&Dataset> {
        self.entries.get(&timeframe).map(|slot| &slot.dataset)
    }

    /// Replaces the whole dataset and resets the load counter.
    pub fn replace(&mut self, timeframe: TimeFrame, dataset: Dataset) -> EngineResult<()> {
        dataset.check_aligned()?;
        let dataset = if dataset.is_time_sorted() {
            dataset
        } else {
            tracing::warn!(%timeframe, "Replacement dataset out of order, sorting");
            merge_sorted(Dataset::default(), dataset)
        };
        tracing::info!(%timeframe, bars = dataset.len(), "Replaced dataset");
        self.entries.insert(timeframe, Slot { dataset, load_count: 0 });
        Ok(())
    }

    /// Puts the pristine seeded window back in place.
    pub fn reset(&mut self, timeframe: TimeFrame) -> EngineResult<&Dataset> {
        let pristine = self.pristine(timeframe)?;
        self.replace(timeframe, pristine)?;
        self.get(timeframe)
    }

    /// Concatenates older bars in front of the current data and returns how many
    /// bars were actually added. The caller supplies an ascending batch strictly
    /// older than the current earliest bar; anything else is re-sorted, with
    /// existing bars winning on duplicate times.
    pub fn prepend(
        &mut self,
        timeframe: TimeFrame,
        older_bars: Vec<Bar>,
        older_volumes: Vec<VolumeBar>,
    ) -> EngineResult<usize> {
        let older = Dataset {
            candlestick: older_bars,
            volume: older_volumes,
        };
        older.check_aligned()?;

        let slot = self.entry(timeframe)?;
        let before = slot.dataset.len();
        let existing = std::mem::take(&mut slot.dataset);

        let contiguous = match (older.latest(), existing.earliest()) {
            (Some(last_older), Some(first_existing)) => {
                older.is_time_sorted() && last_older.epoch_millis() < first_existing.epoch_millis()
            }
            _ => older.is_time_sorted(),
        };

        slot.dataset = if contiguous {
            let mut merged = older;
            merged.candlestick.extend(existing.candlestick);
            merged.volume.extend(existing.volume);
            merged
        } else {
            tracing::warn!(%timeframe, "Prepended batch overlaps or is unordered, re-sorting");
            merge_sorted(existing, older)
        };

        let added = slot.dataset.len() - before;
        tracing::debug!(%timeframe, added, total = slot.dataset.len(), "Prepended older bars");
        Ok(added)
    }

    /// Increments and returns the load counter for `timeframe`.
    pub fn next_load_count(&mut self, timeframe: TimeFrame) -> EngineResult<u32> {
        let slot = self.entry(timeframe)?;
        slot.load_count += 1;
        Ok(slot.load_count)
    }

    pub fn load_count(&self, timeframe: TimeFrame) -> u32 {
        self.entries.get(&timeframe).map_or(0, |slot| slot.load_count)
    }
}

// Stable sort of `primary` followed by `secondary`; on equal times the entry
// from `primary` is kept.
fn merge_sorted(primary: Dataset, secondary: Dataset) -> Dataset {
    let mut pairs: Vec<(Bar, VolumeBar)> = primary
        .candlestick
        .into_iter()
        .zip(primary.volume)
        .chain(secondary.candlestick.into_iter().zip(secondary.volume))
        .collect();
    pairs.sort_by_key(|(bar, _)| bar.epoch_millis());
    pairs.dedup_by_key(|(bar, _)| bar.epoch_millis());

    let (candlestick, volume) = pairs.into_iter().unzip();
    Dataset { candlestick, volume }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use chrono::NaiveDate;
    use shared::models::TimePoint;

    fn registry() -> DatasetRegistry {
        DatasetRegistry::new(&EngineSettings::default()).unwrap()
    }

    #[test]
    fn test_get_seeds_default_window() {
        let mut reg = registry();
        assert!(reg.peek(TimeFrame::Day1).is_none());
        assert_eq!(reg.get(TimeFrame::Day1).unwrap().len(), 30);
        assert_eq!(reg.get(TimeFrame::Hour4).unwrap().len(), 60);
        assert_eq!(reg.get(TimeFrame::Hour1).unwrap().len(), 72);
        assert_eq!(reg.get(TimeFrame::Minute15).unwrap().len(), 96);
        assert!(reg.peek(TimeFrame::Day1).is_some());
    }

    #[test]
    fn test_daily_scenario_prepend_five() {
        let mut reg = registry();
        let first = *reg.get(TimeFrame::Day1).unwrap().earliest().unwrap();
        let older =
            generator::extend_backward(TimeFrame::Day1, 100_000.0, first.epoch_millis(), 5, 1000).unwrap();
        let new_bars = older.candlestick.clone();

        let added = reg.prepend(TimeFrame::Day1, older.candlestick, older.volume).unwrap();
        assert_eq!(added, 5);

        let ds = reg.peek(TimeFrame::Day1).unwrap();
        assert_eq!(ds.len(), 35);
        assert_eq!(&ds.candlestick[..5], &new_bars[..]);
        assert_eq!(ds.candlestick[4].time, TimePoint::Date(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert_eq!(ds.candlestick[5], first);
        assert!(ds.is_time_sorted());
        assert!(ds.is_aligned());
    }

    #[test]
    fn test_prepend_rejects_misaligned_input() {
        let mut reg = registry();
        let first = reg.get(TimeFrame::Hour1).unwrap().candlestick[0].epoch_millis();
        let mut older = generator::extend_backward(TimeFrame::Hour1, 100_000.0, first, 3, 1000).unwrap();
        older.volume.pop();
        assert!(reg.prepend(TimeFrame::Hour1, older.candlestick, older.volume).is_err());
        assert_eq!(reg.peek(TimeFrame::Hour1).unwrap().len(), 72);
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let mut settings = EngineSettings::default();
        settings.base_price = f64::NAN;
        assert!(matches!(DatasetRegistry::new(&settings), Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_replace_rejects_misaligned_dataset() {
        let mut reg = registry();
        let before = reg.get(TimeFrame::Day1).unwrap().clone();
        let mut bad = reg.pristine(TimeFrame::Day1).unwrap();
        bad.volume.truncate(10);

        let err = reg.replace(TimeFrame::Day1, bad).unwrap_err();
        assert!(matches!(err, EngineError::ModelError { .. }));
        assert_eq!(reg.peek(TimeFrame::Day1), Some(&before));
    }

    #[test]
    fn test_prepend_overlapping_batch_is_resorted() {
        let mut reg = registry();
        let existing = reg.get(TimeFrame::Hour4).unwrap().clone();
        // Anchored two bars into the existing data: last two bars collide.
        let anchor = existing.candlestick[2].epoch_millis();
        let older = generator::extend_backward(TimeFrame::Hour4, 100_000.0, anchor, 4, 1000).unwrap();

        let added = reg.prepend(TimeFrame::Hour4, older.candlestick, older.volume).unwrap();
        assert_eq!(added, 2);
        let ds = reg.peek(TimeFrame::Hour4).unwrap();
        assert!(ds.is_time_sorted());
        assert!(ds.is_aligned());
        // Existing bars win on duplicate times.
        assert_eq!(ds.candlestick[2], existing.candlestick[0]);
    }

    #[test]
    fn test_replace_resets_load_count() {
        let mut reg = registry();
        assert_eq!(reg.next_load_count(TimeFrame::Day1).unwrap(), 1);
        assert_eq!(reg.next_load_count(TimeFrame::Day1).unwrap(), 2);
        assert_eq!(reg.load_count(TimeFrame::Hour1), 0);

        let pristine = reg.pristine(TimeFrame::Day1).unwrap();
        reg.replace(TimeFrame::Day1, pristine).unwrap();
        assert_eq!(reg.load_count(TimeFrame::Day1), 0);
    }

    #[test]
    fn test_reset_restores_pristine_window() {
        let mut reg = registry();
        let first = reg.get(TimeFrame::Day1).unwrap().candlestick[0].epoch_millis();
        let older = generator::extend_backward(TimeFrame::Day1, 100_000.0, first, 30, 1000).unwrap();
        reg.prepend(TimeFrame::Day1, older.candlestick, older.volume).unwrap();
        assert_eq!(reg.peek(TimeFrame::Day1).unwrap().len(), 60);

        let ds = reg.reset(TimeFrame::Day1).unwrap().clone();
        assert_eq!(ds, reg.pristine(TimeFrame::Day1).unwrap());
    }

    #[test]
    fn test_replace_sorts_out_of_order_dataset() {
        let mut reg = registry();
        let mut ds = reg.pristine(TimeFrame::Hour1).unwrap();
        ds.candlestick.reverse();
        ds.volume.reverse();
        reg.replace(TimeFrame::Hour1, ds).unwrap();
        let stored = reg.peek(TimeFrame::Hour1).unwrap();
        assert!(stored.is_time_sorted());
        assert!(stored.is_aligned());
        assert_eq!(stored.len(), 72);
    }
}
