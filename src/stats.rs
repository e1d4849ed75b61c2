use std::time::{Duration, Instant};

/// How one listing entry or one asset fared within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Rows came back from upstream; `saved` of them were written
    Saved { fetched: usize, saved: usize },
    /// Upstream had no data for the asset
    Empty,
    /// Rejected during normalization, never sent to the store
    Skipped,
    /// Fetch, login or store failure
    Failed,
}

/// Running tally for one ingestion cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleStats {
    /// Items in the cycle's snapshot (listing entries or asset ids)
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub empty: usize,
    /// Rows written to the store
    pub records: usize,
    pub elapsed: Duration,
    started: Instant,
}

impl CycleStats {
    /// Start the clock for a cycle over `total` items
    pub fn begin(total: usize) -> Self {
        Self {
            total,
            success: 0,
            failed: 0,
            skipped: 0,
            empty: 0,
            records: 0,
            elapsed: Duration::ZERO,
            started: Instant::now(),
        }
    }

    pub fn tally(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Saved { saved, .. } => {
                self.success += 1;
                self.records += saved;
            }
            Outcome::Empty => {
                self.success += 1;
                self.empty += 1;
            }
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Stop the clock
    pub fn finish(mut self) -> Self {
        self.elapsed = self.started.elapsed();
        self
    }

    /// Every item either saved or came back empty
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    /// One line per cycle; warn level when anything was dropped
    pub fn log_summary(&self, task: &str) {
        let elapsed_ms = self.elapsed.as_millis() as u64;

        if self.is_clean() {
            tracing::info!(
                task,
                total = self.total,
                success = self.success,
                empty = self.empty,
                records = self.records,
                elapsed_ms,
                "Cycle finished"
            );
        } else {
            tracing::warn!(
                task,
                total = self.total,
                success = self.success,
                failed = self.failed,
                skipped = self.skipped,
                empty = self.empty,
                records = self.records,
                elapsed_ms,
                "Cycle finished with dropped items"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_by_outcome() {
        let mut stats = CycleStats::begin(5);
        stats.tally(Outcome::Saved { fetched: 3, saved: 3 });
        stats.tally(Outcome::Saved { fetched: 2, saved: 1 });
        stats.tally(Outcome::Empty);
        stats.tally(Outcome::Skipped);
        stats.tally(Outcome::Failed);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.success, 3);
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.records, 4);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_empty_cycle_is_clean() {
        let stats = CycleStats::begin(0).finish();
        assert!(stats.is_clean());
        assert_eq!(stats.success, 0);
    }
}
