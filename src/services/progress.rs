/// Batched progress counter shared by the loader and the exporter.
///
/// A percentage is produced every `interval` items and on the last item, never per
/// item, so notification overhead stays bounded on inputs with millions of lines.
/// Percentages are `processed * 100 / total`, rounded down, and therefore
/// non-decreasing.
#[derive(Debug, Clone)]
pub struct ProgressCadence {
    total: usize,
    interval: usize,
    processed: usize,
    emitted: bool,
}

impl ProgressCadence {
    pub fn new(total: usize, interval: usize) -> Self {
        Self {
            total,
            interval: interval.max(1),
            processed: 0,
            emitted: false,
        }
    }

    /// Count one processed item and return a percentage when one is due.
    pub fn advance(&mut self) -> Option<u8> {
        self.processed += 1;
        if self.processed % self.interval == 0 || self.processed >= self.total {
            self.emitted = true;
            Some(percent(self.processed, self.total))
        } else {
            None
        }
    }

    /// Closing percentage for inputs that never produced one (empty inputs).
    pub fn finish(&mut self) -> Option<u8> {
        if self.emitted {
            None
        } else {
            self.emitted = true;
            Some(100)
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}

pub fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 || processed >= total {
        return 100;
    }
    ((processed as u128 * 100) / total as u128) as u8
}
