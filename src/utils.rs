use crate::models::BatchPlan;

/// One contiguous slice of the ticker universe sent in a single request
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBatch {
    pub batch_number: usize,
    /// Index of the first symbol in the universe
    pub offset: usize,
    pub symbols: Vec<String>,
}

impl SymbolBatch {
    pub fn description(&self) -> String {
        match (self.symbols.first(), self.symbols.last()) {
            (Some(first), Some(last)) => format!("{} symbols ({}..{})", self.symbols.len(), first, last),
            _ => "empty".to_string(),
        }
    }
}

/// Batch calculator for splitting the universe into provider requests
pub struct BatchCalculator;

impl BatchCalculator {
    /// Split `symbols` into contiguous batches following `plan`.
    ///
    /// `BatchPlan::Count(k)` behaves like an even array split: the first
    /// `len % k` batches carry one extra symbol. Empty batches are never
    /// produced, so fewer than `k` batches come back when `len < k`.
    pub fn calculate_batches(symbols: &[String], plan: BatchPlan) -> Vec<SymbolBatch> {
        let sizes: Vec<usize> = match plan {
            BatchPlan::Size(size) => {
                let size = size.max(1);
                (0..symbols.len())
                    .step_by(size)
                    .map(|start| size.min(symbols.len() - start))
                    .collect()
            }
            BatchPlan::Count(count) => {
                let count = count.max(1);
                let base = symbols.len() / count;
                let extra = symbols.len() % count;
                (0..count)
                    .map(|i| base + usize::from(i < extra))
                    .filter(|&size| size > 0)
                    .collect()
            }
        };

        let mut batches = Vec::with_capacity(sizes.len());
        let mut offset = 0;
        for (i, size) in sizes.into_iter().enumerate() {
            batches.push(SymbolBatch {
                batch_number: i + 1,
                offset,
                symbols: symbols[offset..offset + size].to_vec(),
            });
            offset += size;
        }
        batches
    }

    /// Largest batch `plan` would produce for a universe of `len` symbols.
    pub fn largest_batch(len: usize, plan: BatchPlan) -> usize {
        match plan {
            BatchPlan::Size(size) => size.min(len),
            BatchPlan::Count(count) => len.div_ceil(count.max(1)),
        }
    }
}
