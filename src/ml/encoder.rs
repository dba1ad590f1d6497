// ============================================================
// Layer 5: One-Hot Encoder
// ============================================================
// Turns each categorical loan column into a block of 0/1
// indicator features, one per category seen during fitting.
//
//   Property_Area ∈ {Rural, Semiurban, Urban}
//   "Urban" → [0, 0, 1]
//
// Categories are sorted, so the column order is stable across
// runs. A category never seen during fitting encodes as an
// all-zero block instead of failing.

use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotEncoder {
    /// Sorted vocabulary per input column
    pub categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit<const W: usize>(rows: &[[String; W]]) -> Self {
        let categories = (0..W)
            .map(|col| {
                rows.iter()
                    .map(|row| row[col].clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .collect();
        Self { categories }
    }

    /// Total number of output indicator columns.
    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn transform<S: AsRef<str>>(&self, row: &[S]) -> Vec<f64> {
        let mut out = vec![0.0; self.width()];
        let mut offset = 0;
        for (vocab, value) in self.categories.iter().zip(row) {
            // binary_search works because the vocabulary is sorted
            if let Ok(i) = vocab.binary_search_by(|c| c.as_str().cmp(value.as_ref())) {
                out[offset + i] = 1.0;
            }
            offset += vocab.len();
        }
        out
    }
}
