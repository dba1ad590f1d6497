// ============================================================
// Layer 5: Standard Scaler
// ============================================================
// Per-column standardisation of the numeric loan features:
//
//   z = (x - mean) / std
//
// std is the population standard deviation (divide by n). A
// constant column has std 0 and is scaled by 1 instead, so it
// maps to 0 on the training data and never produces NaN.

/// Fitted per-column mean and scale.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub means:  Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit on row-major data; every row must have the same width.
    pub fn fit<const W: usize>(rows: &[[f64; W]]) -> Self {
        let n = rows.len() as f64;
        if rows.is_empty() {
            return Self { means: vec![0.0; W], scales: vec![1.0; W] };
        }

        let mut means = vec![0.0; W];
        for row in rows {
            for (m, &x) in means.iter_mut().zip(row) {
                *m += x;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut variances = vec![0.0; W];
        for row in rows {
            for ((v, &x), &m) in variances.iter_mut().zip(row).zip(&means) {
                let d = x - m;
                *v += d * d;
            }
        }

        let scales = variances
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std == 0.0 { 1.0 } else { std }
            })
            .collect();

        Self { means, scales }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&x, (&m, &s))| (x - m) / s)
            .collect()
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_statistics() {
        let s = StandardScaler::fit(&[[1.0, 10.0], [3.0, 10.0]]);
        assert_eq!(s.means, vec![2.0, 10.0]);
        // population std of {1, 3} is 1
        assert_eq!(s.scales, vec![1.0, 1.0]);
    }

    #[test]
    fn test_transformed_training_columns_are_standardised() {
        let rows  = [[2.0], [4.0], [4.0], [4.0], [5.0], [5.0], [7.0], [9.0]];
        let s     = StandardScaler::fit(&rows);
        let z: Vec<f64> = rows.iter().map(|r| s.transform(r)[0]).collect();

        let mean = z.iter().sum::<f64>() / z.len() as f64;
        let var  = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / z.len() as f64;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let s = StandardScaler::fit(&[[5.0], [5.0], [5.0]]);
        assert_eq!(s.transform(&[5.0]), vec![0.0]);
        assert_eq!(s.transform(&[6.0]), vec![1.0]);
    }
}
