// ============================================================
// Layer 5: Classification Report
// ============================================================
// Per-class precision / recall / F1 / support for a binary
// classifier, plus accuracy and the macro and support-weighted
// averages, rendered in the familiar fixed-width table:
//
//                 precision    recall  f1-score   support
//
//              0       0.95      0.42      0.58        43
//              1       0.79      0.99      0.88        80
//
//       accuracy                           0.80       123
//      macro avg       0.87      0.70      0.73       123
//   weighted avg       0.84      0.80      0.77       123
//
// Any ratio whose denominator is zero is reported as 0.

use std::fmt;

const DIGITS: usize = 2;
const NAME_WIDTH: usize = 12; // len("weighted avg")

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Indexed by label: [0] = rejected (N), [1] = approved (Y)
    pub classes:      [ClassMetrics; 2],
    pub accuracy:     f64,
    pub macro_avg:    ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

pub fn accuracy(truth: &[u8], predicted: &[u8]) -> f64 {
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    ratio(correct, truth.len())
}

impl ClassificationReport {
    pub fn new(truth: &[u8], predicted: &[u8]) -> Self {
        let classes = [0u8, 1u8].map(|label| {
            let tp = truth.iter().zip(predicted).filter(|&(&t, &p)| t == label && p == label).count();
            let predicted_as = predicted.iter().filter(|&&p| p == label).count();
            let support      = truth.iter().filter(|&&t| t == label).count();

            let precision = ratio(tp, predicted_as);
            let recall    = ratio(tp, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            ClassMetrics { precision, recall, f1, support }
        });

        let total = classes.iter().map(|c| c.support).sum::<usize>();

        let macro_avg = ClassMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / 2.0,
            recall:    classes.iter().map(|c| c.recall).sum::<f64>() / 2.0,
            f1:        classes.iter().map(|c| c.f1).sum::<f64>() / 2.0,
            support:   total,
        };

        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|c| c.precision),
            recall:    weighted(|c| c.recall),
            f1:        weighted(|c| c.f1),
            support:   total,
        };

        Self { classes, accuracy: accuracy(truth, predicted), macro_avg, weighted_avg }
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>w$}  {:>9.d$} {:>9.d$} {:>9.d$} {:>9}",
        name, m.precision, m.recall, m.f1, m.support,
        w = NAME_WIDTH, d = DIGITS,
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support",
            w = NAME_WIDTH,
        )?;
        writeln!(f)?;
        for (label, m) in self.classes.iter().enumerate() {
            write_row(f, &label.to_string(), m)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.d$} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support,
            w = NAME_WIDTH, d = DIGITS,
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1, 0, 1, 1], &[1, 0, 0, 1]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_per_class_arithmetic() {
        // truth:     1 1 1 0 0
        // predicted: 1 1 0 1 0
        let r = ClassificationReport::new(&[1, 1, 1, 0, 0], &[1, 1, 0, 1, 0]);

        let one = r.classes[1];
        assert!((one.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((one.recall    - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(one.support, 3);

        let zero = r.classes[0];
        assert!((zero.precision - 0.5).abs() < 1e-12);
        assert!((zero.recall    - 0.5).abs() < 1e-12);
        assert_eq!(zero.support, 2);

        assert!((r.accuracy - 0.6).abs() < 1e-12);
        assert!((r.macro_avg.recall - (0.5 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
        assert!((r.weighted_avg.recall - 0.6).abs() < 1e-12);
        assert_eq!(r.weighted_avg.support, 5);
    }

    #[test]
    fn test_zero_division_reports_zero() {
        // Class 0 never predicted and never present
        let r = ClassificationReport::new(&[1, 1], &[1, 1]);
        assert_eq!(r.classes[0].precision, 0.0);
        assert_eq!(r.classes[0].recall, 0.0);
        assert_eq!(r.classes[0].f1, 0.0);
        assert_eq!(r.classes[1].f1, 1.0);
    }

    #[test]
    fn test_rendered_table() {
        let text = ClassificationReport::new(&[1, 1, 1, 0, 0], &[1, 1, 0, 1, 0]).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "              precision    recall  f1-score   support");
        assert_eq!(lines[2], "           0       0.50      0.50      0.50         2");
        assert_eq!(lines[5], "    accuracy                           0.60         5");
        assert_eq!(lines[7], "weighted avg       0.60      0.60      0.60         5");
    }
}
