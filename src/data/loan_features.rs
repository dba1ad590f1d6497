// ============================================================
// Layer 4: Loan Feature Engineering
// ============================================================
// Turns raw CSV rows into clean, fully numeric training rows.
//
// Steps (applied in order):
//   1. Coerce numeric columns with parse-or-null semantics:
//      anything that does not parse as a number becomes missing.
//      "Dependents" maps "3+" to 3 before parsing.
//   2. Impute each numeric column with the median of its own
//      non-missing values. Columns are independent, so the order
//      in which they are imputed does not matter.
//   3. Derive Total_Income and Loan_to_Income_Ratio from the
//      imputed values (domain::loan::derived_features).
//   4. Map Loan_Status: "Y" → 1, "N" → 0, anything else → missing.
//   5. Drop every row that still has a missing value, including
//      missing categorical fields and missing labels.
//
// The single-applicant path does NOT use the median for Dependents:
// a missing value there becomes 0 (see `applicant_features`). Both
// behaviours are intentional and kept side by side.
//
// Reference: Rust Book §13 (Iterators and Closures)

use crate::domain::loan::{derived_features, ApplicantInput, LoanRecord, PreparedRow};

/// Numeric view of a raw row before imputation: NaN = missing.
#[derive(Debug, Clone, Copy)]
struct RawNumeric {
    applicant_income:   f64,
    coapplicant_income: f64,
    loan_amount:        f64,
    loan_amount_term:   f64,
    credit_history:     f64,
    dependents:         f64,
}

/// Parse a numeric cell; missing or non-numeric text becomes NaN.
pub fn parse_or_null(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

/// Parse a Dependents cell: "3+" counts as 3, otherwise parse-or-null.
pub fn parse_dependents(value: Option<&str>) -> f64 {
    match value.map(str::trim) {
        Some("3+") => 3.0,
        other      => parse_or_null(other),
    }
}

/// Median of the non-NaN values, NaN if there are none.
/// Even counts average the two middle values.
pub fn median(values: &[f64]) -> f64 {
    let mut present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return f64::NAN;
    }
    present.sort_by(|a, b| a.total_cmp(b));

    let n   = present.len();
    let mid = n / 2;
    if n % 2 == 1 {
        present[mid]
    } else {
        (present[mid - 1] + present[mid]) / 2.0
    }
}

/// Replace NaNs in place with the column median.
fn impute_median(column: &mut [f64]) -> f64 {
    let fill = median(column);
    for v in column.iter_mut().filter(|v| v.is_nan()) {
        *v = fill;
    }
    fill
}

/// Map the target label. Anything other than Y/N is missing.
pub fn parse_label(value: Option<&str>) -> Option<u8> {
    match value.map(str::trim) {
        Some("Y") => Some(1),
        Some("N") => Some(0),
        _         => None,
    }
}

/// Summary of what `prepare_rows` did, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrepareStats {
    pub input_rows:   usize,
    pub dropped_rows: usize,
    pub medians:      [f64; 6],
}

/// Run the full batch feature-engineering pass.
pub fn prepare_rows(records: &[LoanRecord]) -> (Vec<PreparedRow>, PrepareStats) {
    // ── Step 1: coerce ────────────────────────────────────────────────────────
    let raw: Vec<RawNumeric> = records
        .iter()
        .map(|r| RawNumeric {
            applicant_income:   parse_or_null(r.applicant_income.as_deref()),
            coapplicant_income: parse_or_null(r.coapplicant_income.as_deref()),
            loan_amount:        parse_or_null(r.loan_amount.as_deref()),
            loan_amount_term:   parse_or_null(r.loan_amount_term.as_deref()),
            credit_history:     parse_or_null(r.credit_history.as_deref()),
            dependents:         parse_dependents(r.dependents.as_deref()),
        })
        .collect();

    // ── Step 2: impute each column with its own median ────────────────────────
    let mut columns: [Vec<f64>; 6] = [
        raw.iter().map(|r| r.applicant_income).collect(),
        raw.iter().map(|r| r.coapplicant_income).collect(),
        raw.iter().map(|r| r.loan_amount).collect(),
        raw.iter().map(|r| r.loan_amount_term).collect(),
        raw.iter().map(|r| r.credit_history).collect(),
        raw.iter().map(|r| r.dependents).collect(),
    ];
    let mut medians = [f64::NAN; 6];
    for (column, m) in columns.iter_mut().zip(medians.iter_mut()) {
        *m = impute_median(column);
    }

    // ── Steps 3-5: derive, label, drop incomplete rows ────────────────────────
    let mut prepared = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let applicant_income   = columns[0][i];
        let coapplicant_income = columns[1][i];
        let loan_amount        = columns[2][i];
        let loan_amount_term   = columns[3][i];
        let credit_history     = columns[4][i];
        let dependents         = columns[5][i];

        let (total_income, ratio) =
            derived_features(applicant_income, coapplicant_income, loan_amount);

        let numeric = [
            applicant_income,
            coapplicant_income,
            loan_amount,
            loan_amount_term,
            credit_history,
            dependents,
            total_income,
            ratio,
        ];
        if numeric.iter().any(|v| !v.is_finite()) {
            continue;
        }

        let Some(categorical) = categorical_fields(record) else {
            continue;
        };
        let Some(label) = parse_label(record.loan_status.as_deref()) else {
            continue;
        };

        prepared.push(PreparedRow { numeric, categorical, label });
    }

    let stats = PrepareStats {
        input_rows:   records.len(),
        dropped_rows: records.len() - prepared.len(),
        medians,
    };
    (prepared, stats)
}

fn categorical_fields(r: &LoanRecord) -> Option<[String; 5]> {
    Some([
        r.gender.clone()?,
        r.married.clone()?,
        r.education.clone()?,
        r.self_employed.clone()?,
        r.property_area.clone()?,
    ])
}

/// Build the feature vectors for one applicant.
///
/// Dependents: "3+" → 3, missing or unparseable → 0 (not the median).
pub fn applicant_features(a: &ApplicantInput) -> ([f64; 8], [String; 5]) {
    let dependents = parse_dependents(a.dependents.as_deref());
    let dependents = if dependents.is_nan() { 0.0 } else { dependents };

    let (total_income, ratio) =
        derived_features(a.applicant_income, a.coapplicant_income, a.loan_amount);

    let numeric = [
        a.applicant_income,
        a.coapplicant_income,
        a.loan_amount,
        a.loan_amount_term,
        a.credit_history,
        dependents,
        total_income,
        ratio,
    ];
    let categorical = [
        a.gender.clone(),
        a.married.clone(),
        a.education.clone(),
        a.self_employed.clone(),
        a.property_area.clone(),
    ];
    (numeric, categorical)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        income: &str,
        co: &str,
        amount: &str,
        dependents: &str,
        status: &str,
    ) -> LoanRecord {
        let opt = |s: &str| if s.is_empty() { None } else { Some(s.to_string()) };
        LoanRecord {
            loan_id:            Some("LP".to_string()),
            gender:             Some("Male".to_string()),
            married:            Some("Yes".to_string()),
            dependents:         opt(dependents),
            education:          Some("Graduate".to_string()),
            self_employed:      Some("No".to_string()),
            applicant_income:   opt(income),
            coapplicant_income: opt(co),
            loan_amount:        opt(amount),
            loan_amount_term:   Some("360".to_string()),
            credit_history:     Some("1".to_string()),
            property_area:      Some("Urban".to_string()),
            loan_status:        opt(status),
        }
    }

    #[test]
    fn test_parse_or_null() {
        assert_eq!(parse_or_null(Some("42.5")), 42.5);
        assert_eq!(parse_or_null(Some(" 7 ")), 7.0);
        assert!(parse_or_null(Some("abc")).is_nan());
        assert!(parse_or_null(None).is_nan());
    }

    #[test]
    fn test_three_plus_dependents() {
        assert_eq!(parse_dependents(Some("3+")), 3.0);
        assert_eq!(parse_dependents(Some("2")), 2.0);
        assert!(parse_dependents(Some("many")).is_nan());
    }

    #[test]
    fn test_median_odd_even_and_missing() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[f64::NAN, 5.0, 1.0]), 3.0);
        assert!(median(&[f64::NAN]).is_nan());
    }

    #[test]
    fn test_missing_values_get_column_median() {
        let rows = vec![
            record("1000", "0", "100", "0", "Y"),
            record("3000", "500", "", "3+", "N"),
            record("", "1000", "300", "", "Y"),
        ];
        let (prepared, stats) = prepare_rows(&rows);
        assert_eq!(prepared.len(), 3);
        assert_eq!(stats.dropped_rows, 0);

        // LoanAmount median of {100, 300} = 200
        assert_eq!(prepared[1].numeric[2], 200.0);
        // ApplicantIncome median of {1000, 3000} = 2000
        assert_eq!(prepared[2].numeric[0], 2000.0);
        // Dependents median of {0, 3} = 1.5
        assert_eq!(prepared[2].numeric[5], 1.5);
    }

    #[test]
    fn test_derived_features_hold_after_imputation() {
        let rows = vec![
            record("1000", "", "100", "0", "Y"),
            record("3000", "500", "", "1", "N"),
            record("", "1000", "300", "2", "Y"),
        ];
        let (prepared, _) = prepare_rows(&rows);
        for row in &prepared {
            let n = row.numeric;
            assert_eq!(n[6], n[0] + n[1]);
            assert_eq!(n[7], n[2] / (n[6] + 1.0));
        }
    }

    #[test]
    fn test_labels_mapped_and_unknown_dropped() {
        let rows = vec![
            record("1000", "0", "100", "0", "Y"),
            record("1000", "0", "100", "0", "N"),
            record("1000", "0", "100", "0", "maybe"),
            record("1000", "0", "100", "0", ""),
        ];
        let (prepared, stats) = prepare_rows(&rows);
        assert_eq!(prepared.iter().map(|r| r.label).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(stats.dropped_rows, 2);
    }

    #[test]
    fn test_missing_category_drops_row() {
        let mut r = record("1000", "0", "100", "0", "Y");
        r.gender = None;
        let (prepared, _) = prepare_rows(&[r, record("1000", "0", "100", "0", "N")]);
        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].label, 0);
    }

    #[test]
    fn test_all_missing_column_drops_everything() {
        let rows = vec![record("", "0", "100", "0", "Y"), record("", "0", "100", "0", "N")];
        let (prepared, _) = prepare_rows(&rows);
        assert!(prepared.is_empty());
    }

    #[test]
    fn test_applicant_missing_dependents_is_zero() {
        let mut a = ApplicantInput::example();
        a.dependents = None;
        assert_eq!(applicant_features(&a).0[5], 0.0);

        a.dependents = Some("3+".to_string());
        assert_eq!(applicant_features(&a).0[5], 3.0);

        a.dependents = Some("n/a".to_string());
        assert_eq!(applicant_features(&a).0[5], 0.0);
    }

    #[test]
    fn test_applicant_derived_features() {
        let (numeric, categorical) = applicant_features(&ApplicantInput::example());
        assert_eq!(numeric[6], 4500.0);
        assert!((numeric[7] - 100.0 / 4501.0).abs() < 1e-12);
        assert_eq!(categorical[4], "Urban");
    }
}
