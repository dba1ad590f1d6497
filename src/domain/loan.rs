// ============================================================
// Layer 3: Loan Domain Types
// ============================================================
// Types for the loan approval pipeline:
//
//   LoanRecord      one raw CSV row, every field still text
//   PreparedRow     a cleaned row: 8 numeric features, 5 categories, label
//   ApplicantInput  one applicant submitted for a single prediction
//   LoanDecision    the fitted pipeline's answer for that applicant
//
// The two derived features (total income and loan-to-income ratio)
// are computed by `derived_features` and nowhere else, so the batch
// path and the single-applicant path cannot drift apart.

use serde::{Deserialize, Serialize};

/// Numeric feature columns, in the order they appear in the feature matrix.
pub const NUMERIC_FEATURES: [&str; 8] = [
    "ApplicantIncome",
    "CoapplicantIncome",
    "LoanAmount",
    "Loan_Amount_Term",
    "Credit_History",
    "Dependents",
    "Total_Income",
    "Loan_to_Income_Ratio",
];

/// Categorical feature columns, one-hot encoded after the numeric block.
pub const CATEGORICAL_FEATURES: [&str; 5] = [
    "Gender",
    "Married",
    "Education",
    "Self_Employed",
    "Property_Area",
];

/// Columns the CSV must contain. `Loan_ID` is optional and ignored.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Gender",
    "Married",
    "Dependents",
    "Education",
    "Self_Employed",
    "ApplicantIncome",
    "CoapplicantIncome",
    "LoanAmount",
    "Loan_Amount_Term",
    "Credit_History",
    "Property_Area",
    "Loan_Status",
];

/// One row exactly as it was read from the CSV.
/// Empty cells are `None`; nothing has been parsed yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    #[serde(rename = "Loan_ID")]
    pub loan_id: Option<String>,
    #[serde(rename = "Gender")]
    pub gender: Option<String>,
    #[serde(rename = "Married")]
    pub married: Option<String>,
    #[serde(rename = "Dependents")]
    pub dependents: Option<String>,
    #[serde(rename = "Education")]
    pub education: Option<String>,
    #[serde(rename = "Self_Employed")]
    pub self_employed: Option<String>,
    #[serde(rename = "ApplicantIncome")]
    pub applicant_income: Option<String>,
    #[serde(rename = "CoapplicantIncome")]
    pub coapplicant_income: Option<String>,
    #[serde(rename = "LoanAmount")]
    pub loan_amount: Option<String>,
    #[serde(rename = "Loan_Amount_Term")]
    pub loan_amount_term: Option<String>,
    #[serde(rename = "Credit_History")]
    pub credit_history: Option<String>,
    #[serde(rename = "Property_Area")]
    pub property_area: Option<String>,
    #[serde(rename = "Loan_Status")]
    pub loan_status: Option<String>,
}

/// A fully cleaned training row with no missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    /// Values for NUMERIC_FEATURES, same order.
    pub numeric: [f64; 8],
    /// Values for CATEGORICAL_FEATURES, same order.
    pub categorical: [String; 5],
    /// 1 = approved ("Y"), 0 = rejected ("N").
    pub label: u8,
}

/// A single applicant to score with an already fitted pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantInput {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Married")]
    pub married: String,
    /// Textual, as in the CSV: "0", "1", "2", "3+" or absent.
    #[serde(rename = "Dependents", default)]
    pub dependents: Option<String>,
    #[serde(rename = "Education")]
    pub education: String,
    #[serde(rename = "Self_Employed")]
    pub self_employed: String,
    #[serde(rename = "ApplicantIncome")]
    pub applicant_income: f64,
    #[serde(rename = "CoapplicantIncome")]
    pub coapplicant_income: f64,
    #[serde(rename = "LoanAmount")]
    pub loan_amount: f64,
    #[serde(rename = "Loan_Amount_Term")]
    pub loan_amount_term: f64,
    #[serde(rename = "Credit_History")]
    pub credit_history: f64,
    #[serde(rename = "Property_Area")]
    pub property_area: String,
}

impl ApplicantInput {
    /// The applicant used by the `loan` command's closing demo.
    pub fn example() -> Self {
        Self {
            gender:             "Male".to_string(),
            married:            "Yes".to_string(),
            dependents:         Some("0".to_string()),
            education:          "Graduate".to_string(),
            self_employed:      "No".to_string(),
            applicant_income:   3000.0,
            coapplicant_income: 1500.0,
            loan_amount:        100.0,
            loan_amount_term:   10.0,
            credit_history:     1.0,
            property_area:      "Urban".to_string(),
        }
    }
}

/// Outcome of scoring one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanDecision {
    pub approved:    bool,
    /// Probability of the positive (approved) class, in [0, 1].
    pub probability: f64,
}

/// Total income and loan-to-income ratio.
///
///   Total_Income         = ApplicantIncome + CoapplicantIncome
///   Loan_to_Income_Ratio = LoanAmount / (Total_Income + 1)
pub fn derived_features(
    applicant_income:   f64,
    coapplicant_income: f64,
    loan_amount:        f64,
) -> (f64, f64) {
    let total_income = applicant_income + coapplicant_income;
    let ratio        = loan_amount / (total_income + 1.0);
    (total_income, ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_features_formula() {
        let (total, ratio) = derived_features(3000.0, 1500.0, 100.0);
        assert_eq!(total, 4500.0);
        assert!((ratio - 100.0 / 4501.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_income_does_not_divide_by_zero() {
        let (total, ratio) = derived_features(0.0, 0.0, 120.0);
        assert_eq!(total, 0.0);
        assert_eq!(ratio, 120.0);
    }

    #[test]
    fn test_applicant_deserialises_from_csv_field_names() {
        let json = r#"{
            "Gender": "Male", "Married": "Yes", "Dependents": "0",
            "Education": "Graduate", "Self_Employed": "No",
            "ApplicantIncome": 3000, "CoapplicantIncome": 1500,
            "LoanAmount": 100, "Loan_Amount_Term": 10,
            "Credit_History": 1, "Property_Area": "Urban"
        }"#;
        let applicant: ApplicantInput = serde_json::from_str(json).unwrap();
        assert_eq!(applicant, ApplicantInput::example());
    }
}
