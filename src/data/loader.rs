// ============================================================
// Layer 4: Loan CSV Loader
// ============================================================
// Reads the loan dataset from a CSV file using the csv crate.
//
// Every column is read as optional text. Nothing is parsed here:
// coercing "3+" or "abc" into numbers is the feature-engineering
// step's job, where the parse-or-null rule lives.
//
// Unlike a directory of documents, this is a single required
// input: a missing file or a missing column is an error, not an
// empty dataset.
//
// Reference: csv crate documentation (Reader, serde deserialisation)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{fs::File, io::Read, path::PathBuf};

use crate::domain::loan::{LoanRecord, REQUIRED_COLUMNS};
use crate::domain::traits::LoanRecordSource;

/// Loads loan rows from one CSV file.
/// Implements the LoanRecordSource trait from Layer 3.
pub struct CsvLoanLoader {
    path: PathBuf,
}

impl CsvLoanLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LoanRecordSource for CsvLoanLoader {
    fn load_all(&self) -> Result<Vec<LoanRecord>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open loan data '{}'", self.path.display()))?;

        let records = read_records(file)
            .with_context(|| format!("Cannot parse loan data '{}'", self.path.display()))?;

        tracing::info!(
            "Loaded {} loan rows from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// Parse CSV text from any reader. Split out so tests can feed strings.
pub fn read_records<R: Read>(input: R) -> Result<Vec<LoanRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input);

    // serde would quietly turn a missing Option column into None,
    // so the header is checked explicitly.
    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        bail!("Missing required column(s): {}", missing.join(", "));
    }

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<LoanRecord>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let record = row.with_context(|| format!("Bad CSV row at line {}", i + 2))?;
        records.push(normalise_empty(record));
    }
    Ok(records)
}

/// csv yields Some("") for an empty cell; treat it as missing.
fn normalise_empty(mut r: LoanRecord) -> LoanRecord {
    for field in [
        &mut r.loan_id,
        &mut r.gender,
        &mut r.married,
        &mut r.dependents,
        &mut r.education,
        &mut r.self_employed,
        &mut r.applicant_income,
        &mut r.coapplicant_income,
        &mut r.loan_amount,
        &mut r.loan_amount_term,
        &mut r.credit_history,
        &mut r.property_area,
        &mut r.loan_status,
    ] {
        if field.as_deref().is_some_and(str::is_empty) {
            *field = None;
        }
    }
    r
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Loan_ID,Gender,Married,Dependents,Education,Self_Employed,\
ApplicantIncome,CoapplicantIncome,LoanAmount,Loan_Amount_Term,Credit_History,\
Property_Area,Loan_Status";

    #[test]
    fn test_reads_rows_and_empty_cells() {
        let csv = format!(
            "{HEADER}\n\
             LP001,Male,No,0,Graduate,No,5849,0,,360,1,Urban,Y\n\
             LP002,Female,Yes,3+,Not Graduate,,4583,1508,128,360,,Rural,N\n"
        );
        let rows = read_records(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].loan_amount, None);
        assert_eq!(rows[0].applicant_income.as_deref(), Some("5849"));
        assert_eq!(rows[1].dependents.as_deref(), Some("3+"));
        assert_eq!(rows[1].self_employed, None);
        assert_eq!(rows[1].credit_history, None);
        assert_eq!(rows[1].education.as_deref(), Some("Not Graduate"));
    }

    #[test]
    fn test_loan_id_column_is_optional() {
        let header = HEADER.trim_start_matches("Loan_ID,");
        let csv = format!("{header}\nMale,No,0,Graduate,No,5849,0,100,360,1,Urban,Y\n");
        let rows = read_records(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].loan_id, None);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = "Gender,Married\nMale,No\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Loan_Status"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let loader = CsvLoanLoader::new("definitely/not/here.csv");
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_loads_from_disk() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("loan_data.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "{HEADER}").unwrap();
        writeln!(f, "LP001,Male,No,0,Graduate,No,5849,0,100,360,1,Urban,Y").unwrap();

        let rows = CsvLoanLoader::new(&path).load_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].loan_status.as_deref(), Some("Y"));
    }
}
