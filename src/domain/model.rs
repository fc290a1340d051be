use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One customer visit record as it appears in the per-mall input files.
///
/// Only `annual_income_k` and `spending_score` feed the clustering step;
/// every other field passes through to the export unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub gender: String,
    pub age: u32,
    pub annual_income_k: i64,
    pub spending_score: i64,
    pub expenses: BTreeMap<String, f64>,
    pub total_spent_annual: f64,
}

impl CustomerRecord {
    /// Parses one raw JSON object into a record, reporting which field is
    /// missing or non-numeric instead of an opaque serde message.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let customer_id = value
            .get("customer_id")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>")
            .to_string();

        let malformed = |field: &str| EtlError::MalformedRecord {
            customer_id: customer_id.clone(),
            field: field.to_string(),
        };

        let gender = value
            .get("gender")
            .and_then(|v| v.as_str())
            .ok_or_else(|| malformed("gender"))?
            .to_string();

        let age = value
            .get("age")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| malformed("age"))? as u32;

        let annual_income_k = value
            .get("annual_income_k")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| malformed("annual_income_k"))?;

        let spending_score = value
            .get("spending_score")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| malformed("spending_score"))?;

        let mut expenses = BTreeMap::new();
        if let Some(map) = value.get("expenses").and_then(|v| v.as_object()) {
            for (domain, amount) in map {
                let amount = amount.as_f64().ok_or_else(|| malformed("expenses"))?;
                expenses.insert(domain.clone(), amount);
            }
        }

        let total_spent_annual = value
            .get("total_spent_annual")
            .and_then(|v| v.as_f64())
            .unwrap_or_else(|| expenses.values().sum());

        Ok(Self {
            customer_id,
            gender,
            age,
            annual_income_k,
            spending_score,
            expenses,
            total_spent_annual,
        })
    }

    /// The 2-D feature vector used for segmentation.
    pub fn features(&self) -> [f64; 2] {
        [self.annual_income_k as f64, self.spending_score as f64]
    }
}

/// A customer record augmented with its cluster assignment.
///
/// `cluster_id` is the raw index from the clustering run and is not stable
/// across runs; `cluster_label` carries the stable semantic meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledCustomer {
    #[serde(flatten)]
    pub record: CustomerRecord,
    pub cluster_id: usize,
    pub cluster_label: String,
}

/// Aggregate analytics for one (mall, year) group, shaped for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub total_visitors: usize,
    pub avg_income: f64,
    pub avg_score: f64,
    pub gender_ratio: BTreeMap<String, usize>,
    pub domain_totals: BTreeMap<String, f64>,
    pub cluster_distribution: BTreeMap<String, usize>,
}

/// Segmentation output for one (mall, year) group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResult {
    pub stats: GroupStats,
    pub customers: Vec<LabeledCustomer>,
}

/// The consolidated output artifact: mall name -> year -> group result.
/// This is the sole contract with the dashboard consumer.
pub type ExportDocument = BTreeMap<String, BTreeMap<String, GroupResult>>;

/// One mall's raw input: year (as string) -> raw customer objects.
#[derive(Debug, Clone)]
pub struct MallDocument {
    pub mall: String,
    pub years: BTreeMap<String, Vec<serde_json::Value>>,
}

/// A group whose segmentation failed; reported, never silently dropped.
#[derive(Debug, Clone)]
pub struct GroupFailure {
    pub mall: String,
    pub year: String,
    pub error: String,
}

/// Result of the transform stage: successful groups plus per-group failures.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub export: ExportDocument,
    pub failures: Vec<GroupFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_parses_full_record() {
        let raw = json!({
            "customer_id": "MET-2021-0001",
            "gender": "Female",
            "age": 34,
            "annual_income_k": 62,
            "spending_score": 48,
            "expenses": {"Tech": 1200.50, "Grocery": 800.0},
            "total_spent_annual": 2000.50
        });

        let record = CustomerRecord::from_value(&raw).unwrap();
        assert_eq!(record.customer_id, "MET-2021-0001");
        assert_eq!(record.annual_income_k, 62);
        assert_eq!(record.spending_score, 48);
        assert_eq!(record.features(), [62.0, 48.0]);
        assert_eq!(record.expenses.len(), 2);
    }

    #[test]
    fn test_from_value_missing_income_is_malformed() {
        let raw = json!({
            "customer_id": "MET-2021-0002",
            "gender": "Male",
            "age": 40,
            "spending_score": 50,
            "expenses": {},
            "total_spent_annual": 0.0
        });

        let err = CustomerRecord::from_value(&raw).unwrap_err();
        match err {
            EtlError::MalformedRecord { customer_id, field } => {
                assert_eq!(customer_id, "MET-2021-0002");
                assert_eq!(field, "annual_income_k");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_value_non_numeric_score_is_malformed() {
        let raw = json!({
            "customer_id": "MET-2021-0003",
            "gender": "Male",
            "age": 40,
            "annual_income_k": 55,
            "spending_score": "high",
            "expenses": {},
            "total_spent_annual": 0.0
        });

        let err = CustomerRecord::from_value(&raw).unwrap_err();
        match err {
            EtlError::MalformedRecord { field, .. } => assert_eq!(field, "spending_score"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_labeled_customer_serializes_flat() {
        let record = CustomerRecord::from_value(&json!({
            "customer_id": "GRA-2022-0007",
            "gender": "Male",
            "age": 28,
            "annual_income_k": 90,
            "spending_score": 20,
            "expenses": {"Tech": 500.0},
            "total_spent_annual": 500.0
        }))
        .unwrap();

        let labeled = LabeledCustomer {
            record,
            cluster_id: 3,
            cluster_label: "Frugal Elites".to_string(),
        };

        let value = serde_json::to_value(&labeled).unwrap();
        assert_eq!(value["customer_id"], "GRA-2022-0007");
        assert_eq!(value["cluster_id"], 3);
        assert_eq!(value["cluster_label"], "Frugal Elites");
    }
}
