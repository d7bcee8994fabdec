use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::PCT_DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};

use super::snapshot_model::{Snapshot, SnapshotKind};

/// Pairing of two snapshots of the same series. Both must belong to the
/// same parent entity (same portfolio, same cash-flow stream, same currency
/// for dividend snapshots); anything else is rejected at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotComparison {
    pub kind: SnapshotKind,
    pub entity_id: String,
    pub base_snapshot_id: String,
    pub compare_snapshot_id: String,
    pub base_date: NaiveDate,
    pub compare_date: NaiveDate,
    pub value_delta: Decimal,
    pub value_delta_pct: Decimal,
    pub gain_loss_delta: Decimal,
}

impl SnapshotComparison {
    pub fn new(base: &Snapshot, compare: &Snapshot) -> Result<Self> {
        if base.kind != compare.kind {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Cannot compare a {} snapshot against a {} snapshot",
                base.kind.as_str(),
                compare.kind.as_str()
            ))));
        }
        if base.entity_id != compare.entity_id {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Snapshots belong to different parents ({} vs {})",
                base.entity_id, compare.entity_id
            ))));
        }

        let value_delta = compare.total_value - base.total_value;
        let value_delta_pct = if base.total_value != Decimal::ZERO {
            (value_delta / base.total_value).round_dp(PCT_DECIMAL_PRECISION)
        } else {
            Decimal::ZERO
        };

        Ok(SnapshotComparison {
            kind: base.kind,
            entity_id: base.entity_id.clone(),
            base_snapshot_id: base.id.clone(),
            compare_snapshot_id: compare.id.clone(),
            base_date: base.snapshot_date,
            compare_date: compare.snapshot_date,
            value_delta,
            value_delta_pct,
            gain_loss_delta: compare.total_gain_loss - base.total_gain_loss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(kind: SnapshotKind, entity_id: &str, value: Decimal) -> Snapshot {
        let mut snapshot = Snapshot::new(
            kind,
            entity_id,
            "2024-03-31".parse().unwrap(),
            "test".to_string(),
            "test#abc123".to_string(),
            "TRY",
        );
        snapshot.total_value = value;
        snapshot
    }

    #[test]
    fn rejects_mismatched_parents() {
        let base = snapshot(SnapshotKind::Portfolio, "p1", dec!(100));
        let other = snapshot(SnapshotKind::Portfolio, "p2", dec!(120));
        assert!(SnapshotComparison::new(&base, &other).is_err());
    }

    #[test]
    fn rejects_mismatched_kinds() {
        let base = snapshot(SnapshotKind::Portfolio, "p1", dec!(100));
        let other = snapshot(SnapshotKind::CashFlow, "p1", dec!(120));
        assert!(SnapshotComparison::new(&base, &other).is_err());
    }

    #[test]
    fn computes_deltas_for_matching_snapshots() {
        let base = snapshot(SnapshotKind::Dividend, "TRY", dec!(1000));
        let compare = snapshot(SnapshotKind::Dividend, "TRY", dec!(1250));

        let comparison = SnapshotComparison::new(&base, &compare).unwrap();
        assert_eq!(comparison.value_delta, dec!(250));
        assert_eq!(comparison.value_delta_pct, dec!(0.25));
    }
}
