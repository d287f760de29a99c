//! Derive the `overweight` flag and collapse ordinal codes.
//!
//! Runs once, right after loading. The resulting [`Table`] is never mutated.

use crate::config::BmiRule;
use crate::error::{TransformError, TransformResult};
use crate::models::{Record, Subject, Table};

/// Collapse an ordinal health code: `1` (normal) → 0, anything above → 1.
pub fn categorize_ordinal(code: i64) -> i64 {
    if code > 1 {
        1
    } else {
        0
    }
}

/// Build the augmented table from loaded records.
///
/// Fails with [`TransformError::ZeroHeight`] on the first record whose height
/// is zero, since height is the BMI divisor.
pub fn normalize(
    records: &[Record],
    rule: &BmiRule,
    normalize_ordinals: bool,
) -> TransformResult<Table> {
    let mut subjects = Vec::with_capacity(records.len());

    for record in records {
        if record.height == 0.0 {
            return Err(TransformError::ZeroHeight {
                line: record.line,
                id: record.id,
            });
        }

        let overweight = rule.is_overweight(record.weight, record.height);

        let mut record = record.clone();
        if normalize_ordinals {
            record.cholesterol = categorize_ordinal(record.cholesterol);
            record.gluc = categorize_ordinal(record.gluc);
        }

        subjects.push(Subject { record, overweight });
    }

    Ok(Table::new(subjects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    fn record(id: i64, height: f64, weight: f64) -> Record {
        let mut r = Record::empty(id as usize + 2);
        r.id = id;
        r.height = height;
        r.weight = weight;
        r.cholesterol = 1;
        r.gluc = 1;
        r
    }

    #[test]
    fn test_hand_computed_bmi_classification() {
        // 170cm/60kg → BMI ≈ 20.8, 160cm/90kg → BMI ≈ 35.2
        let records = vec![
            record(0, 170.0, 60.0),
            record(1, 160.0, 90.0),
            record(2, 170.0, 60.0),
            record(3, 160.0, 90.0),
            record(4, 170.0, 60.0),
        ];
        let table = normalize(&records, &BmiRule::default(), true).unwrap();

        let flags: Vec<bool> = table.subjects.iter().map(|s| s.overweight).collect();
        assert_eq!(flags, vec![false, true, false, true, false]);
    }

    #[test]
    fn test_flag_is_deterministic() {
        let records = vec![record(0, 181.0, 82.5), record(0, 181.0, 82.5)];
        let table = normalize(&records, &BmiRule::default(), true).unwrap();
        assert_eq!(table.subjects[0].overweight, table.subjects[1].overweight);

        let again = normalize(&records, &BmiRule::default(), true).unwrap();
        assert_eq!(table, again);
    }

    #[test]
    fn test_zero_height_is_division_error() {
        let records = vec![record(0, 170.0, 60.0), record(9, 0.0, 60.0)];
        let err = normalize(&records, &BmiRule::default(), true).unwrap_err();

        match err {
            TransformError::ZeroHeight { line, id } => {
                assert_eq!(id, 9);
                assert_eq!(line, 11);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ordinals_collapsed() {
        let mut r = record(0, 170.0, 60.0);
        r.cholesterol = 3;
        r.gluc = 2;
        let mut normal = record(1, 170.0, 60.0);
        normal.cholesterol = 1;

        let table = normalize(&[r.clone(), normal], &BmiRule::default(), true).unwrap();
        assert_eq!(table.subjects[0].code(Field::Cholesterol), 1);
        assert_eq!(table.subjects[0].code(Field::Gluc), 1);
        assert_eq!(table.subjects[1].code(Field::Cholesterol), 0);

        let raw = normalize(&[r], &BmiRule::default(), false).unwrap();
        assert_eq!(raw.subjects[0].code(Field::Cholesterol), 3);
    }

    #[test]
    fn test_custom_cutoff() {
        let rule = BmiRule { cutoff: 20.0, ..BmiRule::default() };
        let table = normalize(&[record(0, 170.0, 60.0)], &rule, true).unwrap();
        assert!(table.subjects[0].overweight);
    }
}
