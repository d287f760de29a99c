//! Wide → long reshaping for the grouped bar chart.

use serde::Serialize;

use crate::error::{TransformError, TransformResult};
use crate::models::{Field, FieldKind, Table};

/// One (subject, feature) pair, carrying the subject's split value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LongRow {
    pub subject: i64,
    pub split: i64,
    pub feature: Field,
    pub value: i64,
}

/// Look up feature columns by name, keeping the given order.
pub fn resolve_features(names: &[String]) -> TransformResult<Vec<Field>> {
    names
        .iter()
        .map(|name| {
            Field::from_name(name).ok_or_else(|| TransformError::MissingColumn(name.clone()))
        })
        .collect()
}

/// Look up the split column; it must be a 0/1 column.
pub fn resolve_split(name: &str) -> TransformResult<Field> {
    let field = Field::from_name(name).ok_or_else(|| TransformError::MissingColumn(name.to_string()))?;
    if field.kind() != FieldKind::Binary {
        return Err(TransformError::NotBinary(name.to_string()));
    }
    Ok(field)
}

/// One row per (subject, feature), subjects in table order, features in the
/// given order. Yields `table.len() * features.len()` rows.
pub fn melt(table: &Table, split: Field, features: &[Field]) -> Vec<LongRow> {
    let mut rows = Vec::with_capacity(table.len() * features.len());

    for subject in &table.subjects {
        let id = subject.record.id;
        let split_value = subject.code(split);
        for &feature in features {
            rows.push(LongRow {
                subject: id,
                split: split_value,
                feature,
                value: subject.code(feature),
            });
        }
    }

    rows
}
