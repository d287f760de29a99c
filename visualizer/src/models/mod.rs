//! Domain models for the medviz pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Field`] - A column of the examination table (input or derived)
//! - [`FieldKind`] - Semantic type of a column
//! - [`SCHEMA`] - Fixed, ordered input schema checked at load time
//! - [`Record`] - One subject as read from the CSV
//! - [`Subject`] - A record augmented with the derived `overweight` flag
//! - [`Table`] - The augmented table shared by both chart stages

use serde::{Deserialize, Serialize};

// =============================================================================
// Fields
// =============================================================================

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Subject identifier (integer).
    Identifier,
    /// Measured quantity (integer or float).
    Continuous,
    /// Ranked category code (1, 2, 3, ...).
    Ordinal,
    /// 0/1 flag.
    Binary,
}

impl FieldKind {
    /// Whether values of this kind are stored as integers.
    pub fn is_integral(&self) -> bool {
        !matches!(self, FieldKind::Continuous)
    }
}

/// A column of the examination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Age,
    Sex,
    Height,
    Weight,
    ApHi,
    ApLo,
    Cholesterol,
    Gluc,
    Smoke,
    Alco,
    Active,
    Cardio,
    /// Derived from height and weight, never read from the file.
    Overweight,
}

/// Input schema: ordered (field, semantic type) pairs.
pub const SCHEMA: [(Field, FieldKind); 13] = [
    (Field::Id, FieldKind::Identifier),
    (Field::Age, FieldKind::Continuous),
    (Field::Sex, FieldKind::Ordinal),
    (Field::Height, FieldKind::Continuous),
    (Field::Weight, FieldKind::Continuous),
    (Field::ApHi, FieldKind::Continuous),
    (Field::ApLo, FieldKind::Continuous),
    (Field::Cholesterol, FieldKind::Ordinal),
    (Field::Gluc, FieldKind::Ordinal),
    (Field::Smoke, FieldKind::Binary),
    (Field::Alco, FieldKind::Binary),
    (Field::Active, FieldKind::Binary),
    (Field::Cardio, FieldKind::Binary),
];

impl Field {
    /// Every numeric column of the augmented table, in display order.
    pub const NUMERIC: [Field; 14] = [
        Field::Id,
        Field::Age,
        Field::Sex,
        Field::Height,
        Field::Weight,
        Field::ApHi,
        Field::ApLo,
        Field::Cholesterol,
        Field::Gluc,
        Field::Smoke,
        Field::Alco,
        Field::Active,
        Field::Cardio,
        Field::Overweight,
    ];

    /// Column name as it appears in the CSV header.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Age => "age",
            Field::Sex => "sex",
            Field::Height => "height",
            Field::Weight => "weight",
            Field::ApHi => "ap_hi",
            Field::ApLo => "ap_lo",
            Field::Cholesterol => "cholesterol",
            Field::Gluc => "gluc",
            Field::Smoke => "smoke",
            Field::Alco => "alco",
            Field::Active => "active",
            Field::Cardio => "cardio",
            Field::Overweight => "overweight",
        }
    }

    /// Look up a column by name (exact, after trimming).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::NUMERIC.into_iter().find(|f| f.name() == name)
    }

    /// Semantic type of this column.
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Overweight => FieldKind::Binary,
            other => SCHEMA
                .iter()
                .find(|(f, _)| f == other)
                .map(|(_, k)| *k)
                .unwrap_or(FieldKind::Continuous),
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, Field::Overweight)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Record
// =============================================================================

/// One subject as read from the input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// 1-based line in the source file (header is line 1).
    #[serde(skip)]
    pub line: usize,
    pub id: i64,
    pub age: i64,
    pub sex: i64,
    pub height: f64,
    pub weight: f64,
    pub ap_hi: i64,
    pub ap_lo: i64,
    pub cholesterol: i64,
    pub gluc: i64,
    pub smoke: i64,
    pub alco: i64,
    pub active: i64,
    pub cardio: i64,
}

impl Record {
    /// Value of an input column. `None` for derived columns.
    pub fn get(&self, field: Field) -> Option<f64> {
        let v = match field {
            Field::Id => self.id as f64,
            Field::Age => self.age as f64,
            Field::Sex => self.sex as f64,
            Field::Height => self.height,
            Field::Weight => self.weight,
            Field::ApHi => self.ap_hi as f64,
            Field::ApLo => self.ap_lo as f64,
            Field::Cholesterol => self.cholesterol as f64,
            Field::Gluc => self.gluc as f64,
            Field::Smoke => self.smoke as f64,
            Field::Alco => self.alco as f64,
            Field::Active => self.active as f64,
            Field::Cardio => self.cardio as f64,
            Field::Overweight => return None,
        };
        Some(v)
    }

    /// Store a parsed cell. Integral kinds are truncated.
    pub(crate) fn set(&mut self, field: Field, value: f64) {
        let int = value as i64;
        match field {
            Field::Id => self.id = int,
            Field::Age => self.age = int,
            Field::Sex => self.sex = int,
            Field::Height => self.height = value,
            Field::Weight => self.weight = value,
            Field::ApHi => self.ap_hi = int,
            Field::ApLo => self.ap_lo = int,
            Field::Cholesterol => self.cholesterol = int,
            Field::Gluc => self.gluc = int,
            Field::Smoke => self.smoke = int,
            Field::Alco => self.alco = int,
            Field::Active => self.active = int,
            Field::Cardio => self.cardio = int,
            Field::Overweight => {}
        }
    }

    pub(crate) fn empty(line: usize) -> Self {
        Self {
            line,
            id: 0,
            age: 0,
            sex: 0,
            height: 0.0,
            weight: 0.0,
            ap_hi: 0,
            ap_lo: 0,
            cholesterol: 0,
            gluc: 0,
            smoke: 0,
            alco: 0,
            active: 0,
            cardio: 0,
        }
    }
}

// =============================================================================
// Subject (augmented record)
// =============================================================================

/// A record plus the flag derived from it at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    #[serde(flatten)]
    pub record: Record,
    pub overweight: bool,
}

impl Subject {
    /// Numeric value of any column; the derived flag reads as 0.0/1.0.
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Overweight => {
                if self.overweight {
                    1.0
                } else {
                    0.0
                }
            }
            other => self.record.get(other).unwrap_or(f64::NAN),
        }
    }

    /// Integer value of a categorical column.
    pub fn code(&self, field: Field) -> i64 {
        self.get(field) as i64
    }
}

// =============================================================================
// Table
// =============================================================================

/// The augmented table. Built once by the normalizer, then only read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub subjects: Vec<Subject>,
}

impl Table {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// All values of one column, in row order.
    pub fn column(&self, field: Field) -> Vec<f64> {
        self.subjects.iter().map(|s| s.get(field)).collect()
    }

    /// Keep the subjects matching `keep`.
    pub fn filter<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Subject) -> bool,
    {
        Table::new(self.subjects.iter().filter(|s| keep(s)).cloned().collect())
    }

    /// Share of subjects flagged overweight, in [0, 1].
    pub fn overweight_share(&self) -> f64 {
        if self.subjects.is_empty() {
            return 0.0;
        }
        let n = self.subjects.iter().filter(|s| s.overweight).count();
        n as f64 / self.subjects.len() as f64
    }
}

// =============================================================================
// Tests
// =============================================================================
