use std::fs;
use std::path::PathBuf;

use medviz::error::TransformError;
use medviz::{
    analyze, load, run, Chart, CorrelationMatrix, Field, PipelineError, PipelineOptions,
};
use tempfile::TempDir;

const HEADER: &str = "id,age,sex,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active,cardio";

fn write_csv(dir: &TempDir, name: &str, rows: &[String]) -> PathBuf {
    let mut content = HEADER.to_string();
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn options_for(input: PathBuf, out_dir: &TempDir) -> PipelineOptions {
    PipelineOptions {
        input,
        out_dir: out_dir.path().to_path_buf(),
        ..PipelineOptions::default()
    }
}

fn synthetic_rows(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            format!(
                "{},{},{},{},{:.1},{},{},{},{},{},{},{},{}",
                i,
                15000 + (i * 53) % 8000,
                1 + i % 2,
                152 + (i * 13) % 36,
                48.0 + ((i * 17) % 55) as f64,
                115 + (i * 7) % 35,
                72 + (i * 3) % 18,
                1 + (i * 2) % 3,
                1 + i % 3,
                (i % 4 == 0) as u8,
                (i % 6 == 0) as u8,
                (i % 5 != 0) as u8,
                (i % 7 < 3) as u8,
            )
        })
        .collect()
}

#[test]
fn overweight_flag_matches_hand_computed_bmi() {
    let dir = TempDir::new().unwrap();
    // 170 cm / 60 kg → BMI 20.8, 160 cm / 90 kg → BMI 35.2
    let rows = vec![
        "1,18000,1,170,60.0,120,80,1,1,0,0,1,0".to_string(),
        "2,18000,2,160,90.0,130,85,1,1,0,0,1,1".to_string(),
        "3,18000,1,170,60.0,110,70,2,1,1,0,0,0".to_string(),
        "4,18000,2,160,90.0,140,90,3,2,0,1,1,1".to_string(),
        "5,18000,1,170,60.0,120,80,1,3,0,0,1,1".to_string(),
    ];
    let input = write_csv(&dir, "five.csv", &rows);

    let (info, table) = load(&options_for(input, &dir)).unwrap();
    assert_eq!(info.row_count, 5);

    let flags: Vec<bool> = table.subjects.iter().map(|s| s.overweight).collect();
    assert_eq!(flags, vec![false, true, false, true, false]);
}

#[test]
fn counts_match_long_form_cardinality() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(&dir, "data.csv", &synthetic_rows(70));
    let options = options_for(input, &dir);

    let analysis = analyze(&options, &[Chart::CatPlot]).unwrap();
    let cat = analysis.categorical.unwrap();

    assert_eq!(cat.long_rows, 70 * options.features.len());
    let counted: usize = cat.counts.iter().map(|c| c.total).sum();
    assert_eq!(counted, cat.long_rows);

    for split in [0, 1] {
        let subjects = analysis.table.subjects.iter().filter(|s| s.record.cardio == split).count();
        let total: usize = cat.counts.iter().filter(|c| c.split == split).map(|c| c.total).sum();
        assert_eq!(total, subjects * options.features.len());
    }
}

#[test]
fn heat_map_keeps_strict_lower_triangle() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(&dir, "data.csv", &synthetic_rows(90));

    let analysis = analyze(&options_for(input, &dir), &[Chart::HeatMap]).unwrap();
    let corr = analysis.correlation.unwrap();

    assert!(corr.matrix.is_symmetric());
    let n = Field::NUMERIC.len();
    assert_eq!(corr.masked.retained_count(), n * (n - 1) / 2);
    for ((i, j), cell) in corr.masked.cells.indexed_iter() {
        assert_eq!(cell.is_some(), i > j);
    }
}

#[test]
fn perfectly_correlated_columns_shown_once() {
    let x: Vec<f64> = (0..10).map(|v| v as f64).collect();
    let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 2.0).collect();
    let z: Vec<f64> = x.iter().map(|v| 10.0 - v).collect();
    let m = CorrelationMatrix::compute(vec!["x".into(), "y".into(), "z".into()], &[x, y, z]);

    let cells = m.masked().lower_triangle();
    let xy: Vec<_> = cells.iter().filter(|c| c.column == "x" && c.row == "y").collect();
    assert_eq!(xy.len(), 1);
    assert_eq!(format!("{:.2}", xy[0].value), "1.00");
    assert!(!cells.iter().any(|c| c.row == "x" && c.column == "y"));

    let xz = cells.iter().find(|c| c.row == "z" && c.column == "x").unwrap();
    assert_eq!(format!("{:.2}", xz.value), "-1.00");
}

#[test]
fn semicolon_file_is_detected() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "{}\n1;18000;1;170;60.0;120;80;1;1;0;0;1;0\n2;18000;2;160;90.0;130;85;1;1;0;0;1;1",
        HEADER.replace(',', ";")
    );
    let input = dir.path().join("semi.csv");
    fs::write(&input, content).unwrap();

    let (info, table) = load(&options_for(input, &dir)).unwrap();
    assert_eq!(info.delimiter, ';');
    assert_eq!(table.len(), 2);
}

#[test]
fn missing_column_fails_before_rows() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("no_cardio.csv");
    fs::write(
        &input,
        "id,age,sex,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active\n1,1,1,x,1,1,1,1,1,1,1,1",
    )
    .unwrap();

    match load(&options_for(input, &dir)) {
        Err(PipelineError::Csv(e)) => {
            assert!(e.is_missing_column());
            assert_eq!(e.column.as_deref(), Some("cardio"));
        }
        other => panic!("expected missing column, got {:?}", other.map(|(info, _)| info)),
    }
}

#[test]
fn zero_height_is_a_division_error() {
    let dir = TempDir::new().unwrap();
    let rows = vec![
        "1,18000,1,170,60.0,120,80,1,1,0,0,1,0".to_string(),
        "2,18000,2,0,90.0,130,85,1,1,0,0,1,1".to_string(),
    ];
    let input = write_csv(&dir, "zero.csv", &rows);

    let err = load(&options_for(input, &dir)).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Transform(TransformError::ZeroHeight { line: 3, id: 2 })
    ));
}

#[test]
fn config_file_keeps_defaults_for_absent_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("medviz.json");
    fs::write(&path, r#"{ "features": ["smoke", "alco"], "verify": false }"#).unwrap();

    let options = PipelineOptions::from_file(&path).unwrap();
    assert_eq!(options.features, vec!["smoke", "alco"]);
    assert!(!options.verify);
    assert_eq!(options.split, "cardio");
    assert_eq!(options.render.heat_map.annotation_precision, 2);
}

#[test]
fn run_writes_both_images_and_verifies() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(&dir, "data.csv", &synthetic_rows(120));
    let mut options = options_for(input, &dir);
    options.out_dir = dir.path().join("charts");

    let report = run(&options).unwrap();

    assert_eq!(report.files.len(), 2);
    for file in &report.files {
        assert!(fs::metadata(file).unwrap().len() > 0);
    }
    assert!(report.verification.unwrap().is_success());
}
