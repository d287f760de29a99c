use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const HEADER: &str = "id,age,sex,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active,cardio";

fn write_sample(dir: &Path) -> std::path::PathBuf {
    let mut content = HEADER.to_string();
    for i in 0..50usize {
        content.push_str(&format!(
            "\n{},{},{},{},{:.1},{},{},{},{},{},{},{},{}",
            i,
            16000 + (i * 41) % 7000,
            1 + i % 2,
            150 + (i * 9) % 38,
            52.0 + ((i * 13) % 45) as f64,
            112 + (i * 5) % 30,
            70 + (i * 7) % 20,
            1 + i % 3,
            1 + (i / 3) % 3,
            (i % 4 == 1) as u8,
            (i % 9 == 0) as u8,
            (i % 3 != 2) as u8,
            (i % 5 < 2) as u8,
        ));
    }
    let path = dir.join("sample.csv");
    fs::write(&path, content).unwrap();
    path
}

fn medviz(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_medviz"))
        .args(args)
        .current_dir(dir)
        .env_remove("MEDVIZ_DATA")
        .env_remove("MEDVIZ_OUT_DIR")
        .output()
        .unwrap()
}

#[test]
fn counts_stdout_is_pure_json() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(dir.path());

    let out = medviz(dir.path(), &["counts", "--input", input.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    let records = json.as_array().unwrap();
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.get("total").is_some()));

    // Progress went to stderr
    assert!(String::from_utf8_lossy(&out.stderr).contains("Read 50 rows"));
}

#[test]
fn corr_stdout_is_pure_json() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(dir.path());

    let out = medviz(dir.path(), &["corr", "--input", input.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 14 * 13 / 2);
}

#[test]
fn failure_reported_on_stderr_with_status_1() {
    let dir = TempDir::new().unwrap();

    let out = medviz(dir.path(), &["counts", "--input", "missing.csv"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error:"));
}
