//! Command-line tests for the `ktp` binary.

use assert_cmd::Command;
use predicates::prelude::*;

const CARD_TEXT: &str = "PROVINSI JAWA BARAT
NIK : 3201O6150989OOO1
Nama : BUDI SANTOSO
Tempat/Tgl Lahir : BOGOR, 06-09-1989
Jenis Kelamin : LAKI-LAKI
RT/RW : 002/005
Kecamatan : CIBINONG";

fn ktp() -> Command {
    Command::cargo_bin("ktp").unwrap()
}

#[test]
fn test_extract_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("card.txt");
    std::fs::write(&input, CARD_TEXT).unwrap();

    ktp()
        .args(["extract", "--confidence", "90"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "BUDI SANTOSO""#))
        .stdout(predicate::str::contains(r#""id_number": "3201060609890001""#))
        .stdout(predicate::str::contains(r#""unit_code": "02""#));
}

#[test]
fn test_extract_from_stdin_as_text() {
    ktp()
        .args(["extract", "-f", "text", "-"])
        .write_stdin("Nama : SITI AMINAH\nRT 7")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nama: SITI AMINAH"))
        .stdout(predicate::str::contains("RT:   -"))
        .stdout(predicate::str::contains("Detected: Nama."));
}

#[test]
fn test_extract_with_config_unit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"extraction": {"valid_unit_codes": ["07"]}}"#).unwrap();

    ktp()
        .arg("--config")
        .arg(&config)
        .args(["extract", "-f", "csv", "-"])
        .write_stdin("RT 7")
        .assert()
        .success()
        .stdout(predicate::str::contains(",,07,0.0"));
}

#[test]
fn test_extract_missing_file() {
    ktp()
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read does-not-exist.txt"));
}

#[test]
fn test_scan_without_models_fails() {
    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("card.jpg");
    std::fs::write(&photo, b"not really a photo").unwrap();

    ktp()
        .arg("scan")
        .arg(&photo)
        .arg("--model-dir")
        .arg(dir.path().join("models"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("OCR models not found"));
}
