//! End-to-end batch tests over CSV extracts on disk

use booking_latency::infra::{Config, OutputFormat};
use booking_latency::services::BatchJob;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const AB_EXTRACT: &str = "\
booking_code,booking_received_at,booking_pushed_at,latency_interval,latency_in_seconds
X,2025-01-06 10:00:00.120000,2025-01-06 10:06:04.424215,0:06:04.304215,364.304215
FAST,2025-01-06 11:00:00,2025-01-06 11:01:00,0:01:00,60
BROKEN,2025-01-06 12:00:00,2025-01-06 12:00:30,garbage,
FALLBACK,2025-01-06 13:00:00,2025-01-06 13:02:00,,120
ONLY_AB,2025-01-06 14:00:00,2025-01-06 14:00:10,0:00:10,10
";

const BC_EXTRACT: &str = "\
extracted_code,invoice_created_at,latency_b_to_c_str
X,2025-01-07 12:25:05.538000,\"1 day, 2:19:01.113712\"
FAST,2025-01-06 11:01:13,0 years 0 mons 0 days 0 hours 0 mins 12.565 secs
BROKEN,2025-01-06 12:01:00,0:00:30
FALLBACK,2025-01-06 13:30:00,0:28:00
ONLY_BC,2025-01-06 15:00:00,0:00:05
";

fn write_extracts(dir: &TempDir, ab: &str, bc: &str) -> Config {
    let ab_path = dir.path().join("ab.csv");
    let bc_path = dir.path().join("bc.csv");
    fs::write(&ab_path, ab).unwrap();
    fs::write(&bc_path, bc).unwrap();

    Config::default()
        .with_ab_file(path_str(&ab_path))
        .with_bc_file(path_str(&bc_path))
        .with_output_file(path_str(&dir.path().join("out").join("report.csv")))
}

fn path_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

#[test]
fn test_batch_end_to_end_csv() {
    let dir = tempdir().unwrap();
    let config = write_extracts(&dir, AB_EXTRACT, BC_EXTRACT);
    let output_file = config.output_file().to_string();

    let outcome = BatchJob::new(config).run().unwrap();

    let codes: Vec<&str> = outcome.rows.iter().map(|r| r.booking_code.as_str()).collect();
    assert_eq!(codes, vec!["X", "FAST", "BROKEN", "FALLBACK"]);

    let content = fs::read_to_string(&output_file).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "booking_code,booking_received_at,booking_pushed_at,invoice_created_at,\
         latency_a_to_b,latency_b_to_c,total_latency,breach_percentage"
    );
    assert_eq!(
        lines[1],
        "X,2025-01-06 10:00:00,2025-01-06 10:06:04,2025-01-07 12:25:05,\
         0 days 00:06:04,1 days 02:19:01,1 days 02:25:05,90-100th percentile"
    );
    assert_eq!(
        lines[2],
        "FAST,2025-01-06 11:00:00,2025-01-06 11:01:00,2025-01-06 11:01:13,\
         0 days 00:01:00,0 days 00:00:13,0 days 00:01:13,Within Threshold"
    );
    assert_eq!(
        lines[3],
        "BROKEN,2025-01-06 12:00:00,2025-01-06 12:00:30,2025-01-06 12:01:00,\
         ,0 days 00:00:30,,Missing Data"
    );
    assert_eq!(
        lines[4],
        "FALLBACK,2025-01-06 13:00:00,2025-01-06 13:02:00,2025-01-06 13:30:00,\
         0 days 00:02:00,0 days 00:28:00,0 days 00:30:00,Within Threshold"
    );
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_batch_summary_counts() {
    let dir = tempdir().unwrap();
    let summary_path = dir.path().join("summary.json");
    let config =
        write_extracts(&dir, AB_EXTRACT, BC_EXTRACT).with_summary_file(path_str(&summary_path));

    let outcome = BatchJob::new(config).run().unwrap();
    let summary = &outcome.summary;

    assert_eq!(summary.joined, 4);
    assert_eq!(summary.a_to_b_only, 1);
    assert_eq!(summary.b_to_c_only, 1);
    assert_eq!(summary.missing_data, 1);
    assert_eq!(summary.breach_count, 1);
    assert_eq!(summary.precomputed_fallbacks, 1);

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(parsed["batch_id"], summary.batch_id);
    assert_eq!(parsed["joined"], 4);
    assert_eq!(parsed["threshold_secs"], 1800);
}

#[test]
fn test_batch_jsonl_output() {
    let dir = tempdir().unwrap();
    let output_path = dir.path().join("report.jsonl");
    let config = write_extracts(&dir, AB_EXTRACT, BC_EXTRACT)
        .with_output_file(path_str(&output_path))
        .with_output_format(OutputFormat::Jsonl);

    BatchJob::new(config).run().unwrap();

    let content = fs::read_to_string(&output_path).unwrap();
    let rows: Vec<serde_json::Value> =
        content.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["booking_code"], "X");
    assert_eq!(rows[0]["breach_percentage"], "90-100th percentile");
    assert_eq!(rows[2]["total_latency"], "");
    assert_eq!(rows[2]["breach_percentage"], "Missing Data");
}

#[test]
fn test_batch_threshold_override() {
    let dir = tempdir().unwrap();
    let config = write_extracts(&dir, AB_EXTRACT, BC_EXTRACT).with_threshold_secs(60);

    let outcome = BatchJob::new(config).run().unwrap();
    let labels: Vec<&str> =
        outcome.rows.iter().map(|r| r.breach_percentage.as_str()).collect();

    // Exceeding set: FAST 73s, FALLBACK 1800s, X ~95105s
    assert_eq!(
        labels,
        vec!["90-100th percentile", "<=50th percentile", "Missing Data", "60-70th percentile"]
    );
}

#[test]
fn test_report_reingests_rendered_durations() {
    let dir = tempdir().unwrap();
    let ab = "booking_code,latency_interval\nR,0 days 00:06:04\n";
    let bc = "booking_code,latency_b_to_c\nR,1 days 02:19:01\n";
    let config = write_extracts(&dir, ab, bc);

    let outcome = BatchJob::new(config).run().unwrap();
    assert_eq!(outcome.rows[0].latency_a_to_b, "0 days 00:06:04");
    assert_eq!(outcome.rows[0].latency_b_to_c, "1 days 02:19:01");
    assert_eq!(outcome.rows[0].total_latency, "1 days 02:25:05");
}

#[test]
fn test_no_shared_codes_is_fatal() {
    let dir = tempdir().unwrap();
    let ab = "booking_code,latency_interval\nA,0:01:00\n";
    let bc = "booking_code,latency_b_to_c\nB,0:01:00\n";
    let config = write_extracts(&dir, ab, bc);
    let output_file = config.output_file().to_string();

    let err = BatchJob::new(config).run().unwrap_err();
    assert!(format!("{err:#}").contains("share no booking codes"));
    assert!(!Path::new(&output_file).exists());
}

#[test]
fn test_empty_extracts_are_fatal() {
    let dir = tempdir().unwrap();
    let config = write_extracts(
        &dir,
        "booking_code,latency_interval\n",
        "booking_code,latency_b_to_c\n",
    );

    assert!(BatchJob::new(config).run().is_err());
}

#[test]
fn test_missing_extract_file_is_fatal() {
    let dir = tempdir().unwrap();
    let config = write_extracts(&dir, AB_EXTRACT, BC_EXTRACT)
        .with_bc_file(path_str(&dir.path().join("does_not_exist.csv")));

    let err = BatchJob::new(config).run().unwrap_err();
    assert!(format!("{err:#}").contains("b_to_c"));
}
