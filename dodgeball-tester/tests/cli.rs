use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "dodgeball-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_dodgeball-tester");
    let output_path = temp_path("json");
    let status = Command::new(exe)
        .args([
            "--roster",
            "4",
            "--seeds",
            "1,2",
            "--iterations",
            "5",
            "--team2",
            "random",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(report["aggregate"]["games"], 10);
    assert_eq!(report["aggregate"]["failed"], 0);
}

#[test]
fn cli_prints_console_summary() {
    let exe = env!("CARGO_BIN_EXE_dodgeball-tester");
    let output = Command::new(exe)
        .args(["--roster", "3", "--iterations", "4", "--timeout", "50"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dodgeball Sweep Tester"));
    assert!(stdout.contains("Sweep Results Summary"));
}

#[test]
fn cli_writes_trajectory_csv() {
    let exe = env!("CARGO_BIN_EXE_dodgeball-tester");
    let report_path = temp_path("csv");
    let trajectory_path = temp_path("trajectory");
    let status = Command::new(exe)
        .args([
            "--roster",
            "5",
            "--profile",
            "linear",
            "--pe",
            "0.9",
            "--pj",
            "0.4",
            "--iterations",
            "2",
            "--report",
            "csv",
            "--output",
        ])
        .arg(&report_path)
        .arg("--trajectory")
        .arg(&trajectory_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let report = std::fs::read_to_string(report_path).expect("read report");
    assert_eq!(report.lines().count(), 3);
    let trajectory = std::fs::read_to_string(trajectory_path).expect("read trajectory");
    assert!(trajectory.starts_with("time,team1,team2\n0.000000,5,5"));
}

#[test]
fn cli_exits_with_failure_when_games_stall() {
    let exe = env!("CARGO_BIN_EXE_dodgeball-tester");
    let output_path = temp_path("stall");
    let output = Command::new(exe)
        .args([
            "--pe",
            "0",
            "--pj",
            "0",
            "--iterations",
            "2",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let content = std::fs::read_to_string(output_path).expect("report still written");
    assert!(content.contains("\"stalled\": 2"));
}

#[test]
fn cli_rejects_unknown_seed_token() {
    let exe = env!("CARGO_BIN_EXE_dodgeball-tester");
    let output = Command::new(exe)
        .args(["--seeds", "1,orange"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unrecognized seed token"));
}
