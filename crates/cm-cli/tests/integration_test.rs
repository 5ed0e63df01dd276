//! Integration tests driving `cam-core run` against temporary job files,
//! covering the scenarios spec.md section 8 names.

use std::io::Write;
use std::process::Command;

fn cam_core_bin() -> &'static str {
    env!("CARGO_BIN_EXE_cam-core")
}

fn write_job(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("job.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_pocket_job_emits_gcode_ending_in_m2() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(
        &dir,
        r#"
        [job]
        units = "millimeters"
        top_z = 0.0
        bot_z = -10.0
        safe_z = 10.0
        pass_depth = 3.0
        plunge_feed = 300.0
        cut_feed = 1200.0
        rapid_feed = 3000.0
        retract_feed = 500.0

        [[operation]]
        name = "pocket-1"
        kind = "pocket"
        geometry = [[[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]]]
        cutter_diameter = 3.0
        overlap = 0.4
        cut_depth = 6.0
        "#,
    );

    let out = Command::new(cam_core_bin())
        .args(["run", job.to_str().unwrap()])
        .output()
        .expect("failed to run cam-core");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("G21"));
    assert!(stdout.trim_end().ends_with("M2"));
    assert!(stdout.contains("G90"));
}

#[test]
fn test_return_to_00_emits_rapid_home_before_m2() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(
        &dir,
        r#"
        [job]
        units = "millimeters"
        top_z = 0.0
        bot_z = -5.0
        safe_z = 5.0
        pass_depth = 2.0
        plunge_feed = 200.0
        cut_feed = 1000.0
        rapid_feed = 3000.0
        retract_feed = 500.0
        return_to_00 = true

        [[operation]]
        name = "drill-1"
        kind = "drill"
        geometry = [[[5.0, 5.0], [7.0, 5.0], [7.0, 7.0], [5.0, 7.0]]]
        cutter_diameter = 3.0
        cut_depth = 5.0
        "#,
    );

    let out = Command::new(cam_core_bin())
        .args(["run", job.to_str().unwrap()])
        .output()
        .expect("failed to run cam-core");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    let m2_idx = lines.iter().rposition(|l| *l == "M2").expect("no M2 line");
    assert!(lines[m2_idx - 1].starts_with("G0 X0 Y0 F"));
}

#[test]
fn test_unsupported_vcarve_still_produces_preamble_and_postamble() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(
        &dir,
        r#"
        [job]
        units = "inches"
        top_z = 0.0
        bot_z = -0.5
        safe_z = 0.25
        pass_depth = 0.1
        plunge_feed = 20.0
        cut_feed = 60.0
        rapid_feed = 150.0
        retract_feed = 30.0

        [[operation]]
        name = "vcarve-1"
        kind = "v-carve"
        geometry = [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]
        cutter_diameter = 0.125
        cut_depth = 0.2
        "#,
    );

    let out = Command::new(cam_core_bin())
        .args(["run", job.to_str().unwrap()])
        .output()
        .expect("failed to run cam-core");
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("G20"));
    assert!(stdout.trim_end().ends_with("M2"));
}

#[test]
fn test_output_file_flag_writes_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let job = write_job(
        &dir,
        r#"
        [job]
        units = "millimeters"
        top_z = 0.0
        bot_z = -5.0
        safe_z = 5.0
        pass_depth = 2.0
        plunge_feed = 200.0
        cut_feed = 1000.0
        rapid_feed = 3000.0
        retract_feed = 500.0
        "#,
    );
    let out_path = dir.path().join("out.nc");

    let out = Command::new(cam_core_bin())
        .args(["run", job.to_str().unwrap(), "--output", out_path.to_str().unwrap()])
        .output()
        .expect("failed to run cam-core");
    assert!(out.status.success());
    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert!(contents.trim_end().ends_with("M2"));
}
