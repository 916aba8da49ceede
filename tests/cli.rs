use std::fs;
use std::process::Command;

use tempfile::tempdir;

fn write_trial_csv(path: &std::path::Path) {
    let mut text = String::from("art,male,dead\n");
    for i in 0..60 {
        let art = i % 2;
        let male = (i / 2) % 2;
        let observed = if art == 0 { i % 5 != 0 } else { i % 3 == 0 };
        let dead = if observed {
            ((i / 4) % 2).to_string()
        } else {
            String::new()
        };
        text.push_str(&format!("{art},{male},{dead}\n"));
    }
    fs::write(path, text).expect("write trial data");
}

fn read_weights(path: &std::path::Path) -> Vec<(usize, u8, f64)> {
    let text = fs::read_to_string(path).expect("read weights");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("record\tobserved\tweight"));
    lines
        .map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            assert_eq!(fields.len(), 3, "malformed line '{line}'");
            (
                fields[0].parse().expect("record"),
                fields[1].parse().expect("observed"),
                fields[2].parse().expect("weight"),
            )
        })
        .collect()
}

#[test]
fn fit_subcommand_writes_one_weight_per_record() {
    let tmp = tempdir().expect("temporary directory");
    let data_path = tmp.path().join("trial.csv");
    write_trial_csv(&data_path);

    let exe = env!("CARGO_BIN_EXE_ipmw");
    let status = Command::new(exe)
        .current_dir(tmp.path())
        .args([
            "fit",
            data_path.to_str().expect("path str"),
            "--separator",
            ",",
            "--missing",
            "dead",
            "--denominator",
            "art",
            "--denominator",
            "male",
            "--stabilized",
            "--outcome",
            "dead",
            "--models-output",
            "models.toml",
            "--quiet",
        ])
        .status()
        .expect("run ipmw cli");

    assert!(status.success(), "CLI exited with status {status:?}");
    assert!(tmp.path().join("models.toml").exists(), "models.toml missing");

    let rows = read_weights(&tmp.path().join("weights.tsv"));
    assert_eq!(rows.len(), 60);
    for (i, &(record, observed, weight)) in rows.iter().enumerate() {
        assert_eq!(record, i + 1);
        let art = i % 2;
        let expected_observed = if art == 0 { i % 5 != 0 } else { i % 3 == 0 };
        assert_eq!(observed == 1, expected_observed);
        assert!(weight.is_finite() && weight > 0.0);
    }
}

#[test]
fn run_subcommand_reads_toml_configuration() {
    let tmp = tempdir().expect("temporary directory");
    write_trial_csv(&tmp.path().join("trial.csv"));
    fs::write(
        tmp.path().join("run.toml"),
        r#"
data = "trial.csv"
separator = ","
missing_variable = "dead"
denominator = ["art"]
output = "out.tsv"
print_results = false
"#,
    )
    .expect("write config");

    let exe = env!("CARGO_BIN_EXE_ipmw");
    let status = Command::new(exe)
        .current_dir(tmp.path())
        .args(["run", "run.toml"])
        .status()
        .expect("run ipmw cli");
    assert!(status.success(), "CLI exited with status {status:?}");

    let rows = read_weights(&tmp.path().join("out.tsv"));
    assert_eq!(rows.len(), 60);
    // Unstabilized weights are the inverse observation rate of each `art` group.
    let art0_rate = (0..60).filter(|i| i % 2 == 0 && i % 5 != 0).count() as f64 / 30.0;
    let art1_rate = (0..60).filter(|i| i % 2 == 1 && i % 3 == 0).count() as f64 / 30.0;
    for (i, &(_, _, weight)) in rows.iter().enumerate() {
        let rate = if i % 2 == 0 { art0_rate } else { art1_rate };
        assert!((weight - 1.0 / rate).abs() < 1e-5, "record {i}: {weight}");
    }
}

#[test]
fn configuration_errors_exit_with_failure() {
    let tmp = tempdir().expect("temporary directory");
    let data_path = tmp.path().join("trial.csv");
    write_trial_csv(&data_path);

    let exe = env!("CARGO_BIN_EXE_ipmw");
    let output = Command::new(exe)
        .current_dir(tmp.path())
        .args([
            "fit",
            data_path.to_str().expect("path str"),
            "--separator",
            ",",
            "--missing",
            "art",
            "--denominator",
            "male",
        ])
        .output()
        .expect("run ipmw cli");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no missing values"), "stderr: {stderr}");
    assert!(!tmp.path().join("weights.tsv").exists());
}
