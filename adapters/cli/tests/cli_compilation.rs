use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "nova-siege"])
        .status()
        .expect("failed to invoke cargo check for nova-siege CLI binary");

    assert!(status.success(), "cargo check --bin nova-siege should succeed");
}

#[test]
fn headless_run_prints_a_summary() {
    let output = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "run",
            "--quiet",
            "--bin",
            "nova-siege",
            "--",
            "--frames",
            "600",
            "--seed",
            "4",
        ])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run the nova-siege CLI binary");

    assert!(output.status.success(), "nova-siege exited with failure");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("frames simulated:"), "{stdout}");
    assert!(stdout.contains("level reached: 1"), "{stdout}");
}
