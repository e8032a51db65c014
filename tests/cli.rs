use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn lyra(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("lyra.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    Command::new(env!("CARGO_BIN_EXE_lyra"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

#[test]
fn build_with_empty_rough_idea_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = lyra(dir.path(), &["build", "--rough", "   "]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());
    assert!(!dir.path().join("history.csv").exists());
}

#[test]
fn build_prints_document_and_logs_it() {
    let dir = tempfile::tempdir().unwrap();
    let output = lyra(dir.path(), &["build", "--rough", "Write me a sales email"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("You are Lyra, optimizing a user request for ChatGPT.\n"));
    assert!(stdout.ends_with("if the first output isn't perfect.\n"));
    assert!(dir.path().join("history.csv").exists());
}

#[test]
fn templates_listing_names_configured_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("lyra.toml"), "templates = \"starter.csv\"\n").unwrap();

    let output = lyra(dir.path(), &["templates"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("You can add"), "{stdout}");
    assert!(stdout.contains("starter.csv later."), "{stdout}");
}
