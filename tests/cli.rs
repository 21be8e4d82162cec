use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    let logs = dir.join("logs");
    fs::write(
        &path,
        format!(
            "[log]\nfolder = {:?}\n\n[log.file]\nname = \"cli\"\ncompress = false\n",
            logs.to_string_lossy()
        ),
    )
    .unwrap();
    path
}

fn run(config: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_applog"))
        .current_dir(config.parent().unwrap())
        .arg("--config")
        .arg(config)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).unwrap();
        }
    }

    child.wait_with_output().unwrap()
}

#[test]
fn test_message_goes_to_console_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run(&config, &["--level", "warn", "disk", "almost", "full"], None);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(" WARN  disk almost full file=main.rs line="));

    let file = fs::read_to_string(temp_dir.path().join("logs").join("cli.log")).unwrap();
    assert_eq!(file.lines().count(), 1);
    assert!(file.contains(" WARN  disk almost full file=main.rs line="));
}

#[test]
fn test_stdin_lines_are_logged() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run(&config, &[], Some("first\n\nsecond\n"));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(" INFO  first "));
    assert!(lines[1].contains(" INFO  second "));
}

#[test]
fn test_below_min_level_is_dropped() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "log.level = \"ERROR\"\nlog.file.enable = false\n",
    )
    .unwrap();

    let output = run(&config_path, &["--level", "info", "ignored"], None);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!temp_dir.path().join("application.log").exists());
}

#[test]
fn test_fatal_exits_with_status_one() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run(&config, &["--level", "fatal", "cannot", "continue"], None);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(" FATAL cannot continue "));

    let file = fs::read_to_string(temp_dir.path().join("logs").join("cli.log")).unwrap();
    assert!(file.contains(" FATAL cannot continue "));
}

#[test]
fn test_uncreatable_folder_is_fatal_at_startup() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "log.folder = {:?}\n",
            blocker.join("logs").to_string_lossy()
        ),
    )
    .unwrap();

    let output = run(&config_path, &["never", "written"], None);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error creating log folder"));
}

#[test]
fn test_unknown_cli_level_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run(&config, &["--level", "loud", "x"], None);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown log level"));
}
