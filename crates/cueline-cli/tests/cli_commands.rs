//! Integration tests for the `cueline` binary.
//!
//! Each test writes a screenplay into a temp dir and runs the binary
//! with `--config` pointing at a file inside that dir.

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const SCRIPT: &str = "\
INT. KITCHEN - DAY
JOHN
(smiling)
Hello there.
MARY
I'm fine thanks.
JOHN
Good.
";

fn write_script(dir: &Path) -> Result<std::path::PathBuf> {
    let path = dir.join("kitchen.txt");
    fs::write(&path, SCRIPT)?;
    Ok(path)
}

fn cueline(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cueline"));
    cmd.arg("--config")
        .arg(dir.join("cueline.yml"))
        .arg("--color")
        .arg("never")
        .current_dir(dir);
    cmd
}

fn rehearse(dir: &Path, input: &str) -> Result<Output> {
    let script = write_script(dir)?;
    let mut child = cueline(dir)
        .arg("rehearse")
        .arg(&script)
        .arg("--user")
        .arg("JOHN")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }
    Ok(child.wait_with_output()?)
}

#[test]
fn test_parse_json() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path())?;

    let output = cueline(temp_dir.path())
        .arg("parse")
        .arg(&script)
        .arg("--pages")
        .arg("10")
        .arg("--format")
        .arg("json")
        .output()?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(parsed["scene_count"], 1);
    assert_eq!(parsed["confidence"], "high");
    assert_eq!(parsed["total_dialogue_lines"], 3);
    assert_eq!(parsed["speaking_characters"], serde_json::json!(["JOHN", "MARY"]));
    assert_eq!(parsed["estimated_duration"]["min_minutes"], 8);
    assert_eq!(parsed["estimated_duration"]["max_minutes"], 12);
    assert_eq!(parsed["elements"][1]["parenthetical"], "smiling");
    assert_eq!(parsed["elements"][1]["line_id"], "scene_1_char_1");

    Ok(())
}

#[test]
fn test_parse_table() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path())?;

    let output = cueline(temp_dir.path()).arg("parse").arg(&script).output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Scenes:         1"));
    assert!(stdout.contains("Speaking:       JOHN, MARY"));
    assert!(stdout.contains("Lines:          JOHN 2, MARY 1"));
    assert!(stdout.contains("scene_1_heading"));
    assert!(stdout.contains("JOHN (smiling)"));

    Ok(())
}

#[test]
fn test_context_json() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path())?;

    let output = cueline(temp_dir.path())
        .arg("context")
        .arg(&script)
        .arg("--user")
        .arg("JOHN")
        .arg("--cursor")
        .arg("3")
        .arg("--format")
        .arg("json")
        .output()?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(snapshot["window"]["start"], 0);
    assert_eq!(snapshot["window"]["end"], 7);
    assert_eq!(snapshot["window"]["cursor"], 3);
    assert_eq!(snapshot["next_speaker"]["character"], "MARY");
    assert_eq!(snapshot["next_speaker"]["type"], "ai");

    Ok(())
}

#[test]
fn test_context_window_respects_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path())?;
    fs::write(
        temp_dir.path().join("cueline.yml"),
        "window:\n  lookback: 1\n  lookahead: 2\n",
    )?;

    let output = cueline(temp_dir.path())
        .arg("context")
        .arg(&script)
        .arg("--user")
        .arg("JOHN")
        .arg("--cursor")
        .arg("3")
        .arg("--format")
        .arg("json")
        .output()?;
    assert!(output.status.success());

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(snapshot["window"]["start"], 2);
    assert_eq!(snapshot["window"]["end"], 5);

    Ok(())
}

#[test]
fn test_context_rejects_unknown_user() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path())?;

    let output = cueline(temp_dir.path())
        .arg("context")
        .arg(&script)
        .arg("--user")
        .arg("BOB")
        .output()?;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Character 'BOB' has no dialogue"));

    Ok(())
}

#[test]
fn test_context_rejects_cursor_out_of_range() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path())?;

    let output = cueline(temp_dir.path())
        .arg("context")
        .arg(&script)
        .arg("--user")
        .arg("JOHN")
        .arg("--cursor")
        .arg("99")
        .output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("out of range"));

    Ok(())
}

#[test]
fn test_invalid_config_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let script = write_script(temp_dir.path())?;
    fs::write(
        temp_dir.path().join("cueline.yml"),
        "timing:\n  silence_threshold_ms: 0\n",
    )?;

    let output = cueline(temp_dir.path()).arg("parse").arg(&script).output()?;
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration validation failed"));
    assert!(stderr.contains("timing.silence_threshold_ms"));

    Ok(())
}

#[test]
fn test_rehearse_steps_and_completes() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = rehearse(temp_dir.path(), "n\nn\nq\n")?;
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("as JOHN (scene partner: MARY)"));
    assert!(stdout.contains("[1/7] INT. KITCHEN - DAY"));
    assert!(stdout.contains("[2/7] JOHN (smiling)"));
    assert!(stdout.contains("[3/7] JOHN: Hello there."));
    assert!(stdout.contains("Rehearsal complete"));
    assert!(stdout.contains("Stopped at element 3 of 7 (completed)"));

    Ok(())
}

#[test]
fn test_rehearse_pause_jump_and_silence() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = rehearse(temp_dir.path(), "g 3\np\ns 2000\np\ns 2000\nb\nq\n")?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[4/7] MARY"));
    assert!(stdout.contains("Paused."));
    assert!(stdout.contains("Still waiting."));
    assert!(stdout.contains("Resumed."));
    assert!(stdout.contains("[5/7] MARY: I'm fine thanks."));
    assert!(stdout.contains("Stopped at element 4 of 7 (completed)"));

    Ok(())
}

#[test]
fn test_rehearse_eof_leaves_session_open() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = rehearse(temp_dir.path(), "n\n")?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Rehearsal complete"));
    assert!(stdout.contains("Stopped at element 2 of 7 (active)"));

    Ok(())
}
