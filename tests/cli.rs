//! Drive the `diffstress` binary as a subprocess.

#![cfg(all(unix, feature = "cli"))]

mod common;

use std::path::Path;
use std::process::Command;

fn diffstress(dir: &Path, args: &[&str]) -> anyhow::Result<(i32, String, String)> {
    let time = common::fake_time(dir)?;
    let output = Command::new(env!("CARGO_BIN_EXE_diffstress"))
        .current_dir(dir)
        .arg("--time-program")
        .arg(time.program())
        .arg("--memory-limit")
        .arg("100000")
        .args(args)
        .env_remove("RUST_LOG")
        .output()?;
    Ok((
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    ))
}

#[test]
fn agreeing_solutions_exit_zero() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    common::echo(dir.path(), "one")?;
    common::echo(dir.path(), "two")?;

    let (code, _, stderr) = diffstress(
        dir.path(),
        &["--solutions", "one two", "--input", "[1, 9]; {a, b}", "--iterations", "5", "--seed", "3"],
    )?;
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("seed: 3"), "{stderr}");
    assert!(stderr.contains("diffstress] 5 inputs, all solutions agree"), "{stderr}");
    Ok(())
}

#[test]
fn log_level_silences_the_summary() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    common::echo(dir.path(), "one")?;

    let (code, _, stderr) = diffstress(
        dir.path(),
        &["--solutions", "one", "--input", "[1, 9]", "--iterations", "2", "--log", "warn"],
    )?;
    assert_eq!(code, 0, "{stderr}");
    assert!(!stderr.contains("all solutions agree"), "{stderr}");
    Ok(())
}

#[test]
fn divergence_exits_one_with_a_dump() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    common::echo(dir.path(), "echo")?;
    common::reverse(dir.path(), "reverse")?;
    std::fs::write(dir.path().join("inputs.txt"), "abc\n")?;

    let (code, _, stderr) = diffstress(
        dir.path(),
        &["--solutions", "echo reverse", "--input", "inputs.txt"],
    )?;
    assert_eq!(code, 1, "{stderr}");
    assert!(stderr.contains("solutions have different outputs"), "{stderr}");
    assert!(stderr.contains("cba"), "{stderr}");
    Ok(())
}

#[test]
fn bad_token_exits_two() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    common::echo(dir.path(), "one")?;

    let (code, _, stderr) = diffstress(
        dir.path(),
        &["--solutions", "one", "--input", "[1, x]", "--iterations", "1"],
    )?;
    assert_eq!(code, 2, "{stderr}");
    assert!(stderr.contains("error:"), "{stderr}");
    Ok(())
}

#[test]
fn fallbacks_are_found_by_suffix() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let slow = common::echo(dir.path(), "slow")?;
    common::echo(dir.path(), "slow.plain")?;
    common::measure_as(&slow, "0:04.00", 10)?;

    let (code, _, stderr) = diffstress(
        dir.path(),
        &[
            "--solutions",
            "slow",
            "--input",
            "[1, 2]",
            "--iterations",
            "1",
            "--fallback-suffix",
            ".plain",
        ],
    )?;
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("Timeout exceeded"), "{stderr}");
    assert!(stderr.contains("within limits without instrumentation"), "{stderr}");
    Ok(())
}
