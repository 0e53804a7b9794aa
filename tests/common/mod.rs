#![allow(dead_code)]

use diffstress::{Suite, TimeWrapper};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Write an executable shell script.
pub fn script(dir: &Path, name: &str, body: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Prints its input back.
pub fn echo(dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
    script(dir, name, "cat")
}

/// Prints every line of its input backwards.
pub fn reverse(dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
    script(
        dir,
        name,
        r#"awk '{ s = ""; for (i = length($0); i > 0; i--) s = s substr($0, i, 1); print s }'"#,
    )
}

/// A stand-in for GNU time. It runs the candidate and then reports the
/// contents of `<candidate>.measure`, or a small default measurement.
pub fn fake_time(dir: &Path) -> anyhow::Result<TimeWrapper> {
    let path = script(
        dir,
        "fake-time",
        r#"shift 2
"$@"
status=$?
if [ -f "$1.measure" ]; then
    cat "$1.measure" >&2
else
    printf 'time: 0:00.01\nmem: 100\n' >&2
fi
exit $status"#,
    )?;
    Ok(TimeWrapper::new(path))
}

/// Make the fake time wrapper report this measurement for `candidate`.
pub fn measure_as(candidate: &Path, time: &str, mem_kb: u64) -> anyhow::Result<()> {
    let mut sidecar = candidate.as_os_str().to_owned();
    sidecar.push(".measure");
    fs::write(sidecar, format!("time: {time}\nmem: {mem_kb}\n"))?;
    Ok(())
}

/// A suite with generous limits, measuring with the fake wrapper.
pub fn suite(dir: &Path) -> anyhow::Result<Suite> {
    let mut suite = Suite::new();
    suite
        .timeout(Duration::from_secs(1))
        .memory_limit_kb(1_000)
        .time_wrapper(fake_time(dir)?);
    Ok(suite)
}
