#![cfg(unix)]

mod common;

use diffstress::{Candidate, Compile, Recorder, Toolchain};
use std::fs;
use std::path::Path;
use std::process::Command;

/// A compiler that turns any source into a script printing whether it was
/// built with sanitizers.
fn fake_compiler(dir: &Path) -> anyhow::Result<Toolchain> {
    let cc = common::script(
        dir,
        "fake-cc",
        r#"args="$*"
while [ $# -gt 3 ]; do shift; done
out=$3
case "$args" in
    *-fsanitize*) kind=instrumented ;;
    *) kind=plain ;;
esac
printf '#!/bin/sh\ncat > /dev/null\necho %s\n' "$kind" > "$out"
chmod +x "$out""#,
    )?;
    Ok(Toolchain::new(cc)
        .arg("-O2")
        .instrumentation(["-fsanitize=address,undefined"]))
}

fn run(path: &Path) -> anyhow::Result<String> {
    let output = Command::new(path).output()?;
    Ok(String::from_utf8(output.stdout)?.trim_end().to_string())
}

#[test]
fn builds_both_variants() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("sol.cpp");
    fs::write(&source, "int main() {}")?;

    let candidate = fake_compiler(dir.path())?.build(
        &Candidate::new(&source),
        dir.path(),
        ".nosan",
    )?;

    assert_eq!(candidate.path(), dir.path().join("sol"));
    assert_eq!(candidate.fallback(), Some(dir.path().join("sol.nosan").as_path()));
    assert_eq!(run(candidate.path())?, "instrumented");
    assert_eq!(run(&dir.path().join("sol.nosan"))?, "plain");
    Ok(())
}

#[test]
fn marked_sources_only_get_a_plain_build() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("brute.cpp");
    fs::write(&source, "int main() {}")?;

    let arg = format!("{}@nosan", source.display());
    let candidate = fake_compiler(dir.path())?.build(&Candidate::parse(&arg), dir.path(), ".plain")?;

    assert!(candidate.skips_instrumentation());
    assert_eq!(candidate.path(), dir.path().join("brute.plain"));
    assert!(!dir.path().join("brute").exists());
    Ok(())
}

#[test]
fn sources_without_an_extension_are_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("sol");
    fs::write(&source, "int main() {}")?;

    let err = fake_compiler(dir.path())?
        .build(&Candidate::new(&source), dir.path(), ".nosan")
        .unwrap_err();
    assert!(err.is_config(), "{err}");
    assert_eq!(fs::read_to_string(&source)?, "int main() {}");
    assert!(!dir.path().join("sol.nosan").exists());
    Ok(())
}

#[test]
fn built_candidates_can_be_compared() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let toolchain = fake_compiler(dir.path())?;
    let mut candidates = Vec::new();
    for name in ["a.cpp", "b.cpp"] {
        let source = dir.path().join(name);
        fs::write(&source, "")?;
        candidates.push(toolchain.build(&Candidate::new(source), dir.path(), ".nosan")?);
    }

    let checked = common::suite(dir.path())?
        .iterations(Some(3))
        .run(
            &candidates,
            diffstress::InputSource::from_option("[1, 10]"),
            &mut Recorder::new(),
        )?;
    assert_eq!(checked, 3);
    Ok(())
}

#[test]
fn compiler_errors_carry_diagnostics() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let broken = common::script(dir.path(), "broken-cc", "echo 'sol.cpp:1: expected ;' >&2; exit 1")?;
    let source = dir.path().join("sol.cpp");
    fs::write(&source, "int main() {")?;

    let err = Toolchain::new(broken)
        .compile(&source, &dir.path().join("sol"), false)
        .unwrap_err();
    assert!(err.is_build());
    assert!(err.to_string().contains("expected ;"), "{err}");
    Ok(())
}

#[test]
fn missing_compiler_is_an_io_error() {
    let err = Toolchain::new("/no/such/compiler")
        .compile(Path::new("sol.cpp"), Path::new("sol"), true)
        .unwrap_err();
    assert!(matches!(err.kind(), diffstress::ErrorKind::Io { .. }));
}
