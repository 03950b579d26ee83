//! Integration tests: running the smalipatch binary and checking output and exit codes.

use std::{fs, process::Command};

use assert_cmd::prelude::*;
use tempfile::{TempDir, tempdir};

const TARGET: &str = "smali/com/example/Main.smali";

const MAIN: &str = "\
.class public Lcom/example/Main;
.super Ljava/lang/Object;

.method public static isEnabled()Z
    .registers 1
    const/4 v0, 0x0
    return v0
.end method
";

const ENABLE_PATCH: &str = "\
# force the feature on
FILE smali/com/example/Main.smali
PATCH .method public static isEnabled()Z
    .registers 1
-     const/4 v0, 0x0
+     const/4 v0, 0x1
    return v0
END
";

/// Work directory with the sample class plus the patch file next to it.
fn setup(patch: &str) -> (TempDir, TempDir) {
    let work = tempdir().unwrap();
    let full = work.path().join(TARGET);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(&full, MAIN).unwrap();

    let patches = tempdir().unwrap();
    fs::write(patches.path().join("fix.smalipatch"), patch).unwrap();
    (work, patches)
}

fn smalipatch(work: &TempDir, patches: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("smalipatch"));
    cmd.arg("--color")
        .arg("never")
        .arg(work.path())
        .arg(patches.path().join("fix.smalipatch"))
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_successful_patch_exits_zero() {
    let (work, patches) = setup(ENABLE_PATCH);

    let assert = smalipatch(&work, &patches).assert().success();

    let stdout = stdout_of(assert.get_output());
    assert!(stdout.contains(&format!("SUCCESS: Patched method in {TARGET}")));
    assert!(stdout.contains("Result: 1/1 block(s) applied successfully."));
    let updated = fs::read_to_string(work.path().join(TARGET)).unwrap();
    assert!(updated.contains("    const/4 v0, 0x1\n"));
    assert!(!updated.contains("0x0"));
}

#[test]
fn test_failed_block_exits_one_and_leaves_file() {
    let (work, patches) = setup(&ENABLE_PATCH.replace("return v0", "return-void"));

    let assert = smalipatch(&work, &patches).assert().code(1);

    let stdout = stdout_of(assert.get_output());
    assert!(stdout.contains("FAILED: context mismatch at line 7"));
    assert!(stdout.contains("(block 1)"));
    assert_eq!(fs::read_to_string(work.path().join(TARGET)).unwrap(), MAIN);
}

#[test]
fn test_malformed_patch_exits_two() {
    let (work, patches) = setup("FILE smali/com/example/Main.smali\nPATCH .method x()V\n+ nop\n");

    let assert = smalipatch(&work, &patches).assert().code(2);

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("fatal:"));
    assert!(stderr.contains("has no 'END' terminator"));
    assert_eq!(fs::read_to_string(work.path().join(TARGET)).unwrap(), MAIN);
}

#[test]
fn test_empty_patch_exits_two() {
    let (work, patches) = setup("# nothing to do\n");
    smalipatch(&work, &patches).assert().code(2);
}

#[test]
fn test_missing_work_dir_exits_two() {
    let (work, patches) = setup(ENABLE_PATCH);
    Command::new(assert_cmd::cargo::cargo_bin!("smalipatch"))
        .arg(work.path().join("does-not-exist"))
        .arg(patches.path().join("fix.smalipatch"))
        .assert()
        .code(2);
}

#[test]
fn test_dry_run_with_diff() {
    let (work, patches) = setup(ENABLE_PATCH);

    let assert = smalipatch(&work, &patches)
        .arg("--dry-run")
        .arg("--diff")
        .assert()
        .success();

    let stdout = stdout_of(assert.get_output());
    assert!(stdout.contains(&format!("--- a/{TARGET}\n+++ b/{TARGET}\n")));
    assert!(stdout.contains("-    const/4 v0, 0x0\n+    const/4 v0, 0x1\n"));
    assert!(stdout.contains("Dry run: no files were written."));
    assert_eq!(fs::read_to_string(work.path().join(TARGET)).unwrap(), MAIN);
}

#[test]
fn test_config_file_in_work_dir() {
    let (work, patches) = setup(ENABLE_PATCH);
    fs::write(work.path().join(".smalipatch.toml"), "dry_run = true\n").unwrap();

    smalipatch(&work, &patches).assert().success();
    assert_eq!(fs::read_to_string(work.path().join(TARGET)).unwrap(), MAIN);

    fs::write(work.path().join(".smalipatch.toml"), "dry_run = 3\n").unwrap();
    smalipatch(&work, &patches).assert().code(2);
}
