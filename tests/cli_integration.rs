//! CLI integration tests for mecab-build.
//!
//! External programs (mecab-config, the interpreter, the C++ compiler) are
//! replaced by shell scripts and wired in through the project config file.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the mecab-build binary command, isolated from the user's config.
fn mecab_build(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mecab-build").unwrap();
    cmd.env("HOME", home)
        .env_remove("MECAB_CONFIG")
        .env_remove("MECAB_BUILD_LOG")
        .env_remove("CXX")
        .env_remove("CC");
    cmd
}

/// A package checkout with the tagger source.
fn tagger_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("mecab_pybind")).unwrap();
    fs::write(
        tmp.path().join("mecab_pybind/tagger.cpp"),
        "#include <mecab.h>\n",
    )
    .unwrap();
    tmp
}

#[cfg(unix)]
fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Compiler accepting `-std=` flags matching `std_pattern` (a shell case pattern).
#[cfg(unix)]
fn compiler_script(std_pattern: &str) -> String {
    format!(
        r#"out=""
prev=""
for arg in "$@"; do
  case "$arg" in
    {std_pattern}) ;;
    -std=*) echo "error: invalid value in '$arg'" >&2; exit 1 ;;
  esac
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
if [ -n "$out" ]; then : > "$out"; fi
"#
    )
}

const MECAB_CONFIG: &str = r#"case "$1" in
  --inc-dir) echo "/usr/include/mecab " ;;
  --libs-only-L) echo "-L/usr/lib/mecab" ;;
esac
"#;

const PYTHON: &str = r#"echo "include=/usr/include/python3.12"
echo "platlib=/usr/lib/python3/site-packages"
echo "ext_suffix=.cpython-312.so"
echo "pybind11_version=2.11.1"
echo "pybind11_include=/opt/pybind11/include"
echo "pybind11_user_include=/home/user/.local/include"
"#;

/// Write stub tools and point the project config at them.
#[cfg(unix)]
fn configure(project: &Path, tools: &Path, config_tool: &str, std_pattern: &str) {
    let cxx = script(tools, "c++", &compiler_script(std_pattern));
    let python = script(tools, "python3", PYTHON);
    let config_tool = if config_tool == "mecab-config" {
        script(tools, "mecab-config", MECAB_CONFIG)
            .display()
            .to_string()
    } else {
        config_tool.to_string()
    };

    fs::create_dir_all(project.join(".mecab-build")).unwrap();
    fs::write(
        project.join(".mecab-build/config.toml"),
        format!(
            "[build]\nconfig-tool = \"{}\"\npython = \"{}\"\ncxx = \"{}\"\n",
            config_tool,
            python.display(),
            cxx.display()
        ),
    )
    .unwrap();
}

// ============================================================================
// mecab-build build
// ============================================================================

#[cfg(unix)]
#[test]
fn test_build_produces_extension_module() {
    let project = tagger_project();
    let tools = TempDir::new().unwrap();
    configure(project.path(), tools.path(), "mecab-config", "-std=c++1[14]");

    mecab_build(tools.path())
        .arg("build")
        .current_dir(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Compiling mecab_pybind v0.1"))
        .stderr(predicate::str::contains("Finished 1 module(s)"));

    assert!(project
        .path()
        .join("build/lib/mecab_pybind.cpython-312.so")
        .exists());
    assert!(project
        .path()
        .join("build/temp/mecab_pybind/mecab_pybind/tagger.o")
        .exists());
}

#[cfg(unix)]
#[test]
fn test_build_dir_override() {
    let project = tagger_project();
    let tools = TempDir::new().unwrap();
    configure(project.path(), tools.path(), "mecab-config", "-std=c++1[14]");

    mecab_build(tools.path())
        .args(["build", "--build-dir", "out"])
        .current_dir(project.path())
        .assert()
        .success();

    assert!(project.path().join("out/lib/mecab_pybind.cpython-312.so").exists());
    assert!(!project.path().join("build").exists());
}

#[cfg(unix)]
#[test]
fn test_build_fails_without_config_tool() {
    let project = tagger_project();
    let tools = TempDir::new().unwrap();
    configure(
        project.path(),
        tools.path(),
        "mecab-config-not-installed",
        "-std=c++14",
    );

    mecab_build(tools.path())
        .arg("build")
        .current_dir(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("`mecab-config-not-installed` not found"))
        .stderr(predicate::str::contains("help: consider:"));

    assert!(!project.path().join("build").exists());
}

#[cfg(unix)]
#[test]
fn test_config_tool_flag_overrides_config_file() {
    let project = tagger_project();
    let tools = TempDir::new().unwrap();
    configure(
        project.path(),
        tools.path(),
        "mecab-config-not-installed",
        "-std=c++1[14]",
    );
    let tool = script(tools.path(), "mecab-config", MECAB_CONFIG);

    mecab_build(tools.path())
        .arg("build")
        .arg("--config-tool")
        .arg(&tool)
        .current_dir(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("mecab-config-not-installed").not());

    assert!(project
        .path()
        .join("build/lib/mecab_pybind.cpython-312.so")
        .exists());
}

#[cfg(unix)]
#[test]
fn test_config_tool_env_overrides_config_file() {
    let project = tagger_project();
    let tools = TempDir::new().unwrap();
    configure(
        project.path(),
        tools.path(),
        "mecab-config-not-installed",
        "-std=c++1[14]",
    );
    let tool = script(tools.path(), "mecab-config", MECAB_CONFIG);

    mecab_build(tools.path())
        .arg("flags")
        .env("MECAB_CONFIG", &tool)
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("-L/usr/lib/mecab"));
}

#[test]
fn test_build_fails_on_broken_project_config() {
    let project = tagger_project();
    let home = TempDir::new().unwrap();
    fs::create_dir_all(project.path().join(".mecab-build")).unwrap();
    fs::write(
        project.path().join(".mecab-build/config.toml"),
        "[build\nconfig-tool = \"/opt/mecab/bin/mecab-config\"\n",
    )
    .unwrap();

    mecab_build(home.path())
        .arg("build")
        .current_dir(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"))
        .stderr(predicate::str::contains(".mecab-build/config.toml"));

    assert!(!project.path().join("build").exists());
}

#[cfg(unix)]
#[test]
fn test_build_fails_on_pre_cxx11_compiler() {
    let project = tagger_project();
    let tools = TempDir::new().unwrap();
    configure(project.path(), tools.path(), "mecab-config", "-std=c++98");

    mecab_build(tools.path())
        .arg("build")
        .current_dir(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Unsupported compiler -- at least C++11 support is needed!",
        ));
}

// ============================================================================
// mecab-build install
// ============================================================================

#[cfg(unix)]
#[test]
fn test_install_copies_into_dest() {
    let project = tagger_project();
    let tools = TempDir::new().unwrap();
    configure(project.path(), tools.path(), "mecab-config", "-std=c++1[14]");

    mecab_build(tools.path())
        .args(["install", "--dest", "site"])
        .current_dir(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Installing"));

    assert!(project.path().join("site/mecab_pybind.cpython-312.so").exists());
}

// ============================================================================
// mecab-build flags
// ============================================================================

#[cfg(unix)]
#[test]
fn test_flags_reports_probed_standard() {
    let project = tagger_project();
    let tools = TempDir::new().unwrap();
    configure(project.path(), tools.path(), "mecab-config", "-std=c++11");

    mecab_build(tools.path())
        .arg("flags")
        .current_dir(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("-std=c++11"))
        .stdout(predicate::str::contains("-std=c++14").not())
        .stdout(predicate::str::contains("-I/usr/include/mecab"))
        .stdout(predicate::str::contains("-lmecab"));

    // Probing compiles nothing into the build directory.
    assert!(!project.path().join("build").exists());
}

#[cfg(unix)]
#[test]
fn test_flags_json() {
    let project = tagger_project();
    let tools = TempDir::new().unwrap();
    configure(project.path(), tools.path(), "mecab-config", "-std=c++1[14]");

    let output = mecab_build(tools.path())
        .args(["flags", "--json"])
        .current_dir(project.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["family"], "unix");
    assert_eq!(report["library_dirs"][0], "/usr/lib/mecab");
    assert_eq!(report["libraries"][0], "mecab");
    assert!(report["compile"]
        .as_array()
        .unwrap()
        .iter()
        .any(|flag| flag == "-std=c++14"));
}

// ============================================================================
// mecab-build clean
// ============================================================================

#[test]
fn test_clean_removes_build_dir() {
    let project = tagger_project();
    let home = TempDir::new().unwrap();
    fs::create_dir_all(project.path().join("build/lib")).unwrap();
    fs::write(project.path().join("build/lib/mecab_pybind.so"), "").unwrap();

    mecab_build(home.path())
        .arg("clean")
        .current_dir(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed"));

    assert!(!project.path().join("build").exists());

    mecab_build(home.path())
        .arg("clean")
        .current_dir(project.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing to clean"));
}

// ============================================================================
// mecab-build completions / help
// ============================================================================

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();

    mecab_build(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mecab-build"));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();

    mecab_build(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("flags"))
        .stdout(predicate::str::contains("clean"));
}
