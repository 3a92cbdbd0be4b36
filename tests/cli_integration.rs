//! CLI integration tests for `fbgen`.
//!
//! These exercise the demonstration binary end to end: a JSON `Project` on
//! disk in, a `fbuild.bff` on disk out.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn fbgen() -> Command {
    Command::cargo_bin("fbgen").unwrap()
}

fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write_project(dir: &std::path::Path, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_emits_bff_for_single_executable() {
    let tmp = temp_dir();
    let out_dir = tmp.path().join("out");

    let project_json = format!(
        r#"{{
            "targets": [
                {{
                    "name": "exe",
                    "kind": "Executable",
                    "sources": [
                        {{ "path": "main.cpp", "language": "Cxx" }}
                    ]
                }}
            ],
            "configurations": ["Debug"],
            "toolchain": {{
                "vars": {{
                    "CMAKE_CXX_COMPILE_OBJECT": "<CMAKE_CXX_COMPILER> <FLAGS> -c <SOURCE> -o <OBJECT>",
                    "CMAKE_CXX_COMPILER": "/usr/bin/c++",
                    "CMAKE_CXX_LINK_EXECUTABLE": "<CMAKE_CXX_COMPILER> <FLAGS> <OBJECTS> -o <TARGET> <LINK_LIBRARIES>"
                }}
            }},
            "home_output_dir": "{}"
        }}"#,
        tmp.path().join("default-out").display()
    );
    let project_path = write_project(tmp.path(), "project.json", &project_json);

    fbgen()
        .arg(&project_path)
        .args(["--out-dir", out_dir.to_str().unwrap()])
        .assert()
        .success();

    let bff_path = out_dir.join("fbuild.bff");
    assert!(predicate::path::exists().eval(&bff_path));
    let text = fs::read_to_string(&bff_path).unwrap();
    assert!(text.contains("Executable('exe-link-Debug')"));
}

#[test]
fn test_missing_project_file_fails() {
    let tmp = temp_dir();
    fbgen()
        .arg(tmp.path().join("does-not-exist.json"))
        .args(["--out-dir", tmp.path().to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_configs_flag_overrides_project_configurations() {
    let tmp = temp_dir();
    let out_dir = tmp.path().join("out");

    let project_json = format!(
        r#"{{
            "targets": [
                {{
                    "name": "exe",
                    "kind": "Executable",
                    "sources": [
                        {{ "path": "main.cpp", "language": "Cxx" }}
                    ]
                }}
            ],
            "configurations": ["Debug"],
            "toolchain": {{
                "vars": {{
                    "CMAKE_CXX_COMPILE_OBJECT": "<CMAKE_CXX_COMPILER> <FLAGS> -c <SOURCE> -o <OBJECT>",
                    "CMAKE_CXX_COMPILER": "/usr/bin/c++",
                    "CMAKE_CXX_LINK_EXECUTABLE": "<CMAKE_CXX_COMPILER> <FLAGS> <OBJECTS> -o <TARGET> <LINK_LIBRARIES>"
                }}
            }},
            "home_output_dir": "{}"
        }}"#,
        tmp.path().join("default-out").display()
    );
    let project_path = write_project(tmp.path(), "project.json", &project_json);

    fbgen()
        .arg(&project_path)
        .args(["--out-dir", out_dir.to_str().unwrap()])
        .args(["--configs", "Release"])
        .assert()
        .success();

    let text = fs::read_to_string(out_dir.join("fbuild.bff")).unwrap();
    assert!(text.contains("Executable('exe-link-Release')"));
    assert!(!text.contains("Executable('exe-link-Debug')"));
}
