use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const LINEAR_MODEL: &str = r#"{
  "model_type": "LinearRegression",
  "intercept_": 2.0,
  "coef_": [3.0, 1.5, -0.5]
}"#;

const TREE_MODEL: &str = r#"{
  "model_type": "DecisionTreeClassifier",
  "n_features_in_": 2,
  "tree_": {
    "children_left": [1, -1, 3, -1, -1],
    "children_right": [2, -1, 4, -1, -1],
    "feature": [0, -2, 1, -2, -2],
    "threshold": [0.5, -2.0, 1.0, -2.0, -2.0],
    "value": [[[6.0, 4.0]], [[5.0, 0.0]], [[1.0, 4.0]], [[1.0, 0.0]], [[0.0, 4.0]]]
  }
}"#;

fn ml2c() -> Command {
    let mut cmd = Command::cargo_bin("ml2c").unwrap();
    cmd.env_remove("ML2C_LOG");
    cmd
}

fn write_model(dir: &TempDir, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_inspect_tree() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "tree.json", TREE_MODEL);

    ml2c()
        .arg("inspect")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("Kind: DecisionTreeClassifier"))
        .stdout(predicate::str::contains("Features: 2"))
        .stdout(predicate::str::contains("Depth: 3"))
        .stdout(predicate::str::contains("Leaves: 3"));
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "linear.json", LINEAR_MODEL);

    ml2c()
        .args(["inspect", "--json"])
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"intercept\": 2.0"));
}

#[test]
fn test_transpile_without_compiling_then_validate() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "house.json", LINEAR_MODEL);
    let output = dir.path().join("house_inference.c");

    ml2c()
        .arg("transpile")
        .arg(&model)
        .arg("-o")
        .arg(&output)
        .args(["--no-compile", "--vector", "1,2,3", "--vector", "0, 0, 0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"));

    let source = fs::read_to_string(&output).unwrap();
    assert!(source.contains("float test_0[] = {1.000000f, 2.000000f, 3.000000f};"));
    assert!(source.contains("float test_1[] = {0.000000f, 0.000000f, 0.000000f};"));

    ml2c()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"));
}

#[test]
fn test_transpile_default_output_in_working_directory() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "tree.json", TREE_MODEL);

    ml2c()
        .current_dir(dir.path())
        .args(["transpile", "tree.json", "--no-compile", "--no-harness"])
        .assert()
        .success();

    let source = fs::read_to_string(dir.path().join("tree_inference.c")).unwrap();
    assert!(model.exists());
    assert!(!source.contains("int main"));
    assert_eq!(source.matches("return ").count(), 3);
}

#[test]
fn test_unsupported_model_fails() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "kmeans.json", r#"{"model_type": "KMeans"}"#);

    ml2c()
        .args(["transpile", "--no-compile"])
        .arg(&model)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Model type KMeans not supported"));
}

#[test]
fn test_bad_vector_fails() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "linear.json", LINEAR_MODEL);

    ml2c()
        .args(["transpile", "--no-compile", "--vector", "1,x,3", "-o"])
        .arg(dir.path().join("out.c"))
        .arg(&model)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid number 'x'"));
}

#[test]
fn test_validate_rejects_foreign_source() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("other.c");
    fs::write(&path, "#include <stdio.h>\n\nint main(void) {\n    return 0;\n}\n").unwrap();

    ml2c()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"));
}

#[test]
fn test_validate_empty_directory() {
    let dir = TempDir::new().unwrap();

    ml2c()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No .c files found"));
}

#[test]
fn test_transpile_compile_and_run() {
    if !ml2c::Toolchain::from_env().is_available() {
        eprintln!("skipping: no C compiler");
        return;
    }
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "linear.json", LINEAR_MODEL);

    ml2c()
        .current_dir(dir.path())
        .args(["transpile", "--run", "--vector", "1,2,3"])
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled"))
        .stdout(predicate::str::contains("Test 0: 6.500000"));
}

#[test]
fn test_run_missing_binary_fails() {
    let dir = TempDir::new().unwrap();

    ml2c()
        .arg("run")
        .arg(dir.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to run"));
}

#[test]
fn test_no_harness_requires_no_compile() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "tree.json", TREE_MODEL);

    ml2c()
        .current_dir(dir.path())
        .args(["transpile", "tree.json", "--no-harness"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--no-compile"));

    assert!(model.exists());
    assert!(!dir.path().join("tree_inference.c").exists());
}

#[test]
fn test_config_without_harness_refuses_to_compile() {
    let dir = TempDir::new().unwrap();
    write_model(&dir, "tree.json", TREE_MODEL);
    fs::write(
        dir.path().join("ml2c.json"),
        r#"{"emitter": {"emit_harness": false}}"#,
    )
    .unwrap();

    ml2c()
        .current_dir(dir.path())
        .args(["transpile", "tree.json", "--config", "ml2c.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("harness generation is disabled"));

    assert!(!dir.path().join("tree_inference.c").exists());
}

#[test]
fn test_zero_timeout_rejected_by_every_subcommand() {
    let dir = TempDir::new().unwrap();
    let model = write_model(&dir, "linear.json", LINEAR_MODEL);

    ml2c()
        .current_dir(dir.path())
        .args(["transpile", "--timeout", "0"])
        .arg(&model)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout must be at least 1 second"));

    ml2c()
        .args(["run", "--timeout", "0"])
        .arg(dir.path().join("linear_inference"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout must be at least 1 second"));
}
