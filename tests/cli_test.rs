//! CLI integration tests for the typegraph-schema binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("typegraph-schema"))
}

// Helper to create a temp manifest file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const GRAPH: &str = r#"{
    "packages": [
        {"path": "example.com/sample/taxonomy", "name": "taxonomy", "markers": ["validation:schema"]}
    ],
    "types": [
        {
            "package": "example.com/sample/taxonomy",
            "name": "Spec",
            "markers": ["validation:object"],
            "fields": [
                {"name": "Field1", "type": {"kind": "reference", "package": "example.com/sample/taxonomy", "name": "Type1"}, "alias": "field1"},
                {"name": "Field2", "type": {"kind": "scalar", "name": "string"}, "alias": "field2"}
            ]
        },
        {
            "package": "example.com/sample/taxonomy",
            "name": "Type1",
            "fields": [
                {"name": "Value", "type": {"kind": "scalar", "name": "string"}, "alias": "value", "optional": true}
            ]
        }
    ]
}"#;

const GRAPH_WITH_FLOAT: &str = r#"{
    "packages": [{"path": "example.com/api", "name": "api", "markers": ["validation:schema"]}],
    "types": [
        {
            "package": "example.com/api",
            "name": "Spec",
            "fields": [{"name": "Ratio", "type": {"kind": "scalar", "name": "float64"}, "alias": "ratio"}]
        }
    ]
}"#;

mod generate_command {
    use super::*;

    #[test]
    fn writes_documents() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH);
        let out = dir.path().join("schemas");

        cmd()
            .args([
                "generate",
                graph.to_str().unwrap(),
                "--output-dir",
                out.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 2 document(s)"));

        let primary = fs::read_to_string(out.join("taxonomy.json")).unwrap();
        assert!(primary.contains(r##""$ref": "#/definitions/Type1""##));
        let filtered = fs::read_to_string(out.join("Spec.json")).unwrap();
        assert!(filtered.starts_with("{\n  \"title\": \"Spec.json\""));
    }

    #[test]
    fn json_report() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH);
        let out = dir.path().join("schemas");

        let output = cmd()
            .args([
                "generate",
                graph.to_str().unwrap(),
                "--output-dir",
                out.to_str().unwrap(),
                "--json",
            ])
            .output()
            .unwrap();

        assert!(output.status.success());
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["documents"].as_array().unwrap().len(), 2);
        assert_eq!(report["diagnostics"], serde_json::json!([]));
    }

    #[test]
    fn diagnostics_are_warnings_by_default() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH_WITH_FLOAT);
        let out = dir.path().join("schemas");

        cmd()
            .args([
                "generate",
                graph.to_str().unwrap(),
                "--output-dir",
                out.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stderr(predicate::str::contains("highly discouraged"));
    }

    #[test]
    fn strict_fails_on_diagnostics() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH_WITH_FLOAT);
        let out = dir.path().join("schemas");

        cmd()
            .args([
                "generate",
                graph.to_str().unwrap(),
                "--output-dir",
                out.to_str().unwrap(),
                "--strict",
            ])
            .assert()
            .code(1);

        // Documents are still written.
        assert!(out.join("api.json").exists());
    }

    #[test]
    fn allow_dangerous_types() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH_WITH_FLOAT);
        let out = dir.path().join("schemas");

        cmd()
            .args([
                "generate",
                graph.to_str().unwrap(),
                "--output-dir",
                out.to_str().unwrap(),
                "--strict",
                "--allow-dangerous-types",
            ])
            .assert()
            .success();

        let api = fs::read_to_string(out.join("api.json")).unwrap();
        assert!(api.contains(r#""type": "number""#));
    }

    #[test]
    fn missing_graph_file() {
        let dir = TempDir::new().unwrap();

        cmd()
            .args([
                "generate",
                "/nonexistent/graph.json",
                "--output-dir",
                dir.path().to_str().unwrap(),
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn invalid_graph_json() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", "not json");

        cmd()
            .args([
                "generate",
                graph.to_str().unwrap(),
                "--output-dir",
                dir.path().to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid type graph"));
    }

    #[test]
    fn unwritable_output_dir() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH);
        let blocker = write_temp_file(&dir, "blocker", "");

        cmd()
            .args([
                "generate",
                graph.to_str().unwrap(),
                "--output-dir",
                blocker.join("out").to_str().unwrap(),
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("cannot create output directory"));
    }
}

mod inspect_command {
    use super::*;

    #[test]
    fn prints_all_documents() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH);

        cmd()
            .args(["inspect", graph.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""title": "taxonomy.json""#))
            .stdout(predicate::str::contains(r#""title": "Spec.json""#));

        assert!(!dir.path().join("taxonomy.json").exists());
    }

    #[test]
    fn prints_single_document() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH);

        cmd()
            .args(["inspect", graph.to_str().unwrap(), "--document", "Spec.json", "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""title": "Spec.json""#))
            .stdout(predicate::str::contains(r#""title": "taxonomy.json""#).not());
    }

    #[test]
    fn compact_by_default() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH);

        let output = cmd()
            .args(["inspect", graph.to_str().unwrap(), "--document", "Spec.json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), 1);
        let document: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(document["title"], "Spec.json");
        assert_eq!(
            document["properties"]["field1"]["$ref"],
            "taxonomy.json#/definitions/Type1"
        );
    }

    #[test]
    fn unknown_document() {
        let dir = TempDir::new().unwrap();
        let graph = write_temp_file(&dir, "graph.json", GRAPH);

        cmd()
            .args(["inspect", graph.to_str().unwrap(), "--document", "nope.json"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no document named nope.json"));
    }
}
