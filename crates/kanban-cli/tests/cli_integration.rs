use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::tempdir;

fn kanban(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kanban").unwrap();
    cmd.env_remove("KANBAN_FILE")
        .env_remove("KANBAN_DEBUG_LOG")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home);
    cmd
}

fn parse_json_output(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("Failed to parse JSON output")
}

fn run_ok(home: &Path, file: &Path, args: &[&str]) -> Value {
    let output = kanban(home)
        .arg("--file")
        .arg(file)
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = parse_json_output(&output);
    assert!(json["success"].as_bool().unwrap());
    json
}

fn titles(show: &Value, column: usize) -> Vec<String> {
    show["data"]["columns"][column]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

/// Board with Todo = [a, b, c] and an empty Done column.
fn setup(home: &Path, file: &Path) -> Vec<String> {
    run_ok(
        home,
        file,
        &["init", "--name", "Test Board", "--column", "Todo", "--column", "Done"],
    );
    ["a", "b", "c"]
        .iter()
        .map(|title| {
            let json = run_ok(home, file, &["add", "--column", "Todo", title]);
            json["data"]["id"].as_str().unwrap().to_string()
        })
        .collect()
}

mod board_tests {
    use super::*;

    #[test]
    fn test_init_with_default_columns() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        let json = run_ok(dir.path(), &file, &["init", "--name", "Sprint"]);
        assert_eq!(json["data"]["name"], "Sprint");
        let names: Vec<_> = json["data"]["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Todo", "In Progress", "Done"]);
        assert!(file.exists());
    }

    #[test]
    fn test_init_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        run_ok(dir.path(), &file, &["init", "--name", "First"]);

        kanban(dir.path())
            .arg("--file")
            .arg(&file)
            .args(["init", "--name", "Second"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_show_lists_tasks_in_order() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        setup(dir.path(), &file);

        let show = run_ok(dir.path(), &file, &["show"]);
        assert_eq!(titles(&show, 0), vec!["a", "b", "c"]);
        assert!(titles(&show, 1).is_empty());
        let positions: Vec<_> = show["data"]["columns"][0]["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["position"].as_u64().unwrap())
            .collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_show_missing_file_fails_with_envelope() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("missing.json");

        kanban(dir.path())
            .arg("--file")
            .arg(&file)
            .arg("show")
            .assert()
            .failure()
            .stderr(predicate::str::contains(r#""success":false"#));
    }

    #[test]
    fn test_file_from_env_var() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");

        kanban(dir.path())
            .env("KANBAN_FILE", &file)
            .args(["init", "--name", "Env"])
            .assert()
            .success();
        assert!(file.exists());
    }

    #[test]
    fn test_missing_file_flag_is_an_error() {
        let dir = tempdir().unwrap();

        kanban(dir.path())
            .arg("show")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--file is required"));
    }
}

mod move_tests {
    use super::*;

    #[test]
    fn test_add_to_unknown_column_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        setup(dir.path(), &file);

        kanban(dir.path())
            .arg("--file")
            .arg(&file)
            .args(["add", "--column", "Backlog", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Backlog"));
    }

    #[test]
    fn test_same_column_reorder() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        let ids = setup(dir.path(), &file);

        let json = run_ok(dir.path(), &file, &["move", &ids[0], "--to", &ids[2]]);
        assert!(json["data"]["moved"].as_bool().unwrap());
        assert_eq!(json["data"]["position"], 2);
        assert_eq!(json["data"]["columns"].as_array().unwrap().len(), 1);
        assert_eq!(
            json["data"]["columns"][0]["orderedTaskIds"],
            serde_json::json!([ids[1], ids[2], ids[0]])
        );

        let show = run_ok(dir.path(), &file, &["show"]);
        assert_eq!(titles(&show, 0), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_to_empty_column_by_name() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        let ids = setup(dir.path(), &file);

        let json = run_ok(dir.path(), &file, &["move", &ids[1], "--to", "done"]);
        assert_eq!(json["data"]["columns"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"]["position"], 0);

        let show = run_ok(dir.path(), &file, &["show"]);
        assert_eq!(titles(&show, 0), vec!["a", "c"]);
        assert_eq!(titles(&show, 1), vec!["b"]);
    }

    #[test]
    fn test_move_onto_own_slot_is_unchanged() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        let ids = setup(dir.path(), &file);

        let json = run_ok(dir.path(), &file, &["move", &ids[1], "--to", &ids[1]]);
        assert!(!json["data"]["moved"].as_bool().unwrap());
        assert!(json["data"].get("commit_id").is_none());
        assert_eq!(json["data"]["position"], 1);
    }

    #[test]
    fn test_move_unknown_task_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        setup(dir.path(), &file);

        kanban(dir.path())
            .arg("--file")
            .arg(&file)
            .args(["move", "00000000-0000-0000-0000-000000000001", "--to", "Done"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not on the board"));
    }

    #[test]
    fn test_move_onto_unknown_id_is_cancelled() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        let ids = setup(dir.path(), &file);

        kanban(dir.path())
            .arg("--file")
            .arg(&file)
            .args(["move", &ids[0], "--to", "00000000-0000-0000-0000-000000000002"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("InvalidTarget"));

        let show = run_ok(dir.path(), &file, &["show"]);
        assert_eq!(titles(&show, 0), vec!["a", "b", "c"]);
    }
}

#[test]
fn test_completions_bash() {
    let dir = tempdir().unwrap();

    kanban(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kanban"));
}
