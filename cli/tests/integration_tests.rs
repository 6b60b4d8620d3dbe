//! End-to-end tests driving the sqlkeeper binary.

use std::path::Path;
use std::process::Output;

const BIN: &str = env!("CARGO_BIN_EXE_sqlkeeper");

fn sqlkeeper(dir: &Path, args: &[&str]) -> Output {
    std::process::Command::new(BIN)
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to spawn sqlkeeper")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_books_json(dir: &Path) {
    std::fs::write(
        dir.join("books.json"),
        r#"[
            {"title": "Dune", "year": 1965},
            {"title": "Neuromancer", "year": 1984}
        ]"#,
    )
    .unwrap();
}

#[test]
fn import_then_list_and_show() {
    let dir = tempfile::tempdir().unwrap();
    write_books_json(dir.path());

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "import", "books.json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("imported 2 rows into books"));

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "tables"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("books (2 rows)"));

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "show", "books"]);
    assert!(out.status.success());
    let shown = stdout(&out);
    assert!(shown.contains("title | year"));
    assert!(shown.contains("Dune | 1965"));
}

#[test]
fn import_existing_table_fails_without_replace() {
    let dir = tempfile::tempdir().unwrap();
    write_books_json(dir.path());

    assert!(sqlkeeper(dir.path(), &["--db", "lib.db", "import", "books.json"])
        .status
        .success());
    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "import", "books.json"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("error:"));

    let out = sqlkeeper(
        dir.path(),
        &["--db", "lib.db", "import", "books.json", "--replace"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn destructive_commands_require_yes() {
    let dir = tempfile::tempdir().unwrap();
    write_books_json(dir.path());
    sqlkeeper(dir.path(), &["--db", "lib.db", "import", "books.json"]);

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "drop", "books"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("confirmation required"));

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "drop", "books", "--yes"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "tables"]);
    assert!(stdout(&out).contains("no tables"));
}

#[test]
fn migrate_reshapes_table() {
    let dir = tempfile::tempdir().unwrap();
    write_books_json(dir.path());
    sqlkeeper(dir.path(), &["--db", "lib.db", "import", "books.json"]);

    let out = sqlkeeper(
        dir.path(),
        &[
            "--db",
            "lib.db",
            "migrate",
            "books",
            "--columns",
            "title,shelf",
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let report = stdout(&out);
    assert!(report.contains("kept [title]"));
    assert!(report.contains("dropped [year]"));
    assert!(report.contains("added [shelf]"));
    assert!(report.contains("2 rows copied"));

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "show", "books"]);
    assert!(stdout(&out).contains("title | shelf"));
}

#[test]
fn backup_check_force_and_restore_cycle() {
    let dir = tempfile::tempdir().unwrap();
    write_books_json(dir.path());
    sqlkeeper(dir.path(), &["--db", "lib.db", "import", "books.json"]);

    // First contact: checkpoint plus first artifact.
    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "backup", "check"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("backup created:"));

    // Second tick is inside the interval.
    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "backup", "check"]);
    assert!(stdout(&out).contains("next backup due in"));

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "backup", "force"]);
    assert!(out.status.success());

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "artifacts"]);
    assert!(out.status.success());
    let listing = stdout(&out);
    let artifact = listing
        .lines()
        .find(|l| l.starts_with("lib_backup_"))
        .expect("no artifact listed")
        .trim()
        .to_string();

    // Mutate, then restore the snapshot.
    sqlkeeper(
        dir.path(),
        &["--db", "lib.db", "drop", "books", "--yes"],
    );
    let out = sqlkeeper(
        dir.path(),
        &["--db", "lib.db", "restore", &artifact, "--yes"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let out = sqlkeeper(dir.path(), &["--db", "lib.db", "tables"]);
    assert!(stdout(&out).contains("books (2 rows)"));
}

#[test]
fn disabled_interval_reports_disabled() {
    let dir = tempfile::tempdir().unwrap();
    write_books_json(dir.path());
    sqlkeeper(dir.path(), &["--db", "lib.db", "import", "books.json"]);

    // First contact always happens; the sentinel gates later ticks.
    sqlkeeper(
        dir.path(),
        &["--db", "lib.db", "backup", "check", "--interval", "-1"],
    );
    let out = sqlkeeper(
        dir.path(),
        &["--db", "lib.db", "backup", "check", "--interval", "-1"],
    );
    assert!(out.status.success());
    assert!(stdout(&out).contains("automatic backups are disabled"));
}

#[test]
fn config_file_supplies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_books_json(dir.path());
    std::fs::write(
        dir.path().join("sqlkeeper.toml"),
        r#"
database = "configured.db"

[backup]
dir = "vault"
"#,
    )
    .unwrap();

    let out = sqlkeeper(
        dir.path(),
        &["--config", "sqlkeeper.toml", "import", "books.json"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(dir.path().join("configured.db").exists());

    let out = sqlkeeper(
        dir.path(),
        &["--config", "sqlkeeper.toml", "backup", "force"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(dir.path().join("vault").is_dir());

    // A flag wins over the config file.
    let out = sqlkeeper(
        dir.path(),
        &["--config", "sqlkeeper.toml", "--db", "flag.db", "tables"],
    );
    assert!(out.status.success());
    assert!(dir.path().join("flag.db").exists());
}

#[test]
fn restore_missing_artifact_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_books_json(dir.path());
    sqlkeeper(dir.path(), &["--db", "lib.db", "import", "books.json"]);

    let out = sqlkeeper(
        dir.path(),
        &["--db", "lib.db", "restore", "no_such_backup", "--yes"],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("artifact not found"));
}
