use assert_cmd::Command;
use predicates::prelude::*;

fn acervo() -> Command {
    Command::cargo_bin("acervo").expect("binary builds")
}

fn file_uri(dir: &tempfile::TempDir) -> String {
    format!("file:{}", dir.path().join("catalog.json").display())
}

fn add_dune(uri: &str) {
    acervo()
        .args([
            "--uri", uri,
            "add-book",
            "--title", "Dune",
            "--author", "Frank Herbert",
            "--genres", "Sci-Fi, Adventure",
            "--publisher", "Ace Books",
            "--year", "1965",
            "--pages", "412",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("upserted 'Dune'"));
}

#[test]
fn add_book_then_dump_roundtrips_through_the_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uri = file_uri(&dir);
    add_dune(&uri);

    acervo()
        .args(["--uri", &uri, "--format", "json", "dump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_books\":1"))
        .stdout(predicate::str::contains("\"Frank Herbert\""))
        .stdout(predicate::str::contains("\"year\":1965"));
}

#[test]
fn recommend_matches_genre_substring() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uri = file_uri(&dir);
    add_dune(&uri);

    acervo()
        .args(["--uri", &uri, "recommend", "sci"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dune by Frank Herbert"));

    acervo()
        .args(["--uri", &uri, "recommend", "sci", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no matches"));
}

#[test]
fn validation_errors_exit_nonzero_with_category() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uri = file_uri(&dir);
    acervo()
        .args([
            "--uri", &uri,
            "add-book",
            "--title", "  ",
            "--author", "Someone",
            "--genres", "Fantasy",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[validation]"));
}

#[test]
fn stats_and_clear() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uri = file_uri(&dir);
    add_dune(&uri);

    acervo()
        .args(["--uri", &uri, "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Book: 1"))
        .stdout(predicate::str::contains("Genre: 2"));

    acervo()
        .args(["--uri", &uri, "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared: 5 node(s)"));

    acervo()
        .args(["--uri", &uri, "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Book: 0"));
}

#[test]
fn raw_statements_run_with_json_params() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uri = file_uri(&dir);

    acervo()
        .args([
            "--uri", &uri,
            "--format", "json",
            "raw",
            "MERGE (a:Author {name: $name})",
            "--params", r#"{"name": "Frank Herbert"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nodes_created\":1"));

    acervo()
        .args([
            "--uri", &uri,
            "--format", "json",
            "raw",
            "MATCH (a:Author) RETURN a.name AS name",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\":\"Frank Herbert\""));
}

#[test]
fn uri_comes_from_the_environment_and_flags_override_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uri = file_uri(&dir);
    add_dune(&uri);

    acervo()
        .env("ACERVO_URI", &uri)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Book: 1"));

    acervo()
        .env("ACERVO_URI", "bolt://nowhere:7687")
        .args(["--uri", &uri, "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Book: 1"));
}

#[test]
fn ping_reports_connectivity_and_degradation() {
    let dir = tempfile::tempdir().expect("tempdir");
    acervo()
        .args(["--uri", &file_uri(&dir), "ping"])
        .assert()
        .success()
        .stdout(predicate::str::contains("store reachable"));

    acervo()
        .args(["--uri", "bolt://nowhere:7687", "ping"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[unavailable]"));
}

#[test]
fn top_rankings_respect_the_limit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uri = file_uri(&dir);
    add_dune(&uri);
    acervo()
        .args([
            "--uri", &uri,
            "add-book",
            "--title", "Children of Dune",
            "--author", "Frank Herbert",
            "--genres", "Sci-Fi",
        ])
        .assert()
        .success();

    acervo()
        .args(["--uri", &uri, "top-authors", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Frank Herbert: 2 book(s)"));
}
