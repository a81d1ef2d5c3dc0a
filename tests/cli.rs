use assert_cmd::Command;

// Nothing listens on the discard port, so fetches fail fast and offline.
const UNREACHABLE: &str = "http://127.0.0.1:9/dataset";

fn datakitten() -> Command {
    let mut cmd = Command::cargo_bin("datakitten").unwrap();
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("DATAKITTEN_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn runs() {
    datakitten().assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = datakitten();
    cmd.arg("-V");
    cmd.assert().success().stdout("datakitten 0.1.0\n");
}

#[test]
fn bare_invocation_points_at_help() {
    datakitten()
        .assert()
        .success()
        .stdout(predicates::str::contains("datakitten --help"));
}

// Detect subcommand tests

#[test]
fn detect_git_address_without_known_host() {
    let mut cmd = datakitten();
    cmd.args(["detect", "https://git.example.org/data/repo.git"]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("origin: git"))
        .stdout(predicates::str::contains("host: -"))
        .stdout(predicates::str::contains("format: -"))
        .stdout(predicates::str::contains("supported: no"))
        .stderr(predicates::str::contains("No supported origin"));
}

#[test]
fn detect_unreachable_url_is_unsupported() {
    let mut cmd = datakitten();
    cmd.args(["detect", UNREACHABLE, "--timeout", "2"]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("origin: web"))
        .stdout(predicates::str::contains("supported: no"));
}

#[test]
fn detect_requires_a_url() {
    let mut cmd = datakitten();
    cmd.arg("detect");
    cmd.assert().failure();
}

// Inspect subcommand tests

#[test]
fn inspect_unsupported_dataset_succeeds() {
    let mut cmd = datakitten();
    cmd.args(["inspect", "not a url"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Dataset: not a url"))
        .stdout(predicates::str::contains("Supported:  no"))
        .stdout(predicates::str::contains("No supported publishing format found."));
}

#[test]
fn inspect_json_output_format() {
    let mut cmd = datakitten();
    cmd.args(["inspect", UNREACHABLE, "--output", "json", "--timeout", "2"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"supported\": false"))
        .stdout(predicates::str::contains("\"origin\": \"web\""))
        .stdout(predicates::str::contains("\"distributions\": []"));
}

#[test]
fn inspect_json_reports_git_origin() {
    let mut cmd = datakitten();
    cmd.args([
        "inspect",
        "https://git.example.org/data/repo.git",
        "--output",
        "json",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"origin\": \"git\""))
        .stdout(predicates::str::contains("\"host\": null"));
}

#[test]
fn inspect_rejects_unknown_output_format() {
    let mut cmd = datakitten();
    cmd.args(["inspect", UNREACHABLE, "--output", "xml"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("invalid value"));
}

#[test]
fn timeout_is_read_from_environment() {
    let mut cmd = datakitten();
    cmd.env("DATAKITTEN_TIMEOUT_SECS", "not-a-number");
    cmd.args(["inspect", UNREACHABLE]);
    cmd.assert().failure();
}
