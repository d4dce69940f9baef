// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the `arscan` binary against a mock backend and a
//! throwaway SQLite database.

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Env {
    dir: tempfile::TempDir,
    config_path: PathBuf,
}

impl Env {
    fn new(api: &MockServer) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("arscan.db");
        let config_path = dir.path().join("arscan.toml");
        std::fs::write(
            &config_path,
            format!(
                r#"
[api]
base_url = "{}"

[storage]
database_path = "{}"

[fetch]
check_connectivity = false
max_retries = 1
retry_delay_ms = 10
"#,
                api.uri(),
                db_path.display()
            ),
        )
        .unwrap();
        Self { dir, config_path }
    }

    async fn run(&self, args: &[&str]) -> Output {
        let config_path = self.config_path.clone();
        let home = self.dir.path().to_path_buf();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        tokio::task::spawn_blocking(move || {
            Command::new(env!("CARGO_BIN_EXE_arscan"))
                .arg("--config")
                .arg(&config_path)
                .arg("--plain")
                .args(&args)
                .env("HOME", &home)
                .env("ARSCAN_PASSWORD", "pw")
                .env_remove("RUST_LOG")
                .output()
                .unwrap()
        })
        .await
        .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn marker_payload() -> Value {
    json!({
        "imageUrl": "https://x/i.png",
        "videoUrl": "https://x/v.mp4",
        "patternUrl": "https://x/p.patt"
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_caches_and_second_fetch_uses_cache() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get-marker"))
        .and(query_param("markerId", "abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(marker_payload()))
        .expect(1)
        .mount(&api)
        .await;
    let env = Env::new(&api);

    let first = env.run(&["fetch", "abc-123"]).await;
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let record: Value = serde_json::from_str(&stdout(&first)).unwrap();
    assert_eq!(record, marker_payload());

    let second = env.run(&["fetch", "abc-123"]).await;
    assert!(second.status.success(), "stderr: {}", stderr(&second));
    assert_eq!(
        serde_json::from_str::<Value>(&stdout(&second)).unwrap(),
        marker_payload()
    );

    let info = env.run(&["cache", "info", "--json"]).await;
    let info: Value = serde_json::from_str(&stdout(&info)).unwrap();
    assert_eq!(info["keys"], json!(["marker_abc-123"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_url_fetches_marker() {
    let api = MockServer::start().await;
    let uuid = "9f1c2d3e-4b5a-4c6d-8e7f-0a1b2c3d4e5f";
    Mock::given(method("GET"))
        .and(path("/api/get-marker"))
        .and(query_param("markerId", uuid))
        .respond_with(ResponseTemplate::new(200).set_body_json(marker_payload()))
        .expect(1)
        .mount(&api)
        .await;
    let env = Env::new(&api);

    let url = format!("https://arweb-tau.vercel.app/ar/{uuid}");
    let output = env.run(&["scan", &url]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("marker loaded"));
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_rejects_unrecognized_text() {
    let api = MockServer::start().await;
    let env = Env::new(&api);

    let output = env.run(&["scan", "not a url"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid QR code format"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_marker_fails_without_retry() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get-marker"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&api)
        .await;
    let env = Env::new(&api);

    let output = env.run(&["fetch", "missing"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not found"), "stderr: {}", stderr(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn login_then_whoami_uses_stored_user() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-1",
            "user": {
                "id": "u1",
                "email": "ada@example.com",
                "firstName": "Ada",
                "lastName": "Lovelace"
            }
        })))
        .expect(1)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/current-user"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&api)
        .await;
    let env = Env::new(&api);

    let login = env.run(&["login", "--email", "ada@example.com"]).await;
    assert!(login.status.success(), "stderr: {}", stderr(&login));

    let whoami = env.run(&["whoami"]).await;
    assert!(whoami.status.success(), "stderr: {}", stderr(&whoami));
    assert!(stdout(&whoami).contains("Ada"));

    let logout = env.run(&["logout"]).await;
    assert!(logout.status.success());
    let after = env.run(&["whoami"]).await;
    assert!(!after.status.success());
    assert!(stderr(&after).contains("not logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_config_is_reported() {
    let api = MockServer::start().await;
    let env = Env::new(&api);
    std::fs::write(&env.config_path, "[fetch]\nmax_retires = 3\n").unwrap();

    let output = env.run(&["config"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("max_retries"), "stderr: {}", stderr(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn config_command_prints_effective_settings() {
    let api = MockServer::start().await;
    let env = Env::new(&api);

    let output = env.run(&["config"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let printed = stdout(&output);
    assert!(printed.contains("[fetch]"));
    assert!(printed.contains("max_retries = 1"));
}
