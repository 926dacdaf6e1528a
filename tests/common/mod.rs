#![allow(dead_code)]

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper struct to run adminctl commands in an isolated temp directory
pub struct AdminctlTest {
    pub temp_dir: TempDir,
    binary_path: String,
}

impl AdminctlTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        AdminctlTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_adminctl").to_string(),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("ADMINCTL_API_URL")
            .env_remove("ADMINCTL_TOKEN")
            .env_remove("ADMINCTL_LOG")
            .env("NO_COLOR", "1")
            .env("NO_PROXY", "127.0.0.1,localhost")
            .output()
            .expect("Failed to execute adminctl command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
    }

    pub fn write_config(&self, content: &str) {
        let dir = self.temp_dir.path().join(".adminctl");
        fs::create_dir_all(&dir).expect("Failed to create .adminctl directory");
        fs::write(dir.join("config.yaml"), content).expect("Failed to write config");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.temp_dir.path().join(".adminctl").join("config.yaml"))
            .expect("Failed to read config")
    }

    pub fn read_storage(&self) -> serde_json::Value {
        let raw = fs::read_to_string(self.temp_dir.path().join(".adminctl").join("storage.json"))
            .expect("Failed to read storage");
        serde_json::from_str(&raw).expect("storage is not JSON")
    }

    pub fn write_file(&self, name: &str, content: &str) {
        fs::write(self.temp_dir.path().join(name), content).expect("Failed to write file");
    }

    /// Point the config at `base_url` with the given fallback identity roles
    pub fn use_api(&self, base_url: &str, roles: &[&str]) {
        let roles = roles
            .iter()
            .map(|r| format!("\"{r}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.write_config(&format!(
            "api:\n  base_url: {base_url}\n  timeout_secs: 5\nidentity:\n  username: tester\n  roles: [{roles}]\n"
        ));
    }
}

/// Admin API stand-in for the binary tests.
///
/// The tests themselves are synchronous, so the server lives on its own
/// runtime for as long as the value is alive.
pub struct MockApi {
    pub base_url: String,
    server: MockServer,
    runtime: Runtime,
}

impl MockApi {
    /// Serve each `(path, status, body)` for GET requests; anything else is a 404
    pub fn start(routes: Vec<(&str, u16, serde_json::Value)>) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("Failed to build runtime");

        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            for (route, status, body) in routes {
                Mock::given(method("GET"))
                    .and(path(route))
                    .respond_with(ResponseTemplate::new(status).set_body_json(body))
                    .mount(&server)
                    .await;
            }
            server
        });

        MockApi {
            base_url: server.uri(),
            server,
            runtime,
        }
    }

    /// Request targets seen so far, query strings included
    pub fn requests(&self) -> Vec<String> {
        let received = self
            .runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default();
        received
            .iter()
            .map(|request| match request.url.query() {
                Some(query) => format!("{}?{}", request.url.path(), query),
                None => request.url.path().to_string(),
            })
            .collect()
    }
}

/// A backend page envelope
pub fn envelope(content: serde_json::Value, total: u64, pages: u32, number: u32, size: u32) -> serde_json::Value {
    serde_json::json!({
        "content": content,
        "totalElements": total,
        "totalPages": pages,
        "number": number,
        "size": size,
        "last": number + 1 >= pages,
    })
}
