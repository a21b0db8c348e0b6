#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{Value, json};
use tempfile::TempDir;

pub fn scicure_binary() -> &'static str {
    env!("CARGO_BIN_EXE_scicure")
}

/// Helper struct to run scicure commands in an isolated temp directory
pub struct ScicureTest {
    pub temp_dir: TempDir,
}

impl ScicureTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        ScicureTest { temp_dir }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(scicure_binary())
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("SCICURE_API_URL")
            .env_remove("RUST_LOG")
            .env_remove("HTTP_PROXY")
            .env_remove("http_proxy")
            .env_remove("ALL_PROXY")
            .env_remove("all_proxy")
            .env("NO_PROXY", "127.0.0.1,localhost")
            .output()
            .expect("Failed to execute scicure command")
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

    pub fn run_json(&self, args: &[&str]) -> Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("Invalid JSON from {:?}: {}\n{}", args, e, stdout))
    }

    fn scicure_dir(&self) -> std::path::PathBuf {
        let dir = self.temp_dir.path().join(".scicure");
        fs::create_dir_all(&dir).expect("Failed to create .scicure directory");
        dir
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.scicure_dir().join("config.yaml"), content)
            .expect("Failed to write config file");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.temp_dir.path().join(".scicure").join("config.yaml"))
            .expect("Failed to read config file")
    }

    pub fn write_raw_session(&self, content: &str) {
        fs::write(self.scicure_dir().join("session.json"), content)
            .expect("Failed to write session file");
    }

    /// Write a file next to the workspace, for upload arguments
    pub fn write_file(&self, name: &str, bytes: &[u8]) {
        fs::write(self.temp_dir.path().join(name), bytes).expect("Failed to write file");
    }

    pub fn read_session(&self) -> Value {
        let content =
            fs::read_to_string(self.temp_dir.path().join(".scicure").join("session.json"))
                .expect("Failed to read session file");
        serde_json::from_str(&content).expect("Session file is not JSON")
    }

    /// Store a logged-in session with the given role and user info
    pub fn login_as(&self, role: &str, user: Value) {
        let session = json!({
            "authToken": "tok-123",
            "userRole": role,
            "userInfo": user.to_string(),
        });
        self.write_raw_session(&session.to_string());
    }

    pub fn login_admin(&self) {
        self.login_as("admin", json!({ "_id": "u1", "email": "admin@example.org", "role": "admin" }));
    }

    /// Point the config at a running mock API
    pub fn use_api(&self, api: &MockApi) {
        self.write_config(&format!("api_url: {}\nui:\n  theme: plain\n", api.base_url()));
    }
}

/// One request seen by the mock API
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

struct Route {
    method: String,
    path: String,
    status: u16,
    body: String,
}

/// Minimal HTTP/1.1 server answering fixed JSON bodies per method and path
pub struct MockApi {
    addr: SocketAddr,
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApi {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");
        let routes: Arc<Mutex<Vec<Route>>> = Arc::default();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();

        let server_routes = Arc::clone(&routes);
        let server_requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, &server_routes, &server_requests);
            }
        });

        MockApi {
            addr,
            routes,
            requests,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Register a response for `METHOD /api/<path>`
    pub fn route(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        self.routes.lock().unwrap().push(Route {
            method: method.to_string(),
            path: format!("/api/{}", path.trim_start_matches('/')),
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

fn handle(
    stream: TcpStream,
    routes: &Mutex<Vec<Route>>,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    let mut content_type = None;
    let mut chunked = false;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "authorization" => authorization = Some(value.trim().to_string()),
                "content-type" => content_type = Some(value.trim().to_string()),
                "transfer-encoding" => chunked = value.trim().eq_ignore_ascii_case("chunked"),
                _ => {}
            }
        }
    }

    let body = if chunked {
        match read_chunked(&mut reader) {
            Some(body) => body,
            None => return,
        }
    } else {
        let mut body = vec![0u8; content_length];
        if reader.read_exact(&mut body).is_err() {
            return;
        }
        body
    };

    requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization,
        content_type,
        body: String::from_utf8_lossy(&body).to_string(),
    });

    let (status, payload) = routes
        .lock()
        .unwrap()
        .iter()
        .find(|r| r.method == method && r.path == path)
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, json!({ "message": "Not found" }).to_string()));

    let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        payload.len(),
        payload
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn read_chunked(reader: &mut impl BufRead) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line).ok()?;
        let size_hex = size_line.trim().split(';').next().unwrap_or_default();
        let size = usize::from_str_radix(size_hex, 16).ok()?;
        if size == 0 {
            // Trailing CRLF after the last chunk
            let mut end = String::new();
            reader.read_line(&mut end).ok()?;
            return Some(body);
        }
        let mut chunk = vec![0u8; size + 2];
        reader.read_exact(&mut chunk).ok()?;
        body.extend_from_slice(&chunk[..size]);
    }
}
