//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed responses per path and counts requests per path. Routes can
//! declare a `Content-Length` larger than the body (connection closes early),
//! omit the header entirely, or stall after a prefix of the body.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// `Content-Length` to send; `None` sends `body.len()`.
    pub declared_len: Option<u64>,
    /// Send no `Content-Length` header; the body ends at connection close.
    pub omit_length: bool,
    /// Keep the connection open this long after writing the body.
    pub stall: Option<Duration>,
}

impl Route {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            body,
            declared_len: None,
            omit_length: false,
            stall: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: b"error page".to_vec(),
            declared_len: None,
            omit_length: false,
            stall: None,
        }
    }

    /// 200 with `declared` in the header but only `body` delivered before close.
    pub fn truncated(body: Vec<u8>, declared: u64) -> Self {
        Self {
            declared_len: Some(declared),
            ..Self::ok(body)
        }
    }

    /// 200 with no `Content-Length`; the body is delimited by closing the connection.
    pub fn r#unsized(body: Vec<u8>) -> Self {
        Self {
            omit_length: true,
            ..Self::ok(body)
        }
    }

    /// 200 that sends a prefix of a `declared`-byte body, then hangs.
    pub fn stalled(prefix: Vec<u8>, declared: u64, stall: Duration) -> Self {
        Self {
            declared_len: Some(declared),
            stall: Some(stall),
            ..Self::ok(prefix)
        }
    }
}

pub struct ImageServer {
    base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl ImageServer {
    /// Starts a server in a background thread. Unknown paths get 404.
    /// The server runs until the process exits.
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(p, r)| (p.to_string(), r))
                .collect(),
        );
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let server_hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&server_hits);
                thread::spawn(move || handle(stream, &routes, &hits));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            hits,
        }
    }

    /// Absolute URL for `path` (e.g. "/a.iso").
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<String, usize>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    let not_found = Route::status(404);
    let route = routes.get(&path).unwrap_or(&not_found);
    let length = if route.omit_length {
        String::new()
    } else {
        let declared = route.declared_len.unwrap_or(route.body.len() as u64);
        format!("Content-Length: {}\r\n", declared)
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\n{}Connection: close\r\n\r\n",
        route.status,
        reason(route.status),
        length
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&route.body);
    let _ = stream.flush();
    if let Some(stall) = route.stall {
        thread::sleep(stall);
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
