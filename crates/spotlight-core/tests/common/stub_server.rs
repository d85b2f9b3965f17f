//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes are keyed by request path (query string ignored), optionally
//! narrowed by one query parameter value. Every request is counted per path,
//! and the headers of the latest request to each path are kept, so tests can
//! assert which endpoints were hit and what was sent.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Route table: `(path, Some(("ctry", "de")))` matches only that query value;
/// `(path, None)` matches any query.
pub type Routes = Vec<(String, Option<(String, String)>, Route)>;

/// Header names lowercased.
type Headers = HashMap<String, String>;

#[derive(Default)]
struct Seen {
    hits: HashMap<String, usize>,
    last_headers: HashMap<String, Headers>,
}

#[derive(Clone)]
pub struct StubServer {
    pub base: String,
    seen: Arc<Mutex<Seen>>,
}

impl StubServer {
    /// Requests served for `path` so far.
    pub fn hits(&self, path: &str) -> usize {
        self.seen.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }

    /// Value of header `name` (any case) on the latest request for `path`.
    pub fn last_header(&self, path: &str, name: &str) -> Option<String> {
        self.seen
            .lock()
            .unwrap()
            .last_headers
            .get(path)
            .and_then(|h| h.get(&name.to_ascii_lowercase()))
            .cloned()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

/// Starts the server on an ephemeral port in a background thread.
/// `make_routes` receives the base URL (e.g. "http://127.0.0.1:12345") so
/// bodies can link back to the server. It runs until the process exits.
pub fn start(make_routes: impl FnOnce(&str) -> Routes) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base = format!("http://127.0.0.1:{}", port);
    let routes = Arc::new(make_routes(&base));
    let seen = Arc::new(Mutex::new(Seen::default()));
    let server_seen = Arc::clone(&seen);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let seen = Arc::clone(&server_seen);
            thread::spawn(move || handle(stream, &routes, &seen));
        }
    });
    StubServer { base, seen }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &Routes,
    seen: &Mutex<Seen>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut lines = request.lines();
    let target = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let headers: Headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let (path, query) = target.split_once('?').unwrap_or((target.as_str(), ""));
    {
        let mut seen = seen.lock().unwrap();
        *seen.hits.entry(path.to_string()).or_insert(0) += 1;
        seen.last_headers.insert(path.to_string(), headers);
    }

    let params: HashMap<&str, &str> = query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .collect();
    let route = routes.iter().find(|(p, filter, _)| {
        p == path
            && match filter {
                Some((k, v)) => params.get(k.as_str()) == Some(&v.as_str()),
                None => true,
            }
    });

    let (status, body): (u16, &[u8]) = match route {
        Some((_, _, r)) => (r.status, r.body.as_slice()),
        None => (404, &b"not found"[..]),
    };
    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}
