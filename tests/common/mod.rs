//! Minimal HTTP server standing in for the CMS.
//!
//! Each test gives it a routing function from request target
//! (`/api/posts?page=1&...`) to `(status, body)`. Every target served is
//! recorded so tests can assert what the client asked for.

#![allow(dead_code)]

use folio_cms::config::ContentConfig;
use std::io::{Read as _, Write as _};
use std::net::TcpListener;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub type Route = dyn Fn(&str) -> (u16, String) + Send + Sync;

pub struct CmsServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    _stop: std::sync::mpsc::Sender<()>,
}

impl CmsServer {
    pub fn start<F>(route: F) -> Self
    where
        F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let route: Arc<Route> = Arc::new(route);

        let log = requests.clone();
        thread::spawn(move || {
            listener.set_nonblocking(true).unwrap();
            loop {
                if rx.try_recv().is_ok() {
                    break;
                }
                match listener.accept() {
                    Ok((stream, _)) => {
                        let route = route.clone();
                        let log = log.clone();
                        thread::spawn(move || serve_request(stream, &*route, &log));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            port,
            requests,
            _stop: tx,
        }
    }

    pub fn origin(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn api_url(&self) -> String {
        format!("{}/api", self.origin())
    }

    /// Decoded request targets, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve_request(mut stream: std::net::TcpStream, route: &Route, log: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(n) if n > 0 => n,
        _ => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let target = decode(request.split_whitespace().nth(1).unwrap_or("/"));
    log.lock().unwrap().push(target.clone());

    let (status, body) = route(&target);
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        _ => "Error",
    };
    let header = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body.as_bytes());
}

/// Undo the percent-encoding reqwest applies to query keys and values.
fn decode(target: &str) -> String {
    target
        .replace("%5B", "[")
        .replace("%5D", "]")
        .replace("%2F", "/")
        .replace("%3A", ":")
        .replace('+', " ")
        .replace("%20", " ")
}

/// Value of `key` in a decoded request target.
pub fn query_param<'a>(target: &'a str, key: &str) -> Option<&'a str> {
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures/cms")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

/// Config pointing at `server` with the CMS enabled.
pub fn config_for(server: &CmsServer, snapshot: &Path) -> ContentConfig {
    let mut config = ContentConfig::default();
    config.cms.enabled = true;
    config.cms.api_url = server.api_url();
    config.cms.timeout_secs = 5;
    config.snapshot.location = snapshot.display().to_string();
    config
}
