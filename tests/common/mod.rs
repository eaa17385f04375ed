//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use consensus_watchdog::watchdog::ProcessExit;

/// One request as seen by the mock node.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Requests received so far, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn count(&self, method: &str) -> usize {
        self.all().iter().filter(|r| r.method == method).count()
    }
}

/// Start a programmable mock node on an ephemeral port.
///
/// `f` receives the request method and returns `(status, body)`.
pub async fn start_programmable_node<F, Fut>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = RequestLog::default();
    let f = Arc::new(f);

    let requests = log.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_head(&mut socket).await else {
                            return;
                        };
                        let method = request.method.clone();
                        requests.0.lock().unwrap().push(request);

                        let (status, body) = f(method).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            403 => "403 Forbidden",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| {
            let (k, v) = line.split_once(':')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect();

    Some(RecordedRequest { method, target, headers })
}

/// Records exit codes instead of terminating the test process.
#[derive(Default)]
pub struct RecordingExit {
    codes: Mutex<Vec<i32>>,
}

impl RecordingExit {
    #[allow(dead_code)]
    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().unwrap().clone()
    }
}

impl ProcessExit for RecordingExit {
    fn exit(&self, code: i32) {
        self.codes.lock().unwrap().push(code);
    }
}
