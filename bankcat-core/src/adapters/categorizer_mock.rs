//! Mock categorization server for testing
//!
//! Serves `POST /categorize` on a random local port with the same
//! envelope as the real service: `{ "data": [...] }`. Categories are
//! assigned from keywords in the description.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use serde::Serialize;

use crate::domain::Transaction;

/// Mock categorization server
pub struct MockCategorizerServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// How the mock responds
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Respond with this HTTP status and an error body
    pub fail_status: Option<u16>,
    /// Respond 200 with a body lacking the `data` field
    pub missing_envelope: bool,
    /// Drop the last record from the response
    pub drop_last: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

#[derive(Serialize)]
struct CategorizeResponse {
    data: Vec<Transaction>,
}

const KEYWORDS: &[(&str, &str)] = &[
    ("grocery", "Groceries"),
    ("gas", "Transportation"),
    ("restaurant", "Dining"),
    ("salary", "Income"),
];

fn category_for(description: &str) -> &'static str {
    let lower = description.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or("Other")
}

impl MockCategorizerServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(AtomicUsize::new(0));

        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        requests_clone.fetch_add(1, Ordering::SeqCst);
                        let cfg = config.clone();
                        thread::spawn(move || handle_connection(stream, &cfg));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Base URL to hand to the HTTP categorizer
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api/", self.port)
    }

    /// Number of connections accepted so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockCategorizerServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(stream: TcpStream, config: &MockConfig) {
    let _ = stream.set_nonblocking(false);
    let mut reader = match stream.try_clone() {
        Ok(s) => BufReader::new(s),
        Err(_) => return,
    };
    let mut stream = stream;

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    }

    if let Some(status) = config.fail_status {
        send_response(&mut stream, status, "Error", r#"{"error": "Categorization failed"}"#);
        return;
    }

    match (parts[0], parts[1]) {
        ("POST", "/api/categorize") => {
            let transactions: Vec<Transaction> = match serde_json::from_slice(&body) {
                Ok(txs) => txs,
                Err(_) => {
                    send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid body"}"#);
                    return;
                }
            };

            if config.missing_envelope {
                send_response(&mut stream, 200, "OK", r#"{"result": []}"#);
                return;
            }

            let mut data: Vec<Transaction> = transactions
                .iter()
                .map(|tx| tx.with_category(category_for(&tx.description)))
                .collect();
            if config.drop_last {
                data.pop();
            }

            let json = serde_json::to_string(&CategorizeResponse { data }).unwrap_or_default();
            send_response(&mut stream, 200, "OK", &json);
        }
        (_, "/api/categorize") => {
            send_response(
                &mut stream,
                405,
                "Method Not Allowed",
                r#"{"error": "Method not allowed"}"#,
            );
        }
        _ => {
            send_response(
                &mut stream,
                404,
                "Not Found",
                r#"{"error": "Endpoint not found"}"#,
            );
        }
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::HttpCategorizer;
    use crate::domain::result::Error;
    use crate::domain::Amount;
    use crate::ports::Categorizer;

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::new("2023-06-01", "Grocery Store", Amount::parse("-50.00")),
            Transaction::new("2023-06-02", "Gas Station", Amount::parse("-30.00")),
            Transaction::new("2023-06-03", "Mystery", Amount::parse("n/a")),
        ]
    }

    #[test]
    fn test_categorize_round_trip() {
        let server = MockCategorizerServer::start(MockConfig::default()).unwrap();
        let categorizer = HttpCategorizer::new(&server.base_url()).unwrap();

        let input = sample();
        let output = categorizer.categorize(&input).unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(output[0].id, input[0].id);
        assert_eq!(output[0].category.as_deref(), Some("Groceries"));
        assert_eq!(output[1].category.as_deref(), Some("Transportation"));
        assert_eq!(output[2].category.as_deref(), Some("Other"));
        assert!(!output[2].amount.is_parsed());
        assert_eq!(output[0].amount.to_string(), "-50");
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let server = MockCategorizerServer::start(MockConfig::default()).unwrap();
        let categorizer = HttpCategorizer::new(&server.base_url()).unwrap();
        assert!(categorizer.categorize(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_server_error_is_categorization_failure() {
        let server = MockCategorizerServer::start(MockConfig {
            fail_status: Some(500),
            ..Default::default()
        })
        .unwrap();
        let categorizer = HttpCategorizer::new(&server.base_url()).unwrap();

        let err = categorizer.categorize(&sample()).unwrap_err();
        assert!(matches!(err, Error::Categorization(_)));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_missing_envelope_is_categorization_failure() {
        let server = MockCategorizerServer::start(MockConfig {
            missing_envelope: true,
            ..Default::default()
        })
        .unwrap();
        let categorizer = HttpCategorizer::new(&server.base_url()).unwrap();

        let err = categorizer.categorize(&sample()).unwrap_err();
        assert!(matches!(err, Error::Categorization(_)));
    }

    #[test]
    fn test_wrong_path_is_categorization_failure() {
        let server = MockCategorizerServer::start(MockConfig::default()).unwrap();
        let base = server.base_url().replace("/api/", "/v2/");
        let categorizer = HttpCategorizer::new(&base).unwrap();

        let err = categorizer.categorize(&sample()).unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_unreachable_service() {
        // Bind then drop to get a port with nothing listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let categorizer = HttpCategorizer::new(&format!("http://127.0.0.1:{}/api/", port)).unwrap();

        let err = categorizer.categorize(&sample()).unwrap_err();
        assert!(matches!(err, Error::Categorization(_)));
    }

    #[test]
    fn test_short_response_passes_through() {
        let server = MockCategorizerServer::start(MockConfig {
            drop_last: true,
            ..Default::default()
        })
        .unwrap();
        let categorizer = HttpCategorizer::new(&server.base_url()).unwrap();

        let output = categorizer.categorize(&sample()).unwrap();
        assert_eq!(output.len(), 2);
    }
}
