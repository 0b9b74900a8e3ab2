//! A scripted HTTP/1.1 server on `127.0.0.1:0`.
//!
//! Each accepted connection gets the next scripted response and is closed.
//! Requests are recorded before the response goes out, so by the time a
//! client sees its answer the request is visible through
//! [`StubServer::requests`].

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn created(body: impl Into<String>) -> Self {
        Self::new(201, body)
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Header value, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether the multipart body has a part with this name.
    pub fn has_part(&self, name: &str) -> bool {
        self.body_text().contains(&format!("name=\"{name}\""))
    }

    /// Filename attached to a file part.
    pub fn part_filename(&self, name: &str) -> Option<String> {
        let body = self.body_text();
        let marker = format!("name=\"{name}\"; filename=\"");
        let start = body.find(&marker)? + marker.len();
        let end = body[start..].find('"')?;
        Some(body[start..start + end].to_string())
    }

    /// Value of a plain form field.
    pub fn field(&self, name: &str) -> Option<String> {
        let body = self.body_text();
        let marker = format!("name=\"{name}\"\r\n\r\n");
        let start = body.find(&marker)? + marker.len();
        let end = body[start..].find("\r\n--")?;
        Some(body[start..start + end].to_string())
    }
}

pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Serve `responses` in order. Connections past the end of the script
    /// get a 500.
    pub fn start(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            let mut script = responses.into_iter();
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let response = script
                    .next()
                    .unwrap_or_else(|| StubResponse::new(500, "no scripted response"));
                if let Ok(request) = read_request(&mut stream) {
                    recorded.lock().unwrap().push(request);
                }
                let _ = write_response(&mut stream, &response);
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request(stream: &mut TcpStream) -> io::Result<RecordedRequest> {
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut line = String::new();
    reader.read_line(&mut line)?;
    let mut request_line = line.split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let header = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    };

    let mut body = Vec::new();
    if let Some(len) = header("content-length").and_then(|v| v.parse::<usize>().ok()) {
        body.resize(len, 0);
        reader.read_exact(&mut body)?;
    } else if header("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        read_chunked(&mut reader, &mut body)?;
    }

    Ok(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn read_chunked(reader: &mut impl BufRead, body: &mut Vec<u8>) -> io::Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        reader.read_line(&mut line)?;
        let size_field = line.trim().split(';').next().unwrap_or_default();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if size == 0 {
            // Trailers end with an empty line.
            loop {
                line.clear();
                if reader.read_line(&mut line)? == 0 || line.trim().is_empty() {
                    return Ok(());
                }
            }
        }
        let start = body.len();
        body.resize(start + size, 0);
        reader.read_exact(&mut body[start..])?;
        let mut crlf = [0u8; 2];
        reader.read_exact(&mut crlf)?;
    }
}

fn write_response(stream: &mut TcpStream, response: &StubResponse) -> io::Result<()> {
    let reason = match response.status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason,
        response.body.len(),
        response.body
    )?;
    stream.flush()?;
    stream.shutdown(Shutdown::Write)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_script_in_order_and_records_requests() {
        let server = StubServer::start(vec![
            StubResponse::created("{}"),
            StubResponse::new(500, "down"),
        ]);
        let addr = server.addr;

        let send = |body: &str| {
            let mut stream = TcpStream::connect(addr).unwrap();
            write!(
                stream,
                "POST /api/2/apps/upload HTTP/1.1\r\nHost: x\r\nX-Token: t\r\nContent-Length: {}\r\n\r\n{}",
                body.len(),
                body
            )
            .unwrap();
            let mut answer = String::new();
            stream.read_to_string(&mut answer).unwrap();
            answer
        };

        assert!(send("one").starts_with("HTTP/1.1 201 Created"));
        let second = send("two");
        assert!(second.starts_with("HTTP/1.1 500"));
        assert!(second.ends_with("down"));
        assert!(send("three").contains("no scripted response"));

        let requests = server.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/api/2/apps/upload");
        assert_eq!(requests[0].header("x-token"), Some("t"));
        assert_eq!(requests[1].body_text(), "two");
    }

    #[test]
    fn decodes_chunked_bodies() {
        let server = StubServer::start(vec![StubResponse::created("{}")]);
        let mut stream = TcpStream::connect(server.addr).unwrap();
        stream
            .write_all(
                b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nabcd\r\n2\r\nef\r\n0\r\n\r\n",
            )
            .unwrap();
        let mut answer = String::new();
        stream.read_to_string(&mut answer).unwrap();

        assert_eq!(server.requests()[0].body_text(), "abcdef");
    }

    #[test]
    fn multipart_helpers() {
        let request = RecordedRequest {
            method: "POST".into(),
            path: "/".into(),
            headers: vec![],
            body: b"--b\r\nContent-Disposition: form-data; name=\"notes\"\r\n\r\nhello\r\n--b\r\nContent-Disposition: form-data; name=\"ipa\"; filename=\"app.apk\"\r\n\r\nPK\r\n--b--\r\n".to_vec(),
        };
        assert_eq!(request.field("notes").as_deref(), Some("hello"));
        assert_eq!(request.part_filename("ipa").as_deref(), Some("app.apk"));
        assert!(request.has_part("ipa"));
        assert!(!request.has_part("dsym"));
    }
}
