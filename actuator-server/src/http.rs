//! Just enough HTTP/1.1 to accept frame posts: a request line, headers and a
//! `Content-Length` body. No chunked bodies, no pipelining.

use std::{
    fmt,
    io::{self, BufRead, Read, Write},
};

pub const MAX_BODY: usize = 1024;
const MAX_HEADERS: usize = 64;
const MAX_LINE: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug)]
pub enum RequestError {
    Io(io::Error),
    Malformed(&'static str),
    TooLarge(usize),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Io(e) => write!(f, "{e}"),
            RequestError::Malformed(what) => write!(f, "malformed request: {what}"),
            RequestError::TooLarge(len) => {
                write!(f, "body of {len} bytes exceeds {MAX_BODY}")
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl From<io::Error> for RequestError {
    fn from(e: io::Error) -> Self {
        RequestError::Io(e)
    }
}

// Reads one line of the head, refusing lines that never end.
fn read_line(reader: &mut impl BufRead, line: &mut String) -> Result<usize, RequestError> {
    line.clear();
    let read = reader.by_ref().take(MAX_LINE as u64).read_line(line)?;
    if read == MAX_LINE && !line.ends_with('\n') {
        return Err(RequestError::Malformed("header too long"));
    }
    Ok(read)
}

/// Reads the next request. `Ok(None)` when the peer closed the connection
/// between requests.
pub fn read_request(reader: &mut impl BufRead) -> Result<Option<Request>, RequestError> {
    let mut line = String::new();
    if read_line(reader, &mut line)? == 0 {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let (Some(method), Some(path), Some(_version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(RequestError::Malformed("request line"));
    };
    let method = method.to_string();
    let path = path.to_string();

    let mut headers = Vec::new();
    loop {
        if read_line(reader, &mut line)? == 0 {
            return Err(RequestError::Malformed("headers ended early"));
        }

        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if headers.len() == MAX_HEADERS {
            return Err(RequestError::Malformed("too many headers"));
        }

        let (key, value) = header
            .split_once(':')
            .ok_or(RequestError::Malformed("header"))?;
        headers.push((key.trim().to_string(), value.trim().to_string()));
    }

    let mut request = Request {
        method,
        path,
        headers,
        body: Vec::new(),
    };

    let len = match request.header("Content-Length") {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| RequestError::Malformed("content length"))?,
        None => 0,
    };
    if len > MAX_BODY {
        return Err(RequestError::TooLarge(len));
    }

    request.body.resize(len, 0);
    reader.read_exact(&mut request.body)?;

    Ok(Some(request))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into().into_bytes(),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            405 => "Method Not Allowed",
            413 => "Payload Too Large",
            _ => "Internal Server Error",
        }
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        write!(
            writer,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len()
        )?;
        writer.write_all(&self.body)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn reads_post_with_body() {
        let mut input = Cursor::new(
            b"POST / HTTP/1.1\r\nHost: 127.0.0.1:7070\r\ncontent-type: application/octet-stream\r\nContent-Length: 3\r\n\r\n\x01\x02\x03"
                .to_vec(),
        );

        let request = read_request(&mut input).unwrap().unwrap();

        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/");
        assert_eq!(
            request.header("Content-Type"),
            Some("application/octet-stream")
        );
        assert_eq!(request.body, vec![1, 2, 3]);
        assert!(read_request(&mut input).unwrap().is_none());
    }

    #[test]
    fn reads_back_to_back_requests() {
        let mut input = Cursor::new(
            b"POST / HTTP/1.1\r\nContent-Length: 1\r\n\r\nAGET /status HTTP/1.1\r\n\r\n".to_vec(),
        );

        assert_eq!(read_request(&mut input).unwrap().unwrap().body, b"A");
        let second = read_request(&mut input).unwrap().unwrap();
        assert_eq!(second.method, "GET");
        assert!(second.body.is_empty());
    }

    #[test]
    fn rejects_oversized_body() {
        let mut input = Cursor::new(b"POST / HTTP/1.1\r\nContent-Length: 4096\r\n\r\n".to_vec());
        assert!(matches!(
            read_request(&mut input),
            Err(RequestError::TooLarge(4096))
        ));
    }

    #[test]
    fn rejects_endless_header_line() {
        let mut head = b"POST / HTTP/1.1\r\nX-Junk: ".to_vec();
        head.resize(head.len() + 8 * 1024 * 1024, b'a');
        head.extend_from_slice(b"\r\nContent-Length: 0\r\n\r\n");
        let mut input = Cursor::new(head);

        assert!(matches!(
            read_request(&mut input),
            Err(RequestError::Malformed("header too long"))
        ));
    }

    #[test]
    fn accepts_header_under_line_limit() {
        let mut head = b"POST / HTTP/1.1\r\nX-Pad: ".to_vec();
        head.resize(head.len() + 4000, b'a');
        head.extend_from_slice(b"\r\nContent-Length: 0\r\n\r\n");
        let mut input = Cursor::new(head);

        let request = read_request(&mut input).unwrap().unwrap();
        assert_eq!(request.header("X-Pad").map(str::len), Some(4000));
    }

    #[test]
    fn rejects_garbage() {
        let mut input = Cursor::new(b"hello\r\n\r\n".to_vec());
        assert!(matches!(
            read_request(&mut input),
            Err(RequestError::Malformed(_))
        ));
    }

    #[test]
    fn writes_status_and_length() {
        let mut output = Vec::new();
        Response::text(405, "POST only")
            .write_to(&mut output)
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "HTTP/1.1 405 Method Not Allowed\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: 9\r\n\r\nPOST only"
        );
    }
}
