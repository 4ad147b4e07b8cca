//! Minimal HTTP/1.1 client framing for DoH over a keep-alive session.
//!
//! `httparse` tokenizes the response head and chunk size lines; the `http`
//! crate carries the typed status and headers.

use bytes::{Bytes, BytesMut};
use harddns_application::ports::DnsTransport;
use harddns_domain::DomainError;
use http::header::{ACCEPT, CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Upper bound for one buffered response, headers included.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

const MAX_HEADERS: usize = 64;
const CRLF: &[u8] = b"\r\n";

/// Serialize a `GET target` request for `host`.
pub fn build_get(host: &str, target: &str, accept: &str) -> Result<Vec<u8>, DomainError> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(target)
        .header(HOST, host)
        .header(ACCEPT, accept)
        .header(USER_AGENT, concat!("harddns/", env!("CARGO_PKG_VERSION")))
        .header(CONNECTION, "keep-alive")
        .body(())
        .map_err(|e| DomainError::InvalidHttpResponse(format!("Bad request: {}", e)))?;

    let mut out = Vec::with_capacity(256 + target.len());
    out.extend_from_slice(
        format!("{} {} HTTP/1.1\r\n", request.method(), request.uri()).as_bytes(),
    );
    for (name, value) in request.headers() {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(CRLF);
    }
    out.extend_from_slice(CRLF);
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    /// False when the server announced it will close the connection.
    pub fn keep_alive(&self) -> bool {
        !self
            .headers
            .get_all(CONNECTION)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.eq_ignore_ascii_case("close"))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Accumulates received bytes until one complete response is buffered.
#[derive(Debug, Default)]
pub struct ResponseReader {
    buf: BytesMut,
}

impl ResponseReader {
    pub fn feed(&mut self, data: &[u8]) -> Result<(), DomainError> {
        if self.buf.len() + data.len() > MAX_RESPONSE_BYTES {
            return Err(DomainError::InvalidHttpResponse(format!(
                "response exceeds {} bytes",
                MAX_RESPONSE_BYTES
            )));
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// `Ok(None)` while more bytes are needed.
    pub fn try_parse(&self) -> Result<Option<HttpResponse>, DomainError> {
        let mut raw = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut parsed = httparse::Response::new(&mut raw);
        let head_len = match parsed.parse(&self.buf) {
            Ok(httparse::Status::Complete(len)) => len,
            Ok(httparse::Status::Partial) => return Ok(None),
            Err(e) => return Err(invalid(&format!("malformed response head: {}", e))),
        };

        let code = parsed.code.ok_or_else(|| invalid("missing status code"))?;
        let status =
            StatusCode::from_u16(code).map_err(|_| invalid(&format!("bad status code {}", code)))?;
        let mut headers = HeaderMap::with_capacity(parsed.headers.len());
        for header in parsed.headers.iter() {
            let name = HeaderName::from_bytes(header.name.as_bytes())
                .map_err(|_| invalid(&format!("bad header name '{}'", header.name)))?;
            let value = HeaderValue::from_bytes(header.value)
                .map_err(|_| invalid(&format!("bad value for header '{}'", header.name)))?;
            headers.append(name, value);
        }

        let rest = &self.buf[head_len..];
        let body = if is_chunked(&headers) {
            match decode_chunked(rest)? {
                Some(body) => Bytes::from(body),
                None => return Ok(None),
            }
        } else if let Some(length) = content_length(&headers)? {
            if rest.len() < length {
                return Ok(None);
            }
            Bytes::copy_from_slice(&rest[..length])
        } else if status.is_informational()
            || status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_MODIFIED
        {
            Bytes::new()
        } else {
            return Err(invalid("response has neither Content-Length nor chunked body"));
        };

        Ok(Some(HttpResponse {
            status,
            headers,
            body,
        }))
    }
}

/// Read one response from `transport`, each receive bounded by `timeout`.
pub fn read_response(
    transport: &mut dyn DnsTransport,
    timeout: Duration,
) -> Result<HttpResponse, DomainError> {
    let mut reader = ResponseReader::default();
    loop {
        if let Some(response) = reader.try_parse()? {
            debug!(
                status = response.status.as_u16(),
                body_len = response.body.len(),
                "HTTP response received"
            );
            return Ok(response);
        }
        let chunk = transport.receive(timeout)?;
        reader.feed(&chunk)?;
    }
}

fn is_chunked(headers: &HeaderMap) -> bool {
    headers
        .get_all(TRANSFER_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.to_ascii_lowercase().contains("chunked"))
}

fn content_length(headers: &HeaderMap) -> Result<Option<usize>, DomainError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(None);
    };
    let length = value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .ok_or_else(|| invalid("bad Content-Length"))?;
    if length > MAX_RESPONSE_BYTES {
        return Err(invalid(&format!("Content-Length {} too large", length)));
    }
    Ok(Some(length))
}

/// `Ok(None)` until the terminating zero-size chunk and its trailer end
/// have arrived.
fn decode_chunked(data: &[u8]) -> Result<Option<Vec<u8>>, DomainError> {
    let mut body = Vec::new();
    let mut pos = 0;
    loop {
        let (line_len, size) = match httparse::parse_chunk_size(&data[pos..]) {
            Ok(httparse::Status::Complete(parsed)) => parsed,
            Ok(httparse::Status::Partial) => return Ok(None),
            Err(_) => return Err(invalid("bad chunk size line")),
        };
        let size = usize::try_from(size)
            .ok()
            .filter(|&size| size <= MAX_RESPONSE_BYTES)
            .ok_or_else(|| invalid(&format!("chunk size {} too large", size)))?;
        pos += line_len;

        if size == 0 {
            // Trailer section ends with an empty line.
            loop {
                let Some(trailer_len) = find(&data[pos..], CRLF) else {
                    return Ok(None);
                };
                pos += trailer_len + CRLF.len();
                if trailer_len == 0 {
                    return Ok(Some(body));
                }
            }
        }

        let chunk_end = pos
            .checked_add(size)
            .ok_or_else(|| invalid("chunk size overflows"))?;
        let Some(crlf_end) = chunk_end.checked_add(CRLF.len()) else {
            return Err(invalid("chunk size overflows"));
        };
        if data.len() < crlf_end {
            return Ok(None);
        }
        if &data[chunk_end..crlf_end] != CRLF {
            return Err(invalid("chunk not terminated by CRLF"));
        }
        body.extend_from_slice(&data[pos..chunk_end]);
        pos = crlf_end;
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn invalid(reason: &str) -> DomainError {
    DomainError::InvalidHttpResponse(reason.to_string())
}
