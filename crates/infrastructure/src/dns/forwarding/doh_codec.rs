//! DoH query codec: query → HTTP request, HTTP response → typed records.

use super::http_framing::{self, HttpResponse};
use super::json_parser;
use super::message_builder::{MessageBuilder, DOH_MESSAGE_ID};
use super::response_parser::ResponseParser;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use harddns_application::ports::{DnsTransport, UpstreamAnswer};
use harddns_domain::{DnsQuery, DomainError, UpstreamConfig};
use std::time::Duration;
use tracing::{debug, warn};

/// Expected content type for DNS-over-HTTPS responses (RFC 8484 §4.2.1)
pub const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";
pub const DNS_JSON_CONTENT_TYPE: &str = "application/dns-json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DohFormat {
    /// RFC 8484: `GET path?dns=<base64url wire message>`
    Wire,
    /// JSON API: `GET path?name=<name>&type=<A|AAAA>`
    Json,
}

impl DohFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            DohFormat::Wire => DNS_MESSAGE_CONTENT_TYPE,
            DohFormat::Json => DNS_JSON_CONTENT_TYPE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DohCodec {
    host: String,
    path: String,
    format: DohFormat,
}

impl DohCodec {
    pub fn new(host: impl Into<String>, path: impl Into<String>, format: DohFormat) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            format,
        }
    }

    pub fn for_upstream(upstream: &UpstreamConfig) -> Self {
        let format = if upstream.rfc8484 {
            DohFormat::Wire
        } else {
            DohFormat::Json
        };
        Self::new(&upstream.host, &upstream.path, format)
    }

    pub fn format(&self) -> DohFormat {
        self.format
    }

    /// Path and query string of the request for `query`.
    pub fn request_target(&self, query: &DnsQuery) -> Result<String, DomainError> {
        let separator = if self.path.contains('?') { '&' } else { '?' };
        let params = match self.format {
            DohFormat::Wire => {
                let wire =
                    MessageBuilder::build_query(&query.domain, &query.record_type, DOH_MESSAGE_ID)?;
                format!("dns={}", URL_SAFE_NO_PAD.encode(wire))
            }
            DohFormat::Json => json_parser::query_string(query),
        };
        Ok(format!("{}{}{}", self.path, separator, params))
    }

    pub fn encode(&self, query: &DnsQuery) -> Result<Vec<u8>, DomainError> {
        let target = self.request_target(query)?;
        http_framing::build_get(&self.host, &target, self.format.content_type())
    }

    pub fn decode(
        &self,
        query: &DnsQuery,
        response: &HttpResponse,
    ) -> Result<UpstreamAnswer, DomainError> {
        if !response.status.is_success() {
            warn!(
                host = %self.host,
                status = response.status.as_u16(),
                body = %String::from_utf8_lossy(&response.body),
                "DoH upstream returned an error status"
            );
            return Err(DomainError::HttpStatus {
                status: response.status.as_u16(),
            });
        }

        match self.format {
            DohFormat::Wire => {
                let parsed = ResponseParser::parse_bytes(response.body.clone())?;
                if parsed.is_server_error() {
                    return Err(DomainError::InvalidDnsResponse(format!(
                        "Upstream answered {} for {}",
                        ResponseParser::rcode_to_status(parsed.rcode),
                        query.domain
                    )));
                }
                Ok(UpstreamAnswer::new(parsed.records, parsed.summary))
            }
            DohFormat::Json => {
                let records = json_parser::parse(&response.body).inspect_err(|e| {
                    warn!(
                        error = %e,
                        body = %String::from_utf8_lossy(&response.body),
                        "Unparseable JSON answer"
                    )
                })?;
                Ok(UpstreamAnswer::new(records, response.body.clone()))
            }
        }
    }

    /// One request/response round trip over an established transport.
    pub fn exchange(
        &self,
        transport: &mut dyn DnsTransport,
        query: &DnsQuery,
        timeout: Duration,
    ) -> Result<UpstreamAnswer, DomainError> {
        let request = self.encode(query)?;
        transport.send(&request, timeout)?;
        let response = http_framing::read_response(transport, timeout)?;

        if !response.keep_alive() {
            debug!(host = %self.host, "Upstream closes the session after this response");
            transport.close();
        }

        self.decode(query, &response)
    }
}
