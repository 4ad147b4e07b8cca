//! DNS JSON API (`application/dns-json`) responses.

use harddns_domain::{DnsQuery, DomainError, RecordType, ResourceRecord};
use serde::Deserialize;
use std::net::{Ipv4Addr, Ipv6Addr};

const STATUS_NOERROR: u16 = 0;
const STATUS_NXDOMAIN: u16 = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JsonResponse {
    status: u16,
    #[serde(default)]
    answer: Vec<JsonAnswer>,
}

#[derive(Debug, Deserialize)]
struct JsonAnswer {
    name: String,
    #[serde(rename = "type")]
    record_type: u16,
    #[serde(rename = "TTL", default)]
    ttl: u32,
    data: String,
}

/// Parse a JSON API body into records. NXDOMAIN yields no records; any
/// other non-zero status is a codec failure.
pub fn parse(body: &[u8]) -> Result<Vec<ResourceRecord>, DomainError> {
    let response: JsonResponse = serde_json::from_slice(body)
        .map_err(|e| DomainError::InvalidDnsResponse(format!("Malformed JSON answer: {}", e)))?;

    match response.status {
        STATUS_NOERROR => {}
        STATUS_NXDOMAIN => return Ok(Vec::new()),
        status => {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Upstream answered status {}",
                status
            )))
        }
    }

    let mut records = Vec::with_capacity(response.answer.len());
    for answer in response.answer {
        let Some(record_type) = RecordType::from_u16(answer.record_type) else {
            continue;
        };
        let data = answer.data.trim();
        let record = match record_type {
            RecordType::A => {
                let ip: Ipv4Addr = data.parse().map_err(|_| bad_address(&answer.name, data))?;
                ResourceRecord::address(&answer.name, ip.into(), answer.ttl)
            }
            RecordType::AAAA => {
                let ip: Ipv6Addr = data.parse().map_err(|_| bad_address(&answer.name, data))?;
                ResourceRecord::address(&answer.name, ip.into(), answer.ttl)
            }
            RecordType::CNAME => ResourceRecord::alias(data, answer.ttl),
        };
        records.push(record);
    }
    Ok(records)
}

/// Query string for the JSON API: `name=<name>&type=<A|AAAA>`.
pub fn query_string(query: &DnsQuery) -> String {
    format!(
        "name={}&type={}",
        percent_encode(&query.domain),
        query.record_type.as_str()
    )
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn bad_address(owner: &str, data: &str) -> DomainError {
    DomainError::InvalidDnsResponse(format!("Bad address '{}' for {}", data, owner))
}
