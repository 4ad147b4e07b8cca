use bytes::Bytes;
use harddns_domain::{DomainError, ResourceRecord};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use std::net::IpAddr;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,

    pub rcode: ResponseCode,

    pub truncated: bool,

    /// A, AAAA and CNAME answers; other types are skipped.
    pub records: Vec<ResourceRecord>,

    /// Presentation form of every answer, for request logging.
    pub summary: String,
}

impl DnsResponse {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn is_server_error(&self) -> bool {
        matches!(
            self.rcode,
            ResponseCode::ServFail | ResponseCode::Refused | ResponseCode::NotImp
        )
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse_bytes(response_bytes: Bytes) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(&response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        let rcode = message.response_code();
        let mut records = Vec::with_capacity(message.answers().len());
        let mut summary = Vec::with_capacity(message.answers().len());

        for record in message.answers() {
            summary.push(record.to_string());
            let ttl = record.ttl();
            let owner = record.name().to_utf8();

            match record.data() {
                RData::A(a) => {
                    records.push(ResourceRecord::address(owner, IpAddr::V4(a.0), ttl));
                }
                RData::AAAA(aaaa) => {
                    records.push(ResourceRecord::address(owner, IpAddr::V6(aaaa.0), ttl));
                }
                RData::CNAME(canonical) => {
                    let target = canonical.to_utf8();
                    debug!(owner = %owner, cname = %target, "CNAME record found");
                    records.push(ResourceRecord::alias(target, ttl));
                }
                _ => {}
            }
        }

        debug!(
            rcode = ?rcode,
            records = records.len(),
            truncated = message.truncated(),
            "DNS response parsed"
        );

        Ok(DnsResponse {
            id: message.id(),
            rcode,
            truncated: message.truncated(),
            records,
            summary: summary.join("; "),
        })
    }

    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        Self::parse_bytes(Bytes::copy_from_slice(response_bytes))
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            _ => "UNKNOWN",
        }
    }
}
