//! Query messages in wire format, used as the RFC 8484 `dns` parameter and
//! as the datagram sent to internal-domain servers.

use super::record_type_map::RecordTypeMapper;
use harddns_domain::{DomainError, RecordType};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

/// RFC 8484 §4.1: GET requests use ID 0 so identical queries stay cacheable.
pub const DOH_MESSAGE_ID: u16 = 0;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Recursive query (RD set) with a single IN question.
    pub fn build_query(
        domain: &str,
        record_type: &RecordType,
        id: u16,
    ) -> Result<Vec<u8>, DomainError> {
        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(Self::question(domain, record_type)?);

        let mut buf = Vec::with_capacity(128);
        message
            .emit(&mut BinEncoder::new(&mut buf))
            .map_err(|e| DomainError::InvalidDomainName(format!("{}: {}", domain, e)))?;
        Ok(buf)
    }

    /// Same as [`build_query`](Self::build_query) with a random ID, returned
    /// for matching the reply.
    pub fn build_query_with_id(
        domain: &str,
        record_type: &RecordType,
    ) -> Result<(u16, Vec<u8>), DomainError> {
        let id = fastrand::u16(..);
        Ok((id, Self::build_query(domain, record_type, id)?))
    }

    fn question(domain: &str, record_type: &RecordType) -> Result<Query, DomainError> {
        if domain.trim_end_matches('.').is_empty() {
            return Err(DomainError::InvalidDomainName(domain.to_string()));
        }
        let mut name = Name::from_ascii(domain)
            .map_err(|e| DomainError::InvalidDomainName(format!("'{}': {}", domain, e)))?;
        name.set_fqdn(true);

        let mut query = Query::query(name, RecordTypeMapper::to_hickory(record_type));
        query.set_query_class(DNSClass::IN);
        Ok(query)
    }
}
