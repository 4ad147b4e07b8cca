use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::{A, AAAA, CNAME};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::BinEncodable;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

pub fn a_record(name: &str, ip: Ipv4Addr, ttl: u32) -> Record {
    Record::from_rdata(Name::from_str(name).unwrap(), ttl, RData::A(A(ip)))
}

pub fn aaaa_record(name: &str, ip: Ipv6Addr, ttl: u32) -> Record {
    Record::from_rdata(Name::from_str(name).unwrap(), ttl, RData::AAAA(AAAA(ip)))
}

pub fn cname_record(name: &str, target: &str, ttl: u32) -> Record {
    Record::from_rdata(
        Name::from_str(name).unwrap(),
        ttl,
        RData::CNAME(CNAME(Name::from_str(target).unwrap())),
    )
}

/// Wire-format response to `query_name`/`query_type` with the given answers.
pub fn dns_answer(id: u16, query_name: &str, query_type: RecordType, answers: Vec<Record>) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(query_name).unwrap());
    query.set_query_type(query_type);

    let mut message = Message::new(id, MessageType::Response, OpCode::Query);
    message.set_recursion_desired(true);
    message.set_recursion_available(true);
    message.add_query(query);
    for answer in answers {
        message.add_answer(answer);
    }
    message.to_vec().unwrap()
}

pub fn http_response(content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
        content_type,
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

pub fn json_response(body: &str) -> Vec<u8> {
    http_response("application/dns-json", body.as_bytes())
}
