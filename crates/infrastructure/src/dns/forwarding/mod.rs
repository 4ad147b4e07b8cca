pub mod doh_codec;
pub mod http_framing;
pub mod json_parser;
pub mod message_builder;
pub mod record_type_map;
pub mod response_parser;

pub use doh_codec::{DohCodec, DohFormat};
pub use http_framing::{read_response, HttpResponse, ResponseReader};
pub use message_builder::MessageBuilder;
pub use record_type_map::RecordTypeMapper;
pub use response_parser::{DnsResponse, ResponseParser};
