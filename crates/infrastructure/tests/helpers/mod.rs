#![allow(dead_code)]
pub mod pki;
pub mod scripted_transport;
pub mod tls_server;
pub mod wire;

pub use pki::{TestCa, TestLeaf};
pub use scripted_transport::ScriptedTransport;
pub use tls_server::{spawn_counting_tls_server, spawn_tls_server, ServerCounters, ServerScript};
pub use wire::{a_record, aaaa_record, cname_record, dns_answer, http_response, json_response};
