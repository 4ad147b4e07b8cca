//! harddns application layer: upstream port and the resolution use case.
pub mod ports;
pub mod use_cases;
