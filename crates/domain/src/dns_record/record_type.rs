use std::fmt;
use std::str::FromStr;

/// Record types the resolver asks for or follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
        }
    }

    /// Convert from wire format number (RFC 1035). Unknown types yield `None`.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(RecordType::A),
            5 => Some(RecordType::CNAME),
            28 => Some(RecordType::AAAA),
            _ => None,
        }
    }

    /// Convert to wire format number
    pub fn to_u16(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::CNAME => 5,
            RecordType::AAAA => 28,
        }
    }

    /// Query type tag in network byte order, as carried in a DNS question.
    pub fn to_wire(&self) -> [u8; 2] {
        self.to_u16().to_be_bytes()
    }

    pub fn is_address(&self) -> bool {
        matches!(self, RecordType::A | RecordType::AAAA)
    }

    /// Width of the raw address data for address types.
    pub fn address_len(&self) -> Option<usize> {
        match self {
            RecordType::A => Some(4),
            RecordType::AAAA => Some(16),
            RecordType::CNAME => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            "CNAME" => Ok(RecordType::CNAME),
            other => Err(format!("Unsupported record type: {}", other)),
        }
    }
}
