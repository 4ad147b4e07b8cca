pub mod record;
pub mod record_set;
pub mod record_type;

pub use record::{RecordOwner, ResourceRecord};
pub use record_set::ResourceRecordSet;
pub use record_type::RecordType;
