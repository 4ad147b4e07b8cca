//! `struct gaih_addrtuple` list, as filled by `gethostbyname4_r`.

use super::{align, leading_pad, Arena};
use harddns_application::use_cases::Resolution;
use harddns_domain::{AddressFamily, DomainError, RecordType};
use libc::{c_char, c_int};
use std::mem::{offset_of, size_of};

/// glibc's `struct gaih_addrtuple` (nss.h).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GaihAddrTuple {
    pub next: *mut GaihAddrTuple,
    pub name: *mut c_char,
    pub family: c_int,
    /// Address in network byte order; IPv4 uses the first word only.
    pub addr: [u32; 4],
    pub scopeid: u32,
}

pub const TUPLE_SIZE: usize = align(size_of::<GaihAddrTuple>());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrTupleImage {
    pub name: usize,
    /// Offset of the first tuple.
    pub head: usize,
    pub count: usize,
    pub len: usize,
}

fn entries(resolution: &Resolution) -> Vec<(c_int, &[u8])> {
    resolution
        .records
        .addresses(AddressFamily::Both)
        .filter_map(|record| match record.record_type {
            RecordType::A if record.data.len() == 4 => Some((libc::AF_INET, record.data.as_slice())),
            RecordType::AAAA if record.data.len() == 16 => {
                Some((libc::AF_INET6, record.data.as_slice()))
            }
            _ => None,
        })
        .collect()
}

pub fn required_size(resolution: &Resolution) -> usize {
    align(resolution.canonical_name.len() + 1) + entries(resolution).len() * TUPLE_SIZE
}

/// Name once, then one tuple per address of either family, linked in record
/// order. Fails with `BufferTooSmall` without touching `buf`.
pub fn write_addrtuples(resolution: &Resolution, buf: &mut [u8]) -> Result<AddrTupleImage, DomainError> {
    let entries = entries(resolution);
    if entries.is_empty() {
        return Err(DomainError::NotFound(resolution.canonical_name.clone()));
    }

    let pad = leading_pad(buf.as_ptr());
    let needed = pad + required_size(resolution);
    if needed > buf.len() {
        return Err(DomainError::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }

    let mut arena = Arena::new(buf, pad);
    let name_bytes = resolution.canonical_name.as_bytes();
    let name = arena.put_cstr(name_bytes, align(name_bytes.len() + 1))?;
    let head = arena.position();

    for (i, (family, address)) in entries.iter().enumerate() {
        let slot = arena.reserve(TUPLE_SIZE, TUPLE_SIZE)?;
        let next = if i + 1 < entries.len() {
            arena.address(slot + TUPLE_SIZE)
        } else {
            0
        };
        arena.write_pointer(slot + offset_of!(GaihAddrTuple, next), next)?;
        arena.write_pointer(slot + offset_of!(GaihAddrTuple, name), arena.address(name))?;
        arena.write_at(slot + offset_of!(GaihAddrTuple, family), &family.to_ne_bytes())?;
        arena.write_at(slot + offset_of!(GaihAddrTuple, addr), address)?;
    }

    Ok(AddrTupleImage {
        name,
        head,
        count: entries.len(),
        len: arena.position(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use harddns_domain::{ResourceRecord, ResourceRecordSet};
    use std::ffi::CStr;

    #[repr(C, align(16))]
    struct Aligned([u8; 512]);

    fn resolution() -> Resolution {
        let mut records = ResourceRecordSet::new();
        records.insert(ResourceRecord::alias("b.example", 300));
        records.insert(ResourceRecord::address("b.example", "192.0.2.1".parse().unwrap(), 120));
        records.insert(ResourceRecord::address("b.example", "2001:db8::1".parse().unwrap(), 60));
        Resolution {
            canonical_name: "b.example".into(),
            family: AddressFamily::Both,
            records,
            ttl: 60,
        }
    }

    #[test]
    fn test_tuple_matches_glibc_layout() {
        if cfg!(target_pointer_width = "64") {
            assert_eq!(size_of::<GaihAddrTuple>(), 40);
            assert_eq!(offset_of!(GaihAddrTuple, family), 16);
            assert_eq!(offset_of!(GaihAddrTuple, addr), 20);
            assert_eq!(offset_of!(GaihAddrTuple, scopeid), 36);
        }
        assert_eq!(TUPLE_SIZE % std::mem::align_of::<GaihAddrTuple>(), 0);
    }

    #[test]
    fn test_required_size() {
        assert_eq!(required_size(&resolution()), align(10) + 2 * TUPLE_SIZE);
    }

    #[test]
    fn test_linked_list_of_both_families() {
        let r = resolution();
        let mut storage = Aligned([0xAA; 512]);
        let buf = &mut storage.0[..];
        let image = write_addrtuples(&r, buf).unwrap();
        assert_eq!(image.count, 2);

        // SAFETY: the image was just written into `buf`, which is aligned and
        // outlives every pointer followed here.
        unsafe {
            let first = &*(buf.as_ptr().add(image.head) as *const GaihAddrTuple);
            assert_eq!(first.family, libc::AF_INET);
            assert_eq!(CStr::from_ptr(first.name).to_str().unwrap(), "b.example");
            let v4: [u8; 4] = first.addr[0].to_ne_bytes();
            assert_eq!(v4, [192, 0, 2, 1]);
            assert_eq!(first.scopeid, 0);

            let second = &*first.next;
            assert_eq!(second.family, libc::AF_INET6);
            assert_eq!(second.name, first.name);
            assert!(second.next.is_null());
        }
    }

    #[test]
    fn test_no_addresses_is_not_found() {
        let mut r = resolution();
        r.records = ResourceRecordSet::new();
        let mut storage = Aligned([0; 512]);
        assert!(matches!(
            write_addrtuples(&r, &mut storage.0),
            Err(DomainError::NotFound(_))
        ));
    }
}
