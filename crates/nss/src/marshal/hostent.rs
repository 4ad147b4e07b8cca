//! `struct hostent` payload: name, aliases and one family's addresses.
//!
//! Layout, each piece padded to the pointer size:
//! canonical name, alias strings, alias pointer array (NULL terminated),
//! raw addresses, address pointer array (NULL terminated).

use super::{align, leading_pad, Arena, POINTER_SIZE};
use harddns_application::use_cases::Resolution;
use harddns_domain::{AddressFamily, DomainError};
use libc::c_int;

/// Where the pieces of a written hostent live, as offsets from the start of
/// the caller buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostentImage {
    pub name: usize,
    pub aliases: usize,
    pub addr_list: usize,
    pub addr_type: c_int,
    pub addr_len: c_int,
    /// Bytes used, alignment pad included.
    pub len: usize,
}

struct HostentLayout<'r> {
    name: &'r [u8],
    aliases: Vec<&'r [u8]>,
    addresses: Vec<&'r [u8]>,
    width: usize,
    addr_type: c_int,
}

impl<'r> HostentLayout<'r> {
    fn new(resolution: &'r Resolution, family: AddressFamily) -> Result<Self, DomainError> {
        let (width, addr_type) = match family {
            AddressFamily::V4 => (4, libc::AF_INET),
            AddressFamily::V6 => (16, libc::AF_INET6),
            AddressFamily::Both => return Err(DomainError::UnsupportedFamily(libc::AF_UNSPEC)),
        };
        Ok(Self {
            name: resolution.canonical_name.as_bytes(),
            aliases: resolution
                .alias_names()
                .into_iter()
                .map(str::as_bytes)
                .collect(),
            addresses: resolution
                .records
                .addresses(family)
                .map(|r| r.data.as_slice())
                .filter(|data| data.len() == width)
                .collect(),
            width,
            addr_type,
        })
    }

    fn size(&self) -> usize {
        let strings: usize = self.aliases.iter().map(|a| align(a.len() + 1)).sum();
        align(self.name.len() + 1)
            + strings
            + (self.aliases.len() + 1) * POINTER_SIZE
            + self.addresses.len() * align(self.width)
            + (self.addresses.len() + 1) * POINTER_SIZE
    }
}

/// Bytes needed for `resolution` in a pointer-aligned buffer.
pub fn required_size(resolution: &Resolution, family: AddressFamily) -> Result<usize, DomainError> {
    Ok(HostentLayout::new(resolution, family)?.size())
}

/// Lay out `resolution` in `buf`. Fails with `BufferTooSmall` without
/// touching `buf` if it cannot hold everything.
pub fn write_hostent(
    resolution: &Resolution,
    family: AddressFamily,
    buf: &mut [u8],
) -> Result<HostentImage, DomainError> {
    let layout = HostentLayout::new(resolution, family)?;
    let pad = leading_pad(buf.as_ptr());
    let needed = pad + layout.size();
    if needed > buf.len() {
        return Err(DomainError::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }

    let mut arena = Arena::new(buf, pad);
    let name = arena.put_cstr(layout.name, align(layout.name.len() + 1))?;

    let mut alias_offsets = Vec::with_capacity(layout.aliases.len());
    for alias in &layout.aliases {
        alias_offsets.push(arena.put_cstr(alias, align(alias.len() + 1))?);
    }
    let aliases = pointer_array(&mut arena, &alias_offsets)?;

    let mut addr_offsets = Vec::with_capacity(layout.addresses.len());
    for address in &layout.addresses {
        addr_offsets.push(arena.put_bytes(address, align(layout.width))?);
    }
    let addr_list = pointer_array(&mut arena, &addr_offsets)?;

    Ok(HostentImage {
        name,
        aliases,
        addr_list,
        addr_type: layout.addr_type,
        addr_len: layout.width as c_int,
        len: arena.position(),
    })
}

/// NULL-terminated array of pointers to `targets`.
fn pointer_array(arena: &mut Arena<'_>, targets: &[usize]) -> Result<usize, DomainError> {
    let size = (targets.len() + 1) * POINTER_SIZE;
    let array = arena.reserve(size, size)?;
    for (i, target) in targets.iter().enumerate() {
        arena.write_pointer(array + i * POINTER_SIZE, arena.address(*target))?;
    }
    arena.write_pointer(array + targets.len() * POINTER_SIZE, 0)?;
    Ok(array)
}
