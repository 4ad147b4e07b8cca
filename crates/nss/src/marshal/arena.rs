use harddns_domain::DomainError;

/// Bump writer over a caller buffer. Offsets are relative to the start of
/// the buffer; `address` turns them into the pointers the caller reads.
#[derive(Debug)]
pub struct Arena<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Arena<'a> {
    /// Start writing at `start`, typically the alignment pad.
    pub fn new(buf: &'a mut [u8], start: usize) -> Self {
        Self { buf, pos: start }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn address(&self, offset: usize) -> usize {
        self.buf.as_ptr() as usize + offset
    }

    /// Claim `len` zeroed bytes and move on by `padded_len`.
    pub fn reserve(&mut self, len: usize, padded_len: usize) -> Result<usize, DomainError> {
        let end = self.pos.checked_add(padded_len).filter(|end| *end <= self.buf.len());
        let Some(end) = end else {
            return Err(DomainError::BufferTooSmall {
                needed: self.pos.saturating_add(padded_len),
                available: self.buf.len(),
            });
        };
        let offset = self.pos;
        self.buf[offset..offset + len.min(padded_len)].fill(0);
        self.pos = end;
        Ok(offset)
    }

    /// Copy `bytes` plus a NUL terminator into a padded slot.
    pub fn put_cstr(&mut self, bytes: &[u8], padded_len: usize) -> Result<usize, DomainError> {
        let offset = self.reserve(bytes.len() + 1, padded_len)?;
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(offset)
    }

    /// Copy raw bytes into a padded slot.
    pub fn put_bytes(&mut self, bytes: &[u8], padded_len: usize) -> Result<usize, DomainError> {
        let offset = self.reserve(bytes.len(), padded_len)?;
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(offset)
    }

    /// Overwrite bytes inside an already reserved slot.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), DomainError> {
        let end = offset + bytes.len();
        if end > self.pos {
            return Err(DomainError::BufferTooSmall {
                needed: end,
                available: self.pos,
            });
        }
        self.buf[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Store a pointer value (0 for NULL) at `offset`.
    pub fn write_pointer(&mut self, offset: usize, value: usize) -> Result<(), DomainError> {
        self.write_at(offset, &value.to_ne_bytes())
    }
}
