//! Bounded write cursor for streamed image bytes.

use log::warn;

use crate::error::ErrorKind;

/// Accumulates fetched body chunks into a fixed-capacity destination.
///
/// The cursor is owned by exactly one in-flight fetch. Chunks are
/// written in arrival order at a monotonically increasing offset; a
/// chunk that would run past the destination capacity fails the fetch
/// and latches the cursor in the failed state, so later pushes are
/// rejected without touching the buffer.
pub struct ImageCursor<'a> {
    dest: &'a mut [u8],
    offset: usize,
    failed: Option<ErrorKind>,
}

impl<'a> ImageCursor<'a> {
    pub fn new(dest: &'a mut [u8]) -> Self {
        Self {
            dest,
            offset: 0,
            failed: None,
        }
    }

    /// Appends one body chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), ErrorKind> {
        if let Some(kind) = self.failed {
            return Err(kind);
        }

        let end = self.offset.saturating_add(chunk.len());
        if end > self.dest.len() {
            warn!(
                "image cursor overflow: offset={} chunk={} capacity={}",
                self.offset,
                chunk.len(),
                self.dest.len()
            );
            self.failed = Some(ErrorKind::InvalidResponse);
            return Err(ErrorKind::InvalidResponse);
        }

        self.dest[self.offset..end].copy_from_slice(chunk);
        self.offset = end;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> usize {
        self.offset
    }

    /// Final accumulated outcome: total bytes written, or the latched
    /// failure.
    pub fn finish(self) -> Result<usize, ErrorKind> {
        match self.failed {
            Some(kind) => Err(kind),
            None => Ok(self.offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_within_capacity_land_in_order() {
        let mut dest = [0u8; 8];
        let mut cursor = ImageCursor::new(&mut dest);

        assert_eq!(cursor.push(&[1, 2, 3]), Ok(()));
        assert_eq!(cursor.push(&[4]), Ok(()));
        assert_eq!(cursor.push(&[5, 6, 7, 8]), Ok(()));
        assert_eq!(cursor.finish(), Ok(8));
        assert_eq!(dest, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn overflowing_chunk_fails_and_writes_nothing_further() {
        let mut dest = [0u8; 4];
        let mut cursor = ImageCursor::new(&mut dest);

        assert_eq!(cursor.push(&[9, 9, 9]), Ok(()));
        assert_eq!(cursor.push(&[1, 1]), Err(ErrorKind::InvalidResponse));
        // Latched: even a fitting chunk is rejected afterwards.
        assert_eq!(cursor.push(&[2]), Err(ErrorKind::InvalidResponse));
        assert_eq!(cursor.finish(), Err(ErrorKind::InvalidResponse));
        assert_eq!(dest, [9, 9, 9, 0]);
    }

    #[test]
    fn exact_fill_is_accepted() {
        let mut dest = [0u8; 3];
        let mut cursor = ImageCursor::new(&mut dest);

        assert_eq!(cursor.push(&[1, 2, 3]), Ok(()));
        assert_eq!(cursor.written(), 3);
        assert_eq!(cursor.finish(), Ok(3));
    }

    #[test]
    fn empty_chunks_are_harmless() {
        let mut dest = [0u8; 2];
        let mut cursor = ImageCursor::new(&mut dest);

        assert_eq!(cursor.push(&[]), Ok(()));
        assert_eq!(cursor.push(&[7, 7]), Ok(()));
        assert_eq!(cursor.push(&[]), Ok(()));
        assert_eq!(cursor.finish(), Ok(2));
    }
}
