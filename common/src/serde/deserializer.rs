use std::{
    borrow::Cow,
    io::{self, ErrorKind, Read},
};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeserializeError>;

#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("unexpected end of data at offset {offset}: needed {needed} bytes, {available} available")]
    Eof {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("failed to read from source: {0}")]
    Io(#[from] io::Error),
}

/// A forward-only byte source. Every read either returns exactly the number
/// of bytes asked for or fails, a short read is always an [`DeserializeError::Eof`].
#[rustfmt::skip]
pub trait Deserializer {
    fn pos(&mut self) -> usize;
    fn read_bytes(&mut self, length: usize) -> Result<Cow<'_, [u8]>>;
    fn is_eof(&mut self) -> Result<bool>;
    /// Consumes everything left in the source, returning how many bytes were skipped.
    fn skip_to_end(&mut self) -> Result<usize>;

    fn advance_by(&mut self, amount: usize) -> Result<()> {
        self.read_bytes(amount).map(|_| ())
    }

    fn read_array<const LENGTH: usize>(&mut self) -> Result<[u8; LENGTH]> {
        let bytes = self.read_bytes(LENGTH)?;
        let mut out = [0; LENGTH];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    fn read_u16_le(&mut self) -> Result<u16> { Ok(u16::from_le_bytes(self.read_array()?)) }
    fn read_u32_le(&mut self) -> Result<u32> { Ok(u32::from_le_bytes(self.read_array()?)) }
    fn read_f32_le(&mut self) -> Result<f32> { Ok(f32::from_le_bytes(self.read_array()?)) }
}

pub struct SliceDeserializer<'a> {
    buffer: &'a [u8],
    offset: usize,
}

/// Deserializes from any [`Read`] implementation. Reads are blocking and
/// sequential, nothing is ever seeked.
pub struct ReaderDeserializer<T: Read> {
    reader: T,
    offset: usize,
    peeked: Option<u8>,
}

impl<'a> SliceDeserializer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            offset: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }
}

impl<T: Read> ReaderDeserializer<T> {
    pub fn new(reader: T) -> Self {
        Self {
            reader,
            offset: 0,
            peeked: None,
        }
    }

    pub fn into_inner(self) -> T {
        self.reader
    }

    fn read_vec(&mut self, length: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0; length];
        let mut written = 0;

        if length > 0 {
            if let Some(byte) = self.peeked.take() {
                buf[0] = byte;
                written = 1;
            }
        }

        while written < length {
            match self.reader.read(&mut buf[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        buf.truncate(written);
        Ok(buf)
    }
}

impl Deserializer for SliceDeserializer<'_> {
    fn pos(&mut self) -> usize {
        self.offset
    }

    fn read_bytes(&mut self, length: usize) -> Result<Cow<'_, [u8]>> {
        let available = self.remaining();
        if available < length {
            return Err(DeserializeError::Eof {
                offset: self.offset,
                needed: length,
                available,
            });
        }

        let value = &self.buffer[self.offset..self.offset + length];
        self.offset += length;
        Ok(Cow::Borrowed(value))
    }

    fn is_eof(&mut self) -> Result<bool> {
        Ok(self.offset >= self.buffer.len())
    }

    fn skip_to_end(&mut self) -> Result<usize> {
        let skipped = self.remaining();
        self.offset = self.buffer.len();
        Ok(skipped)
    }
}

impl<T: Read> Deserializer for ReaderDeserializer<T> {
    fn pos(&mut self) -> usize {
        self.offset
    }

    fn read_bytes(&mut self, length: usize) -> Result<Cow<'_, [u8]>> {
        let buf = self.read_vec(length)?;
        if buf.len() < length {
            return Err(DeserializeError::Eof {
                offset: self.offset,
                needed: length,
                available: buf.len(),
            });
        }

        self.offset += length;
        Ok(Cow::Owned(buf))
    }

    fn is_eof(&mut self) -> Result<bool> {
        if self.peeked.is_some() {
            return Ok(false);
        }

        let mut byte = [0; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(true),
                Ok(_) => {
                    self.peeked = Some(byte[0]);
                    return Ok(false);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn skip_to_end(&mut self) -> Result<usize> {
        let peeked = self.peeked.take().is_some() as usize;
        let skipped = io::copy(&mut self.reader, &mut io::sink())? as usize + peeked;
        self.offset += skipped;
        Ok(skipped)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn slice_reads_little_endian() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xDEAD_BEEF_u32.to_le_bytes());
        data.extend_from_slice(&1.5_f32.to_le_bytes());
        data.extend_from_slice(&7_u16.to_le_bytes());

        let mut des = SliceDeserializer::new(&data);
        assert_eq!(des.read_u32_le().unwrap(), 0xDEAD_BEEF);
        assert_eq!(des.read_f32_le().unwrap(), 1.5);
        assert_eq!(des.read_u16_le().unwrap(), 7);
        assert!(des.is_eof().unwrap());
    }

    #[test]
    fn short_slice_read_is_eof() {
        let data = [1, 2, 3];
        let mut des = SliceDeserializer::new(&data);
        des.advance_by(1).unwrap();

        match des.read_u32_le() {
            Err(DeserializeError::Eof {
                offset,
                needed,
                available,
            }) => {
                assert_eq!((offset, needed, available), (1, 4, 2));
            }
            other => panic!("expected eof, got {other:?}"),
        }
    }

    #[test]
    fn reader_peek_does_not_lose_bytes() {
        let mut des = ReaderDeserializer::new(Cursor::new(vec![1, 0, 0, 0, 9, 9]));
        assert_eq!(des.read_u32_le().unwrap(), 1);
        assert!(!des.is_eof().unwrap());
        assert!(!des.is_eof().unwrap());
        assert_eq!(des.pos(), 4);
        assert_eq!(des.read_u16_le().unwrap(), 0x0909);
        assert!(des.is_eof().unwrap());
    }

    #[test]
    fn reader_short_read_is_eof() {
        let mut des = ReaderDeserializer::new(Cursor::new(vec![0; 10]));
        des.advance_by(8).unwrap();
        assert!(matches!(
            des.read_f32_le(),
            Err(DeserializeError::Eof {
                offset: 8,
                needed: 4,
                available: 2
            })
        ));
    }

    #[test]
    fn skip_to_end_counts_peeked_byte() {
        let mut des = ReaderDeserializer::new(Cursor::new(vec![0; 6]));
        des.advance_by(2).unwrap();
        assert!(!des.is_eof().unwrap());
        assert_eq!(des.skip_to_end().unwrap(), 4);
        assert_eq!(des.pos(), 6);

        let data = [0; 6];
        let mut des = SliceDeserializer::new(&data);
        des.advance_by(5).unwrap();
        assert_eq!(des.skip_to_end().unwrap(), 1);
        assert!(des.is_eof().unwrap());
    }
}
