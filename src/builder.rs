// Outgoing packet assembly
//
// A CommandBuilder pre-writes the 11-byte header (length placeholder + id +
// flags + command-set/command), then callers append the payload fluently.
// finalize() back-patches the length prefix and freezes the buffer.

use crate::ids::{IdSizes, IdWidth};
use bytes::{BufMut, Bytes, BytesMut};

pub const HEADER_SIZE: usize = 11;

pub struct CommandBuilder {
    buf: BytesMut,
}

impl CommandBuilder {
    pub fn new(id: u32, command_set: u8, command: u8) -> Self {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE);
        buf.put_u32(0); // length placeholder, patched in finalize()
        buf.put_u32(id);
        buf.put_u8(0x00); // flags: command
        buf.put_u8(command_set);
        buf.put_u8(command);
        CommandBuilder { buf }
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.buf.put_u8(v);
        self
    }

    pub fn bool(self, v: bool) -> Self {
        self.u8(v as u8)
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.buf.put_i32(v);
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.buf.put_u32(v);
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.buf.put_i64(v);
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.buf.put_u64(v);
        self
    }

    /// u32 length-in-bytes prefix followed by the raw UTF-8 bytes, no NUL.
    pub fn utf8_string(mut self, s: &str) -> Self {
        let bytes = s.as_bytes();
        self.buf.put_u32(bytes.len() as u32);
        self.buf.put_slice(bytes);
        self
    }

    fn id(self, width: IdWidth, v: u64) -> Self {
        match width {
            IdWidth::Four => self.u32(v as u32),
            IdWidth::Eight => self.u64(v),
        }
    }

    pub fn object_id(self, sizes: &IdSizes, v: u64) -> Self {
        let width = sizes.object_assert();
        self.id(width, v)
    }

    pub fn thread_id(self, sizes: &IdSizes, v: u64) -> Self {
        // ThreadID shares the object ID width, per the JDWP wire spec.
        self.object_id(sizes, v)
    }

    pub fn reference_type_id(self, sizes: &IdSizes, v: u64) -> Self {
        let width = sizes.reference_type_assert();
        self.id(width, v)
    }

    pub fn method_id(self, sizes: &IdSizes, v: u64) -> Self {
        let width = sizes.method_assert();
        self.id(width, v)
    }

    pub fn field_id(self, sizes: &IdSizes, v: u64) -> Self {
        let width = sizes.field_assert();
        self.id(width, v)
    }

    pub fn frame_id(self, sizes: &IdSizes, v: u64) -> Self {
        let width = sizes.frame_assert();
        self.id(width, v)
    }

    pub fn finalize(mut self) -> Bytes {
        let len = self.buf.len() as u32;
        self.buf[0..4].copy_from_slice(&len.to_be_bytes());
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_patches_length_prefix() {
        let bytes = CommandBuilder::new(1, 1, 1).u8(7).finalize();
        assert_eq!(bytes.len(), HEADER_SIZE + 1);
        assert_eq!(&bytes[0..4], &(bytes.len() as u32).to_be_bytes());
        assert_eq!(&bytes[4..8], &1u32.to_be_bytes());
        assert_eq!(bytes[8], 0x00);
        assert_eq!(bytes[9], 1);
        assert_eq!(bytes[10], 1);
        assert_eq!(bytes[11], 7);
    }

    #[test]
    fn big_endian_id_encoding() {
        let bytes = CommandBuilder::new(0x12345678, 1, 1).finalize();
        assert_eq!(&bytes[4..8], &[0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn width_four_truncates_id() {
        let sizes = IdSizes::new(4, 4, 4, 4, 4).unwrap();
        let bytes = CommandBuilder::new(1, 1, 1).object_id(&sizes, 0x42).finalize();
        assert_eq!(bytes.len(), HEADER_SIZE + 4);
    }

    #[test]
    fn width_eight_keeps_full_id() {
        let sizes = IdSizes::new(8, 8, 8, 8, 8).unwrap();
        let bytes = CommandBuilder::new(1, 1, 1).object_id(&sizes, 0x42).finalize();
        assert_eq!(bytes.len(), HEADER_SIZE + 8);
    }

    #[test]
    #[should_panic(expected = "encoded before negotiation")]
    fn encoding_id_before_negotiation_panics() {
        let sizes = IdSizes::new_unknown();
        let _ = CommandBuilder::new(1, 1, 1).object_id(&sizes, 1);
    }
}
