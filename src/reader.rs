// Cursor-based decoder over a received buffer
//
// Mirrors CommandBuilder: big-endian primitives, u32-length-prefixed UTF-8
// strings, width-aware ID reads. Every read is bounds-checked; a short
// buffer fails with a protocol error and leaves the cursor unadvanced.

use crate::error::{JdwpError, JdwpResult};
use crate::ids::{IdSizes, IdWidth};
use bytes::{Buf, Bytes};

pub struct PacketReader {
    buf: Bytes,
}

impl PacketReader {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        PacketReader { buf: buf.into() }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, n: usize) -> JdwpResult<()> {
        if self.buf.remaining() < n {
            return Err(JdwpError::Protocol("Invalid JDWP packet".to_string()));
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> JdwpResult<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_bool(&mut self) -> JdwpResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i32(&mut self) -> JdwpResult<i32> {
        self.need(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_u32(&mut self) -> JdwpResult<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_i64(&mut self) -> JdwpResult<i64> {
        self.need(8)?;
        Ok(self.buf.get_i64())
    }

    pub fn read_u64(&mut self) -> JdwpResult<u64> {
        self.need(8)?;
        Ok(self.buf.get_u64())
    }

    /// u32 length-in-bytes prefix followed by raw UTF-8 bytes, no NUL.
    pub fn read_utf8_string(&mut self) -> JdwpResult<String> {
        let len = self.read_u32()? as usize;
        self.need(len)?;
        let bytes = self.buf.split_to(len);
        String::from_utf8(bytes.to_vec())
            .map_err(|e| JdwpError::Protocol(format!("invalid UTF-8 in string: {e}")))
    }

    fn read_id(&mut self, width: IdWidth) -> JdwpResult<u64> {
        match width {
            IdWidth::Four => Ok(self.read_u32()? as u64),
            IdWidth::Eight => self.read_u64(),
        }
    }

    pub fn read_object_id(&mut self, sizes: &IdSizes) -> JdwpResult<u64> {
        let width = sizes.object_checked()?;
        self.read_id(width)
    }

    pub fn read_thread_id(&mut self, sizes: &IdSizes) -> JdwpResult<u64> {
        // ThreadID shares the object ID width, per the JDWP wire spec.
        self.read_object_id(sizes)
    }

    pub fn read_reference_type_id(&mut self, sizes: &IdSizes) -> JdwpResult<u64> {
        let width = sizes.reference_type_checked()?;
        self.read_id(width)
    }

    pub fn read_method_id(&mut self, sizes: &IdSizes) -> JdwpResult<u64> {
        let width = sizes.method_checked()?;
        self.read_id(width)
    }

    pub fn read_field_id(&mut self, sizes: &IdSizes) -> JdwpResult<u64> {
        let width = sizes.field_checked()?;
        self.read_id(width)
    }

    pub fn read_frame_id(&mut self, sizes: &IdSizes) -> JdwpResult<u64> {
        let width = sizes.frame_checked()?;
        self.read_id(width)
    }
}
