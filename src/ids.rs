// Negotiated ID widths
//
// JDWP does not fix the byte width of object/thread/reference-type/method/
// field IDs; the VM reports them in its VM.IDSizes reply and every
// ID-bearing field thereafter must be encoded/decoded at that width.

use crate::error::{JdwpError, JdwpResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdWidth {
    Four,
    Eight,
}

impl IdWidth {
    fn from_byte_count(n: i32) -> JdwpResult<Self> {
        match n {
            4 => Ok(IdWidth::Four),
            8 => Ok(IdWidth::Eight),
            other => Err(JdwpError::Protocol(format!(
                "unsupported ID size: {other} (must be 4 or 8)"
            ))),
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            IdWidth::Four => 4,
            IdWidth::Eight => 8,
        }
    }
}

/// The five ID widths negotiated by `VM.IDSizes`. Starts `unknown` and is
/// populated exactly once, immediately after the handshake.
#[derive(Debug, Clone, Copy)]
pub struct IdSizes {
    known: Option<Widths>,
}

#[derive(Debug, Clone, Copy)]
struct Widths {
    field: IdWidth,
    method: IdWidth,
    object: IdWidth,
    reference_type: IdWidth,
    frame: IdWidth,
}

impl IdSizes {
    pub fn new_unknown() -> Self {
        IdSizes { known: None }
    }

    pub fn new(field: i32, method: i32, object: i32, reference_type: i32, frame: i32) -> JdwpResult<Self> {
        Ok(IdSizes {
            known: Some(Widths {
                field: IdWidth::from_byte_count(field)?,
                method: IdWidth::from_byte_count(method)?,
                object: IdWidth::from_byte_count(object)?,
                reference_type: IdWidth::from_byte_count(reference_type)?,
                frame: IdWidth::from_byte_count(frame)?,
            }),
        })
    }

    pub fn is_known(&self) -> bool {
        self.known.is_some()
    }

    /// Checked accessor: returns a protocol error if the sizes are not yet
    /// known. Used while decoding a reply received before ID_SIZES completes.
    fn checked(&self, which: &'static str, get: impl Fn(&Widths) -> IdWidth) -> JdwpResult<IdWidth> {
        self.known
            .as_ref()
            .map(get)
            .ok_or_else(|| JdwpError::Protocol(format!("{which} ID size read before negotiation")))
    }

    /// Assert accessor: an unknown state here is a caller bug, not a
    /// protocol violation — encoding an ID-bearing command before the
    /// session reached READY should never happen.
    fn assert(&self, which: &'static str, get: impl Fn(&Widths) -> IdWidth) -> IdWidth {
        self.known
            .as_ref()
            .map(get)
            .unwrap_or_else(|| panic!("{which} ID size encoded before negotiation"))
    }

    pub fn field_checked(&self) -> JdwpResult<IdWidth> {
        self.checked("field", |w| w.field)
    }
    pub fn method_checked(&self) -> JdwpResult<IdWidth> {
        self.checked("method", |w| w.method)
    }
    pub fn object_checked(&self) -> JdwpResult<IdWidth> {
        self.checked("object", |w| w.object)
    }
    pub fn reference_type_checked(&self) -> JdwpResult<IdWidth> {
        self.checked("reference-type", |w| w.reference_type)
    }
    pub fn frame_checked(&self) -> JdwpResult<IdWidth> {
        self.checked("frame", |w| w.frame)
    }

    pub fn field_assert(&self) -> IdWidth {
        self.assert("field", |w| w.field)
    }
    pub fn method_assert(&self) -> IdWidth {
        self.assert("method", |w| w.method)
    }
    pub fn object_assert(&self) -> IdWidth {
        self.assert("object", |w| w.object)
    }
    pub fn reference_type_assert(&self) -> IdWidth {
        self.assert("reference-type", |w| w.reference_type)
    }
    pub fn frame_assert(&self) -> IdWidth {
        self.assert("frame", |w| w.frame)
    }
}

impl Default for IdSizes {
    fn default() -> Self {
        Self::new_unknown()
    }
}
