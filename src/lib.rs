// JDWP client library.
//
// A framing/encoding engine with negotiated per-connection ID widths, a
// session state machine that multiplexes requests and replies over a
// single byte-duplex stream, and a command/event vocabulary for the
// VirtualMachine, ReferenceType, and EventRequest command sets. Transport
// establishment, credentials, and anything downstream of raw protocol
// values (source mapping, breakpoint resolution, stack-frame decoding)
// are left to callers.

pub mod builder;
pub mod commands;
pub mod error;
pub mod ids;
pub mod modifiers;
pub mod protocol;
pub mod reader;
pub mod session;
pub mod types;

mod eventrequest;
mod reftype;
mod vm;

pub use builder::CommandBuilder;
pub use error::{JdwpError, JdwpResult};
pub use ids::IdSizes;
pub use modifiers::{EventModifier, EventModifierKind};
pub use reader::PacketReader;
pub use session::{Session, SessionState};
pub use types::{
    ClassInfo, ClassStatus, EventKind, EventRequestID, FieldID, MethodID, MethodInfo, ObjectID, ReferenceTypeID,
    StepDepth, StepSize, SuspendPolicy, ThreadID, TypeTag,
};

#[cfg(test)]
mod tests {
    #[test]
    fn public_surface_is_reachable() {
        let _ = crate::SuspendPolicy::All;
        let _ = crate::EventKind::Breakpoint;
    }
}
