// JDWP public types
//
// Strongly-typed ID handles, enums, and reply-shaped structs used across the
// command surface.

/// Declares a newtype wrapper around a `u64` ID payload, with the
/// conversions the rest of the crate needs to move it in and out of the
/// wire encoder/decoder.
macro_rules! id_handle {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u64);

        impl $name {
            /// Handle value 0 denotes null for object/reference-type family
            /// handles.
            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for u64 {
            fn from(v: $name) -> Self {
                v.0
            }
        }
    };
}

id_handle!(ObjectID);
id_handle!(ThreadID);
id_handle!(ReferenceTypeID);
id_handle!(MethodID);
id_handle!(FieldID);

/// Unlike the object/reference-type family, this is a plain 32-bit VM-side
/// identifier for an installed event request, not a width-negotiated ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventRequestID(pub i32);

impl From<i32> for EventRequestID {
    fn from(v: i32) -> Self {
        EventRequestID(v)
    }
}

impl From<EventRequestID> for i32 {
    fn from(v: EventRequestID) -> Self {
        v.0
    }
}

/// Kind of reference type a `ReferenceTypeID` denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Class = 1,
    Interface = 2,
    Array = 3,
}

impl TypeTag {
    pub fn from_wire(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(TypeTag::Class),
            2 => Some(TypeTag::Interface),
            3 => Some(TypeTag::Array),
            _ => None,
        }
    }
}

bitflags::bitflags! {
    /// Bits reported alongside a `ClassInfo`, OR'd together.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassStatus: i32 {
        const VERIFIED    = 1;
        const PREPARED    = 2;
        const INITIALIZED = 4;
        const ERROR       = 8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassInfo {
    pub tag: TypeTag,
    pub type_id: ReferenceTypeID,
    pub status: ClassStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub method_id: MethodID,
    pub name: String,
    pub signature: String,
    pub mod_bits: i32,
}

/// How the VM should suspend threads when a requested event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendPolicy {
    None = 0,
    EventThread = 1,
    All = 2,
}

impl SuspendPolicy {
    pub fn wire(self) -> u8 {
        self as u8
    }
}

/// Event kinds recognized by `EventRequest.Set`/`Clear` (subset used by
/// this crate's modifiers; `parse_event_packet`-style consumers are out of
/// scope — see spec.md §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventKind {
    SingleStep = 1,
    Breakpoint = 2,
    FramePop = 3,
    Exception = 4,
    UserDefined = 5,
    ThreadStart = 6,
    ThreadDeath = 7,
    ClassPrepare = 8,
    ClassUnload = 9,
    ClassLoad = 10,
    FieldAccess = 20,
    FieldModification = 21,
    ExceptionCatch = 30,
    MethodEntry = 40,
    MethodExit = 41,
    MethodExitWithReturnValue = 42,
    MonitorContendedEnter = 43,
    MonitorContendedEntered = 44,
    MonitorWait = 45,
    MonitorWaited = 46,
    VmStart = 90,
    VmDeath = 99,
}

impl EventKind {
    pub fn wire(self) -> u8 {
        self as u8
    }
}

/// Granularity of a single-step event request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSize {
    Min = 0,
    Line = 1,
}

/// How far a single-step event request steps relative to the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDepth {
    Into = 0,
    Over = 1,
    Out = 2,
}
