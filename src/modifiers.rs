// Event request modifiers
//
// A closed sum of the modifier kinds JDWP defines for EventRequest.Set,
// each carrying its own wire kind byte. Kept as a tagged enum with a
// dispatch function rather than the teacher's base-class-with-override
// shape, since the set of modifier kinds is closed and fixed by the
// protocol (EventModifierKind, below) rather than open for extension.

use crate::builder::CommandBuilder;
use crate::ids::IdSizes;
use crate::types::{FieldID, MethodID, ObjectID, ReferenceTypeID, StepDepth, StepSize, ThreadID, TypeTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventModifierKind {
    Count = 1,
    ThreadOnly = 3,
    ClassOnly = 4,
    ClassMatch = 5,
    ClassExclude = 6,
    LocationOnly = 7,
    ExceptionOnly = 8,
    FieldOnly = 9,
    Step = 10,
    InstanceOnly = 11,
    SourceNameMatch = 12,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventModifier {
    /// Only report the Nth occurrence onward; typical use is `Count(1)` to
    /// auto-delete after a single hit.
    Count(i32),
    ThreadOnly(ThreadID),
    ClassOnly(ReferenceTypeID),
    ClassMatch(String),
    ClassExclude(String),
    LocationOnly {
        tag: TypeTag,
        class: ReferenceTypeID,
        method: MethodID,
        index: u64,
    },
    ExceptionOnly {
        /// `None` matches exceptions of any type.
        ref_type: Option<ReferenceTypeID>,
        caught: bool,
        uncaught: bool,
    },
    FieldOnly {
        class: ReferenceTypeID,
        field: FieldID,
    },
    Step {
        thread: ThreadID,
        size: StepSize,
        depth: StepDepth,
    },
    InstanceOnly(ObjectID),
    SourceNameMatch(String),
}

impl EventModifier {
    fn kind(&self) -> EventModifierKind {
        match self {
            EventModifier::Count(_) => EventModifierKind::Count,
            EventModifier::ThreadOnly(_) => EventModifierKind::ThreadOnly,
            EventModifier::ClassOnly(_) => EventModifierKind::ClassOnly,
            EventModifier::ClassMatch(_) => EventModifierKind::ClassMatch,
            EventModifier::ClassExclude(_) => EventModifierKind::ClassExclude,
            EventModifier::LocationOnly { .. } => EventModifierKind::LocationOnly,
            EventModifier::ExceptionOnly { .. } => EventModifierKind::ExceptionOnly,
            EventModifier::FieldOnly { .. } => EventModifierKind::FieldOnly,
            EventModifier::Step { .. } => EventModifierKind::Step,
            EventModifier::InstanceOnly(_) => EventModifierKind::InstanceOnly,
            EventModifier::SourceNameMatch(_) => EventModifierKind::SourceNameMatch,
        }
    }

    /// Serialize this modifier (kind byte + payload) into an in-progress
    /// command buffer.
    pub fn serialize(&self, builder: CommandBuilder, sizes: &IdSizes) -> CommandBuilder {
        let builder = builder.u8(self.kind() as u8);
        match self {
            EventModifier::Count(n) => builder.i32(*n),
            EventModifier::ThreadOnly(thread) => builder.thread_id(sizes, thread.0),
            EventModifier::ClassOnly(class) => builder.reference_type_id(sizes, class.0),
            EventModifier::ClassMatch(pattern) => builder.utf8_string(pattern),
            EventModifier::ClassExclude(pattern) => builder.utf8_string(pattern),
            EventModifier::LocationOnly { tag, class, method, index } => builder
                .u8(*tag as u8)
                .reference_type_id(sizes, class.0)
                .method_id(sizes, method.0)
                .u64(*index),
            EventModifier::ExceptionOnly { ref_type, caught, uncaught } => builder
                .reference_type_id(sizes, ref_type.map(|r| r.0).unwrap_or(0))
                .bool(*caught)
                .bool(*uncaught),
            EventModifier::FieldOnly { class, field } => {
                builder.reference_type_id(sizes, class.0).field_id(sizes, field.0)
            }
            EventModifier::Step { thread, size, depth } => {
                builder.thread_id(sizes, thread.0).i32(*size as i32).i32(*depth as i32)
            }
            EventModifier::InstanceOnly(object) => builder.object_id(sizes, object.0),
            EventModifier::SourceNameMatch(pattern) => builder.utf8_string(pattern),
        }
    }
}
