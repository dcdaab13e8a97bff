// VirtualMachine command implementations.

use tokio_util::sync::CancellationToken;

use crate::builder::CommandBuilder;
use crate::commands::{command_sets, vm_commands};
use crate::error::{JdwpError, JdwpResult};
use crate::session::Session;
use crate::types::{ClassInfo, ClassStatus, ReferenceTypeID, TypeTag};

impl Session {
    /// VirtualMachine.ClassesBySignature: every loaded class/interface/array
    /// matching `signature` (JNI-style, e.g. `"Lcom/example/MyClass;"`).
    pub async fn get_classes_by_signature(
        &self,
        signature: &str,
        cancel: Option<&CancellationToken>,
    ) -> JdwpResult<Vec<ClassInfo>> {
        let signature = signature.to_string();
        let mut reply = self
            .execute(
                move |id| {
                    CommandBuilder::new(id, command_sets::VIRTUAL_MACHINE, vm_commands::CLASSES_BY_SIGNATURE)
                        .utf8_string(&signature)
                        .finalize()
                },
                cancel,
            )
            .await?;

        let sizes = self.id_sizes();
        let count = reply.read_i32()?;
        let mut classes = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let tag_byte = reply.read_u8()?;
            let tag = TypeTag::from_wire(tag_byte)
                .ok_or_else(|| JdwpError::Protocol(format!("unknown type tag: {tag_byte}")))?;
            let type_id = ReferenceTypeID(reply.read_reference_type_id(&sizes)?);
            let status = ClassStatus::from_bits_truncate(reply.read_i32()?);
            classes.push(ClassInfo { tag, type_id, status });
        }
        Ok(classes)
    }

    /// Convenience over [`Session::get_classes_by_signature`] for callers
    /// that expect exactly one loaded class matching `signature`. Fails
    /// with [`JdwpError::InvalidArgument`] if none or more than one match.
    pub async fn get_class_by_signature(
        &self,
        signature: &str,
        cancel: Option<&CancellationToken>,
    ) -> JdwpResult<ClassInfo> {
        let mut classes = self.get_classes_by_signature(signature, cancel).await?;
        match classes.len() {
            1 => Ok(classes.remove(0)),
            0 => Err(JdwpError::InvalidArgument(format!("no loaded class matches signature {signature}"))),
            n => Err(JdwpError::InvalidArgument(format!("signature {signature} is ambiguous: {n} classes match"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdSizes;

    fn type_id(reply: &mut crate::reader::PacketReader, sizes: &IdSizes) -> u64 {
        reply.read_reference_type_id(sizes).unwrap()
    }

    #[test]
    fn classes_by_signature_request_shape() {
        let bytes = CommandBuilder::new(1, command_sets::VIRTUAL_MACHINE, vm_commands::CLASSES_BY_SIGNATURE)
            .utf8_string("Lcom/example/Foo;")
            .finalize();
        assert_eq!(bytes[9], command_sets::VIRTUAL_MACHINE);
        assert_eq!(bytes[10], vm_commands::CLASSES_BY_SIGNATURE);
    }

    #[test]
    fn reply_decoding_reads_tag_id_and_status() {
        let sizes = IdSizes::new(8, 8, 8, 8, 8).unwrap();
        let bytes = CommandBuilder::new(1, 1, 1)
            .i32(1)
            .u8(TypeTag::Class as u8)
            .reference_type_id(&sizes, 0x99)
            .i32(ClassStatus::VERIFIED.bits() | ClassStatus::PREPARED.bits())
            .finalize();
        let mut reply = crate::reader::PacketReader::new(bytes.slice(11..));
        let count = reply.read_i32().unwrap();
        assert_eq!(count, 1);
        let tag = TypeTag::from_wire(reply.read_u8().unwrap()).unwrap();
        assert_eq!(tag, TypeTag::Class);
        assert_eq!(type_id(&mut reply, &sizes), 0x99);
        let status = ClassStatus::from_bits_truncate(reply.read_i32().unwrap());
        assert!(status.contains(ClassStatus::VERIFIED));
    }
}
