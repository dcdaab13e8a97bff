// ReferenceType command implementations.
//
// Only Methods is in scope; Fields and friends (source debug info, field
// access) sit outside this crate's command surface.

use tokio_util::sync::CancellationToken;

use crate::builder::CommandBuilder;
use crate::commands::{command_sets, reference_type_commands};
use crate::error::JdwpResult;
use crate::session::Session;
use crate::types::{MethodID, MethodInfo, ReferenceTypeID};

impl Session {
    /// ReferenceType.Methods: the declared methods of `reference_type`, in
    /// the order the VM reports them.
    pub async fn get_methods(
        &self,
        reference_type: ReferenceTypeID,
        cancel: Option<&CancellationToken>,
    ) -> JdwpResult<Vec<MethodInfo>> {
        let sizes = self.id_sizes();
        let mut reply = self
            .execute(
                move |id| {
                    CommandBuilder::new(id, command_sets::REFERENCE_TYPE, reference_type_commands::METHODS)
                        .reference_type_id(&sizes, reference_type.0)
                        .finalize()
                },
                cancel,
            )
            .await?;

        let count = reply.read_i32()?;
        let mut methods = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let method_id = MethodID(reply.read_method_id(&sizes)?);
            let name = reply.read_utf8_string()?;
            let signature = reply.read_utf8_string()?;
            let mod_bits = reply.read_i32()?;
            methods.push(MethodInfo { method_id, name, signature, mod_bits });
        }
        Ok(methods)
    }
}
