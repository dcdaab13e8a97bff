// EventRequest command implementations: installing and removing event
// requests built from the closed `EventModifier` set.

use tokio_util::sync::CancellationToken;

use crate::builder::CommandBuilder;
use crate::commands::{command_sets, event_commands};
use crate::error::JdwpResult;
use crate::modifiers::EventModifier;
use crate::session::Session;
use crate::types::{EventKind, EventRequestID, SuspendPolicy};

impl Session {
    /// EventRequest.Set: installs an event request for `kind`, returning
    /// the VM-assigned request id used to clear it later.
    pub async fn set_event_request(
        &self,
        kind: EventKind,
        suspend_policy: SuspendPolicy,
        modifiers: &[EventModifier],
        cancel: Option<&CancellationToken>,
    ) -> JdwpResult<EventRequestID> {
        let sizes = self.id_sizes();
        let modifiers = modifiers.to_vec();
        let mut reply = self
            .execute(
                move |id| {
                    let mut builder = CommandBuilder::new(id, command_sets::EVENT_REQUEST, event_commands::SET)
                        .u8(kind.wire())
                        .u8(suspend_policy.wire())
                        .i32(modifiers.len() as i32);
                    for modifier in &modifiers {
                        builder = modifier.serialize(builder, &sizes);
                    }
                    builder.finalize()
                },
                cancel,
            )
            .await?;

        Ok(EventRequestID(reply.read_i32()?))
    }

    /// EventRequest.Clear: removes a single previously installed request.
    pub async fn clear_event_request(
        &self,
        kind: EventKind,
        request: EventRequestID,
        cancel: Option<&CancellationToken>,
    ) -> JdwpResult<()> {
        self.execute(
            move |id| {
                CommandBuilder::new(id, command_sets::EVENT_REQUEST, event_commands::CLEAR)
                    .u8(kind.wire())
                    .i32(request.0)
                    .finalize()
            },
            cancel,
        )
        .await?;
        Ok(())
    }

    /// EventRequest.ClearAllBreakpoints: removes every installed breakpoint
    /// request in one call.
    pub async fn clear_all_breakpoints(&self, cancel: Option<&CancellationToken>) -> JdwpResult<()> {
        self.execute(
            move |id| CommandBuilder::new(id, command_sets::EVENT_REQUEST, event_commands::CLEAR_ALL_BREAKPOINTS).finalize(),
            cancel,
        )
        .await?;
        Ok(())
    }
}
