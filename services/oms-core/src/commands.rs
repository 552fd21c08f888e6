//! Command consumer
//!
//! Translates admitted commands into canonical order events. The decision
//! itself is pure ([`decide`]): it consults the persisted status and the
//! shared FSM, so the command path and the reconciliation path can never
//! disagree on legality.

use crate::OmsContext;
use atlas_bus::BusMessage;
use atlas_types::command::{CommandType, OrderCommand};
use atlas_types::event::{OrderEvent, OrderEventType};
use atlas_types::fsm;
use atlas_types::order::OrderStatus;
use atlas_types::report::{ExecType, ExecutionReport};
use tracing::{info, warn};

/// Outcome of a command against the current order status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandDecision {
    /// Emit `event_type`, mirror an exec report, optionally persist a new
    /// order row.
    Accept {
        event_type: OrderEventType,
        exec_type: ExecType,
        exec_status: OrderStatus,
        persist: bool,
    },
    /// NEW command against an ineligible status: emit a REJECTED report.
    Reject { reason: String },
    /// CANCEL with no legal path (or an unsupported verb): swallow.
    Ignore,
}

/// Decide what a command does to an order currently at `current`.
pub fn decide(command_type: CommandType, current: OrderStatus) -> CommandDecision {
    match command_type {
        CommandType::New => match fsm::can_transition(current, OrderStatus::PendingSubmit) {
            Ok(()) => CommandDecision::Accept {
                event_type: OrderEventType::OrderCreated,
                exec_type: ExecType::New,
                exec_status: OrderStatus::PendingSubmit,
                persist: true,
            },
            Err(err) => CommandDecision::Reject {
                reason: err.to_string(),
            },
        },
        CommandType::Cancel => {
            let cancelable = fsm::can_transition(current, OrderStatus::Canceled).is_ok()
                || fsm::can_transition(current, OrderStatus::CancelPending).is_ok();
            if cancelable {
                CommandDecision::Accept {
                    event_type: OrderEventType::OrderCancelRequested,
                    exec_type: ExecType::PendingCancel,
                    exec_status: OrderStatus::CancelPending,
                    persist: false,
                }
            } else {
                CommandDecision::Ignore
            }
        }
        CommandType::Replace => CommandDecision::Ignore,
    }
}

/// Handle one message from `orders.commands`.
pub async fn handle_command(ctx: &OmsContext, msg: BusMessage) -> anyhow::Result<()> {
    let cmd: OrderCommand = match serde_json::from_slice(&msg.payload) {
        Ok(cmd) => cmd,
        Err(err) => {
            // Poison message: commit and move on.
            warn!(error = %err, "undecodable command");
            return Ok(());
        }
    };

    info!(
        command_type = %cmd.command_type,
        order_id = %cmd.order_id,
        symbol = %cmd.symbol,
        "processing command"
    );

    let current = ctx
        .orders
        .get_status(&cmd.order_id)
        .await?
        .unwrap_or(fsm::INITIAL);

    match decide(cmd.command_type, current) {
        CommandDecision::Reject { reason } => {
            warn!(order_id = %cmd.order_id, %reason, "rejecting command");
            send_exec_report(ctx, &cmd, ExecType::Rejected, OrderStatus::Rejected, &reason).await;
            Ok(())
        }
        CommandDecision::Ignore => {
            info!(order_id = %cmd.order_id, %current, "command has no legal transition, ignoring");
            Ok(())
        }
        CommandDecision::Accept {
            event_type,
            exec_type,
            exec_status,
            persist,
        } => {
            if persist {
                ctx.orders.create(&cmd).await?;
            }

            // Canonical event first: it is the durable history.
            let event = OrderEvent::new(&cmd.order_id, event_type, &cmd)?;
            ctx.events
                .send(&cmd.order_id, &serde_json::to_vec(&event)?)
                .await?;
            info!(order_id = %cmd.order_id, %event_type, "emitted event");

            // Mirror exec report for UI latency; losing it is tolerable.
            send_exec_report(ctx, &cmd, exec_type, exec_status, "").await;
            Ok(())
        }
    }
}

async fn send_exec_report(
    ctx: &OmsContext,
    cmd: &OrderCommand,
    exec_type: ExecType,
    status: OrderStatus,
    reason: &str,
) {
    let report = ExecutionReport::from_command(cmd, exec_type, status, reason);
    let payload = match serde_json::to_vec(&report) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(order_id = %cmd.order_id, error = %err, "failed to encode exec report");
            return;
        }
    };
    if let Err(err) = ctx.execs.send(&cmd.order_id, &payload).await {
        warn!(order_id = %cmd.order_id, error = %err, "failed to publish exec report");
    }
}
