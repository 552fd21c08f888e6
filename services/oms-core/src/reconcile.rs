//! Execution-report reconciliation
//!
//! Consumes `exec.reports` and folds venue (and mirror) reports into the
//! durable order state, emitting the derived canonical event. Reports for
//! unknown orders are logged and committed: the gateway may have crashed
//! before the OMS saw the command, and inventing an order row would turn a
//! partial failure into corrupted history.

use crate::OmsContext;
use atlas_bus::BusMessage;
use atlas_types::errors::TransitionError;
use atlas_types::event::{OrderEvent, OrderEventType};
use atlas_types::fsm;
use atlas_types::order::OrderStatus;
use atlas_types::report::ExecutionReport;
use tracing::{info, warn};

/// Derive the event that advances `current` to the reported status.
///
/// `Ok(None)` when the report carries a non-advancing status (already
/// there, or one the reconciler does not track); `Err` when the jump would
/// be illegal, in which case the report is skipped rather than persisted.
pub fn advance(
    current: OrderStatus,
    reported: OrderStatus,
) -> Result<Option<OrderEventType>, TransitionError> {
    let event_type = match reported {
        OrderStatus::Live => OrderEventType::OrderLive,
        OrderStatus::PartiallyFilled => OrderEventType::OrderPartiallyFilled,
        OrderStatus::Filled => OrderEventType::OrderFilled,
        OrderStatus::Canceled => OrderEventType::OrderCanceled,
        _ => return Ok(None),
    };

    if reported == current {
        return Ok(None);
    }

    fsm::can_transition(current, reported)?;
    Ok(Some(event_type))
}

/// Handle one message from `exec.reports`.
pub async fn handle_report(ctx: &OmsContext, msg: BusMessage) -> anyhow::Result<()> {
    let report: ExecutionReport = match serde_json::from_slice(&msg.payload) {
        Ok(report) => report,
        Err(err) => {
            warn!(error = %err, "undecodable exec report");
            return Ok(());
        }
    };

    info!(
        order_id = %report.order_id,
        status = %report.status,
        cum_qty = %report.cum_qty,
        avg_px = %report.avg_px,
        "received exec report"
    );

    let Some(current) = ctx.orders.get_status(&report.order_id).await? else {
        warn!(order_id = %report.order_id, "order not found, skipping state update");
        return Ok(());
    };

    let event_type = match advance(current, report.status) {
        Ok(Some(event_type)) => event_type,
        Ok(None) => return Ok(()),
        Err(err) => {
            warn!(order_id = %report.order_id, error = %err, "report would jump illegally, skipping");
            return Ok(());
        }
    };

    ctx.orders
        .update_status(&report.order_id, report.status, report.cum_qty, report.avg_px)
        .await?;
    info!(order_id = %report.order_id, from = %current, to = %report.status, "state transition");

    let event = OrderEvent::new(&report.order_id, event_type, &report)?;
    ctx.events
        .send(&report.order_id, &serde_json::to_vec(&event)?)
        .await?;
    info!(order_id = %report.order_id, %event_type, "emitted event");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_live_report_advances_pending_submit() {
        assert_eq!(
            advance(PendingSubmit, Live).unwrap(),
            Some(OrderEventType::OrderLive)
        );
    }

    #[test]
    fn test_fill_report_advances_live() {
        assert_eq!(advance(Live, Filled).unwrap(), Some(OrderEventType::OrderFilled));
        assert_eq!(
            advance(Live, PartiallyFilled).unwrap(),
            Some(OrderEventType::OrderPartiallyFilled)
        );
        assert_eq!(
            advance(PartiallyFilled, Filled).unwrap(),
            Some(OrderEventType::OrderFilled)
        );
    }

    #[test]
    fn test_cancel_confirmation() {
        assert_eq!(
            advance(CancelPending, Canceled).unwrap(),
            Some(OrderEventType::OrderCanceled)
        );
    }

    #[test]
    fn test_same_status_does_not_advance() {
        assert_eq!(advance(Live, Live).unwrap(), None);
        assert_eq!(advance(Filled, Filled).unwrap(), None);
    }

    #[test]
    fn test_untracked_statuses_do_not_advance() {
        // The OMS's own mirror reports come back on the same topic.
        assert_eq!(advance(PendingSubmit, PendingSubmit).unwrap(), None);
        assert_eq!(advance(Live, CancelPending).unwrap(), None);
        assert_eq!(advance(PendingSubmit, Rejected).unwrap(), None);
    }

    #[test]
    fn test_illegal_jump_is_refused() {
        let err = advance(Filled, Live).unwrap_err();
        assert_eq!(err.from, Filled);
        assert_eq!(err.to, Live);

        // A fill racing a cancel: the fill report loses.
        assert!(advance(CancelPending, Filled).is_err());
    }
}
