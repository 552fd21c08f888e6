//! Pure order state machine
//!
//! Both the OMS command path and the reconciliation path must share
//! transition rules bit-for-bit; any divergence produces split-brain
//! orders. This module is therefore pure and side-effect free: the command
//! path asks [`can_transition`] before acting, and recovery replays an
//! event stream through [`apply`].

use crate::errors::TransitionError;
use crate::event::OrderEventType;
use crate::order::OrderStatus;

/// Status a freshly observed order starts from.
pub const INITIAL: OrderStatus = OrderStatus::New;

/// Check whether `current → target` is a legal transition.
pub fn can_transition(current: OrderStatus, target: OrderStatus) -> Result<(), TransitionError> {
    use OrderStatus::*;

    let legal = match current {
        New => matches!(target, PendingSubmit),
        // PENDING_SUBMIT → PENDING_SUBMIT absorbs a re-delivered submit.
        PendingSubmit => matches!(target, Live | Rejected | PendingSubmit),
        Live => matches!(target, Filled | PartiallyFilled | CancelPending | ReplacePending),
        PartiallyFilled => matches!(target, Filled | CancelPending | ReplacePending),
        CancelPending => matches!(target, Canceled),
        ReplacePending => matches!(target, Live),
        Filled | Canceled | Rejected => false,
    };

    if legal {
        Ok(())
    } else {
        Err(TransitionError {
            from: current,
            to: target,
        })
    }
}

/// Advance an in-memory status replica by one event.
///
/// Used during reconciliation and recovery to rebuild order state from the
/// canonical event stream. `ORDER_CANCEL_REQUESTED` records intent only;
/// the status advances when the cancellation is confirmed.
pub fn apply(state: OrderStatus, event: OrderEventType) -> OrderStatus {
    match event {
        OrderEventType::OrderCreated => OrderStatus::PendingSubmit,
        OrderEventType::OrderAccepted | OrderEventType::OrderLive => OrderStatus::Live,
        OrderEventType::OrderPartiallyFilled => OrderStatus::PartiallyFilled,
        OrderEventType::OrderFilled => OrderStatus::Filled,
        OrderEventType::OrderCanceled => OrderStatus::Canceled,
        OrderEventType::OrderRejected => OrderStatus::Rejected,
        OrderEventType::OrderCancelRequested => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 9] = [
        New,
        PendingSubmit,
        Live,
        PartiallyFilled,
        Filled,
        CancelPending,
        Canceled,
        ReplacePending,
        Rejected,
    ];

    fn legal_targets(from: OrderStatus) -> Vec<OrderStatus> {
        ALL.iter()
            .copied()
            .filter(|to| can_transition(from, *to).is_ok())
            .collect()
    }

    #[test]
    fn test_transition_table_exhaustive() {
        assert_eq!(legal_targets(New), vec![PendingSubmit]);
        assert_eq!(legal_targets(PendingSubmit), vec![PendingSubmit, Live, Rejected]);
        assert_eq!(
            legal_targets(Live),
            vec![PartiallyFilled, Filled, CancelPending, ReplacePending]
        );
        assert_eq!(
            legal_targets(PartiallyFilled),
            vec![Filled, CancelPending, ReplacePending]
        );
        assert_eq!(legal_targets(CancelPending), vec![Canceled]);
        assert_eq!(legal_targets(ReplacePending), vec![Live]);
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for terminal in [Filled, Canceled, Rejected] {
            assert!(legal_targets(terminal).is_empty(), "{terminal} must be terminal");
        }
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let err = can_transition(Filled, PendingSubmit).unwrap_err();
        assert_eq!(err.from, Filled);
        assert_eq!(err.to, PendingSubmit);
    }

    #[test]
    fn test_apply_happy_path() {
        let mut state = INITIAL;
        for (event, expected) in [
            (OrderEventType::OrderCreated, PendingSubmit),
            (OrderEventType::OrderLive, Live),
            (OrderEventType::OrderPartiallyFilled, PartiallyFilled),
            (OrderEventType::OrderFilled, Filled),
        ] {
            state = apply(state, event);
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn test_apply_cancel_path() {
        let mut state = apply(INITIAL, OrderEventType::OrderCreated);
        state = apply(state, OrderEventType::OrderLive);
        // The request alone does not advance the replica.
        assert_eq!(apply(state, OrderEventType::OrderCancelRequested), Live);
        assert_eq!(apply(state, OrderEventType::OrderCanceled), Canceled);
    }

    #[test]
    fn test_apply_rejection() {
        let state = apply(INITIAL, OrderEventType::OrderCreated);
        assert_eq!(apply(state, OrderEventType::OrderRejected), Rejected);
    }

    #[test]
    fn test_apply_accepted_equals_live() {
        let created = apply(INITIAL, OrderEventType::OrderCreated);
        assert_eq!(
            apply(created, OrderEventType::OrderAccepted),
            apply(created, OrderEventType::OrderLive)
        );
    }
}
