//! Order lifecycle: the status enum and the rules for moving between states.
//!
//! Orders progress `Placed → Processing → Ready → Delivered → Completed`.
//! `Cancelled` is reachable from the first three states only. Staff may skip
//! forward; customers may only cancel their own order shortly after placing it.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    Placed,
    Processing,
    Ready,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Placed,
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Position in the progress bar. `Cancelled` is off the track.
    pub fn progress_step(self) -> Option<u8> {
        match self {
            OrderStatus::Placed => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::Ready => Some(2),
            OrderStatus::Delivered => Some(3),
            OrderStatus::Completed => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            OrderStatus::Placed | OrderStatus::Processing | OrderStatus::Ready
        )
    }

    /// Statuses a review may be left for.
    pub fn is_fulfilled(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }

    pub fn active() -> Vec<OrderStatus> {
        Self::ALL.into_iter().filter(|s| s.is_active()).collect()
    }

    pub fn historical() -> Vec<OrderStatus> {
        Self::ALL.into_iter().filter(|s| s.is_terminal()).collect()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::BadRequest(format!("Invalid order status: {wanted}")))
    }
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The customer who owns the order.
    Owner,
    /// Kitchen staff or an administrator.
    Staff,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Order is already {0}")]
    Unchanged(OrderStatus),
    #[error("Order is {0} and can no longer change")]
    Terminal(OrderStatus),
    #[error("Cannot move order back from {from} to {to}")]
    Backwards { from: OrderStatus, to: OrderStatus },
    #[error("Order cannot be cancelled once it is {0}")]
    NotCancellable(OrderStatus),
    #[error("The cancellation window has passed")]
    WindowElapsed,
    #[error("Customers may only cancel their order")]
    NotPermitted,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotPermitted => AppError::Forbidden,
            other => AppError::Conflict(other.to_string()),
        }
    }
}

/// Rules applied to every status change request.
#[derive(Debug, Clone, Copy)]
pub struct TransitionPolicy {
    pub cancel_window: Duration,
}

impl TransitionPolicy {
    pub fn new(cancel_window_secs: i64) -> Self {
        Self {
            cancel_window: Duration::seconds(cancel_window_secs),
        }
    }

    /// Last instant at which the owner may still cancel.
    pub fn cancel_deadline(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + self.cancel_window
    }

    pub fn owner_can_cancel(
        &self,
        status: OrderStatus,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        matches!(status, OrderStatus::Placed | OrderStatus::Processing)
            && now <= self.cancel_deadline(created_at)
    }

    pub fn check(
        &self,
        actor: Actor,
        from: OrderStatus,
        to: OrderStatus,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if actor == Actor::Owner && to != OrderStatus::Cancelled {
            return Err(TransitionError::NotPermitted);
        }
        if from == to {
            return Err(TransitionError::Unchanged(from));
        }
        if from.is_terminal() {
            return Err(TransitionError::Terminal(from));
        }

        if to == OrderStatus::Cancelled {
            if !from.is_cancellable() {
                return Err(TransitionError::NotCancellable(from));
            }
            if actor == Actor::Owner {
                if from == OrderStatus::Ready {
                    return Err(TransitionError::NotCancellable(from));
                }
                if now > self.cancel_deadline(created_at) {
                    return Err(TransitionError::WindowElapsed);
                }
            }
            return Ok(());
        }

        match (from.progress_step(), to.progress_step()) {
            (Some(a), Some(b)) if b > a => Ok(()),
            _ => Err(TransitionError::Backwards { from, to }),
        }
    }
}

/// Which slice of an order history a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderScope {
    Active,
    History,
}

impl OrderScope {
    pub fn statuses(self) -> Vec<OrderStatus> {
        match self {
            OrderScope::Active => OrderStatus::active(),
            OrderScope::History => OrderStatus::historical(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> TransitionPolicy {
        TransitionPolicy::new(300)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("placed".parse::<OrderStatus>().unwrap(), OrderStatus::Placed);
        assert_eq!(
            " Delivered ".parse::<OrderStatus>().unwrap(),
            OrderStatus::Delivered
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn staff_moves_forward_and_may_skip() {
        let p = policy();
        use OrderStatus::*;
        assert!(p.check(Actor::Staff, Placed, Processing, at(0), at(1)).is_ok());
        assert!(p.check(Actor::Staff, Ready, Completed, at(0), at(9999)).is_ok());
        assert!(p.check(Actor::Staff, Delivered, Completed, at(0), at(9999)).is_ok());
    }

    #[test]
    fn staff_cannot_go_backwards_or_repeat() {
        let p = policy();
        use OrderStatus::*;
        assert_eq!(
            p.check(Actor::Staff, Ready, Processing, at(0), at(1)),
            Err(TransitionError::Backwards {
                from: Ready,
                to: Processing
            })
        );
        assert_eq!(
            p.check(Actor::Staff, Ready, Ready, at(0), at(1)),
            Err(TransitionError::Unchanged(Ready))
        );
    }

    #[test]
    fn terminal_states_are_final() {
        let p = policy();
        use OrderStatus::*;
        assert_eq!(
            p.check(Actor::Staff, Completed, Cancelled, at(0), at(1)),
            Err(TransitionError::Terminal(Completed))
        );
        assert_eq!(
            p.check(Actor::Staff, Cancelled, Placed, at(0), at(1)),
            Err(TransitionError::Terminal(Cancelled))
        );
    }

    #[test]
    fn delivered_orders_cannot_be_cancelled() {
        let p = policy();
        assert_eq!(
            p.check(
                Actor::Staff,
                OrderStatus::Delivered,
                OrderStatus::Cancelled,
                at(0),
                at(1)
            ),
            Err(TransitionError::NotCancellable(OrderStatus::Delivered))
        );
    }

    #[test]
    fn staff_cancel_ignores_window() {
        let p = policy();
        assert!(
            p.check(
                Actor::Staff,
                OrderStatus::Ready,
                OrderStatus::Cancelled,
                at(0),
                at(86_400)
            )
            .is_ok()
        );
    }

    #[test]
    fn owner_cancel_window_boundary() {
        let p = policy();
        use OrderStatus::*;
        assert!(p.check(Actor::Owner, Placed, Cancelled, at(0), at(300)).is_ok());
        assert_eq!(
            p.check(Actor::Owner, Placed, Cancelled, at(0), at(301)),
            Err(TransitionError::WindowElapsed)
        );
        assert!(p.owner_can_cancel(Processing, at(0), at(299)));
        assert!(!p.owner_can_cancel(Processing, at(0), at(301)));
    }

    #[test]
    fn owner_cannot_cancel_ready_or_advance() {
        let p = policy();
        use OrderStatus::*;
        assert_eq!(
            p.check(Actor::Owner, Ready, Cancelled, at(0), at(10)),
            Err(TransitionError::NotCancellable(Ready))
        );
        assert_eq!(
            p.check(Actor::Owner, Placed, Processing, at(0), at(10)),
            Err(TransitionError::NotPermitted)
        );
        assert!(matches!(
            AppError::from(TransitionError::NotPermitted),
            AppError::Forbidden
        ));
    }

    #[test]
    fn scopes_partition_statuses() {
        let active = OrderScope::Active.statuses();
        let history = OrderScope::History.statuses();
        assert_eq!(active.len() + history.len(), OrderStatus::ALL.len());
        assert!(active.contains(&OrderStatus::Delivered));
        assert!(history.contains(&OrderStatus::Cancelled));
        assert_eq!(OrderStatus::Completed.progress_step(), Some(4));
        assert_eq!(OrderStatus::Cancelled.progress_step(), None);
    }
}
