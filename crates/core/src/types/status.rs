//! Order status state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Orders move through a fixed forward progression, one step at a time:
///
/// ```text
/// Pending -> Processing -> Shipped -> Delivered
/// ```
///
/// `Cancelled` is terminal and reachable from any non-terminal state.
/// Nothing leaves `Delivered` or `Cancelled`. Transition legality is
/// enforced by [`OrderStatus::can_transition_to`]; callers reject illegal
/// requests before persisting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Initial status of a freshly placed order.
    #[default]
    Pending,
    /// Order accepted and being prepared.
    Processing,
    /// Order handed to the carrier.
    Shipped,
    /// Order received by the customer. Terminal.
    Delivered,
    /// Order cancelled. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transitions are allowed out of this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The next status in the forward progression, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Processing),
            Self::Processing => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Legal moves are the single forward step and cancellation of any
    /// non-terminal order. Self-transitions are illegal.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        if next == Self::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(next)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use OrderStatus::{Cancelled, Delivered, Pending, Processing, Shipped};

    const ALL: [OrderStatus; 5] = [Pending, Processing, Shipped, Delivered, Cancelled];

    #[test]
    fn test_forward_steps_are_legal() {
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn test_skipping_steps_is_illegal() {
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Processing.can_transition_to(Delivered));
    }

    #[test]
    fn test_backward_steps_are_illegal() {
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Shipped.can_transition_to(Processing));
        assert!(!Processing.can_transition_to(Pending));
    }

    #[test]
    fn test_cancel_from_non_terminal_only() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_states_allow_nothing() {
        for next in ALL {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_self_transitions_are_illegal() {
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in ALL {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("Unknown".parse::<OrderStatus>().is_err());
    }
}
