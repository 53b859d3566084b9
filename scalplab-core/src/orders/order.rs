//! A proposed trade and its lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Confidence, ExitReason, Signal};

/// Lifecycle state. Transitions are one-directional:
/// Pending -> Accepted -> Executed -> Closed, or Pending -> Rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Executed,
    Rejected,
    Closed,
}

impl OrderStatus {
    /// Whether the state machine permits `self -> to`.
    pub fn can_move_to(&self, to: OrderStatus) -> bool {
        matches!(
            (self, to),
            (OrderStatus::Pending, OrderStatus::Accepted)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Accepted, OrderStatus::Executed)
                | (OrderStatus::Executed, OrderStatus::Closed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Closed)
    }
}

/// Opaque order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the caller submits: the actionable slice of a signal analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub coin: String,
    pub signal: Signal,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
    pub risk_reward: f64,
    pub confidence: Confidence,
    pub signal_quality: f64,
    pub buy_votes: u32,
    pub sell_votes: u32,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub ticket: OrderTicket,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub exit_price: Option<f64>,
    pub exit_reason: Option<ExitReason>,
    pub pnl_percent: Option<f64>,
}

impl Order {
    pub fn new(id: OrderId, ticket: OrderTicket, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: OrderStatus::Pending,
            ticket,
            created_at: now,
            updated_at: now,
            executed_at: None,
            rejection_reason: None,
            exit_price: None,
            exit_reason: None,
            pnl_percent: None,
        }
    }

    /// Signed close PnL percent from the stored entry and an exit price.
    pub fn close_pnl_percent(&self, exit_price: f64) -> f64 {
        let dir = match self.ticket.signal {
            Signal::Sell => -1.0,
            _ => 1.0,
        };
        dir * (exit_price - self.ticket.entry_price) / self.ticket.entry_price * 100.0
    }
}
