//! JSON-file backed order store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::order::{Order, OrderId, OrderStatus, OrderTicket};
use crate::domain::ExitReason;

#[derive(Debug, Error)]
pub enum OrderStoreError {
    #[error("order {0} not found")]
    NotFound(OrderId),
    #[error("order {id}: invalid transition {from:?} -> {to:?}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("order store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("order store serialization: {0}")]
    Json(#[from] serde_json::Error),
}

/// Aggregate counters over the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub executed: usize,
    pub rejected: usize,
    pub closed: usize,
    pub wins: usize,
    pub losses: usize,
    pub winrate: f64,
    pub total_pnl_percent: f64,
}

/// Orders keyed by id, optionally persisted to a JSON file after every
/// mutation. Ids are sequential and embed the coin for greppability.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: HashMap<OrderId, Order>,
    next_seq: u64,
    path: Option<PathBuf>,
}

impl OrderStore {
    /// In-memory store, nothing persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store backed by `path`; existing history is loaded first.
    pub fn with_file(path: impl AsRef<Path>) -> Result<Self, OrderStoreError> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self {
            path: Some(path.clone()),
            ..Self::default()
        };
        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let orders: Vec<Order> = serde_json::from_str(&raw)?;
            store.next_seq = orders.len() as u64;
            store.orders = orders.into_iter().map(|o| (o.id.clone(), o)).collect();
            info!(count = store.orders.len(), "order history loaded");
        }
        Ok(store)
    }

    pub fn submit(&mut self, ticket: OrderTicket) -> Result<OrderId, OrderStoreError> {
        self.next_seq += 1;
        let id = OrderId(format!("{}-{:06}", ticket.coin, self.next_seq));
        let order = Order::new(id.clone(), ticket, Utc::now());
        info!(id = %order.id, coin = %order.ticket.coin, signal = %order.ticket.signal, "order submitted");
        self.orders.insert(id.clone(), order);
        self.save()?;
        Ok(id)
    }

    pub fn accept(&mut self, id: &OrderId) -> Result<(), OrderStoreError> {
        self.transition(id, OrderStatus::Accepted, |_| {})
    }

    pub fn reject(&mut self, id: &OrderId, reason: &str) -> Result<(), OrderStoreError> {
        let reason = reason.to_string();
        self.transition(id, OrderStatus::Rejected, move |order| {
            order.rejection_reason = Some(reason);
        })
    }

    pub fn execute(&mut self, id: &OrderId) -> Result<(), OrderStoreError> {
        self.transition(id, OrderStatus::Executed, |order| {
            order.executed_at = Some(order.updated_at);
        })
    }

    pub fn close(
        &mut self,
        id: &OrderId,
        exit_price: f64,
        reason: ExitReason,
    ) -> Result<(), OrderStoreError> {
        self.transition(id, OrderStatus::Closed, move |order| {
            order.exit_price = Some(exit_price);
            order.exit_reason = Some(reason);
            order.pnl_percent = Some(order.close_pnl_percent(exit_price));
        })
    }

    fn transition(
        &mut self,
        id: &OrderId,
        to: OrderStatus,
        apply: impl FnOnce(&mut Order),
    ) -> Result<(), OrderStoreError> {
        let order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| OrderStoreError::NotFound(id.clone()))?;
        if !order.status.can_move_to(to) {
            return Err(OrderStoreError::InvalidTransition {
                id: id.clone(),
                from: order.status,
                to,
            });
        }
        order.status = to;
        order.updated_at = Utc::now();
        apply(order);
        info!(id = %id, status = ?to, "order transition");
        self.save()
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn by_status(&self, status: OrderStatus) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| o.status == status)
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn statistics(&self) -> OrderStats {
        let mut stats = OrderStats {
            total: self.orders.len(),
            ..OrderStats::default()
        };
        for order in self.orders.values() {
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Accepted => stats.accepted += 1,
                OrderStatus::Executed => stats.executed += 1,
                OrderStatus::Rejected => stats.rejected += 1,
                OrderStatus::Closed => stats.closed += 1,
            }
            if let Some(pnl) = order.pnl_percent {
                stats.total_pnl_percent += pnl;
                if pnl > 0.0 {
                    stats.wins += 1;
                } else {
                    stats.losses += 1;
                }
            }
        }
        if stats.wins + stats.losses > 0 {
            stats.winrate = stats.wins as f64 / (stats.wins + stats.losses) as f64;
        }
        stats
    }

    fn save(&self) -> Result<(), OrderStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut orders: Vec<&Order> = self.orders.values().collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.0.cmp(&b.id.0)));
        fs::write(path, serde_json::to_string_pretty(&orders)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Confidence, Signal};

    fn ticket(coin: &str) -> OrderTicket {
        OrderTicket {
            coin: coin.to_string(),
            signal: Signal::Buy,
            entry_price: 100.0,
            stop_loss: 99.2,
            take_profit: 101.0,
            stop_loss_percent: 0.8,
            take_profit_percent: 1.0,
            risk_reward: 1.25,
            confidence: Confidence::High,
            signal_quality: 85.0,
            buy_votes: 9,
            sell_votes: 2,
            reasons: vec!["RSI oversold".into()],
        }
    }

    #[test]
    fn full_lifecycle() {
        let mut store = OrderStore::new();
        let id = store.submit(ticket("BTC")).unwrap();
        assert_eq!(store.get(&id).unwrap().status, OrderStatus::Pending);

        store.accept(&id).unwrap();
        store.execute(&id).unwrap();
        assert!(store.get(&id).unwrap().executed_at.is_some());

        store.close(&id, 101.0, ExitReason::TakeProfit1).unwrap();
        let order = store.get(&id).unwrap();
        assert_eq!(order.status, OrderStatus::Closed);
        assert!((order.pnl_percent.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejected_order_is_terminal() {
        let mut store = OrderStore::new();
        let id = store.submit(ticket("BTC")).unwrap();
        store.reject(&id, "spread too wide").unwrap();
        let err = store.accept(&id).unwrap_err();
        assert!(matches!(err, OrderStoreError::InvalidTransition { .. }));
    }

    #[test]
    fn cannot_execute_pending() {
        let mut store = OrderStore::new();
        let id = store.submit(ticket("BTC")).unwrap();
        let err = store.execute(&id).unwrap_err();
        assert!(matches!(
            err,
            OrderStoreError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Executed,
                ..
            }
        ));
    }

    #[test]
    fn unknown_id() {
        let mut store = OrderStore::new();
        let err = store.accept(&OrderId("nope".into())).unwrap_err();
        assert!(matches!(err, OrderStoreError::NotFound(_)));
    }

    #[test]
    fn short_close_pnl_sign() {
        let mut store = OrderStore::new();
        let mut t = ticket("ETH");
        t.signal = Signal::Sell;
        let id = store.submit(t).unwrap();
        store.accept(&id).unwrap();
        store.execute(&id).unwrap();
        store.close(&id, 99.0, ExitReason::TakeProfit1).unwrap();
        assert!(store.get(&id).unwrap().pnl_percent.unwrap() > 0.0);
    }

    #[test]
    fn persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        let id = {
            let mut store = OrderStore::with_file(&path).unwrap();
            let id = store.submit(ticket("BTC")).unwrap();
            store.accept(&id).unwrap();
            id
        };
        let store = OrderStore::with_file(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().status, OrderStatus::Accepted);
        // Sequence continues past loaded history.
        let mut store = store;
        let id2 = store.submit(ticket("BTC")).unwrap();
        assert_ne!(id, id2);
    }

    #[test]
    fn statistics_roll_up() {
        let mut store = OrderStore::new();
        for (exit, _) in [(101.0, true), (99.0, false)] {
            let id = store.submit(ticket("BTC")).unwrap();
            store.accept(&id).unwrap();
            store.execute(&id).unwrap();
            store.close(&id, exit, ExitReason::StopLoss).unwrap();
        }
        let pending = store.submit(ticket("ETH")).unwrap();
        let _ = pending;
        let stats = store.statistics();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.closed, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert!((stats.winrate - 0.5).abs() < 1e-9);
    }
}
