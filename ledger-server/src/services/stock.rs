//! Stock/catalog collaborator
//!
//! Invoked as a side effect on order creation. External-source line items
//! (manually keyed in, sourced outside the catalog) are never decremented.

use async_trait::async_trait;
use dashmap::DashMap;
use shared::models::LineItem;
use std::sync::Arc;

/// Stock decrement boundary
#[async_trait]
pub trait StockService: Send + Sync {
    /// Decrement stock for catalog-backed lines. Failures are the
    /// collaborator's concern; the ledger treats this as best-effort.
    async fn decrement(&self, items: &[LineItem]);
}

/// No-op stock service
#[derive(Debug, Clone, Default)]
pub struct NoopStockService;

#[async_trait]
impl StockService for NoopStockService {
    async fn decrement(&self, _items: &[LineItem]) {}
}

/// In-memory stock counter (tests / local runs)
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockService {
    decremented: Arc<DashMap<i64, i64>>,
}

impl InMemoryStockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total quantity decremented for a product
    pub fn decremented(&self, product_id: i64) -> i64 {
        self.decremented.get(&product_id).map(|v| *v).unwrap_or(0)
    }
}

#[async_trait]
impl StockService for InMemoryStockService {
    async fn decrement(&self, items: &[LineItem]) {
        for item in items {
            if item.external_source {
                continue;
            }
            *self.decremented.entry(item.id).or_insert(0) += item.quantity as i64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_external_source_lines_are_skipped() {
        let stock = InMemoryStockService::new();
        let items = vec![
            LineItem {
                id: 1,
                name: "catalog item".into(),
                quantity: 2,
                unit_price: 1_000,
                external_source: false,
            },
            LineItem {
                id: 2,
                name: "manual item".into(),
                quantity: 5,
                unit_price: 1_000,
                external_source: true,
            },
        ];
        stock.decrement(&items).await;
        assert_eq!(stock.decremented(1), 2);
        assert_eq!(stock.decremented(2), 0);
    }
}
