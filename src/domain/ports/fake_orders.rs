use chrono::NaiveDate;

use crate::domain::entities::daily_metrics::FakeOrderAdjustment;
use crate::domain::error::DomainError;

/// Lookup service over the out-of-band fake-order detection results.
/// Returns a zero adjustment for days with no detected fake orders.
pub trait FakeOrderLookup: Send + Sync {
    fn adjustment(
        &self,
        restaurant_id: i64,
        date: NaiveDate,
    ) -> Result<FakeOrderAdjustment, DomainError>;
}

/// No-op lookup for deployments without the fake-order pipeline.
pub struct NoFakeOrders;

impl FakeOrderLookup for NoFakeOrders {
    fn adjustment(
        &self,
        _restaurant_id: i64,
        _date: NaiveDate,
    ) -> Result<FakeOrderAdjustment, DomainError> {
        Ok(FakeOrderAdjustment::default())
    }
}
