//! Back-office dashboard figures.

use crate::{
    core::money::format_brl,
    entities::{Product, Sale, SaleStatus, sale},
    errors::Result,
};
use sea_orm::{PaginatorTrait, QuerySelect, prelude::*};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Sum of totals of completed sales
    pub revenue_cents: i64,
    pub pending_sales: u64,
    pub completed_sales: u64,
    pub product_count: u64,
}

impl fmt::Display for DashboardSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "💰 Revenue: {}", format_brl(self.revenue_cents))?;
        writeln!(f, "⏳ Pending sales: {}", self.pending_sales)?;
        writeln!(f, "✅ Completed sales: {}", self.completed_sales)?;
        write!(f, "📦 Products: {}", self.product_count)
    }
}

async fn count_with_status(db: &DatabaseConnection, status: SaleStatus) -> Result<u64> {
    Sale::find()
        .filter(sale::Column::Status.eq(status))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Computes the dashboard figures.
pub async fn generate_dashboard(db: &DatabaseConnection) -> Result<DashboardSummary> {
    // SUM over no rows is NULL
    let revenue_cents = Sale::find()
        .select_only()
        .column_as(sale::Column::TotalCents.sum(), "revenue_cents")
        .filter(sale::Column::Status.eq(SaleStatus::Completed))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?
        .flatten();

    Ok(DashboardSummary {
        revenue_cents: revenue_cents.unwrap_or_default(),
        pending_sales: count_with_status(db, SaleStatus::Pending).await?,
        completed_sales: count_with_status(db, SaleStatus::Completed).await?,
        product_count: Product::find().count(db).await?,
    })
}
