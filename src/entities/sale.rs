//! Sale entity - A checkout attempt and its payment lifecycle.
//!
//! A sale is created by the storefront checkout in the `pending` state and is
//! afterwards only touched by admin status changes. Product name and unit price
//! are snapshotted so the record survives product edits and deletion.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a sale.
///
/// Moves forward only: `pending -> paid | cancelled`, `paid -> completed | cancelled`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Created by checkout, waiting for the payment to land
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Payment confirmed by an admin
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Goods delivered; terminal
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Abandoned or refused; terminal
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl SaleStatus {
    /// Lower-case name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether an admin may move a sale from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid | Self::Cancelled)
                | (Self::Paid, Self::Completed | Self::Cancelled)
        )
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sale database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product that was bought, cleared if the product is later deleted
    pub product_id: Option<i64>,
    /// Product name at the time of the sale
    pub product_name: String,
    /// Units bought
    pub quantity: i32,
    /// Unit price snapshot in cents
    pub unit_price_cents: i64,
    /// `quantity * unit_price_cents`
    pub total_cents: i64,
    /// Optional customer name given at checkout
    pub customer_name: Option<String>,
    /// Optional customer phone given at checkout
    pub customer_phone: Option<String>,
    /// Current lifecycle status
    pub status: SaleStatus,
    /// Generated PIX "copia e cola" payload, set once the payload is built
    pub pix_code: Option<String>,
    /// Chat user who started the checkout
    pub buyer_id: Option<String>,
    /// When the sale was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale references the product it was created for
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "SetNull"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
