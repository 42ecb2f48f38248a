//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Expense      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name           │   │  product_id ····│·► informational   │       │
//! │  │  cost / sale    │   │  name snapshot  │   │  description    │       │
//! │  │  quantity ≥ 0   │   │  price snapshot │   │  amount         │       │
//! │  │  created_at     │   │  totals, profit │   │  date           │       │
//! │  │  last_updated   │   │  date           │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Timestamps are assigned by the store. Until a record is acknowledged  │
//! │  they are `None`, and every consumer must tolerate that.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `Sale` copies the product's name and prices at the moment of sale.
//! Editing or deleting the product later never changes recorded sales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::sale::SaleTotals;
use crate::validation::{
    validate_amount_cents, validate_expense_description, validate_price_cents,
    validate_product_name, validate_sale_quantity, validate_stock_level, ValidationResult,
};
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Owner Identity
// =============================================================================

/// Opaque identity of the authenticated owner.
///
/// Supplied by the authentication collaborator once sign-in (anonymous or
/// token based) completes. Every collection is scoped to one owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wraps an owner identity, rejecting blank values.
    pub fn new(id: impl Into<String>) -> ValidationResult<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "owner id".to_string(),
            });
        }
        Ok(OwnerId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Collections
// =============================================================================

/// The three owner-scoped collections of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Products,
    Sales,
    Expenses,
}

impl Collection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Sales => "sales",
            Collection::Expenses => "expenses",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the owner's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// What the owner paid per unit, in cents.
    #[serde(rename = "costPrice")]
    pub cost_price_cents: i64,

    /// What the owner charges per unit, in cents.
    #[serde(rename = "salePrice")]
    pub sale_price_cents: i64,

    /// Current stock. Never negative.
    pub quantity: i64,

    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,

    #[ts(as = "Option<String>")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Product {
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Whether the product belongs in the low-stock list.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= LOW_STOCK_THRESHOLD
    }

    /// Whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// Product form data, used both to create and to replace a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(rename = "costPrice")]
    pub cost_price_cents: i64,
    #[serde(rename = "salePrice")]
    pub sale_price_cents: i64,
    pub quantity: i64,
}

impl NewProduct {
    /// Checks name, prices and stock level.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::NewProduct;
    ///
    /// let ok = NewProduct {
    ///     name: "Whey".to_string(),
    ///     cost_price_cents: 2000,
    ///     sale_price_cents: 3500,
    ///     quantity: 10,
    /// };
    /// assert!(ok.validate().is_ok());
    ///
    /// let negative_stock = NewProduct { quantity: -1, ..ok };
    /// assert!(negative_stock.validate().is_err());
    /// ```
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_price_cents("cost price", self.cost_price_cents)?;
        validate_price_cents("sale price", self.sale_price_cents)?;
        validate_stock_level(self.quantity)?;
        Ok(())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Back-reference to the product; not enforced, the product may be gone.
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit sale price at time of sale (frozen).
    #[serde(rename = "salePrice")]
    pub sale_price_cents: i64,
    /// Unit cost price at time of sale (frozen).
    #[serde(rename = "costPrice")]
    pub cost_price_cents: i64,
    #[serde(rename = "totalRevenue")]
    pub total_revenue_cents: i64,
    #[serde(rename = "totalCost")]
    pub total_cost_cents: i64,
    #[serde(rename = "profit")]
    pub profit_cents: i64,
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }

    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

/// A computed sale that has not been persisted yet.
///
/// [`crate::sale::prepare_sale`] builds these from a product snapshot. Any
/// other source must pass [`NewSale::validate`] before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    #[serde(rename = "salePrice")]
    pub sale_price_cents: i64,
    #[serde(rename = "costPrice")]
    pub cost_price_cents: i64,
    #[serde(rename = "totalRevenue")]
    pub total_revenue_cents: i64,
    #[serde(rename = "totalCost")]
    pub total_cost_cents: i64,
    #[serde(rename = "profit")]
    pub profit_cents: i64,
}

impl NewSale {
    /// Checks the snapshot fields and that every total is derived exactly
    /// from the unit prices and quantity.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::NewSale;
    ///
    /// let sale = NewSale {
    ///     product_id: "p1".to_string(),
    ///     product_name: "Whey".to_string(),
    ///     quantity: 3,
    ///     sale_price_cents: 3500,
    ///     cost_price_cents: 2000,
    ///     total_revenue_cents: 10500,
    ///     total_cost_cents: 6000,
    ///     profit_cents: 4500,
    /// };
    /// assert!(sale.validate().is_ok());
    ///
    /// let inflated = NewSale { total_revenue_cents: 999_999, ..sale };
    /// assert!(inflated.validate().is_err());
    /// ```
    pub fn validate(&self) -> CoreResult<()> {
        if self.product_id.trim().is_empty() {
            return Err(ValidationError::NoProductSelected.into());
        }
        validate_product_name(&self.product_name)?;
        validate_sale_quantity(self.quantity)?;
        validate_price_cents("sale price", self.sale_price_cents)?;
        validate_price_cents("cost price", self.cost_price_cents)?;

        let totals = SaleTotals::compute(
            Money::from_cents(self.sale_price_cents),
            Money::from_cents(self.cost_price_cents),
            self.quantity,
        )?;
        expect_cents("total revenue", totals.total_revenue, self.total_revenue_cents)?;
        expect_cents("total cost", totals.total_cost, self.total_cost_cents)?;
        expect_cents("profit", totals.profit, self.profit_cents)?;
        Ok(())
    }

    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }

    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }

    /// Attaches the store-assigned id and timestamp.
    pub fn into_sale(self, id: String, date: Option<DateTime<Utc>>) -> Sale {
        Sale {
            id,
            product_id: self.product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            sale_price_cents: self.sale_price_cents,
            cost_price_cents: self.cost_price_cents,
            total_revenue_cents: self.total_revenue_cents,
            total_cost_cents: self.total_cost_cents,
            profit_cents: self.profit_cents,
            date,
        }
    }
}

fn expect_cents(field: &str, expected: Money, actual: i64) -> ValidationResult<()> {
    if expected.cents() != actual {
        return Err(ValidationError::Mismatch {
            field: field.to_string(),
            expected: expected.cents(),
            actual,
        });
    }
    Ok(())
}

// =============================================================================
// Expense
// =============================================================================

/// A business expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub description: String,
    #[serde(rename = "amount")]
    pub amount_cents: i64,
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Expense form data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    #[serde(rename = "amount")]
    pub amount_cents: i64,
}

impl NewExpense {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_expense_description(&self.description)?;
        validate_amount_cents(self.amount_cents)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Whey".to_string(),
            cost_price_cents: 2000,
            sale_price_cents: 3500,
            quantity,
            created_at: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_owner_id_rejects_blank() {
        assert!(OwnerId::new("   ").is_err());
        assert_eq!(OwnerId::new(" uid-1 ").unwrap().as_str(), "uid-1");
    }

    #[test]
    fn test_low_stock_boundary() {
        assert!(product(5).is_low_stock());
        assert!(product(0).is_low_stock());
        assert!(!product(6).is_low_stock());
    }

    #[test]
    fn test_can_sell() {
        assert!(product(3).can_sell(3));
        assert!(!product(2).can_sell(5));
    }

    #[test]
    fn test_new_expense_validation() {
        let ok = NewExpense {
            description: "Rent".to_string(),
            amount_cents: 10_000,
        };
        assert!(ok.validate().is_ok());

        let blank = NewExpense {
            description: " ".to_string(),
            ..ok.clone()
        };
        assert!(blank.validate().is_err());

        let negative = NewExpense {
            amount_cents: -1,
            ..ok
        };
        assert!(negative.validate().is_err());
    }

    fn whey_sale() -> NewSale {
        NewSale {
            product_id: "p1".to_string(),
            product_name: "Whey".to_string(),
            quantity: 3,
            sale_price_cents: 3500,
            cost_price_cents: 2000,
            total_revenue_cents: 10500,
            total_cost_cents: 6000,
            profit_cents: 4500,
        }
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let json = serde_json::to_value(product(10)).unwrap();
        assert_eq!(json["costPrice"], 2000);
        assert_eq!(json["salePrice"], 3500);
        assert!(json.get("costPriceCents").is_none());
        assert!(json["lastUpdated"].is_null());
    }

    #[test]
    fn test_sale_and_expense_field_names() {
        let sale = serde_json::to_value(whey_sale().into_sale("s1".to_string(), None)).unwrap();
        assert_eq!(sale["productName"], "Whey");
        assert_eq!(sale["salePrice"], 3500);
        assert_eq!(sale["costPrice"], 2000);
        assert_eq!(sale["totalRevenue"], 10500);
        assert_eq!(sale["totalCost"], 6000);
        assert_eq!(sale["profit"], 4500);

        let expense: NewExpense =
            serde_json::from_str(r#"{"description":"Rent","amount":1000}"#).unwrap();
        assert_eq!(expense.amount_cents, 1000);
    }

    #[test]
    fn test_new_sale_validation() {
        assert!(whey_sale().validate().is_ok());

        let inflated = NewSale {
            total_revenue_cents: 999_999,
            profit_cents: 7,
            ..whey_sale()
        };
        assert_eq!(
            inflated.validate(),
            Err(ValidationError::Mismatch {
                field: "total revenue".to_string(),
                expected: 10500,
                actual: 999_999,
            }
            .into())
        );

        let wrong_profit = NewSale {
            profit_cents: 7,
            ..whey_sale()
        };
        assert!(wrong_profit.validate().is_err());

        let zero_qty = NewSale {
            quantity: 0,
            total_revenue_cents: 0,
            total_cost_cents: 0,
            profit_cents: 0,
            ..whey_sale()
        };
        assert!(zero_qty.validate().is_err());

        let no_product = NewSale {
            product_id: " ".to_string(),
            ..whey_sale()
        };
        assert_eq!(
            no_product.validate(),
            Err(ValidationError::NoProductSelected.into())
        );
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Products.to_string(), "products");
        assert_eq!(Collection::Sales.as_str(), "sales");
        assert_eq!(Collection::Expenses.as_str(), "expenses");
    }
}
