//! # Sale Planning
//!
//! The pure half of recording a sale: validate the request against the
//! caller's product snapshot and compute the immutable sale record plus the
//! resulting stock level. The storage half (one atomic write of both
//! effects) lives in `stockbook-db`.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  prepare_sale(product_id, quantity, snapshot)                           │
//! │       │                                                                 │
//! │       ├── product_id blank?       → ValidationError::NoProductSelected  │
//! │       ├── not in snapshot?        → ValidationError::ProductNotFound    │
//! │       ├── quantity <= 0?          → ValidationError::MustBePositive     │
//! │       ├── stock < quantity?       → CoreError::InsufficientStock        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PreparedSale { sale: NewSale, stock_before, stock_after }              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stockbook-db: INSERT sale + UPDATE stock in ONE transaction           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests for more than the available stock are rejected, never clamped.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{NewSale, Product};
use crate::validation::validate_sale_quantity;

/// Revenue, cost and profit of selling `quantity` units at fixed prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub total_revenue: Money,
    pub total_cost: Money,
    pub profit: Money,
}

impl SaleTotals {
    /// Checked computation; overflow is `CoreError::AmountOverflow`.
    pub fn compute(sale_price: Money, cost_price: Money, quantity: i64) -> CoreResult<Self> {
        let overflow = |what: &str| CoreError::AmountOverflow {
            what: what.to_string(),
        };

        let total_revenue = sale_price
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| overflow("total revenue"))?;
        let total_cost = cost_price
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| overflow("total cost"))?;
        let profit = total_revenue
            .checked_sub(total_cost)
            .ok_or_else(|| overflow("profit"))?;

        Ok(SaleTotals {
            total_revenue,
            total_cost,
            profit,
        })
    }
}

/// A validated sale, ready to be written atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedSale {
    /// The record to append to the Sales collection.
    pub sale: NewSale,
    /// Stock the plan was validated against.
    pub stock_before: i64,
    /// Stock to store once the sale commits.
    pub stock_after: i64,
}

impl PreparedSale {
    pub fn product_id(&self) -> &str {
        &self.sale.product_id
    }
}

/// Validates a sale request and computes its totals.
///
/// Checks run in a fixed order and the first failure wins. The product's
/// current name and prices are copied into the sale.
///
/// ## Example
/// ```rust
/// use stockbook_core::{prepare_sale, CoreError, Product};
///
/// let product = Product {
///     id: "p1".to_string(),
///     name: "Whey".to_string(),
///     cost_price_cents: 2000,
///     sale_price_cents: 3500,
///     quantity: 2,
///     created_at: None,
///     last_updated: None,
/// };
///
/// let err = prepare_sale("p1", 5, &[product]).unwrap_err();
/// assert_eq!(err.available_quantity(), Some(2));
/// ```
pub fn prepare_sale(
    product_id: &str,
    quantity: i64,
    products: &[Product],
) -> CoreResult<PreparedSale> {
    let product_id = product_id.trim();
    if product_id.is_empty() {
        return Err(ValidationError::NoProductSelected.into());
    }

    let product = products
        .iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| ValidationError::ProductNotFound {
            id: product_id.to_string(),
        })?;

    validate_sale_quantity(quantity)?;

    if !product.can_sell(quantity) {
        return Err(CoreError::InsufficientStock {
            product_id: product.id.clone(),
            available: product.quantity,
            requested: quantity,
        });
    }

    let totals = SaleTotals::compute(product.sale_price(), product.cost_price(), quantity)?;

    Ok(PreparedSale {
        sale: NewSale {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            sale_price_cents: product.sale_price_cents,
            cost_price_cents: product.cost_price_cents,
            total_revenue_cents: totals.total_revenue.cents(),
            total_cost_cents: totals.total_cost.cents(),
            profit_cents: totals.profit.cents(),
        },
        stock_before: product.quantity,
        stock_after: product.quantity - quantity,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn whey(quantity: i64) -> Product {
        Product {
            id: "whey".to_string(),
            name: "Whey".to_string(),
            cost_price_cents: 2000,
            sale_price_cents: 3500,
            quantity,
            created_at: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_whey_sale_totals() {
        let plan = prepare_sale("whey", 3, &[whey(10)]).unwrap();

        assert_eq!(plan.sale.total_revenue(), Money::from_cents(10500));
        assert_eq!(plan.sale.total_cost(), Money::from_cents(6000));
        assert_eq!(plan.sale.profit(), Money::from_cents(4500));
        assert_eq!(plan.sale.product_name, "Whey");
        assert_eq!(plan.sale.sale_price_cents, 3500);
        assert_eq!(plan.sale.cost_price_cents, 2000);
        assert_eq!(plan.stock_before, 10);
        assert_eq!(plan.stock_after, 7);
        assert_eq!(plan.product_id(), "whey");
    }

    #[test]
    fn test_insufficient_stock_reports_available() {
        let err = prepare_sale("whey", 5, &[whey(2)]).unwrap_err();

        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product_id: "whey".to_string(),
                available: 2,
                requested: 5,
            }
        );
        assert!(err.to_string().contains("only 2 units available"));
    }

    #[test]
    fn test_selling_entire_stock_is_allowed() {
        let plan = prepare_sale("whey", 2, &[whey(2)]).unwrap();
        assert_eq!(plan.stock_after, 0);
    }

    #[test]
    fn test_blank_product_id_wins_over_everything() {
        let err = prepare_sale("  ", 0, &[]).unwrap_err();
        assert_eq!(err, CoreError::Validation(ValidationError::NoProductSelected));
    }

    #[test]
    fn test_unknown_product() {
        let err = prepare_sale("ghost", 1, &[whey(10)]).unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation(ValidationError::ProductNotFound {
                id: "ghost".to_string()
            })
        );
        assert_eq!(err.to_string(), "Validation error: product not found");
    }

    #[test]
    fn test_lookup_precedes_quantity_check() {
        let err = prepare_sale("ghost", -1, &[whey(10)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::ProductNotFound { .. })
        ));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        for qty in [0, -4] {
            let err = prepare_sale("whey", qty, &[whey(10)]).unwrap_err();
            assert!(matches!(
                err,
                CoreError::Validation(ValidationError::MustBePositive { .. })
            ));
        }
    }

    #[test]
    fn test_overflow_is_an_error_not_a_panic() {
        let mut huge = whey(i64::MAX);
        huge.sale_price_cents = i64::MAX / 2;
        let err = prepare_sale("whey", 3, &[huge]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));
    }

    #[test]
    fn test_zero_price_product() {
        let mut freebie = whey(4);
        freebie.sale_price_cents = 0;
        let plan = prepare_sale("whey", 2, &[freebie]).unwrap();
        assert_eq!(plan.sale.profit(), Money::from_cents(-4000));
    }
}
