//! Outstanding balance aggregation per customer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::records::{Customer, Payment, Sale};

/// Derived balance row for one customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CustomerBalance {
    pub customer_id: String,
    pub name: String,
    pub total_sales: f64,
    pub total_paid: f64,
    pub outstanding: f64,
}

/// Balance = sum of sale totals - sum of payments, for every customer.
///
/// Sales and payments referencing unknown customers are ignored. Output keeps
/// the order of `customers`.
pub fn compute_balances(
    customers: &[Customer],
    sales: &[Sale],
    payments: &[Payment],
) -> Vec<CustomerBalance> {
    let mut sold: HashMap<&str, f64> = HashMap::new();
    for sale in sales {
        *sold.entry(sale.customer_id.as_str()).or_default() += sale.total_amount;
    }

    let mut paid: HashMap<&str, f64> = HashMap::new();
    for payment in payments {
        *paid.entry(payment.customer_id.as_str()).or_default() += payment.amount;
    }

    customers
        .iter()
        .map(|customer| {
            let total_sales = sold.get(customer.id.as_str()).copied().unwrap_or(0.0);
            let total_paid = paid.get(customer.id.as_str()).copied().unwrap_or(0.0);
            CustomerBalance {
                customer_id: customer.id.clone(),
                name: customer.name.clone(),
                total_sales,
                total_paid,
                outstanding: total_sales - total_paid,
            }
        })
        .collect()
}
