//! Entity kinds and the cache tags their mutations invalidate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{
    TABLE_CUSTOMERS, TABLE_EXPENSES, TABLE_PAYMENTS, TABLE_PRODUCTIONS, TABLE_SALES,
    TAG_CUSTOMERS, TAG_EXPENSES, TAG_LAST10, TAG_PAYMENTS, TAG_PRODUCTIONS, TAG_SALES,
};

/// Label marking a class of cached derived reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTag {
    Customers,
    Productions,
    Sales,
    Payments,
    Expenses,
    Last10,
}

impl CacheTag {
    pub const ALL: [CacheTag; 6] = [
        CacheTag::Customers,
        CacheTag::Productions,
        CacheTag::Sales,
        CacheTag::Payments,
        CacheTag::Expenses,
        CacheTag::Last10,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTag::Customers => TAG_CUSTOMERS,
            CacheTag::Productions => TAG_PRODUCTIONS,
            CacheTag::Sales => TAG_SALES,
            CacheTag::Payments => TAG_PAYMENTS,
            CacheTag::Expenses => TAG_EXPENSES,
            CacheTag::Last10 => TAG_LAST10,
        }
    }
}

impl std::fmt::Display for CacheTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of tags; ordering keeps log lines and tests deterministic.
pub type TagSet = BTreeSet<CacheTag>;

/// Business entity types managed by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customer,
    Production,
    Sale,
    Payment,
    Expense,
}

impl EntityKind {
    /// Backing store table
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Customer => TABLE_CUSTOMERS,
            EntityKind::Production => TABLE_PRODUCTIONS,
            EntityKind::Sale => TABLE_SALES,
            EntityKind::Payment => TABLE_PAYMENTS,
            EntityKind::Expense => TABLE_EXPENSES,
        }
    }

    /// Capitalized name used in client-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Customer => "Customer",
            EntityKind::Production => "Production",
            EntityKind::Sale => "Sale",
            EntityKind::Payment => "Payment",
            EntityKind::Expense => "Expense",
        }
    }

    /// Name of the identifier field in delete request bodies
    pub fn id_field(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customerId",
            EntityKind::Production => "productionId",
            EntityKind::Sale => "saleId",
            EntityKind::Payment => "paymentId",
            EntityKind::Expense => "expenseId",
        }
    }

    /// The tag for this entity's own list view
    pub fn own_tag(&self) -> CacheTag {
        match self {
            EntityKind::Customer => CacheTag::Customers,
            EntityKind::Production => CacheTag::Productions,
            EntityKind::Sale => CacheTag::Sales,
            EntityKind::Payment => CacheTag::Payments,
            EntityKind::Expense => CacheTag::Expenses,
        }
    }

    /// Fixed set of tags invalidated by any successful mutation of this kind.
    ///
    /// The set is static per kind and never derived from the mutated row: a
    /// sale references a customer and a production, and a payment changes a
    /// customer's balance, so their sets include the related views.
    pub fn invalidation_tags(&self) -> TagSet {
        let tags: &[CacheTag] = match self {
            EntityKind::Customer => &[CacheTag::Customers],
            EntityKind::Production => &[CacheTag::Productions, CacheTag::Last10],
            EntityKind::Sale => &[CacheTag::Sales, CacheTag::Customers, CacheTag::Productions],
            EntityKind::Payment => &[
                CacheTag::Payments,
                CacheTag::Customers,
                CacheTag::Productions,
                CacheTag::Sales,
            ],
            EntityKind::Expense => &[CacheTag::Expenses],
        };
        tags.iter().copied().collect()
    }

    /// Message for a delete request missing its identifier
    pub fn missing_id_message(&self) -> String {
        format!("{} ID is required", self.label())
    }

    /// Generic message for unexpected delete failures
    pub fn delete_failed_message(&self) -> String {
        format!("Failed to delete {}", self.label().to_lowercase())
    }

    /// Generic message for unexpected create failures
    pub fn create_failed_message(&self) -> String {
        format!("Failed to create {}", self.label().to_lowercase())
    }

    /// Message for a delete that matched no row
    pub fn not_found_message(&self) -> String {
        format!("{} not found", self.label())
    }
}
