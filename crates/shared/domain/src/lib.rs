//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! identities and roles, the bakery's business records, and the fixed
//! mapping from entity kinds to the cache tags their mutations invalidate.

pub mod balance;
pub mod constants;
pub mod entity;
pub mod error;
pub mod outcome;
pub mod profile;
pub mod records;

pub use balance::{compute_balances, CustomerBalance};
pub use constants::*;
pub use entity::{CacheTag, EntityKind, TagSet};
pub use error::{DomainError, DomainResult};
pub use outcome::ServiceResult;
pub use profile::{Identity, UserProfile, UserRole};
pub use records::{
    Customer, Expense, NewCustomer, NewExpense, NewPayment, NewProduction, NewSale, Payment,
    Production, Sale,
};
