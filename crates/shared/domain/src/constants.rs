//! Domain-level constants.
//!
//! These constants define business rules and the names shared with the
//! backing store.

// =============================================================================
// User Roles
// =============================================================================

/// Base role assigned to new profiles and used when no role can be resolved
pub const ROLE_USER: &str = "user";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// Super administrator, the only role allowed to manage other roles
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

// =============================================================================
// Cache Tags
// =============================================================================

pub const TAG_CUSTOMERS: &str = "customers";
pub const TAG_PRODUCTIONS: &str = "productions";
pub const TAG_SALES: &str = "sales";
pub const TAG_PAYMENTS: &str = "payments";
pub const TAG_EXPENSES: &str = "expenses";

/// Tag for the "last 10 productions" view
pub const TAG_LAST10: &str = "last10";

// =============================================================================
// Store Tables
// =============================================================================

pub const TABLE_PROFILES: &str = "profiles";
pub const TABLE_CUSTOMERS: &str = "customers";
pub const TABLE_PRODUCTIONS: &str = "productions";
pub const TABLE_SALES: &str = "sales";
pub const TABLE_PAYMENTS: &str = "payments";
pub const TABLE_EXPENSES: &str = "expenses";

// =============================================================================
// Views
// =============================================================================

/// Number of productions in the recent productions view
pub const RECENT_PRODUCTIONS_LIMIT: usize = 10;
