//! Request middleware.

mod guard;

pub use guard::{bypasses_guard, decide, is_protected, route_guard, GuardDecision};
