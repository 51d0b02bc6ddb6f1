//! Request extractors.

mod current_identity;
mod validated_json;

pub use current_identity::CurrentIdentity;
pub use validated_json::ValidatedJson;
