//! Application services: CRUD over the business tables, profiles, roles and
//! session resolution.

mod pkce;
mod profile_service;
mod record_service;
mod role_resolver;
mod session_resolver;

pub use pkce::{code_challenge, PkcePair, CHALLENGE_METHOD};
pub use profile_service::{ProfileRepository, ProfileStore};
pub use record_service::{ListQuery, RecordManager, RecordService};
pub use role_resolver::RoleResolver;
pub use session_resolver::{SessionResolution, SessionResolver};

#[cfg(any(test, feature = "test-utils"))]
pub use profile_service::MockProfileRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use record_service::MockRecordService;
