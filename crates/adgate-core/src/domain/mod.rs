//! Domain entities and pure decode logic
//!
//! Everything in this module is protocol-free: entities are decoded from an
//! [`AttributeBag`], a generic string-keyed multi-value map that the LDAP
//! adapter fills from search results. All fallback rules that the directory
//! data requires (display name falling back to the account name, default
//! `userAccountControl` values, zero timestamps meaning "unset") live here,
//! explicit and unit-tested.

pub mod attrs;
pub mod audit;
pub mod computer;
pub mod errors;
pub mod filetime;
pub mod group;
pub mod page;
pub mod uac;
pub mod user;

pub use attrs::AttributeBag;
pub use audit::{AuditAction, AuditEntry, AuditSource, TargetType};
pub use computer::Computer;
pub use errors::{DecodeError, DirectoryError, ObjectKind};
pub use group::{Group, GroupMember, OrgUnit};
pub use page::{paginate, Page};
pub use user::User;

/// Decodes a batch of attribute bags, splitting successes from failures.
///
/// One corrupt record must never fail an entire listing: callers log the
/// returned errors as warnings and keep the decoded entities.
pub fn decode_all<T>(
    bags: &[AttributeBag],
    decode: impl Fn(&AttributeBag) -> Result<T, DecodeError>,
) -> (Vec<T>, Vec<DecodeError>) {
    let mut entities = Vec::with_capacity(bags.len());
    let mut warnings = Vec::new();
    for bag in bags {
        match decode(bag) {
            Ok(entity) => entities.push(entity),
            Err(e) => warnings.push(e),
        }
    }
    (entities, warnings)
}
