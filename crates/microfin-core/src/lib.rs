//! # microfin-core
//!
//! The domain rules of the microfinance console - THE LOGIC.
//!
//! Two independent leaf utilities consumed by page-level collaborators:
//!
//! - **Identity parsing**: decode a national identity number into birth
//!   date, gender and age, and check a customer category against gender.
//! - **Access guarding**: decide whether a session may see a view or a menu
//!   entry, failing closed until the session is loaded.
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network, no I/O
//! - The current date and the session are always injected, never read from
//!   ambient state (the `parse` convenience wrappers read the clock once)
//! - Nothing is cached; every decision is recomputed

// =============================================================================
// MODULES
// =============================================================================

pub mod access;
pub mod category;
pub mod identity;
pub mod navigation;
pub mod policy;
pub mod primitives;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{BirthRecord, Gender, IdentityFormat, MicrofinError, Permission, Role};

// =============================================================================
// RE-EXPORTS: Identity
// =============================================================================

pub use category::{CategoryCheck, CategoryRule, validate_category_against_gender};
pub use identity::{
    CenturyPolicy, IdentityNumber, IdentityParser, LeapDayPolicy, ParserPolicy, parse, parse_on,
};

// =============================================================================
// RE-EXPORTS: Access
// =============================================================================

pub use access::{
    AccessContext, AccessGuard, AccessRequirement, RawRequirement, ResolvedRequirement,
    SuperAdminScope, is_allowed,
};
pub use navigation::{MenuItem, PageAccess, PageGate, console_menu, visible_menu};
pub use policy::{AccessPolicy, PolicyConfig};
pub use session::{ParsedSession, RawSession, Session, SessionState};
