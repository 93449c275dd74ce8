//! redb table definitions for the formation state store.
//!
//! Record tables use `&str` keys and `&[u8]` values (JSON-serialized domain
//! types); the stack index maps `&str` to `&str`.

use redb::TableDefinition;

/// Apps keyed by `{name}`.
pub const APPS: TableDefinition<&str, &[u8]> = TableDefinition::new("apps");

/// Stack name index: `{stack}` → owning app name.
pub const STACKS: TableDefinition<&str, &str> = TableDefinition::new("stacks");

/// Releases keyed by `{app}:{release_id}`.
pub const RELEASES: TableDefinition<&str, &[u8]> = TableDefinition::new("releases");
