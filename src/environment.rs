//! Contract between the engine and the host application.
//!
//! The host owns every piece of origin-derived state: server-variable
//! tables, the public base URL, and memoized URL objects. The engine never
//! reaches into that state; it goes through [`OriginEnvironment`], whose
//! methods are the only mutations it performs.
//!
//! # Shared state
//!
//! `set_live_site` and `reset_derived_origin_cache` may touch state the host
//! shares across requests. Implementations must perform them under the
//! synchronization the host already uses for that state, and no reader for
//! the same request may interleave with a rewrite. The crate's own
//! [`RequestContext`](crate::RequestContext) keeps all of it per request, so
//! it needs no synchronization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CacheUnavailable;

/// One of the tables that mirror server variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerStore {
    /// The framework's request-input table. Always written.
    Input,
    /// The process-level server table.
    Server,
    /// The process-level environment table.
    Env,
}

impl ServerStore {
    /// All stores, in write order.
    pub const ALL: [ServerStore; 3] = [ServerStore::Input, ServerStore::Server, ServerStore::Env];

    /// Returns `true` for the process-level mirrors governed by [`OverwriteMode`].
    pub fn is_mirror(self) -> bool {
        !matches!(self, ServerStore::Input)
    }
}

impl fmt::Display for ServerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerStore::Input => write!(f, "input"),
            ServerStore::Server => write!(f, "server"),
            ServerStore::Env => write!(f, "env"),
        }
    }
}

/// How a server variable is written into the process-level mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteMode {
    /// Write every mirror, creating the key where it was missing.
    AlwaysSet,
    /// Only overwrite mirrors that already hold a value for the key.
    #[default]
    OnlyOverwritePresent,
}

/// Origin-derived state owned by the host, as seen by the engine.
pub trait OriginEnvironment {
    /// Returns the value of `key` in `store`, if the store holds one.
    fn server_var(&self, store: ServerStore, key: &str) -> Option<&str>;

    /// Sets `key` in `store`.
    fn set_server_var(&mut self, store: ServerStore, key: &str, value: &str);

    /// Installs a request-scoped public base URL.
    ///
    /// Must only affect the current request; the persisted configuration
    /// value stays untouched.
    fn set_live_site(&mut self, base_url: String);

    /// Returns the public base URL currently in effect for this request.
    fn live_site(&self) -> Option<&str>;

    /// Drops every memoized URL derived from the request origin.
    ///
    /// # Errors
    ///
    /// Returns `CacheUnavailable` when the host has no way to invalidate
    /// its cache. The rewrite is then reported as incomplete.
    fn reset_derived_origin_cache(&mut self) -> Result<(), CacheUnavailable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_process_tables_are_mirrors() {
        assert!(!ServerStore::Input.is_mirror());
        assert!(ServerStore::Server.is_mirror());
        assert!(ServerStore::Env.is_mirror());
    }

    #[test]
    fn overwrite_mode_defaults_to_only_present() {
        assert_eq!(OverwriteMode::default(), OverwriteMode::OnlyOverwritePresent);
    }

    #[test]
    fn store_display_names() {
        let names: Vec<String> = ServerStore::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["input", "server", "env"]);
    }
}
