//! # Lifecycle Suffixes
//!
//! Correlation is a naming convention: a request event named
//! `"<base>_<REQUEST-SUFFIX>"` is concluded by an event named
//! `"<base>_<SUCCESS|FAILURE|CANCEL-SUFFIX>"`. This module owns that
//! convention: the recognized suffix strings ([`SuffixConfig`]), base-name
//! derivation, and the write-once cell holding the configuration in effect
//! for one bus wiring ([`ActiveSuffixes`]).
//!
//! ## Write-once semantics
//!
//! Exactly one configuration is in effect per [`Correlator`](crate::Correlator).
//! The first caller to supply a non-default configuration wins; later
//! adoption attempts are silent no-ops. Reads before any adoption see the
//! defaults (`REQUESTED` / `SUCCEEDED` / `FAILED` / `CANCELED`).

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Separator between base name and lifecycle suffix.
pub const SEPARATOR: char = '_';

/// The lifecycle role a recognized event type plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixKind {
    Request,
    Success,
    Failure,
    Cancel,
}

/// The set of recognized lifecycle suffix strings.
///
/// `cancel` is optional: when `None`, cancel events are not part of the
/// protocol and a `*_CANCELED` event is just another unrelated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixConfig {
    pub request: String,
    pub success: String,
    pub failure: String,
    pub cancel: Option<String>,
}

impl Default for SuffixConfig {
    fn default() -> Self {
        Self {
            request: "REQUESTED".to_string(),
            success: "SUCCEEDED".to_string(),
            failure: "FAILED".to_string(),
            cancel: Some("CANCELED".to_string()),
        }
    }
}

impl SuffixConfig {
    /// Derives the base name of a request event type.
    ///
    /// Returns `None` when the type does not end with
    /// `"<separator><request-suffix>"`.
    pub fn base_name<'a>(&self, event_type: &'a str) -> Option<&'a str> {
        event_type
            .strip_suffix(self.request.as_str())
            .and_then(|stem| stem.strip_suffix(SEPARATOR))
    }

    /// Builds the full event type for a lifecycle suffix of `base`.
    ///
    /// Returns `None` only for [`SuffixKind::Cancel`] when no cancel suffix
    /// is configured.
    pub fn lifecycle_type(&self, base: &str, kind: SuffixKind) -> Option<String> {
        let suffix = match kind {
            SuffixKind::Request => &self.request,
            SuffixKind::Success => &self.success,
            SuffixKind::Failure => &self.failure,
            SuffixKind::Cancel => self.cancel.as_ref()?,
        };
        Some(format!("{base}{SEPARATOR}{suffix}"))
    }

    /// Classifies an event type by the lifecycle suffix it ends with, if any.
    ///
    /// This is a suffix test only; it does not check that anything is
    /// actually waiting on the base name.
    pub fn kind_of(&self, event_type: &str) -> Option<SuffixKind> {
        if event_type.ends_with(self.request.as_str()) {
            Some(SuffixKind::Request)
        } else if event_type.ends_with(self.success.as_str()) {
            Some(SuffixKind::Success)
        } else if event_type.ends_with(self.failure.as_str()) {
            Some(SuffixKind::Failure)
        } else if self
            .cancel
            .as_ref()
            .is_some_and(|cancel| event_type.ends_with(cancel.as_str()))
        {
            Some(SuffixKind::Cancel)
        } else {
            None
        }
    }
}

/// Write-once holder for the suffix configuration of one bus wiring.
#[derive(Debug, Default)]
pub struct ActiveSuffixes {
    cell: OnceLock<SuffixConfig>,
}

impl ActiveSuffixes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the configuration in effect: the adopted one, or the defaults
    /// if nothing has been adopted yet. Reading does not pin the defaults;
    /// a later first adoption still wins.
    pub fn get(&self) -> SuffixConfig {
        self.cell.get().cloned().unwrap_or_default()
    }

    /// Adopts a configuration. Only the first adoption takes effect;
    /// returns whether this call was the one that did.
    pub fn adopt(&self, config: SuffixConfig) -> bool {
        self.cell.set(config).is_ok()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_base_name_default_config() {
        let config = SuffixConfig::default();
        assert_eq!(config.base_name("GET_USER_REQUESTED"), Some("GET_USER"));
        assert_eq!(config.base_name("GET_USER_SUCCEEDED"), None);
        assert_eq!(config.base_name("REQUESTED"), None);
        // Suffix without separator is not a request.
        assert_eq!(config.base_name("GET_USERREQUESTED"), None);
    }

    #[test]
    fn test_lifecycle_type_round_trip() {
        let config = SuffixConfig::default();
        assert_eq!(
            config.lifecycle_type("GET_USER", SuffixKind::Success),
            Some("GET_USER_SUCCEEDED".to_string())
        );
        assert_eq!(
            config.lifecycle_type("GET_USER", SuffixKind::Failure),
            Some("GET_USER_FAILED".to_string())
        );
        assert_eq!(
            config.lifecycle_type("GET_USER", SuffixKind::Cancel),
            Some("GET_USER_CANCELED".to_string())
        );
    }

    #[test]
    fn test_cancel_not_configured() {
        let config = SuffixConfig {
            cancel: None,
            ..Default::default()
        };
        assert_eq!(config.lifecycle_type("GET_USER", SuffixKind::Cancel), None);
        assert_eq!(config.kind_of("GET_USER_CANCELED"), None);
    }

    #[test]
    fn test_kind_of() {
        let config = SuffixConfig::default();
        assert_eq!(config.kind_of("A_REQUESTED"), Some(SuffixKind::Request));
        assert_eq!(config.kind_of("A_SUCCEEDED"), Some(SuffixKind::Success));
        assert_eq!(config.kind_of("A_FAILED"), Some(SuffixKind::Failure));
        assert_eq!(config.kind_of("A_CANCELED"), Some(SuffixKind::Cancel));
        assert_eq!(config.kind_of("A_TICKED"), None);
    }

    #[test]
    fn test_adopt_first_write_wins() {
        let active = ActiveSuffixes::new();
        assert!(!active.is_initialized());
        assert_eq!(active.get(), SuffixConfig::default());

        let custom = SuffixConfig {
            request: "REQ".to_string(),
            success: "OK".to_string(),
            failure: "ERR".to_string(),
            cancel: None,
        };
        assert!(active.adopt(custom.clone()));
        assert!(!active.adopt(SuffixConfig::default()));
        assert_eq!(active.get(), custom);
    }

    proptest! {
        #[test]
        fn prop_base_name_inverts_lifecycle_type(base in "[A-Z][A-Z0-9_]{0,20}[A-Z0-9]") {
            let config = SuffixConfig::default();
            let request_type = config
                .lifecycle_type(&base, SuffixKind::Request)
                .unwrap();
            prop_assert_eq!(config.base_name(&request_type), Some(base.as_str()));
        }
    }
}
