//! Type definitions shared by the probe, metrics and output modules

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// The three routing paths under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Straight to the deployment
    Direct,
    /// Through the Fly edge proxy
    Pocker,
    /// Through Cloudflare, then the Fly edge proxy
    PockerCf,
}

impl Target {
    /// All targets in the order one iteration visits them
    pub const ALL: [Target; 3] = [Target::Direct, Target::Pocker, Target::PockerCf];

    /// Group name used in log messages
    pub fn group_name(&self) -> &'static str {
        match self {
            Target::Direct => "Direct",
            Target::Pocker => "Pocker",
            Target::PockerCf => "Pocker CF",
        }
    }

    /// Hostname label inserted between the subdomain and the base domain
    pub fn host_infix(&self) -> Option<&'static str> {
        match self {
            Target::Direct => None,
            Target::Pocker => Some("pocker"),
            Target::PockerCf => Some("pockercf"),
        }
    }

    /// Trend receiving client-measured round-trip durations
    pub fn duration_trend(&self) -> &'static str {
        match self {
            Target::Direct => "http_req_duration_direct",
            Target::Pocker => "http_req_duration_pocker",
            Target::PockerCf => "http_req_duration_pocker_cf",
        }
    }

    /// Trend receiving the proxy's own duration header, for proxied targets
    pub fn internal_trend(&self) -> Option<&'static str> {
        match self {
            Target::Direct => None,
            Target::Pocker => Some("http_req_duration_pocker_internal"),
            Target::PockerCf => Some("http_req_duration_pocker_cf_internal"),
        }
    }

    /// Routing path description used in the summary report
    pub fn route_label(&self) -> &'static str {
        match self {
            Target::Direct => "CF->DO(sfo)",
            Target::Pocker => "Fly(edge)->Fly(sjc)->DO(sfo)",
            Target::PockerCf => "CF->Fly(edge)->Fly(sjc)->DO(sfo)",
        }
    }

    pub fn is_proxied(&self) -> bool {
        self.host_infix().is_some()
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.group_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_order() {
        assert_eq!(Target::ALL, [Target::Direct, Target::Pocker, Target::PockerCf]);
    }

    #[test]
    fn test_only_proxied_targets_have_internal_trends() {
        assert!(Target::Direct.internal_trend().is_none());
        assert!(!Target::Direct.is_proxied());
        assert_eq!(Target::Pocker.internal_trend(), Some("http_req_duration_pocker_internal"));
        assert_eq!(Target::PockerCf.internal_trend(), Some("http_req_duration_pocker_cf_internal"));
    }

    #[test]
    fn test_trend_names_are_distinct() {
        let mut names: Vec<&str> = Target::ALL.iter().map(|t| t.duration_trend()).collect();
        names.extend(Target::ALL.iter().filter_map(|t| t.internal_trend()));
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_display_uses_group_name() {
        assert_eq!(Target::PockerCf.to_string(), "Pocker CF");
    }
}
