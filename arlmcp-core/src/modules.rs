//! Scan module table
//!
//! ARL tracks a task as a set of independently completing services. The
//! four modules this adapter cares about, and the backend service names
//! that signal their completion, live in one declarative table so the
//! naming contract with the backend stays a single reviewable artifact.

use serde_json::Value;

/// The four scan phases tracked by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanModule {
    SubdomainBrute,
    IpCollection,
    SiteProbe,
    FileLeak,
}

/// Everything the adapter knows about one scan module: how the backend
/// names it, how it is shown to users, and where its results live.
#[derive(Debug)]
pub struct ModuleSpec {
    pub module: ScanModule,
    /// Service name reported by the backend when the module finishes.
    pub service: &'static str,
    /// Human-facing label, matching the platform's own UI language.
    pub display: &'static str,
    /// Key under which the aggregator stores this module's results.
    pub result_key: &'static str,
    /// Paginated list endpoint holding the results.
    pub endpoint: &'static str,
    /// Query parameter carrying the domain filter on that endpoint.
    pub filter_param: &'static str,
    /// Field extracted from each list item.
    pub item_field: &'static str,
    /// Whether results get set semantics (subdomains only).
    pub dedup: bool,
}

/// Module-to-backend mapping. Must stay in sync with the backend's
/// service naming scheme.
pub const MODULE_TABLE: [ModuleSpec; 4] = [
    ModuleSpec {
        module: ScanModule::SubdomainBrute,
        service: "arl_search",
        display: "子域名爆破",
        result_key: "subdomains",
        endpoint: "/api/domain/",
        filter_param: "domain",
        item_field: "domain",
        dedup: true,
    },
    ModuleSpec {
        module: ScanModule::IpCollection,
        service: "port_scan",
        display: "IP收集",
        result_key: "ips",
        endpoint: "/api/ip/",
        filter_param: "domain",
        item_field: "ip",
        dedup: false,
    },
    ModuleSpec {
        module: ScanModule::SiteProbe,
        service: "site_spider",
        display: "站点探测",
        result_key: "sites",
        endpoint: "/api/site/",
        filter_param: "site",
        item_field: "site",
        dedup: false,
    },
    ModuleSpec {
        module: ScanModule::FileLeak,
        service: "file_leak",
        display: "文件泄露检测",
        result_key: "fileleaks",
        endpoint: "/api/fileleak/",
        filter_param: "url",
        item_field: "url",
        dedup: false,
    },
];

/// Per-module completion flags derived from a task's completed-service
/// list. Ephemeral: regenerated on every status query, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleFlags {
    done: [bool; MODULE_TABLE.len()],
}

impl ModuleFlags {
    /// Derive flags from the service names a task reports as completed.
    pub fn from_services<S: AsRef<str>>(services: &[S]) -> Self {
        let mut done = [false; MODULE_TABLE.len()];
        for (slot, spec) in done.iter_mut().zip(MODULE_TABLE.iter()) {
            *slot = services.iter().any(|s| s.as_ref() == spec.service);
        }
        Self { done }
    }

    /// Pull the completed-service names out of a raw task object
    /// (`task["service"][i]["name"]`) and derive flags from them.
    pub fn from_task(task: &Value) -> Self {
        let services: Vec<String> = task["service"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|s| s["name"].as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self::from_services(&services)
    }

    pub fn is_done(&self, module: ScanModule) -> bool {
        MODULE_TABLE
            .iter()
            .position(|spec| spec.module == module)
            .map(|i| self.done[i])
            .unwrap_or(false)
    }

    /// Extraction completeness: true iff all four modules are done.
    pub fn all_done(&self) -> bool {
        self.done.iter().all(|d| *d)
    }

    /// Specs for modules that are finished, in table order.
    pub fn completed(&self) -> impl Iterator<Item = &'static ModuleSpec> + '_ {
        MODULE_TABLE
            .iter()
            .zip(self.done)
            .filter_map(|(spec, done)| done.then_some(spec))
    }

    /// Specs for modules still running, in table order.
    pub fn pending(&self) -> impl Iterator<Item = &'static ModuleSpec> + '_ {
        MODULE_TABLE
            .iter()
            .zip(self.done)
            .filter_map(|(spec, done)| (!done).then_some(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_from_services() {
        let flags = ModuleFlags::from_services(&["arl_search", "port_scan"]);
        assert!(flags.is_done(ScanModule::SubdomainBrute));
        assert!(flags.is_done(ScanModule::IpCollection));
        assert!(!flags.is_done(ScanModule::SiteProbe));
        assert!(!flags.is_done(ScanModule::FileLeak));
        assert!(!flags.all_done());
    }

    #[test]
    fn test_flags_all_done() {
        let flags =
            ModuleFlags::from_services(&["arl_search", "port_scan", "site_spider", "file_leak"]);
        assert!(flags.all_done());
        assert_eq!(flags.pending().count(), 0);
        assert_eq!(flags.completed().count(), 4);
    }

    #[test]
    fn test_unknown_services_are_ignored() {
        let flags = ModuleFlags::from_services(&["nuclei_scan", "ssl_cert"]);
        assert!(!flags.is_done(ScanModule::SubdomainBrute));
        assert_eq!(flags.pending().count(), 4);
    }

    #[test]
    fn test_flags_from_task_value() {
        let task = serde_json::json!({
            "name": "demo",
            "service": [
                {"name": "arl_search", "elapsed": 12.5},
                {"name": "site_spider"},
                {"elapsed": 3.0}
            ]
        });
        let flags = ModuleFlags::from_task(&task);
        assert!(flags.is_done(ScanModule::SubdomainBrute));
        assert!(flags.is_done(ScanModule::SiteProbe));
        assert!(!flags.is_done(ScanModule::IpCollection));
    }

    #[test]
    fn test_flags_from_task_without_service_list() {
        let task = serde_json::json!({"name": "demo"});
        let flags = ModuleFlags::from_task(&task);
        assert_eq!(flags.completed().count(), 0);
    }

    #[test]
    fn test_table_keys_are_distinct() {
        for (i, a) in MODULE_TABLE.iter().enumerate() {
            for b in MODULE_TABLE.iter().skip(i + 1) {
                assert_ne!(a.service, b.service);
                assert_ne!(a.result_key, b.result_key);
                assert_ne!(a.display, b.display);
            }
        }
    }
}
