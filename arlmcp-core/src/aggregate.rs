//! Result aggregation
//!
//! Combines the status evaluator and the paginated collector into a
//! unified extraction report. Only modules whose completion flag is set
//! are fetched; querying an unfinished module would read against
//! incomplete backend state, so that is a hard invariant here.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::client::ArlApi;
use crate::modules::ModuleSpec;
use crate::pagination::{collect_all, PageQuery};
use crate::status::{lookup_task, TaskLookup};
use crate::text::ReplyLanguage;
use crate::Result;

/// One result category's outcome. A failed fetch carries its error on a
/// distinct channel instead of hiding an error string inside the data
/// list, so callers can never mistake a failure for real results.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CategoryData {
    Values(Vec<String>),
    Failed { error: String },
}

/// Unified extraction report for one task.
#[derive(Debug, Serialize)]
pub struct ExtractReport {
    /// `done` when nothing is pending, else `running`.
    pub status: &'static str,
    #[serde(rename = "completed_modules")]
    pub completed: Vec<&'static str>,
    #[serde(rename = "pending_modules")]
    pub pending: Vec<&'static str>,
    /// Result key -> values (or failure) for every completed module.
    #[serde(rename = "extracted_data")]
    pub extracted: BTreeMap<&'static str, CategoryData>,
    pub next_step: String,
}

/// Extraction outcome: the task may simply not exist.
#[derive(Debug)]
pub enum Extraction {
    NotFound,
    Report(ExtractReport),
}

/// Fetch one module's full result set for a domain.
pub async fn fetch_module_results(
    api: &dyn ArlApi,
    spec: &'static ModuleSpec,
    domain: &str,
) -> Result<Vec<String>> {
    let query = PageQuery::for_module(spec, domain);
    collect_all(api, &query).await
}

/// Evaluate a task's status and pull every ready result category.
///
/// Errors from the status lookup propagate; a failure while fetching one
/// category is recorded against that category alone and the remaining
/// categories are still fetched. Pure read: safe to call repeatedly, and
/// two calls against unchanged backend state return the same report.
pub async fn extract_results(
    api: &dyn ArlApi,
    name: &str,
    domain: &str,
    lang: ReplyLanguage,
) -> Result<Extraction> {
    let progress = match lookup_task(api, name).await? {
        TaskLookup::NotFound => return Ok(Extraction::NotFound),
        TaskLookup::Found(progress) => progress,
    };

    let mut extracted = BTreeMap::new();
    let mut completed = Vec::new();
    for spec in progress.flags.completed() {
        completed.push(spec.display);
        match fetch_module_results(api, spec, domain).await {
            Ok(values) => {
                debug!(module = spec.result_key, count = values.len(), "category fetched");
                extracted.insert(spec.result_key, CategoryData::Values(values));
            }
            Err(e) => {
                warn!(module = spec.result_key, error = %e, "category fetch failed");
                extracted.insert(
                    spec.result_key,
                    CategoryData::Failed {
                        error: e.to_string(),
                    },
                );
            }
        }
    }

    let pending: Vec<&'static str> = progress.flags.pending().map(|spec| spec.display).collect();
    let status = if pending.is_empty() { "done" } else { "running" };
    let next_step = if pending.is_empty() {
        lang.pick(
            "全部数据已提取，无需再次查询。",
            "All data extracted; no further queries needed.",
        )
        .to_string()
    } else {
        match lang {
            ReplyLanguage::Chinese => format!("以下模块尚未完成：{}。", pending.join("、")),
            ReplyLanguage::English => {
                format!("Modules still running: {}.", pending.join(", "))
            }
        }
    };

    Ok(Extraction::Report(ExtractReport {
        status,
        completed,
        pending,
        extracted,
        next_step,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_data_success_serializes_as_list() {
        let data = CategoryData::Values(vec!["a.example.com".to_string()]);
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.is_array());
    }

    #[test]
    fn test_category_data_failure_serializes_as_object() {
        let data = CategoryData::Failed {
            error: "connection failed".to_string(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.is_object());
        assert_eq!(json["error"], "connection failed");
    }
}
