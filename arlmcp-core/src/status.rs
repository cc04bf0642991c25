//! Task status evaluation
//!
//! A task's progress is read through a single lookup (`size=1`) against
//! the task list endpoint; the per-module completion flags are derived
//! from the completed-service names the backend reports on that task.

use serde_json::Value;
use tracing::debug;

use crate::client::{ArlApi, READ_TIMEOUT};
use crate::modules::ModuleFlags;
use crate::pagination::ListPage;
use crate::Result;

/// Outcome of a task lookup. Absence of a task is a first-class state,
/// distinct from transport and protocol failures (those come back as
/// `Err`), so callers never conflate "doesn't exist" with "unreachable".
#[derive(Debug)]
pub enum TaskLookup {
    NotFound,
    Found(TaskProgress),
}

/// Progress snapshot of one named task.
#[derive(Debug)]
pub struct TaskProgress {
    pub name: String,
    pub flags: ModuleFlags,
}

impl TaskProgress {
    pub fn all_done(&self) -> bool {
        self.flags.all_done()
    }
}

/// Look up at most one task by name and derive its module flags.
pub async fn lookup_task(api: &dyn ArlApi, name: &str) -> Result<TaskLookup> {
    let params = [("name", name.to_string()), ("size", "1".to_string())];
    let body = api.get_json("/api/task/", &params, READ_TIMEOUT).await?;
    let page = ListPage::parse(&body)?;

    let Some(task) = page.items.first() else {
        debug!(name, "task not found");
        return Ok(TaskLookup::NotFound);
    };

    let flags = ModuleFlags::from_task(task);
    Ok(TaskLookup::Found(TaskProgress {
        name: name.to_string(),
        flags,
    }))
}

/// Summarise a raw task object for listing output.
pub fn summarize_task(task: &Value) -> Value {
    serde_json::json!({
        "task_id": task["_id"].as_str().unwrap_or(""),
        "name": task["name"].as_str().unwrap_or(""),
        "target": task["target"].as_str().unwrap_or(""),
        "status": task["status"].as_str().unwrap_or(""),
        "start_date": task["start_date"].as_str().unwrap_or(""),
        "end_date": task["end_date"].as_str().unwrap_or(""),
        "statistic": task.get("statistic").cloned().unwrap_or(Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ScanModule;
    use crate::Error;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    struct OnePageApi {
        response: Result<Value>,
    }

    #[async_trait]
    impl ArlApi for OnePageApi {
        async fn get_json(
            &self,
            path: &str,
            query: &[(&str, String)],
            _timeout: Duration,
        ) -> Result<Value> {
            assert_eq!(path, "/api/task/");
            assert!(query.iter().any(|(k, v)| *k == "size" && v == "1"));
            match &self.response {
                Ok(v) => Ok(v.clone()),
                Err(Error::Http { status, body }) => Err(Error::Http {
                    status: *status,
                    body: body.clone(),
                }),
                Err(Error::Transport(msg)) => Err(Error::Transport(msg.clone())),
                Err(e) => panic!("unexpected scripted error: {e}"),
            }
        }

        async fn post_json(&self, _path: &str, _body: Value, _timeout: Duration) -> Result<Value> {
            unreachable!("lookup never posts")
        }

        async fn get_raw(&self, _path: &str, _timeout: Duration) -> Result<String> {
            unreachable!("lookup never fetches raw bodies")
        }
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found_never_error() {
        let api = OnePageApi {
            response: Ok(json!({"items": [], "total": 0, "code": 200})),
        };
        let lookup = lookup_task(&api, "demo").await.unwrap();
        assert!(matches!(lookup, TaskLookup::NotFound));
    }

    #[tokio::test]
    async fn test_found_task_derives_flags() {
        let api = OnePageApi {
            response: Ok(json!({
                "items": [{
                    "name": "demo",
                    "service": [{"name": "arl_search"}, {"name": "port_scan"}]
                }],
                "total": 1,
                "code": 200
            })),
        };
        let lookup = lookup_task(&api, "demo").await.unwrap();
        let TaskLookup::Found(progress) = lookup else {
            panic!("expected found task");
        };
        assert_eq!(progress.name, "demo");
        assert!(progress.flags.is_done(ScanModule::SubdomainBrute));
        assert!(!progress.flags.is_done(ScanModule::FileLeak));
        assert!(!progress.all_done());
    }

    #[tokio::test]
    async fn test_http_failure_propagates() {
        let api = OnePageApi {
            response: Err(Error::Http {
                status: 502,
                body: "bad gateway".to_string(),
            }),
        };
        let result = lookup_task(&api, "demo").await;
        assert!(matches!(result, Err(Error::Http { status: 502, .. })));
    }

    #[test]
    fn test_summarize_task() {
        let task = json!({
            "_id": "abc",
            "name": "demo",
            "target": "example.com",
            "status": "running",
            "start_date": "2024-01-01 10:00:00",
            "statistic": {"site_cnt": 3}
        });
        let summary = summarize_task(&task);
        assert_eq!(summary["task_id"], "abc");
        assert_eq!(summary["status"], "running");
        assert_eq!(summary["end_date"], "");
        assert_eq!(summary["statistic"]["site_cnt"], 3);
    }
}
