//! Task lifecycle tools: submission, listing, deletion, stop, export

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{READ_TIMEOUT, SUBMIT_TIMEOUT};
use crate::mcp::tools::{failure_payload, parse_args, ToolContext};
use crate::mcp::{McpTool, ToolReply};
use crate::pagination::ListPage;
use crate::status::summarize_task;
use crate::text::ReplyLanguage;
use crate::Result;

fn default_true() -> bool {
    true
}

fn default_page() -> u64 {
    1
}

fn default_list_size() -> u64 {
    10
}

// ============================================================================
// add_scan_task_and_prompt
// ============================================================================

/// Submit a scan task with per-module toggles and return an ETA prompt.
pub struct AddScanTaskTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct AddScanTaskArgs {
    name: String,
    target: String,
    #[serde(default = "default_true")]
    domain_brute: bool,
    #[serde(default = "default_true")]
    alt_dns: bool,
    #[serde(default = "default_true")]
    dns_query_plugin: bool,
    #[serde(default = "default_true")]
    arl_search: bool,
    #[serde(default = "default_true")]
    port_scan: bool,
    #[serde(default = "default_true")]
    skip_scan_cdn_ip: bool,
    #[serde(default = "default_true")]
    site_identify: bool,
    #[serde(default = "default_true")]
    search_engines: bool,
    #[serde(default = "default_true")]
    site_spider: bool,
    #[serde(default = "default_true")]
    file_leak: bool,
    #[serde(default = "default_true")]
    findvhost: bool,
}

impl AddScanTaskTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    fn submission_payload(args: &AddScanTaskArgs) -> Value {
        json!({
            "name": args.name,
            "target": args.target,
            "domain_brute_type": "big",
            "port_scan_type": "top1000",
            "domain_brute": args.domain_brute,
            "alt_dns": args.alt_dns,
            "dns_query_plugin": args.dns_query_plugin,
            "arl_search": args.arl_search,
            "port_scan": args.port_scan,
            "service_detection": false,
            "os_detection": false,
            "ssl_cert": false,
            "skip_scan_cdn_ip": args.skip_scan_cdn_ip,
            "site_identify": args.site_identify,
            "search_engines": args.search_engines,
            "site_spider": args.site_spider,
            "site_capture": false,
            "file_leak": args.file_leak,
            "findvhost": args.findvhost,
            "nuclei_scan": false
        })
    }

    fn eta_message(name: &str, target: &str, lang: ReplyLanguage) -> String {
        match lang {
            ReplyLanguage::Chinese => format!(
                "任务已成功创建：{name}\n目标：{target}\n\
                 预估子域名枚举完成时间：5-10 分钟\n\
                 预估文件泄露检测完成时间：15-30 分钟\n\
                 请稍后输入：查询任务状态 {name}\n\
                 以检查扫描进度并决定是否提取数据。"
            ),
            ReplyLanguage::English => format!(
                "Task created: {name}\nTarget: {target}\n\
                 Estimated subdomain enumeration: 5-10 minutes\n\
                 Estimated file-leak detection: 15-30 minutes\n\
                 Query the task status for '{name}' later to check progress \
                 and decide when to extract data."
            ),
        }
    }
}

#[async_trait]
impl McpTool for AddScanTaskTool {
    fn name(&self) -> &'static str {
        "add_scan_task_and_prompt"
    }

    fn description(&self) -> &'static str {
        "Submit a scan task to the ARL platform and return an estimated completion prompt. \
         Module toggles default to enabled."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Task name" },
                "target": { "type": "string", "description": "Domain, IP, or IP range to scan" },
                "domain_brute": { "type": "boolean", "default": true },
                "alt_dns": { "type": "boolean", "default": true },
                "dns_query_plugin": { "type": "boolean", "default": true },
                "arl_search": { "type": "boolean", "default": true },
                "port_scan": { "type": "boolean", "default": true },
                "skip_scan_cdn_ip": { "type": "boolean", "default": true },
                "site_identify": { "type": "boolean", "default": true },
                "search_engines": { "type": "boolean", "default": true },
                "site_spider": { "type": "boolean", "default": true },
                "file_leak": { "type": "boolean", "default": true },
                "findvhost": { "type": "boolean", "default": true }
            },
            "required": ["name", "target"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: AddScanTaskArgs = parse_args(self.name(), arguments)?;
        let lang = self.context.lang().await;

        let payload = Self::submission_payload(&args);
        let result = self
            .context
            .api
            .post_json("/api/task/", payload, SUBMIT_TIMEOUT)
            .await;

        let payload = match result {
            Ok(data) => json!({
                "status": "success",
                "task_info": data,
                "message": Self::eta_message(&args.name, &args.target, lang),
            }),
            Err(e) => failure_payload(&e, lang),
        };
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// add_scan_task_with_policy
// ============================================================================

/// Submit a scan task bound to an existing policy.
pub struct AddScanTaskWithPolicyTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct AddScanTaskWithPolicyArgs {
    name: String,
    target: String,
    policy_id: String,
    #[serde(default = "default_task_tag")]
    task_tag: String,
}

fn default_task_tag() -> String {
    "task".to_string()
}

impl AddScanTaskWithPolicyTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for AddScanTaskWithPolicyTool {
    fn name(&self) -> &'static str {
        "add_scan_task_with_policy"
    }

    fn description(&self) -> &'static str {
        "Submit a scan task using a saved policy (policy_id from list_policies)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Task name" },
                "target": { "type": "string", "description": "Domain, IP, or IP range to scan" },
                "policy_id": { "type": "string", "description": "Policy id from list_policies" },
                "task_tag": { "type": "string", "default": "task" }
            },
            "required": ["name", "target", "policy_id"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: AddScanTaskWithPolicyArgs = parse_args(self.name(), arguments)?;
        let lang = self.context.lang().await;

        let body = json!({
            "name": args.name,
            "target": args.target,
            "policy_id": args.policy_id,
            "task_tag": args.task_tag,
        });
        let result = self
            .context
            .api
            .post_json("/api/task/", body, SUBMIT_TIMEOUT)
            .await;

        let payload = match result {
            Ok(data) => json!({
                "status": "success",
                "task_info": data,
                "message": match lang {
                    ReplyLanguage::Chinese => format!(
                        "任务已成功创建：{}\n目标：{}\n使用策略ID：{}\n\
                         预估完整扫描完成时间：30-60 分钟\n\
                         请稍后输入：查询任务状态 {} 以检查扫描进度。",
                        args.name, args.target, args.policy_id, args.name
                    ),
                    ReplyLanguage::English => format!(
                        "Task created: {} (target {}, policy {}). Full scan typically \
                         completes in 30-60 minutes; query the task status later.",
                        args.name, args.target, args.policy_id
                    ),
                },
            }),
            Err(e) => failure_payload(&e, lang),
        };
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// list_all_tasks
// ============================================================================

/// List tasks with optional status filtering.
pub struct ListTasksTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct ListTasksArgs {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_list_size")]
    size: u64,
    #[serde(default)]
    status: String,
}

impl ListTasksTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for ListTasksTool {
    fn name(&self) -> &'static str {
        "list_all_tasks"
    }

    fn description(&self) -> &'static str {
        "List scan tasks with name, target, status, timestamps and statistics. \
         Optional status filter: waiting, running, done, stop, error."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "page": { "type": "integer", "default": 1 },
                "size": { "type": "integer", "default": 10 },
                "status": {
                    "type": "string",
                    "description": "Filter: waiting, running, done, stop, error",
                    "default": ""
                }
            }
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: ListTasksArgs = parse_args(self.name(), arguments)?;
        let lang = self.context.lang().await;

        let mut params = vec![
            ("page", args.page.to_string()),
            ("size", args.size.to_string()),
        ];
        if !args.status.is_empty() {
            params.push(("status", args.status.clone()));
        }

        let outcome = async {
            let body = self
                .context
                .api
                .get_json("/api/task/", &params, SUBMIT_TIMEOUT)
                .await?;
            ListPage::parse(&body)
        }
        .await;

        let payload = match outcome {
            Ok(page) => {
                let tasks: Vec<Value> = page.items.iter().map(summarize_task).collect();
                json!({
                    "status": "success",
                    "total": page.total,
                    "page": args.page,
                    "size": args.size,
                    "tasks": tasks,
                    "message": match lang {
                        ReplyLanguage::Chinese => format!(
                            "共找到 {} 个任务，当前显示第 {} 页", page.total, args.page
                        ),
                        ReplyLanguage::English => format!(
                            "{} tasks found, showing page {}", page.total, args.page
                        ),
                    },
                })
            }
            Err(e) => failure_payload(&e, lang),
        };
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// delete_task
// ============================================================================

/// Delete one or more tasks by id.
pub struct DeleteTaskTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct DeleteTaskArgs {
    task_id: String,
}

impl DeleteTaskTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for DeleteTaskTool {
    fn name(&self) -> &'static str {
        "delete_task"
    }

    fn description(&self) -> &'static str {
        "Delete tasks by id; accepts a single id or a comma-separated list."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "Task id, or comma-separated ids"
                }
            },
            "required": ["task_id"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: DeleteTaskArgs = parse_args(self.name(), arguments)?;
        let lang = self.context.lang().await;

        let task_ids: Vec<String> = args
            .task_id
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        let result = self
            .context
            .api
            .post_json("/api/task/delete/", json!({ "task_id": task_ids }), READ_TIMEOUT)
            .await;

        let payload = match result {
            Ok(data) => json!({
                "status": "success",
                "message": match lang {
                    ReplyLanguage::Chinese => format!("成功删除 {} 个任务", task_ids.len()),
                    ReplyLanguage::English => format!("Deleted {} task(s)", task_ids.len()),
                },
                "deleted_ids": task_ids,
                "response": data,
            }),
            Err(e) => failure_payload(&e, lang),
        };
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// stop_task
// ============================================================================

/// Stop a running task.
pub struct StopTaskTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct StopTaskArgs {
    task_id: String,
}

impl StopTaskTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for StopTaskTool {
    fn name(&self) -> &'static str {
        "stop_task"
    }

    fn description(&self) -> &'static str {
        "Stop a running task by id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": { "type": "string", "description": "Task id" }
            },
            "required": ["task_id"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: StopTaskArgs = parse_args(self.name(), arguments)?;
        let lang = self.context.lang().await;

        let path = format!("/api/task/stop/{}", args.task_id);
        let result = self.context.api.get_json(&path, &[], READ_TIMEOUT).await;

        let payload = match result {
            Ok(data) => json!({
                "status": "success",
                "message": match lang {
                    ReplyLanguage::Chinese => format!("任务 {} 已停止", args.task_id),
                    ReplyLanguage::English => format!("Task {} stopped", args.task_id),
                },
                "response": data,
            }),
            Err(e) => failure_payload(&e, lang),
        };
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// export_task_data
// ============================================================================

/// Export a task's complete data set.
pub struct ExportTaskDataTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct ExportTaskDataArgs {
    task_id: String,
}

impl ExportTaskDataTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for ExportTaskDataTool {
    fn name(&self) -> &'static str {
        "export_task_data"
    }

    fn description(&self) -> &'static str {
        "Export a task's complete scan data by task id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": { "type": "string", "description": "Task id" }
            },
            "required": ["task_id"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: ExportTaskDataArgs = parse_args(self.name(), arguments)?;
        let lang = self.context.lang().await;

        let path = format!("/api/export/{}", args.task_id);
        let result = self.context.api.get_raw(&path, SUBMIT_TIMEOUT).await;

        let payload = match result {
            Ok(body) => {
                // Export may hand back JSON or raw text; keep either.
                let data = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
                json!({
                    "status": "success",
                    "task_id": args.task_id,
                    "data": data,
                })
            }
            Err(e) => failure_payload(&e, lang),
        };
        Ok(ToolReply::json(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ArlApi;
    use crate::mcp::Content;
    use crate::Error;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records POST bodies and serves a scripted response.
    struct RecordingApi {
        posts: Mutex<Vec<(String, Value)>>,
        response: Value,
    }

    impl RecordingApi {
        fn new(response: Value) -> Self {
            Self {
                posts: Mutex::new(Vec::new()),
                response,
            }
        }
    }

    #[async_trait]
    impl ArlApi for RecordingApi {
        async fn get_json(
            &self,
            _path: &str,
            _query: &[(&str, String)],
            _timeout: Duration,
        ) -> Result<Value> {
            Ok(self.response.clone())
        }

        async fn post_json(&self, path: &str, body: Value, _timeout: Duration) -> Result<Value> {
            self.posts.lock().unwrap().push((path.to_string(), body));
            Ok(self.response.clone())
        }

        async fn get_raw(&self, _path: &str, _timeout: Duration) -> Result<String> {
            Ok(self.response.to_string())
        }
    }

    struct RefusingApi;

    #[async_trait]
    impl ArlApi for RefusingApi {
        async fn get_json(
            &self,
            _path: &str,
            _query: &[(&str, String)],
            _timeout: Duration,
        ) -> Result<Value> {
            Err(Error::Transport("connection refused".to_string()))
        }

        async fn post_json(&self, _path: &str, _body: Value, _timeout: Duration) -> Result<Value> {
            Err(Error::Transport("connection refused".to_string()))
        }

        async fn get_raw(&self, _path: &str, _timeout: Duration) -> Result<String> {
            Err(Error::Transport("connection refused".to_string()))
        }
    }

    fn reply_json(reply: &ToolReply) -> Value {
        let Content::Text { text } = &reply.content[0];
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_add_scan_task_posts_full_payload() {
        let api = Arc::new(RecordingApi::new(json!({"code": 200})));
        let context = ToolContext::new(Arc::clone(&api) as Arc<dyn ArlApi>);
        let tool = AddScanTaskTool::new(context);

        let reply = tool
            .execute(json!({ "name": "demo", "target": "example.com", "port_scan": false }))
            .await
            .unwrap();
        let payload = reply_json(&reply);
        assert_eq!(payload["status"], "success");

        let posts = api.posts.lock().unwrap();
        let (path, body) = &posts[0];
        assert_eq!(path, "/api/task/");
        assert_eq!(body["domain_brute_type"], "big");
        assert_eq!(body["port_scan_type"], "top1000");
        assert_eq!(body["port_scan"], false);
        assert_eq!(body["domain_brute"], true);
        assert_eq!(body["nuclei_scan"], false);
    }

    #[tokio::test]
    async fn test_add_scan_task_failure_is_structured() {
        let context = ToolContext::new(Arc::new(RefusingApi));
        let tool = AddScanTaskTool::new(context);

        let reply = tool
            .execute(json!({ "name": "demo", "target": "example.com" }))
            .await
            .unwrap();
        let payload = reply_json(&reply);
        assert_eq!(payload["status"], "exception");
        assert!(payload["reason"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_delete_task_splits_ids() {
        let api = Arc::new(RecordingApi::new(json!({"code": 200})));
        let context = ToolContext::new(Arc::clone(&api) as Arc<dyn ArlApi>);
        let tool = DeleteTaskTool::new(context);

        let reply = tool
            .execute(json!({ "task_id": "a1, b2,c3" }))
            .await
            .unwrap();
        let payload = reply_json(&reply);
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["deleted_ids"], json!(["a1", "b2", "c3"]));

        let posts = api.posts.lock().unwrap();
        assert_eq!(posts[0].0, "/api/task/delete/");
        assert_eq!(posts[0].1["task_id"], json!(["a1", "b2", "c3"]));
    }

    #[tokio::test]
    async fn test_list_tasks_summarizes_items() {
        let api = Arc::new(RecordingApi::new(json!({
            "items": [{"_id": "x", "name": "demo", "target": "example.com", "status": "done"}],
            "total": 1,
            "code": 200
        })));
        let context = ToolContext::new(api as Arc<dyn ArlApi>);
        let tool = ListTasksTool::new(context);

        let reply = tool.execute(json!({})).await.unwrap();
        let payload = reply_json(&reply);
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["total"], 1);
        assert_eq!(payload["tasks"][0]["name"], "demo");
    }

    #[tokio::test]
    async fn test_export_task_falls_back_to_raw_text() {
        let api = Arc::new(RecordingApi::new(Value::String("csv,data".to_string())));
        let context = ToolContext::new(api as Arc<dyn ArlApi>);
        let tool = ExportTaskDataTool::new(context);

        let reply = tool.execute(json!({ "task_id": "x" })).await.unwrap();
        let payload = reply_json(&reply);
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["task_id"], "x");
    }
}
