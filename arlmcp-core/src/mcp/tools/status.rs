//! Task status and extraction tools

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::aggregate::{extract_results, Extraction};
use crate::mcp::tools::{parse_args, ToolContext};
use crate::mcp::{McpTool, ToolReply};
use crate::status::{lookup_task, TaskLookup, TaskProgress};
use crate::text::ReplyLanguage;
use crate::Result;

// ============================================================================
// query_task_status
// ============================================================================

/// Report per-module completion for a named task.
pub struct QueryTaskStatusTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct QueryTaskStatusArgs {
    name: String,
}

impl QueryTaskStatusTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    fn progress_payload(progress: &TaskProgress, lang: ReplyLanguage) -> Value {
        let mut payload = Map::new();
        payload.insert("state".to_string(), json!("success"));
        payload.insert("task".to_string(), json!(progress.name));
        for spec in crate::modules::MODULE_TABLE.iter() {
            let done = progress.flags.is_done(spec.module);
            payload.insert(
                spec.display.to_string(),
                json!(if done { "已完成" } else { "未完成" }),
            );
        }

        let next_step = if progress.all_done() {
            match lang {
                ReplyLanguage::Chinese => format!(
                    "全部模块已完成！请输入：提取任务结果 {} <主域名> 获取全部扫描数据。",
                    progress.name
                ),
                ReplyLanguage::English => format!(
                    "All modules complete. Run query_and_extract with task '{}' and the main \
                     domain to collect the full scan data.",
                    progress.name
                ),
            }
        } else {
            lang.pick(
                "部分模块尚未完成，请稍后再次查询。",
                "Some modules are still running; query again later.",
            )
            .to_string()
        };
        payload.insert("next_step".to_string(), json!(next_step));
        Value::Object(payload)
    }
}

#[async_trait]
impl McpTool for QueryTaskStatusTool {
    fn name(&self) -> &'static str {
        "query_task_status"
    }

    fn description(&self) -> &'static str {
        "Query a task's per-module completion status (subdomain brute, IP collection, site \
         probing, file-leak detection) by task name."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Task name" }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: QueryTaskStatusArgs = parse_args(self.name(), arguments)?;
        let lang = self.context.lang().await;

        let payload = match lookup_task(self.context.api.as_ref(), &args.name).await {
            Ok(TaskLookup::NotFound) => json!({ "state": "not_found" }),
            Ok(TaskLookup::Found(progress)) => Self::progress_payload(&progress, lang),
            Err(e) => json!({
                "state": e.tool_state(),
                "reason": e.to_string(),
            }),
        };
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// query_and_extract
// ============================================================================

/// Evaluate task status and extract every ready result category.
pub struct QueryAndExtractTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct QueryAndExtractArgs {
    name: String,
    domain: String,
}

impl QueryAndExtractTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for QueryAndExtractTool {
    fn name(&self) -> &'static str {
        "query_and_extract"
    }

    fn description(&self) -> &'static str {
        "Check which scan modules of a task are finished and extract subdomains, IPs, sites \
         and file leaks for every finished module. Safe to call repeatedly."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Task name" },
                "domain": { "type": "string", "description": "Main domain filter for results" }
            },
            "required": ["name", "domain"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: QueryAndExtractArgs = parse_args(self.name(), arguments)?;
        let lang = self.context.lang().await;

        let outcome =
            extract_results(self.context.api.as_ref(), &args.name, &args.domain, lang).await;

        let payload = match outcome {
            Ok(Extraction::Report(report)) => serde_json::to_value(report)?,
            Ok(Extraction::NotFound) => json!({
                "status": "not_found",
                "reason": lang.pick("任务未找到", "Task not found"),
                "extracted_data": {},
                "next_step": lang.pick(
                    "请检查任务名称或稍后重新调用。",
                    "Check the task name or try again later.",
                ),
            }),
            Err(e) => json!({
                "status": e.tool_state(),
                "reason": e.to_string(),
                "extracted_data": {},
                "next_step": lang.pick(
                    "请检查任务名称或稍后重新调用。",
                    "Check the task name or try again later.",
                ),
            }),
        };
        Ok(ToolReply::json(&payload))
    }
}
