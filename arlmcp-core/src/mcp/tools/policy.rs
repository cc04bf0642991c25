//! Scan-policy and vulnerability-result tools

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::READ_TIMEOUT;
use crate::mcp::tools::{failure_payload, parse_args, ToolContext};
use crate::mcp::{McpTool, ToolReply};
use crate::pagination::ListPage;
use crate::Result;

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    100
}

/// List saved scan policies.
pub struct ListPoliciesTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct ListPoliciesArgs {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
}

impl ListPoliciesTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for ListPoliciesTool {
    fn name(&self) -> &'static str {
        "list_policies"
    }

    fn description(&self) -> &'static str {
        "List saved scan policies; policy ids feed add_scan_task_with_policy."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "page": { "type": "integer", "default": 1 },
                "size": { "type": "integer", "default": 100 }
            }
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: ListPoliciesArgs = parse_args(self.name(), arguments)?;

        let params = [
            ("page", args.page.to_string()),
            ("size", args.size.to_string()),
        ];
        let outcome = async {
            let body = self
                .context
                .api
                .get_json("/api/policy/", &params, READ_TIMEOUT)
                .await?;
            ListPage::parse(&body)
        }
        .await;

        let payload = match outcome {
            Ok(page) => {
                let policies: Vec<Value> = page
                    .items
                    .iter()
                    .map(|item| {
                        json!({
                            "policy_id": item["_id"].as_str().unwrap_or(""),
                            "name": item["name"].as_str().unwrap_or(""),
                            "policy": item.get("policy").cloned().unwrap_or(json!({})),
                        })
                    })
                    .collect();
                json!({
                    "status": "success",
                    "total": page.total,
                    "policies": policies,
                })
            }
            Err(e) => failure_payload(&e, self.context.lang().await),
        };
        Ok(ToolReply::json(&payload))
    }
}

/// Search nuclei vulnerability-scan findings.
pub struct SearchNucleiResultTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct SearchNucleiResultArgs {
    #[serde(default)]
    url: String,
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
}

impl SearchNucleiResultTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for SearchNucleiResultTool {
    fn name(&self) -> &'static str {
        "search_nuclei_result"
    }

    fn description(&self) -> &'static str {
        "Search nuclei vulnerability-scan findings by URL keyword."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "URL keyword", "default": "" },
                "page": { "type": "integer", "default": 1 },
                "size": { "type": "integer", "default": 100 }
            }
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: SearchNucleiResultArgs = parse_args(self.name(), arguments)?;

        let mut params = vec![
            ("page", args.page.to_string()),
            ("size", args.size.to_string()),
        ];
        if !args.url.is_empty() {
            params.push(("url", args.url.clone()));
        }

        let outcome = async {
            let body = self
                .context
                .api
                .get_json("/api/nuclei_result/", &params, READ_TIMEOUT)
                .await?;
            ListPage::parse(&body)
        }
        .await;

        let payload = match outcome {
            Ok(page) => {
                let results: Vec<Value> = page
                    .items
                    .iter()
                    .map(|item| {
                        json!({
                            "url": item["url"].as_str().unwrap_or(""),
                            "template_id": item["template_id"].as_str().unwrap_or(""),
                            "template_name": item["template_name"].as_str().unwrap_or(""),
                            "severity": item["severity"].as_str().unwrap_or(""),
                            "matched": item["matched"].as_str().unwrap_or(""),
                            "extracted_results": item
                                .get("extracted_results")
                                .cloned()
                                .unwrap_or(json!([])),
                        })
                    })
                    .collect();
                json!({
                    "status": "success",
                    "total": page.total,
                    "results": results,
                })
            }
            Err(e) => failure_payload(&e, self.context.lang().await),
        };
        Ok(ToolReply::json(&payload))
    }
}
