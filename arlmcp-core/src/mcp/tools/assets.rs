//! Asset search and scope management tools

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::READ_TIMEOUT;
use crate::mcp::tools::{failure_payload, parse_args, ToolContext};
use crate::mcp::{McpTool, ToolReply};
use crate::pagination::ListPage;
use crate::text::ReplyLanguage;
use crate::Result;

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    100
}

/// Run one single-page list query and map the items through a summary
/// function into a `{status, total, <key>}` payload.
async fn search_page(
    context: &ToolContext,
    path: &str,
    params: &[(&str, String)],
    result_key: &str,
    summarize: impl Fn(&Value) -> Value,
) -> Value {
    let outcome = async {
        let body = context.api.get_json(path, params, READ_TIMEOUT).await?;
        ListPage::parse(&body)
    }
    .await;

    match outcome {
        Ok(page) => {
            let rows: Vec<Value> = page.items.iter().map(summarize).collect();
            let mut payload = serde_json::Map::new();
            payload.insert("status".to_string(), json!("success"));
            payload.insert("total".to_string(), json!(page.total));
            payload.insert(result_key.to_string(), json!(rows));
            Value::Object(payload)
        }
        Err(e) => failure_payload(&e, context.lang().await),
    }
}

// ============================================================================
// search_asset_domain
// ============================================================================

/// Search asset domains, optionally within a scope.
pub struct SearchAssetDomainTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct SearchAssetDomainArgs {
    #[serde(default)]
    domain: String,
    #[serde(default)]
    scope_id: String,
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
}

impl SearchAssetDomainTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for SearchAssetDomainTool {
    fn name(&self) -> &'static str {
        "search_asset_domain"
    }

    fn description(&self) -> &'static str {
        "Search asset domains by keyword, optionally restricted to an asset scope."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "domain": { "type": "string", "description": "Domain keyword", "default": "" },
                "scope_id": { "type": "string", "description": "Asset scope id", "default": "" },
                "page": { "type": "integer", "default": 1 },
                "size": { "type": "integer", "default": 100 }
            }
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: SearchAssetDomainArgs = parse_args(self.name(), arguments)?;

        let mut params = vec![
            ("page", args.page.to_string()),
            ("size", args.size.to_string()),
        ];
        if !args.domain.is_empty() {
            params.push(("domain", args.domain.clone()));
        }
        if !args.scope_id.is_empty() {
            params.push(("scope_id", args.scope_id.clone()));
        }

        let payload = search_page(
            &self.context,
            "/api/asset_domain/",
            &params,
            "domains",
            |item| {
                json!({
                    "domain": item["domain"].as_str().unwrap_or(""),
                    "type": item["type"].as_str().unwrap_or(""),
                    "record": item["record"].clone(),
                    "ips": item.get("ips").cloned().unwrap_or(json!([])),
                    "source": item["source"].as_str().unwrap_or(""),
                })
            },
        )
        .await;
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// search_asset_ip
// ============================================================================

/// Search asset IPs with port, geo and CDN summaries.
pub struct SearchAssetIpTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct SearchAssetIpArgs {
    #[serde(default)]
    ip: String,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    scope_id: String,
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
}

impl SearchAssetIpTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    fn summarize_ports(item: &Value) -> Vec<String> {
        item["port_info"]
            .as_array()
            .map(|ports| {
                ports
                    .iter()
                    .map(|p| {
                        format!(
                            "{}({})",
                            p["port_id"].as_i64().unwrap_or(0),
                            p["service_name"].as_str().unwrap_or("unknown")
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl McpTool for SearchAssetIpTool {
    fn name(&self) -> &'static str {
        "search_asset_ip"
    }

    fn description(&self) -> &'static str {
        "Search asset IPs by keyword or related domain, returning ports, location and CDN info."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ip": { "type": "string", "description": "IP keyword", "default": "" },
                "domain": { "type": "string", "description": "Related domain", "default": "" },
                "scope_id": { "type": "string", "description": "Asset scope id", "default": "" },
                "page": { "type": "integer", "default": 1 },
                "size": { "type": "integer", "default": 100 }
            }
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: SearchAssetIpArgs = parse_args(self.name(), arguments)?;

        let mut params = vec![
            ("page", args.page.to_string()),
            ("size", args.size.to_string()),
        ];
        if !args.ip.is_empty() {
            params.push(("ip", args.ip.clone()));
        }
        if !args.domain.is_empty() {
            params.push(("domain", args.domain.clone()));
        }
        if !args.scope_id.is_empty() {
            params.push(("scope_id", args.scope_id.clone()));
        }

        let payload = search_page(&self.context, "/api/asset_ip/", &params, "ips", |item| {
            json!({
                "ip": item["ip"].as_str().unwrap_or(""),
                "domains": item.get("domain").cloned().unwrap_or(json!([])),
                "ports": Self::summarize_ports(item),
                "location": item["geo_asn"]["location"].as_str().unwrap_or(""),
                "cdn": item["cdn_name"].as_str().unwrap_or(""),
            })
        })
        .await;
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// search_site
// ============================================================================

/// Search probed sites with fingerprint information.
pub struct SearchSiteTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct SearchSiteArgs {
    #[serde(default)]
    site: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: i64,
    #[serde(default)]
    scope_id: String,
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
}

impl SearchSiteTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for SearchSiteTool {
    fn name(&self) -> &'static str {
        "search_site"
    }

    fn description(&self) -> &'static str {
        "Search probed sites by URL keyword, title or HTTP status, returning fingerprints."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "site": { "type": "string", "description": "Site URL keyword", "default": "" },
                "title": { "type": "string", "description": "Site title keyword", "default": "" },
                "status": { "type": "integer", "description": "HTTP status code", "default": 0 },
                "scope_id": { "type": "string", "description": "Asset scope id", "default": "" },
                "page": { "type": "integer", "default": 1 },
                "size": { "type": "integer", "default": 100 }
            }
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: SearchSiteArgs = parse_args(self.name(), arguments)?;

        let mut params = vec![
            ("page", args.page.to_string()),
            ("size", args.size.to_string()),
        ];
        if !args.site.is_empty() {
            params.push(("site", args.site.clone()));
        }
        if !args.title.is_empty() {
            params.push(("title", args.title.clone()));
        }
        if args.status > 0 {
            params.push(("status", args.status.to_string()));
        }
        if !args.scope_id.is_empty() {
            params.push(("scope_id", args.scope_id.clone()));
        }

        let payload = search_page(&self.context, "/api/site/", &params, "sites", |item| {
            json!({
                "site": item["site"].as_str().unwrap_or(""),
                "title": item["title"].as_str().unwrap_or(""),
                "status": item["status"].as_i64().unwrap_or(0),
                "finger": item.get("finger").cloned().unwrap_or(json!([])),
                "ip": item.get("ip").cloned().unwrap_or(json!([])),
                "favicon": item["favicon"]["hash"].clone(),
            })
        })
        .await;
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// list_asset_scopes
// ============================================================================

/// List asset scopes (named target groupings).
pub struct ListAssetScopesTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct ListAssetScopesArgs {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
}

impl ListAssetScopesTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for ListAssetScopesTool {
    fn name(&self) -> &'static str {
        "list_asset_scopes"
    }

    fn description(&self) -> &'static str {
        "List asset scopes: named, reusable groupings of target domains and IPs."
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
        let args: ListAssetScopesArgs = parse_args(self.name(), arguments)?;

        let params = [
            ("page", args.page.to_string()),
            ("size", args.size.to_string()),
        ];
        let payload = search_page(
            &self.context,
            "/api/asset_scope/",
            &params,
            "scopes",
            |item| {
                json!({
                    "scope_id": item["_id"].as_str().unwrap_or(""),
                    "name": item["name"].as_str().unwrap_or(""),
                    "scope": item.get("scope_array").cloned().unwrap_or(json!([])),
                    "created": item["date"].as_str().unwrap_or(""),
                })
            },
        )
        .await;
        Ok(ToolReply::json(&payload))
    }
}

// ============================================================================
// create_asset_scope
// ============================================================================

/// Create an asset scope.
pub struct CreateAssetScopeTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct CreateAssetScopeArgs {
    name: String,
    scope: String,
}

impl CreateAssetScopeTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for CreateAssetScopeTool {
    fn name(&self) -> &'static str {
        "create_asset_scope"
    }

    fn description(&self) -> &'static str {
        "Create an asset scope; scope entries (domains, IPs, ranges) are newline-separated."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Scope name" },
                "scope": {
                    "type": "string",
                    "description": "Domains/IPs/ranges, newline-separated"
                }
            },
            "required": ["name", "scope"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: CreateAssetScopeArgs = parse_args(self.name(), arguments)?;
        let lang = self.context.lang().await;

        let body = json!({ "name": args.name, "scope": args.scope });
        let result = self
            .context
            .api
            .post_json("/api/asset_scope/", body, READ_TIMEOUT)
            .await;

        let payload = match result {
            Ok(data) => json!({
                "status": "success",
                "message": match lang {
                    ReplyLanguage::Chinese => format!("成功创建资产范围: {}", args.name),
                    ReplyLanguage::English => format!("Asset scope created: {}", args.name),
                },
                "response": data,
            }),
            Err(e) => failure_payload(&e, lang),
        };
        Ok(ToolReply::json(&payload))
    }
}
