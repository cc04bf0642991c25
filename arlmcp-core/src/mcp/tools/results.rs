//! Direct result-list tools, one per scan module
//!
//! Thin wrappers over the paginated collector for callers that want a
//! single category without the full extraction report.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::aggregate::fetch_module_results;
use crate::mcp::tools::{failure_payload, parse_args, ToolContext};
use crate::mcp::{McpTool, ToolReply};
use crate::modules::{ModuleSpec, ScanModule, MODULE_TABLE};
use crate::Result;

fn spec_for(module: ScanModule) -> &'static ModuleSpec {
    MODULE_TABLE
        .iter()
        .find(|spec| spec.module == module)
        .expect("every scan module has a table entry")
}

#[derive(Debug, Deserialize)]
struct DomainFilterArgs {
    domain: String,
}

/// Implementation shared by the four category tools.
async fn run_category_fetch(
    context: &ToolContext,
    module: ScanModule,
    arguments: Value,
    tool_name: &str,
) -> Result<ToolReply> {
    let args: DomainFilterArgs = parse_args(tool_name, arguments)?;
    let spec = spec_for(module);

    let payload = match fetch_module_results(context.api.as_ref(), spec, &args.domain).await {
        Ok(values) => {
            let mut payload = serde_json::Map::new();
            payload.insert("status".to_string(), json!("success"));
            payload.insert("total".to_string(), json!(values.len()));
            payload.insert(spec.result_key.to_string(), json!(values));
            Value::Object(payload)
        }
        Err(e) => failure_payload(&e, context.lang().await),
    };
    Ok(ToolReply::json(&payload))
}

fn domain_filter_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "domain": { "type": "string", "description": description }
        },
        "required": ["domain"]
    })
}

/// All subdomains discovered for a domain (deduplicated).
pub struct SubdomainListTool {
    context: Arc<ToolContext>,
}

impl SubdomainListTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for SubdomainListTool {
    fn name(&self) -> &'static str {
        "get_all_subdomains"
    }

    fn description(&self) -> &'static str {
        "Fetch every discovered subdomain for a domain, walking all result pages. Duplicates \
         are removed."
    }

    fn input_schema(&self) -> Value {
        domain_filter_schema("Main domain to filter subdomains by")
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        run_category_fetch(&self.context, ScanModule::SubdomainBrute, arguments, self.name()).await
    }
}

/// All IPs collected for a domain.
pub struct IpListTool {
    context: Arc<ToolContext>,
}

impl IpListTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for IpListTool {
    fn name(&self) -> &'static str {
        "query_ip_list"
    }

    fn description(&self) -> &'static str {
        "Fetch every collected IP for a domain, walking all result pages."
    }

    fn input_schema(&self) -> Value {
        domain_filter_schema("Main domain to filter IPs by")
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        run_category_fetch(&self.context, ScanModule::IpCollection, arguments, self.name()).await
    }
}

/// All probed sites for a domain.
pub struct SiteListTool {
    context: Arc<ToolContext>,
}

impl SiteListTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for SiteListTool {
    fn name(&self) -> &'static str {
        "query_site_list"
    }

    fn description(&self) -> &'static str {
        "Fetch every probed site URL for a domain, walking all result pages."
    }

    fn input_schema(&self) -> Value {
        domain_filter_schema("Main domain to filter sites by")
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        run_category_fetch(&self.context, ScanModule::SiteProbe, arguments, self.name()).await
    }
}

/// All detected file leaks for a domain.
pub struct FileleakListTool {
    context: Arc<ToolContext>,
}

impl FileleakListTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for FileleakListTool {
    fn name(&self) -> &'static str {
        "query_fileleak_list"
    }

    fn description(&self) -> &'static str {
        "Fetch every detected file-leak URL for a domain, walking all result pages."
    }

    fn input_schema(&self) -> Value {
        domain_filter_schema("Main domain to filter file leaks by")
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        run_category_fetch(&self.context, ScanModule::FileLeak, arguments, self.name()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ArlApi;
    use crate::mcp::Content;
    use std::time::Duration;

    struct OnePage {
        field: &'static str,
        values: Vec<&'static str>,
    }

    #[async_trait]
    impl ArlApi for OnePage {
        async fn get_json(
            &self,
            _path: &str,
            _query: &[(&str, String)],
            _timeout: Duration,
        ) -> Result<Value> {
            let items: Vec<Value> = self
                .values
                .iter()
                .map(|v| {
                    let mut item = serde_json::Map::new();
                    item.insert(self.field.to_string(), json!(v));
                    Value::Object(item)
                })
                .collect();
            let total = items.len();
            Ok(json!({"items": items, "total": total, "code": 200}))
        }

        async fn post_json(&self, _path: &str, _body: Value, _timeout: Duration) -> Result<Value> {
            unreachable!()
        }

        async fn get_raw(&self, _path: &str, _timeout: Duration) -> Result<String> {
            unreachable!()
        }
    }

    fn reply_json(reply: &ToolReply) -> Value {
        let Content::Text { text } = &reply.content[0];
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_subdomain_tool_dedups() {
        let context = ToolContext::new(Arc::new(OnePage {
            field: "domain",
            values: vec!["a.example.com", "a.example.com", "b.example.com"],
        }));
        let tool = SubdomainListTool::new(context);

        let reply = tool.execute(json!({ "domain": "example.com" })).await.unwrap();
        let payload = reply_json(&reply);
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["subdomains"], json!(["a.example.com", "b.example.com"]));
        assert_eq!(payload["total"], 2);
    }

    #[tokio::test]
    async fn test_ip_tool_keeps_duplicates() {
        let context = ToolContext::new(Arc::new(OnePage {
            field: "ip",
            values: vec!["1.1.1.1", "1.1.1.1"],
        }));
        let tool = IpListTool::new(context);

        let reply = tool.execute(json!({ "domain": "example.com" })).await.unwrap();
        let payload = reply_json(&reply);
        assert_eq!(payload["ips"], json!(["1.1.1.1", "1.1.1.1"]));
    }
}
