//! ARL tool surface
//!
//! Every tool catches backend failures at its own boundary and returns a
//! structured payload with a `status`/`state` field; a tool call never
//! raises for a backend problem. `Err` from `execute` is reserved for
//! malformed arguments.

mod assets;
mod policy;
mod results;
mod status;
mod task;
mod text;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::client::ArlApi;
use crate::mcp::McpServer;
use crate::text::ReplyLanguage;
use crate::{Error, Result};

pub use assets::{
    CreateAssetScopeTool, ListAssetScopesTool, SearchAssetDomainTool, SearchAssetIpTool,
    SearchSiteTool,
};
pub use policy::{ListPoliciesTool, SearchNucleiResultTool};
pub use results::{FileleakListTool, IpListTool, SiteListTool, SubdomainListTool};
pub use status::{QueryAndExtractTool, QueryTaskStatusTool};
pub use task::{
    AddScanTaskTool, AddScanTaskWithPolicyTool, DeleteTaskTool, ExportTaskDataTool, ListTasksTool,
    StopTaskTool,
};
pub use text::{DetectReplyLanguageTool, ExtractDomainOrIpTool, ExtractMainDomainTool};

/// Shared state threaded through every tool: the backend client and the
/// reply-language holder (set by `detect_reply_language`, read by hint
/// builders; defaults to Chinese).
pub struct ToolContext {
    pub api: Arc<dyn ArlApi>,
    reply_language: RwLock<ReplyLanguage>,
}

impl ToolContext {
    pub fn new(api: Arc<dyn ArlApi>) -> Arc<Self> {
        Arc::new(Self {
            api,
            reply_language: RwLock::new(ReplyLanguage::default()),
        })
    }

    pub async fn lang(&self) -> ReplyLanguage {
        *self.reply_language.read().await
    }

    pub async fn set_lang(&self, lang: ReplyLanguage) {
        *self.reply_language.write().await = lang;
    }
}

/// Deserialize tool arguments, mapping failures to a tool error naming
/// the offending tool.
fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| Error::Tool(format!("Invalid {tool} arguments: {e}")))
}

/// Structured failure payload shared by all tools: terminal state,
/// human-readable reason, and a retry hint.
fn failure_payload(err: &Error, lang: ReplyLanguage) -> Value {
    serde_json::json!({
        "status": err.tool_state(),
        "reason": err.to_string(),
        "next_step": lang.pick(
            "请稍后重试，或检查 ARL 服务是否正常运行。",
            "Retry later, or check that the ARL service is reachable.",
        ),
    })
}

/// Register the full tool surface on a server.
pub fn register_all(server: &mut McpServer, context: &Arc<ToolContext>) {
    server.register(Arc::new(ExtractMainDomainTool));
    server.register(Arc::new(ExtractDomainOrIpTool));
    server.register(Arc::new(DetectReplyLanguageTool::new(Arc::clone(context))));

    server.register(Arc::new(AddScanTaskTool::new(Arc::clone(context))));
    server.register(Arc::new(AddScanTaskWithPolicyTool::new(Arc::clone(context))));
    server.register(Arc::new(ListTasksTool::new(Arc::clone(context))));
    server.register(Arc::new(DeleteTaskTool::new(Arc::clone(context))));
    server.register(Arc::new(StopTaskTool::new(Arc::clone(context))));
    server.register(Arc::new(ExportTaskDataTool::new(Arc::clone(context))));

    server.register(Arc::new(QueryTaskStatusTool::new(Arc::clone(context))));
    server.register(Arc::new(QueryAndExtractTool::new(Arc::clone(context))));

    server.register(Arc::new(SubdomainListTool::new(Arc::clone(context))));
    server.register(Arc::new(IpListTool::new(Arc::clone(context))));
    server.register(Arc::new(SiteListTool::new(Arc::clone(context))));
    server.register(Arc::new(FileleakListTool::new(Arc::clone(context))));

    server.register(Arc::new(SearchAssetDomainTool::new(Arc::clone(context))));
    server.register(Arc::new(SearchAssetIpTool::new(Arc::clone(context))));
    server.register(Arc::new(SearchSiteTool::new(Arc::clone(context))));
    server.register(Arc::new(ListAssetScopesTool::new(Arc::clone(context))));
    server.register(Arc::new(CreateAssetScopeTool::new(Arc::clone(context))));

    server.register(Arc::new(ListPoliciesTool::new(Arc::clone(context))));
    server.register(Arc::new(SearchNucleiResultTool::new(Arc::clone(context))));
}
