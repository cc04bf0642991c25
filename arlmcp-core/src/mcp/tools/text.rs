//! Text normalization and language tools

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::mcp::tools::{parse_args, ToolContext};
use crate::mcp::{McpTool, ToolReply};
use crate::text::{self, ReplyLanguage};
use crate::Result;

/// Extract the registrable domain from a raw HTTP request's Host header.
pub struct ExtractMainDomainTool;

#[derive(Debug, Deserialize)]
struct ExtractMainDomainArgs {
    request_body: String,
}

#[async_trait]
impl McpTool for ExtractMainDomainTool {
    fn name(&self) -> &'static str {
        "extract_main_domain"
    }

    fn description(&self) -> &'static str {
        "Extract the main (registrable) domain from a raw HTTP request containing a Host header, \
         e.g. 'baidu.com' from 'Host: www.baidu.com'."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "request_body": {
                    "type": "string",
                    "description": "Raw HTTP request including the Host header"
                }
            },
            "required": ["request_body"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: ExtractMainDomainArgs = parse_args(self.name(), arguments)?;
        Ok(match text::extract_main_domain(&args.request_body) {
            Some(domain) => ToolReply::text(domain),
            None => ToolReply::text("host not found"),
        })
    }
}

/// Normalize free-form input into a domain, IP, or IP range.
pub struct ExtractDomainOrIpTool;

#[derive(Debug, Deserialize)]
struct ExtractDomainOrIpArgs {
    text: String,
}

#[async_trait]
impl McpTool for ExtractDomainOrIpTool {
    fn name(&self) -> &'static str {
        "extract_domain_or_ip"
    }

    fn description(&self) -> &'static str {
        "Normalize input text into a main domain, IP address, or IP range (e.g. 192.168.0.0/24). \
         Does not parse full URLs."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Domain, IP, or IP range, e.g. www.baidu.com or 192.168.0.0/24"
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: ExtractDomainOrIpArgs = parse_args(self.name(), arguments)?;
        Ok(ToolReply::text(text::extract_domain_or_ip(&args.text)))
    }
}

/// Detect the user's language and set the reply language for hints.
pub struct DetectReplyLanguageTool {
    context: Arc<ToolContext>,
}

#[derive(Debug, Deserialize)]
struct DetectReplyLanguageArgs {
    user_prompt: String,
}

impl DetectReplyLanguageTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl McpTool for DetectReplyLanguageTool {
    fn name(&self) -> &'static str {
        "detect_reply_language"
    }

    fn description(&self) -> &'static str {
        "Detect the language of the user's prompt and switch the reply language for all \
         subsequent hint messages."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_prompt": {
                    "type": "string",
                    "description": "The user's original prompt"
                }
            },
            "required": ["user_prompt"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolReply> {
        let args: DetectReplyLanguageArgs = parse_args(self.name(), arguments)?;
        let lang = text::detect_reply_language(&args.user_prompt);
        self.context.set_lang(lang).await;
        Ok(ToolReply::text(match lang {
            ReplyLanguage::Chinese => "已自动切换为中文回复模式。",
            ReplyLanguage::English => "Auto-switched to English reply mode.",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ArlApi;
    use crate::mcp::Content;
    use std::time::Duration;

    struct DeadApi;

    #[async_trait]
    impl ArlApi for DeadApi {
        async fn get_json(
            &self,
            _path: &str,
            _query: &[(&str, String)],
            _timeout: Duration,
        ) -> Result<Value> {
            unreachable!("text tools never touch the backend")
        }

        async fn post_json(&self, _path: &str, _body: Value, _timeout: Duration) -> Result<Value> {
            unreachable!()
        }

        async fn get_raw(&self, _path: &str, _timeout: Duration) -> Result<String> {
            unreachable!()
        }
    }

    fn reply_text(reply: &ToolReply) -> &str {
        let Content::Text { text } = &reply.content[0];
        text
    }

    #[tokio::test]
    async fn test_extract_main_domain_tool() {
        let reply = ExtractMainDomainTool
            .execute(serde_json::json!({
                "request_body": "GET / HTTP/1.1\r\nHost: www.baidu.com\r\n"
            }))
            .await
            .unwrap();
        assert_eq!(reply_text(&reply), "baidu.com");
    }

    #[tokio::test]
    async fn test_extract_main_domain_tool_no_host() {
        let reply = ExtractMainDomainTool
            .execute(serde_json::json!({ "request_body": "GET / HTTP/1.1\r\n" }))
            .await
            .unwrap();
        assert_eq!(reply_text(&reply), "host not found");
    }

    #[tokio::test]
    async fn test_detect_reply_language_updates_context() {
        let context = ToolContext::new(Arc::new(DeadApi));
        let tool = DetectReplyLanguageTool::new(Arc::clone(&context));

        tool.execute(serde_json::json!({ "user_prompt": "scan example.com please" }))
            .await
            .unwrap();
        assert_eq!(context.lang().await, ReplyLanguage::English);

        tool.execute(serde_json::json!({ "user_prompt": "扫描 example.com" }))
            .await
            .unwrap();
        assert_eq!(context.lang().await, ReplyLanguage::Chinese);
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_err() {
        let result = ExtractDomainOrIpTool
            .execute(serde_json::json!({ "wrong": 1 }))
            .await;
        assert!(result.is_err());
    }
}
