//! Message handler implementation

use super::messages::*;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Trait for handling messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle incoming message, optionally producing a reply
    async fn handle_message(&self, message: Message) -> Result<Option<Message>>;
}

/// Default responder.
///
/// Acknowledges identity claims, requests and data; stays silent on ACK and
/// ERROR; answers unknown op codes with an ERROR.
pub struct DefaultMessageHandler {
    agent_id: String,
}

impl DefaultMessageHandler {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
        }
    }

    /// Create acknowledgment reply
    fn create_ack(&self, original: &Message, message: String) -> Message {
        Message::ack("success", message)
            .with_param("op_code", original.op_code.as_str())
            .with_param("agent", self.agent_id.as_str())
    }
}

impl Default for DefaultMessageHandler {
    fn default() -> Self {
        Self::new("efficode-gateway")
    }
}

#[async_trait]
impl MessageHandler for DefaultMessageHandler {
    async fn handle_message(&self, message: Message) -> Result<Option<Message>> {
        debug!("Handling message with op code {}", message.op_code);

        match &message.op_code {
            OpCode::Did => {
                let identity = message
                    .params
                    .get("id")
                    .or_else(|| message.params.get("value"))
                    .cloned()
                    .unwrap_or(Value::Null);
                let reply = self
                    .create_ack(&message, "identity registered".to_string())
                    .with_param("identity", identity);
                Ok(Some(reply))
            }
            OpCode::Req => {
                let request_type = message.param_str("type").unwrap_or("unspecified");
                let reply = self.create_ack(&message, format!("request received ({})", request_type));
                Ok(Some(reply))
            }
            OpCode::Data => {
                let size = message.content().map(|c| c.len()).unwrap_or(0);
                let reply = self
                    .create_ack(&message, "data received".to_string())
                    .with_param("bytes", json!(size));
                Ok(Some(reply))
            }
            OpCode::Ack | OpCode::Error => Ok(None),
            OpCode::Custom(token) => {
                warn!("No handler for op code {}", token);
                let reply = Message::error(format!("unsupported op code: {}", token))
                    .with_param("agent", self.agent_id.as_str());
                Ok(Some(reply))
            }
        }
    }
}
