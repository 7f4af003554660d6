//! API request handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::{
    config::CodecConfig,
    error::CodecError,
    observability::CodecMetrics,
    protocol::{
        is_compressed, DecodedFrame, DefaultMessageHandler, EfficodeCodec, Message,
        MessageClass, MessageHandler, OpCode, Params, SelfExtractingPacket,
    },
};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<EfficodeCodec>,
    pub handler: Arc<dyn MessageHandler>,
    pub metrics: Arc<CodecMetrics>,
}

impl AppState {
    pub fn new(
        codec: EfficodeCodec,
        handler: Arc<dyn MessageHandler>,
        metrics: Arc<CodecMetrics>,
    ) -> Self {
        Self {
            codec: Arc::new(codec),
            handler,
            metrics,
        }
    }

    /// State with the default handler and fresh metrics
    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(
            EfficodeCodec::from_config(config),
            Arc::new(DefaultMessageHandler::default()),
            Arc::new(CodecMetrics::new()),
        )
    }
}

/// Request to encode a message
#[derive(Debug, Deserialize)]
pub struct EncodeRequest {
    pub op_code: String,
    #[serde(default)]
    pub params: Params,
}

/// Request carrying a wire string
#[derive(Debug, Deserialize)]
pub struct WireRequest {
    pub wire: String,
}

#[derive(Debug, Serialize)]
pub struct WireResponse {
    pub wire: String,
}

/// Decoded message with its wire class
#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    pub op_code: OpCode,
    pub class: MessageClass,
    pub params: Params,
}

/// Request to compress a payload; any JSON value is accepted so that
/// non-text input can be reported
#[derive(Debug, Deserialize)]
pub struct CompressRequest {
    pub content: Value,
}

#[derive(Debug, Serialize)]
pub struct CompressResponse {
    pub content: String,
    pub compressed: bool,
}

#[derive(Debug, Deserialize)]
pub struct DecompressRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct DecompressResponse {
    pub content: String,
}

/// Reply produced by the message handler, if any
#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    pub reply: Option<String>,
}

/// Generic error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: CodecError) -> Response {
    let status = match &err {
        CodecError::MessageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        CodecError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn decode_wire(state: &AppState, wire: &str) -> Result<DecodedFrame, CodecError> {
    match state.codec.decode_frame(wire) {
        Ok(frame) => {
            state.metrics.record_decoded();
            if frame.decompressed {
                state.metrics.record_decompressed();
            }
            Ok(frame)
        }
        Err(e) => {
            if matches!(e, CodecError::Framing(_)) {
                state.metrics.record_framing_error();
            }
            Err(e)
        }
    }
}

fn encode_reply(state: &AppState, message: &Message) -> Result<String, CodecError> {
    let wire = state.codec.encode_message(message)?;
    state.metrics.record_encoded();
    if message.op_code == OpCode::Data
        && message
            .param_str("content")
            .is_some_and(|content| state.codec.compressor().should_compress(content))
    {
        state.metrics.record_compressed();
    }
    Ok(wire)
}

/// Encode an op code and parameters into a wire string
pub async fn encode(
    State(state): State<AppState>,
    Json(req): Json<EncodeRequest>,
) -> impl IntoResponse {
    let message = Message::new(req.op_code, req.params);

    match encode_reply(&state, &message) {
        Ok(wire) => (StatusCode::OK, Json(WireResponse { wire })).into_response(),
        Err(e) => error_response(e),
    }
}

/// Decode a wire string
pub async fn decode(
    State(state): State<AppState>,
    Json(req): Json<WireRequest>,
) -> impl IntoResponse {
    match decode_wire(&state, &req.wire) {
        Ok(frame) => (
            StatusCode::OK,
            Json(DecodeResponse {
                class: frame.class,
                op_code: frame.message.op_code,
                params: frame.message.params,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Compress a text payload
pub async fn compress(
    State(state): State<AppState>,
    Json(req): Json<CompressRequest>,
) -> impl IntoResponse {
    let compressor = state.codec.compressor();

    match compressor.compress_value(&req.content) {
        Ok(content) => {
            let compressed = req
                .content
                .as_str()
                .is_some_and(|text| compressor.should_compress(text));
            if compressed {
                state.metrics.record_compressed();
            }
            (
                StatusCode::OK,
                Json(CompressResponse {
                    content,
                    compressed,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// Decompress a payload; anything that is not a recognised payload comes back as is
pub async fn decompress(
    State(state): State<AppState>,
    Json(req): Json<DecompressRequest>,
) -> impl IntoResponse {
    if is_compressed(&req.content) {
        state.metrics.record_decompressed();
    }

    let content = state.codec.compressor().decompress(&req.content);
    (StatusCode::OK, Json(DecompressResponse { content }))
}

/// Hand a decoded wire message to the message handler and encode its reply
pub async fn exchange(
    State(state): State<AppState>,
    Json(req): Json<WireRequest>,
) -> impl IntoResponse {
    let message = match decode_wire(&state, &req.wire) {
        Ok(frame) => frame.message,
        Err(e) => return error_response(e),
    };

    debug!(op_code = %message.op_code, "Dispatching message to handler");

    let reply = match state.handler.handle_message(message).await {
        Ok(reply) => reply,
        Err(e) => return error_response(e),
    };

    let reply = match reply {
        Some(reply) => match encode_reply(&state, &reply) {
            Ok(wire) => Some(wire),
            Err(e) => return error_response(e),
        },
        None => None,
    };

    (StatusCode::OK, Json(ExchangeResponse { reply })).into_response()
}

/// Bundle REQ or DATA content into a self-extracting packet
pub async fn bundle(
    State(state): State<AppState>,
    Json(message): Json<Message>,
) -> impl IntoResponse {
    match SelfExtractingPacket::from_message(&message, state.codec.compressor()) {
        Ok(packet) => (StatusCode::OK, Json(packet)).into_response(),
        Err(e) => error_response(e),
    }
}
