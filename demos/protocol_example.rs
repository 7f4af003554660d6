//! Example demonstrating the Efficode wire protocol

use efficode::prelude::*;
use efficode::protocol::{syntax_guide, DefaultMessageHandler, JsonCodec};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize observability
    efficode::observability::init_observability("info", "pretty");

    println!("=== Efficode Protocol Example ===\n");

    let config = Config::default_config();
    let codec = EfficodeCodec::from_config(&config.codec);
    let handler = DefaultMessageHandler::new("example_agent");

    println!("1. Announcing identity...");

    let identity = Message::did(Params::new()).with_param("id", "example_agent");
    let wire = codec.encode_message(&identity)?;
    println!("   Wire: {}", wire);

    if let Some(reply) = handler.handle_message(codec.decode_message(&wire)?).await? {
        println!("   Reply: {}", codec.encode_message(&reply)?);
    }

    println!("\n2. Sending a request...");

    let request = Message::request("What is the user interested in?", "query")
        .with_param("max_tokens", json!(1000));
    let wire = codec.encode_message(&request)?;
    println!("   Wire: {}", wire);

    println!("\n3. Sending a large DATA payload...");

    let content = "Observations from the last run: all checks passed. ".repeat(12);
    let wire = codec.encode_message(&Message::data(content.clone(), "text"))?;
    println!("   Content size: {} bytes", content.len());
    println!("   Wire size:    {} bytes", wire.len());

    let decoded = codec.decode_message(&wire)?;
    assert_eq!(decoded.content().as_deref(), Some(content.as_str()));
    println!("   ✓ Content restored transparently");

    if let Some(reply) = handler.handle_message(decoded).await? {
        println!("   Reply: {}", codec.encode_message(&reply)?);
    }

    println!("\n4. Decoding an error from a peer...");

    let error = codec.decode_message("!ERROR:upstream timed out")?;
    println!("   Error: {:?}", error.param_str("message"));

    println!("\n5. Bundling a self-extracting packet...");

    let packet = SelfExtractingPacket::from_message(
        &Message::request("summarise the report", "task"),
        codec.compressor(),
    )?;
    let envelope = JsonCodec.encode(&Message::new("ACK", Params::new()))?;
    println!("   Packet data: {}", packet.compressed_data);
    println!("   Ratio:       {:.2}", packet.compression_ratio);
    println!("   Extracted:   {}", packet.extract());
    println!("   JSON envelope size for comparison: {} bytes", envelope.len());

    println!("\n{}", syntax_guide(codec.compressor().threshold()));

    println!("=== Protocol example completed! ===");

    Ok(())
}
