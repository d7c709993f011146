use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One in-flight large payload, stored out of band while only its id
/// travels through the queue.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Record {
    pub id: String,
    pub payload: Value,
    pub created_at_ms: u64,
}

/// Wire body of a queue message produced by this relay.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ReferenceMessage {
    pub id: String,
}

/// Raw message as pulled from the queue transport.
#[derive(Clone, Debug)]
pub struct QueueMessage {
    pub id: String,
    pub body: String,
    pub receipt: String,
}

/// Queue-provided metadata handed through to the user handler.
#[derive(Clone, Debug)]
pub struct Provenance {
    pub message_id: String,
    pub receipt: String,
}

#[derive(Clone, Debug)]
pub struct SendAck {
    pub message_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceParse {
    Valid(String),
    Malformed,
}

/// Validates a queue message body as a reference. Anything that is not a
/// JSON object carrying a non-empty string `id` field is foreign to this
/// relay and reported as `Malformed`, never as an error.
pub fn parse_reference(body: &str) -> ReferenceParse {
    match serde_json::from_str::<ReferenceMessage>(body) {
        Ok(reference) if !reference.id.is_empty() => ReferenceParse::Valid(reference.id),
        _ => ReferenceParse::Malformed,
    }
}

pub fn now_millis() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_millis() as u64,
        Err(_) => 0,
    }
}
