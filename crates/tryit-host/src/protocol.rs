//! Line protocol spoken with an engine process.
//!
//! Every message is one JSON object on its own line. The host sends
//! [`EngineRequest`]s on the engine's stdin and reads [`EngineEvent`]s from
//! its stdout. Handles are allocated by the host and announced with `open`
//! before the first evaluation under them.

use serde::{Deserialize, Serialize};
use tryit::Handle;

/// Requests the host sends to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineRequest {
    /// A new session exists under `handle`.
    Open { handle: Handle },

    /// Evaluate `source` in the session `handle`.
    Evaluate { handle: Handle, source: String },
}

/// Events the engine sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A chunk of output for the running evaluation of `handle`.
    Output { handle: Handle, text: String },

    /// The running evaluation of `handle` is complete.
    Finish { handle: Handle },

    /// Engine-side diagnostic not tied to an evaluation.
    Error { message: String },
}

/// Serialize `message` as one newline-terminated line.
pub fn encode_line<T: Serialize>(message: &T) -> serde_json::Result<Vec<u8>> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    Ok(line)
}

pub fn decode_event(line: &str) -> serde_json::Result<EngineEvent> {
    serde_json::from_str(line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_request_wire_format() {
        let line = encode_line(&EngineRequest::Open { handle: Handle(3) }).unwrap();
        assert_eq!(line, b"{\"type\":\"open\",\"handle\":3}\n");
    }

    #[test]
    fn test_evaluate_request_escapes_source() {
        let req = EngineRequest::Evaluate {
            handle: Handle(0),
            source: "print(\"hi\")\nx := 1".to_string(),
        };
        let line = encode_line(&req).unwrap();
        let text = std::str::from_utf8(&line).unwrap();

        assert_eq!(text.matches('\n').count(), 1);
        assert!(text.ends_with('\n'));
        assert_eq!(
            serde_json::from_str::<EngineRequest>(text.trim_end()).unwrap(),
            req
        );
    }

    #[test]
    fn test_decode_output_event() {
        let event = decode_event(r#"{"type":"output","handle":1,"text":"2\n"}"#).unwrap();
        assert_eq!(
            event,
            EngineEvent::Output {
                handle: Handle(1),
                text: "2\n".to_string()
            }
        );
    }

    #[test]
    fn test_decode_finish_event_with_trailing_whitespace() {
        let event = decode_event("{\"type\":\"finish\",\"handle\":7}\r\n").unwrap();
        assert_eq!(event, EngineEvent::Finish { handle: Handle(7) });
    }

    #[test]
    fn test_decode_error_event() {
        let event = decode_event(r#"{"type":"error","message":"out of memory"}"#).unwrap();
        assert!(matches!(event, EngineEvent::Error { message } if message == "out of memory"));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        assert!(decode_event(r#"{"type":"restart","handle":1}"#).is_err());
        assert!(decode_event("not json").is_err());
    }
}
