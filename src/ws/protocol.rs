//! Coordinate stream wire format
//!
//! The server sends one text payload per wall segment, `"{left},{right}"`
//! with signed decimal numbers, followed by a single `"finished"` sentinel.
//! The client sends one session hello once the channel is ready.

use crate::game::WallSegment;

/// Reserved payload signaling that no further segments will be sent
pub const SENTINEL: &str = "finished";

/// One parsed inbound payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamPayload {
    /// A wall-offset pair in traversal order
    Segment(WallSegment),
    /// The terminal sentinel
    Finished,
}

/// Parse one inbound text payload.
///
/// Anything that is not the sentinel or a well-formed pair of numbers is a
/// protocol error; silently mis-parsing would poison every later collision
/// and rendering computation with NaN.
pub fn parse_payload(text: &str) -> Result<StreamPayload, ProtocolError> {
    if text == SENTINEL {
        return Ok(StreamPayload::Finished);
    }

    let mut fields = text.split(',');
    let (Some(left), Some(right), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ProtocolError::MalformedSegment {
            payload: text.to_string(),
        });
    };

    let parse = |field: &str| {
        field
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ProtocolError::MalformedSegment {
                payload: text.to_string(),
            })
    };

    Ok(StreamPayload::Segment(WallSegment {
        left: parse(left)?,
        right: parse(right)?,
    }))
}

/// Session hello sent to the server once the channel is ready
pub fn session_hello(session_id: &str, descriptor: &str) -> String {
    format!("session:{session_id}-{descriptor}")
}

/// Wire format errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed segment payload: {payload:?}")]
    MalformedSegment { payload: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_pairs() {
        assert_eq!(
            parse_payload("-50,50").unwrap(),
            StreamPayload::Segment(WallSegment {
                left: -50.0,
                right: 50.0
            })
        );
        assert_eq!(
            parse_payload("-12.5,3.25").unwrap(),
            StreamPayload::Segment(WallSegment {
                left: -12.5,
                right: 3.25
            })
        );
    }

    #[test]
    fn parses_the_sentinel() {
        assert_eq!(parse_payload("finished").unwrap(), StreamPayload::Finished);
    }

    #[test]
    fn rejects_wrong_field_counts() {
        assert!(parse_payload("").is_err());
        assert!(parse_payload("1").is_err());
        assert!(parse_payload("1,2,3").is_err());
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert!(parse_payload("a,b").is_err());
        assert!(parse_payload("1,").is_err());
        assert!(parse_payload("NaN,5").is_err());
        assert!(parse_payload("inf,5").is_err());
    }

    #[test]
    fn hello_carries_session_id_and_descriptor() {
        assert_eq!(
            session_hello("abc123", "XYZW"),
            "session:abc123-XYZW"
        );
    }
}
