//! IPC protocol definitions for Vigil.
//!
//! Defines message types and communication protocol between daemon and client.
//! Messages are line-delimited JSON over the control socket.

use crate::types::ZoneStatus;
use serde::{Deserialize, Serialize};

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: Method,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    pub result: Result<ResponseData, String>,
}

/// Request methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum Method {
    /// Ping daemon (health check)
    Ping,

    /// Get the zone status snapshot
    Status,

    /// Request a protection mode change.
    ///
    /// `mode` uses the stable numeric codes (0 = disarmed, 1 = full,
    /// 2 = hull, 3 = partial); anything else is rejected at the boundary.
    SelectMode { mode: u8, sender: String },
}

/// Response data variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ResponseData {
    /// Simple success/pong
    Ok,

    /// Zone status snapshot
    Status(ZoneStatus),

    /// Outcome of a mode selection. `accepted` is false when the request
    /// was rejected (maintenance, disabled mode) or aborted by the sensor
    /// check.
    ModeResult { accepted: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_mode_round_trip() {
        let request = Request {
            id: 7,
            method: Method::SelectMode {
                mode: 1,
                sender: "vigilctl".to_string(),
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 7);
        match back.method {
            Method::SelectMode { mode, sender } => {
                assert_eq!(mode, 1);
                assert_eq!(sender, "vigilctl");
            }
            other => panic!("unexpected method: {:?}", other),
        }
    }

    #[test]
    fn test_error_response_round_trip() {
        let response = Response {
            id: 3,
            result: Err("Invalid protection mode: 9".to_string()),
        };
        let json = serde_json::to_string(&response).unwrap();
        let back: Response = serde_json::from_str(&json).unwrap();
        assert!(back.result.is_err());
    }

    #[test]
    fn test_mode_result_serialization() {
        let response = Response {
            id: 1,
            result: Ok(ResponseData::ModeResult { accepted: false }),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ModeResult"));
    }
}
