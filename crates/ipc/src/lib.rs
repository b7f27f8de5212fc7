//! PaneStack IPC Protocol
//!
//! Shared types for host-CLI communication. Every message is one line of
//! JSON; the host answers each command with exactly one response line.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum size of a single protocol line in bytes.
pub const MAX_IPC_MESSAGE_SIZE: usize = 64 * 1024;

/// Errors from encoding or decoding protocol lines.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Message of {0} bytes exceeds the protocol size limit")]
    TooLarge(usize),

    #[error("Invalid message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Commands that can be sent to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcCommand {
    /// Open a pane, or promote it to the end if already open.
    OpenPane {
        /// Unique pane id.
        id: String,
        /// Tab title.
        title: String,
    },
    /// Close a pane. Unknown ids are ignored.
    ClosePane {
        /// Id of the pane to close.
        id: String,
    },

    /// Report new viewport metrics.
    Resize {
        /// Viewport width in pixels.
        width: f64,
        /// Viewport height in pixels.
        height: f64,
    },

    /// One drag sample.
    Drag {
        /// Cumulative offset since the gesture started.
        offset: f64,
        /// Sign of the current movement.
        #[serde(default)]
        direction: i8,
        /// False on the final sample.
        active: bool,
    },
    /// A wheel delta (positive = toward the end of the list).
    Wheel {
        /// Scroll delta in pixels.
        delta: f64,
    },
    /// Abort the current gesture.
    CancelGesture,

    /// Query the current layout.
    QueryLayout,
    /// Query the open panes.
    QueryPanes,

    /// Reload configuration from file.
    Reload,
    /// Stop the host.
    Stop,
}

/// Role of a pane in a layout snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    LeftTab,
    Pinned,
    Track,
    RightTab,
}

/// Placement of one pane in a layout snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneSlot {
    /// Pane id.
    pub id: String,
    /// Tab title.
    pub title: String,
    /// Role in the partition.
    pub role: SlotRole,
    /// Left edge in pixels.
    pub x: f64,
    /// Width in pixels.
    pub width: f64,
    /// Whether the pane overlaps its visible region.
    pub visible: bool,
    /// Whether the pane is mid-transition between tab and pane.
    #[serde(default)]
    pub in_refuge: bool,
}

/// Layout state reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Ids collapsed on the left edge.
    pub left_tabs: Vec<String>,
    /// Id of the pinned pane.
    pub pinned: Option<String>,
    /// Ids in the sliding track.
    pub track: Vec<String>,
    /// Ids collapsed on the right edge.
    pub right_tabs: Vec<String>,
    /// Track offset reported by the allocator; informational only.
    pub track_offset: f64,
    /// Distance the track rests left of its origin; `x` rests at its negation.
    pub resting_shift: f64,
    /// Live track translation.
    pub x: f64,
    /// Lower bound of `x`.
    pub min: f64,
    /// Upper bound of `x`.
    pub max: f64,
    /// Drag phase name (`resting`, `dragging` or `refuge`).
    pub phase: String,
    /// Collapsed panes pushed to the right edge.
    pub tab_offset: i32,
    /// Viewport width the layout was computed for.
    pub viewport_width: f64,
    /// Per-pane placements in list order.
    pub slots: Vec<PaneSlot>,
}

/// Pane summary for `query_panes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneInfo {
    pub id: String,
    pub title: String,
}

/// Responses from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IpcResponse {
    /// Command executed successfully.
    Ok,
    /// Command failed with an error.
    Error {
        /// Error message describing what went wrong.
        message: String,
    },
    /// Layout query response.
    Layout(LayoutSnapshot),
    /// Pane list query response.
    Panes {
        /// Open panes in display order.
        panes: Vec<PaneInfo>,
    },
}

impl IpcResponse {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Serialize a message as one protocol line, newline included.
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(message)?;
    if line.len() >= MAX_IPC_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(line.len()));
    }
    line.push('\n');
    Ok(line)
}

/// Parse one protocol line. Surrounding whitespace is ignored.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, ProtocolError> {
    if line.len() > MAX_IPC_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(line.len()));
    }
    Ok(serde_json::from_str(line.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = IpcCommand::QueryLayout;
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("query_layout"));

        let cmd2: IpcCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, cmd2);
    }

    #[test]
    fn test_open_pane_wire_format() {
        let cmd = IpcCommand::OpenPane {
            id: "inbox".to_string(),
            title: "Inbox".to_string(),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"type":"open_pane","id":"inbox","title":"Inbox"}"#);
    }

    #[test]
    fn test_drag_direction_defaults_to_zero() {
        let cmd: IpcCommand =
            decode_line(r#"{"type":"drag","offset":12.5,"active":true}"#).unwrap();
        assert_eq!(
            cmd,
            IpcCommand::Drag {
                offset: 12.5,
                direction: 0,
                active: true
            }
        );
    }

    #[test]
    fn test_layout_response_is_flattened() {
        let resp = IpcResponse::Layout(LayoutSnapshot {
            left_tabs: vec!["a".to_string()],
            pinned: Some("b".to_string()),
            track: vec![],
            right_tabs: vec![],
            track_offset: 0.0,
            resting_shift: 0.0,
            x: 0.0,
            min: 0.0,
            max: 0.0,
            phase: "resting".to_string(),
            tab_offset: 0,
            viewport_width: 300.0,
            slots: vec![],
        });
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.starts_with(r#"{"status":"layout","left_tabs":["a"]"#));

        let parsed: IpcResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp, parsed);
    }

    #[test]
    fn test_error_response() {
        let resp = IpcResponse::error("Something went wrong");
        if let IpcResponse::Error { message } = resp {
            assert_eq!(message, "Something went wrong");
        } else {
            panic!("Expected Error response");
        }
    }

    #[test]
    fn test_line_delimited_protocol() {
        let line = encode_line(&IpcCommand::Wheel { delta: -40.0 }).unwrap();
        assert!(line.ends_with('\n'));

        let parsed: IpcCommand = decode_line(&line).unwrap();
        assert_eq!(parsed, IpcCommand::Wheel { delta: -40.0 });
    }

    #[test]
    fn test_invalid_json_handling() {
        let result: Result<IpcCommand, _> = decode_line("not valid json");
        assert!(matches!(result, Err(ProtocolError::Json(_))));

        let result: Result<IpcCommand, _> = decode_line(r#"{"type": "unknown_command"}"#);
        assert!(result.is_err());

        let result: Result<IpcResponse, _> = decode_line(r#"{"status": "invalid"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_line_rejected() {
        let line = "x".repeat(MAX_IPC_MESSAGE_SIZE + 1);
        let result: Result<IpcCommand, _> = decode_line(&line);
        assert!(matches!(result, Err(ProtocolError::TooLarge(_))));

        let cmd = IpcCommand::OpenPane {
            id: "x".repeat(MAX_IPC_MESSAGE_SIZE),
            title: String::new(),
        };
        assert!(matches!(encode_line(&cmd), Err(ProtocolError::TooLarge(_))));
    }
}
