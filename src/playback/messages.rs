use serde_json::{Value, json};

/// Fields of interest extracted from one inbound surface message.
///
/// The surface's message contract is untyped and varies between players, so
/// parsing is defensive: known aliases are probed in order and anything that
/// does not fit is simply absent. A message carrying none of the known
/// fields parses to `None` and is ignored by the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceEvent {
    pub current_time: Option<f64>,
    pub duration: Option<f64>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl SurfaceEvent {
    /// Parse a raw message: either a JSON object or a JSON string encoding
    /// one. Unparsable or structurally incompatible input yields `None`;
    /// the surface emits plenty of unrelated traffic, and none of it is an
    /// error.
    pub fn parse(raw: &Value) -> Option<Self> {
        let decoded;
        let object = match raw {
            Value::Object(_) => raw,
            Value::String(text) => {
                decoded = serde_json::from_str::<Value>(text).ok()?;
                if !decoded.is_object() {
                    return None;
                }
                &decoded
            }
            _ => return None,
        };

        let event = SurfaceEvent {
            current_time: first_seconds(object, &["currentTime", "time", "position"]),
            duration: first_seconds(object, &["duration", "total", "length", "videoLength"]),
            season: first_index(object, "season"),
            episode: first_index(object, "episode"),
        };

        if event == SurfaceEvent::default() {
            None
        } else {
            Some(event)
        }
    }
}

/// First alias that holds a usable, non-negative finite number of seconds.
fn first_seconds(object: &Value, aliases: &[&str]) -> Option<f64> {
    aliases
        .iter()
        .filter_map(|alias| object.get(alias))
        .filter_map(Value::as_f64)
        .find(|seconds| seconds.is_finite() && *seconds >= 0.0)
}

fn first_index(object: &Value, field: &str) -> Option<u32> {
    object
        .get(field)
        .and_then(Value::as_u64)
        .and_then(|index| u32::try_from(index).ok())
}

/// Outbound seek, posted in both command shapes the embedded players are
/// known to accept. `time` is the absolute target position.
pub fn seek_commands(time: f64) -> [Value; 2] {
    [
        json!({ "action": "seek", "time": time }),
        json!({ "event": "command", "func": "seek", "args": [time] }),
    ]
}
