//! get_current_time tool - report the local clock
//!
//! The timezone argument is echoed back; no conversion happens. The
//! timestamp carries its own UTC offset so the answer stays unambiguous.

use chrono::{DateTime, Local, SecondsFormat};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::ToolResult;

pub(super) const NAME: &str = "get_current_time";

pub(super) const DESCRIPTION: &str = "Get the current time";

const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentTimeArgs {
    #[serde(default)]
    pub timezone: Option<String>,
}

pub(super) fn parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "timezone": {
                "type": "string",
                "description": "Timezone (e.g., 'UTC', 'America/New_York')",
                "default": DEFAULT_TIMEZONE
            }
        }
    })
}

pub(super) fn run(args: CurrentTimeArgs) -> ToolResult {
    run_at(Local::now(), args)
}

fn run_at(now: DateTime<Local>, args: CurrentTimeArgs) -> ToolResult {
    let timezone = args.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

    let mut fields = Map::new();
    fields.insert(
        "time".to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, false)),
    );
    fields.insert("timezone".to_string(), Value::String(timezone));
    ToolResult::success(fields)
}
