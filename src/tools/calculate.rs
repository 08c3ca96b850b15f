//! calculate tool - evaluate an arithmetic expression

use serde::Deserialize;
use serde_json::{Map, Number, Value, json};

use super::ToolResult;
use super::expr;

pub(super) const NAME: &str = "calculate";

pub(super) const DESCRIPTION: &str = "Perform a mathematical calculation";

/// Largest magnitude at which every integer is exactly representable in f64
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Deserialize)]
pub struct CalculateArgs {
    pub expression: String,
}

pub(super) fn parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "expression": {
                "type": "string",
                "description": "Math expression to evaluate (e.g., '2 + 2', '10 * 5')"
            }
        },
        "required": ["expression"]
    })
}

pub(super) fn run(args: CalculateArgs) -> ToolResult {
    match expr::evaluate(&args.expression) {
        Ok(value) => {
            let mut fields = Map::new();
            fields.insert("result".to_string(), to_json_number(value));
            fields.insert("expression".to_string(), Value::String(args.expression));
            ToolResult::success(fields)
        }
        Err(e) => ToolResult::error(e.to_string()),
    }
}

/// Integral values go out as JSON integers (`56088`, not `56088.0`).
fn to_json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INT {
        return Value::Number(Number::from(value as i64));
    }
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}
