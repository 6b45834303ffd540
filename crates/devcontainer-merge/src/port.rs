//! Port entries passed on the command line.

use serde_json::Value;

/// True if `raw` is a bare decimal port number such as `8080`.
pub fn is_bare_port_number(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Convert a port argument into the value stored in `appPort`.
///
/// Bare integers become JSON numbers; anything else (`"3000:3000"`, ranges,
/// out-of-range digits) is kept verbatim as a string.
pub fn coerce_port(raw: &str) -> Value {
    if is_bare_port_number(raw) {
        if let Ok(number) = raw.parse::<u64>() {
            return Value::from(number);
        }
    }
    Value::String(raw.to_string())
}
