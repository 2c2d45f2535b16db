//! Helper functions available inside templates.

use minijinja::value::{Rest, ValueKind};
use minijinja::{Environment, State, Value};

const LINK: &str = "link";
const LINK_SELECTED: &str = "link link-selected";

/// Register all helpers on `env`.
pub fn register(env: &mut Environment<'_>) {
    env.add_function("isset", isset);
    env.add_function("is_active", is_active);
}

/// `isset(name)` checks the render context; `isset(name, value)` checks a map-shaped value.
pub fn isset(state: &State, name: &str, value: Rest<Value>) -> bool {
    match value.first() {
        Some(value) => has_field(value, name),
        None => state.lookup(name).is_some_and(|v| !v.is_undefined()),
    }
}

/// CSS classes for a navigation link pointing at `path`.
pub fn is_active(state: &State, path: &str) -> String {
    let current = state.lookup("path");
    let selected = current
        .as_ref()
        .and_then(Value::as_str)
        .is_some_and(|current| current == path);
    let classes = if selected { LINK_SELECTED } else { LINK };
    classes.to_string()
}

fn has_field(value: &Value, name: &str) -> bool {
    value.kind() == ValueKind::Map
        && value
            .get_attr(name)
            .map(|field| !field.is_undefined())
            .unwrap_or(false)
}
