//! Helper functions available to template bodies.
//!
//! The registry is fixed: every template compiled by this crate sees exactly
//! the helpers registered by [`register`], nothing is looked up dynamically.
//!
//! | name                      | arguments                         |
//! |---------------------------|-----------------------------------|
//! | `contains`                | haystack, needle                  |
//! | `has_prefix`              | s, prefix                         |
//! | `has_suffix`              | s, suffix                         |
//! | `to_lower`                | s                                 |
//! | `to_upper`                | s                                 |
//! | `trim`                    | s                                 |
//! | `replace_all`             | s, from, to                       |
//! | `join`                    | array of strings, separator       |
//! | `default_value`           | value, fallback                   |
//! | `make_location_path`      | path, match type                  |
//! | `header_value_or_default` | headers, name, fallback           |

use handlebars::{handlebars_helper, Handlebars, JsonValue};

handlebars_helper!(contains: |haystack: str, needle: str| haystack.contains(needle));
handlebars_helper!(has_prefix: |s: str, prefix: str| s.starts_with(prefix));
handlebars_helper!(has_suffix: |s: str, suffix: str| s.ends_with(suffix));
handlebars_helper!(to_lower: |s: str| s.to_lowercase());
handlebars_helper!(to_upper: |s: str| s.to_uppercase());
handlebars_helper!(trim: |s: str| s.trim().to_string());
handlebars_helper!(replace_all: |s: str, from: str, to: str| s.replace(from, to));
handlebars_helper!(join: |items: array, sep: str| join_strings(items, sep));
handlebars_helper!(default_value: |value: Json, fallback: Json| pick_default(value, fallback));
handlebars_helper!(make_location_path: |path: str, match_type: str| location_path(path, match_type));
handlebars_helper!(header_value_or_default: |headers: array, name: str, fallback: str| {
    header_value(headers, name).unwrap_or(fallback).to_string()
});

/// Register the full helper set on a registry.
pub fn register(registry: &mut Handlebars<'static>) {
    registry.register_helper("contains", Box::new(contains));
    registry.register_helper("has_prefix", Box::new(has_prefix));
    registry.register_helper("has_suffix", Box::new(has_suffix));
    registry.register_helper("to_lower", Box::new(to_lower));
    registry.register_helper("to_upper", Box::new(to_upper));
    registry.register_helper("trim", Box::new(trim));
    registry.register_helper("replace_all", Box::new(replace_all));
    registry.register_helper("join", Box::new(join));
    registry.register_helper("default_value", Box::new(default_value));
    registry.register_helper("make_location_path", Box::new(make_location_path));
    registry.register_helper("header_value_or_default", Box::new(header_value_or_default));
}

fn join_strings(items: &[JsonValue], sep: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(sep)
}

fn pick_default(value: &JsonValue, fallback: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Null => fallback.clone(),
        JsonValue::String(s) if s.is_empty() => fallback.clone(),
        other => other.clone(),
    }
}

/// Build the argument of an NGINX `location` directive.
fn location_path(path: &str, match_type: &str) -> String {
    match match_type {
        "exact" => format!("= {}", path),
        "regex" => format!("~ {}", path),
        "regex_case_insensitive" => format!("~* {}", path),
        _ => path.to_string(),
    }
}

/// Case-insensitive lookup in a list of `{ name, value }` objects.
fn header_value<'a>(headers: &'a [JsonValue], name: &str) -> Option<&'a str> {
    headers.iter().find_map(|header| {
        let header_name = header.get("name")?.as_str()?;
        if header_name.eq_ignore_ascii_case(name) {
            header.get("value")?.as_str()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(template: &str, data: &JsonValue) -> String {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        register(&mut registry);
        registry.render_template(template, data).unwrap()
    }

    #[test]
    fn test_string_predicates() {
        let data = json!({ "path": "/api/v1" });
        assert_eq!(render(r#"{{#if (has_prefix path "/api")}}yes{{/if}}"#, &data), "yes");
        assert_eq!(render(r#"{{#if (has_suffix path "v2")}}yes{{else}}no{{/if}}"#, &data), "no");
        assert_eq!(render(r#"{{#if (contains path "pi/v")}}yes{{/if}}"#, &data), "yes");
    }

    #[test]
    fn test_string_transforms() {
        let data = json!({ "name": "  Cafe.Example.COM " });
        assert_eq!(render("{{to_lower (trim name)}}", &data), "cafe.example.com");
        assert_eq!(render("{{to_upper (trim name)}}", &data), "CAFE.EXAMPLE.COM");
        assert_eq!(render(r#"{{replace_all (trim name) "." "_"}}"#, &data), "Cafe_Example_COM");
    }

    #[test]
    fn test_join() {
        let data = json!({ "protocols": ["TLSv1.2", "TLSv1.3"] });
        assert_eq!(render(r#"{{join protocols " "}}"#, &data), "TLSv1.2 TLSv1.3");
    }

    #[test]
    fn test_default_value() {
        let data = json!({ "set": "60s", "unset": null, "empty": "" });
        assert_eq!(render(r#"{{default_value set "30s"}}"#, &data), "60s");
        assert_eq!(render(r#"{{default_value unset "30s"}}"#, &data), "30s");
        assert_eq!(render(r#"{{default_value empty "30s"}}"#, &data), "30s");
    }

    #[test]
    fn test_make_location_path() {
        assert_eq!(location_path("/exact", "exact"), "= /exact");
        assert_eq!(location_path("^/api", "regex"), "~ ^/api");
        assert_eq!(location_path("^/api", "regex_case_insensitive"), "~* ^/api");
        assert_eq!(location_path("/prefix", "prefix"), "/prefix");
    }

    #[test]
    fn test_header_value_lookup_ignores_case() {
        let data = json!({
            "headers": [
                { "name": "X-Forwarded-Proto", "value": "https" },
            ]
        });
        assert_eq!(
            render(r#"{{header_value_or_default headers "x-forwarded-proto" "$scheme"}}"#, &data),
            "https"
        );
        assert_eq!(
            render(r#"{{header_value_or_default headers "Host" "$host"}}"#, &data),
            "$host"
        );
    }
}
