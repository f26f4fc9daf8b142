//! Label-attribute validation and resolution.

use crate::error::{MetricsError, Result, ValidationError};
use crate::host::RequestContext;
use crate::sdk::LabelSet;
use serde_json::Value;
use tracing::debug;

/// Label attributes that may be declared on counters.
pub const SUPPORTED_ATTRIBUTES: &[&str] = &["user", "tenant"];

/// Sentinel label value used when the request context lacks the field.
pub const UNKNOWN: &str = "unknown";

/// A declared label attribute.
///
/// Annotations name attributes either as a bare string or in the host
/// model's structured reference form `{"=": <name>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeRef {
    /// Plain attribute name.
    Name(String),
    /// Name taken from a structured `{"=": <name>}` reference.
    Renamed(String),
}

impl AttributeRef {
    /// The effective attribute name.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Renamed(name) => name,
        }
    }

    /// Parse one annotation list element into an attribute reference.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self::Name(name.clone())),
            Value::Object(map) => map
                .get("=")
                .and_then(Value::as_str)
                .map(|name| Self::Renamed(name.to_owned())),
            _ => None,
        }
    }
}

/// The default label attributes applied when a declaration names none.
pub fn default_attributes() -> Vec<AttributeRef> {
    SUPPORTED_ATTRIBUTES
        .iter()
        .map(|name| AttributeRef::Name((*name).to_owned()))
        .collect()
}

/// Check that every declared attribute belongs to the supported set.
///
/// The attribute set is accepted or rejected wholesale: the first
/// unsupported name fails the whole declaration site. On success this is a
/// pure check with no output.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the unsupported attribute, the
/// declaration site, and the supported set.
pub fn validate_attributes(
    attributes: &[AttributeRef],
    context: &str,
) -> std::result::Result<(), ValidationError> {
    debug!(context, count = attributes.len(), "checking declared label attributes");
    for attribute in attributes {
        if !SUPPORTED_ATTRIBUTES.contains(&attribute.name()) {
            return Err(ValidationError::unsupported(
                attribute.name(),
                context,
                SUPPORTED_ATTRIBUTES,
            ));
        }
    }
    debug!(context, "declared label attributes are valid");
    Ok(())
}

/// Resolve declared attributes into a label set from the request context.
///
/// Context fields that are absent resolve to the [`UNKNOWN`] sentinel
/// rather than being dropped, so every declared label is always present on
/// the data point.
///
/// # Errors
///
/// Returns [`MetricsError::UnsupportedAttribute`] for names outside the
/// supported set. Prior validation makes this unreachable for hooks
/// installed by this crate.
pub fn resolve_labels(
    attributes: &[AttributeRef],
    ctx: &dyn RequestContext,
) -> Result<LabelSet> {
    let mut labels = LabelSet::new();
    for attribute in attributes {
        match attribute.name() {
            "user" => {
                let user = ctx.user_id().unwrap_or_else(|| UNKNOWN.to_owned());
                labels.insert("user".to_owned(), user);
            }
            "tenant" => {
                let tenant = ctx.subdomain().unwrap_or_else(|| UNKNOWN.to_owned());
                labels.insert("tenant".to_owned(), tenant);
            }
            other => return Err(MetricsError::UnsupportedAttribute(other.to_owned())),
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct TestContext {
        user: Option<&'static str>,
        tenant: Option<&'static str>,
    }

    impl RequestContext for TestContext {
        fn user_id(&self) -> Option<String> {
            self.user.map(str::to_owned)
        }

        fn subdomain(&self) -> Option<String> {
            self.tenant.map(str::to_owned)
        }

        fn reject(&self, _code: u16, _message: &str) {}

        fn info(&self, _message: &str) {}
    }

    fn named(names: &[&str]) -> Vec<AttributeRef> {
        names
            .iter()
            .map(|name| AttributeRef::Name((*name).to_owned()))
            .collect()
    }

    #[test]
    fn supported_attributes_validate() {
        assert!(validate_attributes(&named(&["user"]), "entity Books").is_ok());
        assert!(validate_attributes(&named(&["tenant", "user"]), "entity Books").is_ok());
        assert!(validate_attributes(&[], "entity Books").is_ok());
    }

    #[test]
    fn unsupported_attribute_is_rejected_with_context() {
        let err = validate_attributes(&named(&["user", "role"]), "entity Books @Counter.attributes")
            .unwrap_err();
        assert_eq!(err.attribute, "role");
        assert_eq!(err.context, "entity Books @Counter.attributes");
        let message = err.to_string();
        assert!(message.contains("'role'"));
        assert!(message.contains("entity Books @Counter.attributes"));
        assert!(message.contains("user, tenant"));
    }

    #[test]
    fn renamed_form_resolves_to_inner_name() {
        let attr = AttributeRef::from_value(&json!({"=": "tenant"})).unwrap();
        assert_eq!(attr, AttributeRef::Renamed("tenant".to_owned()));
        assert!(validate_attributes(&[attr], "entity Books").is_ok());
    }

    #[test]
    fn non_string_elements_do_not_parse() {
        assert_eq!(AttributeRef::from_value(&json!(42)), None);
        assert_eq!(AttributeRef::from_value(&json!({"name": "user"})), None);
    }

    #[test]
    fn labels_resolve_from_context() {
        let ctx = TestContext {
            user: Some("alice"),
            tenant: Some("acme"),
        };
        let labels = resolve_labels(&default_attributes(), &ctx).unwrap();
        assert_eq!(labels.get("user").map(String::as_str), Some("alice"));
        assert_eq!(labels.get("tenant").map(String::as_str), Some("acme"));
    }

    #[test]
    fn absent_context_fields_fall_back_to_unknown() {
        let ctx = TestContext {
            user: None,
            tenant: None,
        };
        let labels = resolve_labels(&default_attributes(), &ctx).unwrap();
        assert_eq!(labels.get("user").map(String::as_str), Some(UNKNOWN));
        assert_eq!(labels.get("tenant").map(String::as_str), Some(UNKNOWN));
    }

    #[test]
    fn unsupported_name_fails_resolution() {
        let ctx = TestContext {
            user: None,
            tenant: None,
        };
        let err = resolve_labels(&named(&["role"]), &ctx).unwrap_err();
        assert!(matches!(err, MetricsError::UnsupportedAttribute(name) if name == "role"));
    }
}
