//! Declarative metric annotations, parsed into explicit shapes.
//!
//! The host model attaches loosely-typed annotation values to entities and
//! actions. Everything is interpreted here, once, at registration time;
//! downstream code only ever sees the resolved variants.

use crate::core::attributes::{AttributeRef, default_attributes};
use crate::error::{MetricsError, Result};
use crate::host::Annotated;
use serde_json::Value;

/// Annotation key for the counter declaration body.
pub const COUNTER: &str = "@Counter";
/// Annotation key for the counter attribute list.
pub const COUNTER_ATTRIBUTES: &str = "@Counter.attributes";
/// Annotation key naming the fields a gauge observes.
pub const GAUGE_OBSERVE: &str = "@Gauge.observe";
/// Annotation key naming the gauge key field.
pub const GAUGE_KEY: &str = "@Gauge.key";

/// Counter declaration on an entity, exactly one of three shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum CounterSpec {
    /// Label attributes applying to all four lifecycle events.
    Attributes(Vec<AttributeRef>),
    /// Explicit per-event descriptors. An empty list means the declaration
    /// named no events and falls back to all defaults.
    Events(Vec<EventCounterSpec>),
    /// Presence flag: all default events with default attributes.
    AllDefaults,
}

/// One per-event counter descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCounterSpec {
    /// Event name the hook fires after.
    pub event: String,
    /// Declared label attributes; `None` means the default set.
    pub attributes: Option<Vec<AttributeRef>>,
}

impl CounterSpec {
    /// Read the counter declaration from an entity's annotations.
    ///
    /// `@Counter.attributes` takes precedence over `@Counter`. A `@Counter`
    /// array maps to [`CounterSpec::Events`]; any other present, truthy
    /// value is the bare presence flag. `null` and `false` count as absent.
    ///
    /// # Errors
    ///
    /// Returns a declaration error when a present annotation has a shape
    /// that cannot be interpreted.
    pub fn from_entity(entity: &dyn Annotated, context: &str) -> Result<Option<Self>> {
        if let Some(value) = present(entity.annotation(COUNTER_ATTRIBUTES)) {
            let attributes = parse_attribute_list(&value, context)?;
            return Ok(Some(Self::Attributes(attributes)));
        }
        match present(entity.annotation(COUNTER)) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let events = items
                    .iter()
                    .map(|item| EventCounterSpec::parse(item, context))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Some(Self::Events(events)))
            }
            Some(_) => Ok(Some(Self::AllDefaults)),
        }
    }
}

impl EventCounterSpec {
    fn parse(value: &Value, context: &str) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(declaration(context, "event descriptor must be an object"));
        };
        let event = map
            .get("event")
            .and_then(Value::as_str)
            .ok_or_else(|| declaration(context, "event descriptor is missing an 'event' string"))?
            .to_owned();
        let attributes = match map.get("attributes") {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_attribute_list(value, context)?),
        };
        Ok(Self { event, attributes })
    }
}

/// Counter declaration on a bound or unbound action.
///
/// Actions know only the presence flag and the attribute list. A declared
/// list is validated even when the flag is also present, but the flag makes
/// the default attribute set effective.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCounterSpec {
    /// The `@Counter` presence flag was set.
    pub flagged: bool,
    /// Explicitly declared attributes, if any.
    pub attributes: Option<Vec<AttributeRef>>,
}

impl ActionCounterSpec {
    /// Read the counter declaration from an action's annotations.
    ///
    /// # Errors
    ///
    /// Returns a declaration error when the attribute list is malformed.
    pub fn from_action(action: &dyn Annotated, context: &str) -> Result<Option<Self>> {
        let flagged = present(action.annotation(COUNTER)).is_some();
        let attributes = match present(action.annotation(COUNTER_ATTRIBUTES)) {
            None => None,
            Some(value) => Some(parse_attribute_list(&value, context)?),
        };
        if !flagged && attributes.is_none() {
            return Ok(None);
        }
        Ok(Some(Self { flagged, attributes }))
    }

    /// The attribute set hooks for this action resolve labels from.
    pub fn effective_attributes(self) -> Vec<AttributeRef> {
        if self.flagged {
            default_attributes()
        } else {
            self.attributes.unwrap_or_else(default_attributes)
        }
    }
}

/// Gauge declaration: observed fields plus a key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeSpec {
    /// Names of the fields to observe.
    pub observe: Vec<String>,
    /// Field whose value keys each reported measurement.
    pub key: String,
}

impl GaugeSpec {
    /// Read the gauge declaration from an entity's annotations.
    ///
    /// Both `@Gauge.observe` and `@Gauge.key` must be present for a gauge
    /// to exist; absence of either is no gauge, not an error.
    ///
    /// # Errors
    ///
    /// Returns a declaration error when either annotation is present with
    /// the wrong shape.
    pub fn from_entity(entity: &dyn Annotated, context: &str) -> Result<Option<Self>> {
        let (Some(observe), Some(key)) = (
            present(entity.annotation(GAUGE_OBSERVE)),
            present(entity.annotation(GAUGE_KEY)),
        ) else {
            return Ok(None);
        };
        let Value::Array(fields) = observe else {
            return Err(declaration(context, "@Gauge.observe must be an array of field names"));
        };
        let observe = fields
            .iter()
            .map(|field| {
                field
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| declaration(context, "@Gauge.observe entries must be strings"))
            })
            .collect::<Result<Vec<_>>>()?;
        let key = key
            .as_str()
            .ok_or_else(|| declaration(context, "@Gauge.key must be a string"))?
            .to_owned();
        Ok(Some(Self { observe, key }))
    }
}

// Annotation values of `null` and `false` count as not declared.
fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !matches!(value, Value::Null | Value::Bool(false)))
}

fn parse_attribute_list(value: &Value, context: &str) -> Result<Vec<AttributeRef>> {
    let Value::Array(items) = value else {
        return Err(declaration(context, "attribute list must be an array"));
    };
    items
        .iter()
        .map(|item| {
            AttributeRef::from_value(item).ok_or_else(|| {
                declaration(
                    context,
                    "attribute entries must be names or {\"=\": name} references",
                )
            })
        })
        .collect()
}

fn declaration(context: &str, reason: &str) -> MetricsError {
    MetricsError::Declaration {
        context: context.to_owned(),
        reason: reason.to_owned(),
    }
}
