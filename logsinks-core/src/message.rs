use std::collections::BTreeSet;
use std::fmt;

use crate::error::Result;
use crate::item::{LogItem, format_timestamp};
use crate::serializer::LogItemSerializer;

/// A piece of a log item that can be rendered into a message.
///
/// Declaration order is rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageProperty {
    Timestamp,
    CorrelationIds,
    Origin,
    SubjectSummary,
    StackTrace,
    FullSerialization,
}

/// What a writer puts in each message it emits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MessageProperties {
    /// The item's own display form.
    #[default]
    Default,
    /// The chosen properties in declaration order. An empty set renders
    /// like [`MessageProperties::Default`].
    Selected(BTreeSet<MessageProperty>),
}

impl MessageProperties {
    pub fn selected<I: IntoIterator<Item = MessageProperty>>(properties: I) -> Self {
        MessageProperties::Selected(properties.into_iter().collect())
    }

    /// Only the full serialized item, the format the time-sliced reader expects.
    pub fn serialization_only() -> Self {
        Self::selected([MessageProperty::FullSerialization])
    }

    pub fn is_serialization_only(&self) -> bool {
        matches!(self, MessageProperties::Selected(set)
            if set.len() == 1 && set.contains(&MessageProperty::FullSerialization))
    }
}

impl fmt::Display for MessageProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageProperties::Default => f.write_str("Default"),
            MessageProperties::Selected(set) => {
                let names: Vec<String> = set.iter().map(|p| format!("{p:?}")).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

const SEPARATOR: &str = " | ";

/// Builds the text a sink writes for `item`.
pub fn build_message(
    item: &LogItem,
    properties: &MessageProperties,
    serializer: &dyn LogItemSerializer,
) -> Result<String> {
    let selected = match properties {
        MessageProperties::Selected(selected) if !selected.is_empty() => selected,
        _ => return Ok(item.to_string()),
    };
    let mut parts = Vec::with_capacity(selected.len());
    for property in selected {
        match property {
            MessageProperty::Timestamp => parts.push(format_timestamp(&item.timestamp_utc())),
            MessageProperty::CorrelationIds => {
                if !item.correlations().is_empty() {
                    let ids: Vec<String> = item
                        .correlations()
                        .iter()
                        .map(|c| c.correlation_id.to_string())
                        .collect();
                    parts.push(ids.join(","));
                }
            }
            MessageProperty::Origin => parts.push(item.origin().to_string()),
            MessageProperty::SubjectSummary => parts.push(item.message().to_string()),
            MessageProperty::StackTrace => {
                if let Some(stack_trace) = item.context().stack_trace() {
                    parts.push(stack_trace.to_string());
                }
            }
            MessageProperty::FullSerialization => parts.push(serializer.serialize(item)?),
        }
    }
    Ok(parts.join(SEPARATOR))
}
