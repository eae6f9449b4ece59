use serde::{Deserialize, Serialize};

/// A reaction-style button rendered as a text legend under outbound messages.
///
/// Discord has no inline keyboard equivalent for plain sends, so buttons are
/// presented as `label: value` lines the user can answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    /// Optional answer text shown next to the label.
    pub value: Option<String>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
        }
    }

    pub fn with_value(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Some(value.into()),
        }
    }
}
