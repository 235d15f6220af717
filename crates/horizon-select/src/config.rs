//! Construction-time configuration for items and containers.
//!
//! Both config types deserialize with `serde`, so they can be loaded from
//! application settings:
//!
//! ```
//! use horizon_select::ContainerConfig;
//!
//! let config: ContainerConfig = serde_json::from_str(
//!     r#"{ "default_label": "picked", "ignore_label": "starred" }"#,
//! ).unwrap();
//! assert_eq!(config.default_label.as_str(), "picked");
//! assert_eq!(config.ignore_label.len(), 1);
//! assert!(config.model_sharing);
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::label::Label;

/// Configuration for a single-choice or multi-choice container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// The label used when an operation names none.
    pub default_label: Label,
    /// Labels this container never mirrors. Accepts a string or a list.
    #[serde(deserialize_with = "one_or_many")]
    pub ignore_label: Vec<Label>,
    /// Whether members may also belong to other containers.
    pub model_sharing: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            default_label: Label::default(),
            ignore_label: Vec::new(),
            model_sharing: true,
        }
    }
}

impl ContainerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default label.
    pub fn default_label(mut self, label: impl Into<Label>) -> Self {
        self.default_label = label.into();
        self
    }

    /// Adds a label to the ignore list.
    pub fn ignore_label(mut self, label: impl Into<Label>) -> Self {
        self.ignore_label.push(label.into());
        self
    }

    /// Adds several labels to the ignore list.
    pub fn ignore_labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        self.ignore_label.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Enables or disables model sharing.
    pub fn model_sharing(mut self, enabled: bool) -> Self {
        self.model_sharing = enabled;
        self
    }
}

/// Configuration for a selectable item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    /// The label used when an item-level call names none.
    pub default_label: Label,
}

impl ItemConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default label.
    pub fn default_label(mut self, label: impl Into<Label>) -> Self {
        self.default_label = label.into();
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Label>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Label),
        Many(Vec<Label>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(label) => vec![label],
        OneOrMany::Many(labels) => labels,
    })
}
