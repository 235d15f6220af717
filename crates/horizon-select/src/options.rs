//! Options accepted by selection and membership operations.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::label::Label;

/// Caller-supplied options for a selection or membership operation.
///
/// The recognized keys are typed fields; anything else goes into `custom`
/// and is passed through unchanged to every notification the operation fires.
///
/// # Example
///
/// ```
/// use horizon_select::SelectOptions;
///
/// let options = SelectOptions::new()
///     .label("starred")
///     .exclusive()
///     .custom("origin", "keyboard");
/// assert!(options.exclusive);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    /// The label to operate on. `None` uses the default label of the entry point.
    pub label: Option<Label>,
    /// Commit the change but fire no notifications.
    pub silent: bool,
    /// Also deselect every other selected item in each multi-choice container
    /// holding the target.
    pub exclusive: bool,
    /// Suppress the target item's own notification (and its bubbled copies)
    /// while still notifying containers and displaced items.
    pub silent_locally: bool,
    /// Pass-through data for event handlers.
    pub custom: BTreeMap<String, Value>,
}

impl SelectOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Enables silent mode.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Enables exclusive selection.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Suppresses the target item's own notification.
    pub fn silent_locally(mut self) -> Self {
        self.silent_locally = true;
        self
    }

    /// Adds a pass-through value.
    pub fn custom(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }
}

impl From<&str> for SelectOptions {
    fn from(label: &str) -> Self {
        Self::new().label(label)
    }
}

impl From<Label> for SelectOptions {
    fn from(label: Label) -> Self {
        Self::new().label(label)
    }
}

/// The structural change that caused an automatic selection update.
///
/// Attached only to the notifications of the container whose membership
/// changed; never forwarded to cascaded notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalChange {
    /// Items were added to the container.
    Add,
    /// Items were removed from the container.
    Remove,
    /// The container's members were replaced.
    Reset,
    /// A member item was destroyed.
    Destroy,
}

impl ExternalChange {
    /// The conventional event name of the structural change.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Reset => "reset",
            Self::Destroy => "destroy",
        }
    }
}

/// Options delivered with every notification.
#[derive(Debug, Clone, PartialEq)]
pub struct EventOptions {
    /// The resolved label.
    pub label: Label,
    /// Whether the originating call was exclusive.
    pub exclusive: bool,
    /// The caller's pass-through data.
    pub custom: BTreeMap<String, Value>,
    /// Set when the notification is the direct result of a membership change.
    pub external: Option<ExternalChange>,
}

impl EventOptions {
    pub(crate) fn from_request(options: &SelectOptions, label: Label) -> Self {
        Self {
            label,
            exclusive: options.exclusive,
            custom: options.custom.clone(),
            external: None,
        }
    }

    /// Returns a pass-through value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.custom.get(key)
    }
}
