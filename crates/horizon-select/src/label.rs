//! Selection labels and the label registry.
//!
//! A [`Label`] names an independent selection channel. Every item tracks one
//! boolean per label, and every container mirrors the labels it does not
//! ignore. The [`LabelRegistry`] validates label names against the host
//! surface the first time they are used.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use horizon_select_core::logging::targets;
use horizon_select_core::{Result, SelectError, Surface};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The label used when no label is configured or requested.
pub const DEFAULT_LABEL: &str = "selected";

/// A named selection channel.
///
/// Labels are cheap to clone (reference-counted string).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(Arc<str>);

impl Label {
    /// Creates a label from a name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the label name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the library-wide default label.
    pub fn is_default(&self) -> bool {
        &*self.0 == DEFAULT_LABEL
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({:?})", &*self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&Label> for Label {
    fn from(label: &Label) -> Self {
        label.clone()
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Label::from)
    }
}

/// The member names reachable on the host's item and container types.
///
/// A label may not reuse any of these names. Implement this trait when the
/// host framework exposes members beyond [`DefaultSurface`].
pub trait HostSurface: Send + Sync {
    /// Member names of the item type.
    fn item_members(&self) -> &[&'static str];

    /// Member names of the container types.
    fn container_members(&self) -> &[&'static str];
}

/// Item members: the selection API plus the host item primitives.
const ITEM_MEMBERS: &[&str] = &[
    // selection
    "select",
    "deselect",
    "toggle_selected",
    "is_selected",
    "is_selected_for",
    "labels",
    "default_label",
    "containers",
    // host item primitive
    "id",
    "destroy",
    "on",
    "on_label",
    "off",
    "trigger",
    "get",
    "set",
    "has",
    "unset",
    "clear",
    "save",
    "fetch",
    "validate",
    "parse",
    "url",
    "clone",
    "attributes",
];

/// Container members: the selection API plus the host collection primitives.
const CONTAINER_MEMBERS: &[&str] = &[
    // selection
    "select",
    "deselect",
    "select_all",
    "deselect_all",
    "select_none",
    "invert_selection",
    "toggle_select_all",
    "holder",
    "selection",
    "selected_count",
    "ignored_labels",
    "default_label",
    // host collection primitive
    "id",
    "add",
    "remove",
    "reset",
    "close",
    "filter",
    "members",
    "contains",
    "len",
    "length",
    "on",
    "on_label",
    "on_item",
    "off",
    "trigger",
    "get",
    "set",
    "fetch",
    "create",
    "sort",
    "push",
    "pop",
    "shift",
    "unshift",
    "slice",
    "find",
    "each",
    "map",
    "models",
    "url",
    "parse",
];

/// The surface of the library's own handle types and a conventional host.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSurface;

impl HostSurface for DefaultSurface {
    fn item_members(&self) -> &[&'static str] {
        ITEM_MEMBERS
    }

    fn container_members(&self) -> &[&'static str] {
        CONTAINER_MEMBERS
    }
}

/// Validates label names and resolves effective labels.
///
/// Validation results are cached: a label is checked once per registry, the
/// first time it is used.
pub struct LabelRegistry {
    surface: Box<dyn HostSurface>,
    validated: RwLock<HashSet<Label>>,
}

impl LabelRegistry {
    /// Creates a registry checking against the given host surface.
    pub fn new(surface: impl HostSurface + 'static) -> Self {
        Self {
            surface: Box::new(surface),
            validated: RwLock::new(HashSet::new()),
        }
    }

    /// Resolves the effective label: the explicit one if given, else the default.
    pub fn resolve(explicit: Option<&Label>, default_label: &Label) -> Label {
        explicit.unwrap_or(default_label).clone()
    }

    /// Checks a label against the host surface.
    ///
    /// Returns the collision error naming the label if it reuses an item or
    /// container member name. Nothing is registered when validation fails.
    pub fn validate(&self, label: &Label) -> Result<()> {
        if self.validated.read().contains(label) {
            return Ok(());
        }

        let name = label.as_str();
        if name.is_empty() {
            tracing::warn!(target: targets::LABEL, "rejected empty label");
            return Err(SelectError::EmptyLabel);
        }
        if self.surface.item_members().iter().any(|member| *member == name) {
            tracing::warn!(target: targets::LABEL, label = name, "label collides with item surface");
            return Err(SelectError::collision(name, Surface::Item));
        }
        if self.surface.container_members().iter().any(|member| *member == name) {
            tracing::warn!(target: targets::LABEL, label = name, "label collides with container surface");
            return Err(SelectError::collision(name, Surface::Container));
        }

        tracing::trace!(target: targets::LABEL, label = name, "label validated");
        self.validated.write().insert(label.clone());
        Ok(())
    }

    /// Validates an optional explicit label, passing `None` through.
    pub fn validate_explicit(&self, label: Option<&Label>) -> Result<()> {
        match label {
            Some(label) => self.validate(label),
            None => Ok(()),
        }
    }

    /// Returns `true` if the label has already passed validation.
    pub fn is_validated(&self, label: &str) -> bool {
        self.validated.read().contains(label)
    }

    /// Returns `true` if `label` is in a container's ignore list.
    pub fn is_ignored(ignored: &HashSet<Label>, label: &Label) -> bool {
        ignored.contains(label)
    }
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self::new(DefaultSurface)
    }
}

impl fmt::Debug for LabelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelRegistry")
            .field("validated", &self.validated.read().len())
            .finish_non_exhaustive()
    }
}
