//! Error types for Horizon Select.

use std::fmt;

/// Result type alias for selection operations.
pub type Result<T> = std::result::Result<T, SelectError>;

/// The public surface a label name was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// The selectable item type.
    Item,
    /// The container types (single-choice and multi-choice).
    Container,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item => write!(f, "item"),
            Self::Container => write!(f, "container"),
        }
    }
}

/// Errors that can occur in the selection system.
///
/// Every variant is raised before the failing operation mutates anything, so a
/// caller that receives an error observes exactly the state it had before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// The label name collides with a member of the item or container surface.
    #[error("Illegal label '{label}': collides with a member of the {surface} surface")]
    LabelCollision {
        /// The offending label name.
        label: String,
        /// Which surface the collision was found on.
        surface: Surface,
    },

    /// Labels must be non-empty.
    #[error("Illegal label: label names must not be empty")]
    EmptyLabel,

    /// A container was configured to ignore its own default label.
    #[error("Illegal configuration: a container cannot ignore its default label '{label}'")]
    IgnoresDefaultLabel {
        /// The default label that appeared in the ignore list.
        label: String,
    },

    /// The item ID is invalid or the item has been destroyed.
    #[error("Invalid or destroyed item")]
    InvalidItem,

    /// The container has been closed.
    #[error("Container has been closed")]
    ContainerClosed,

    /// Model sharing is disabled for a container involved in the operation.
    #[error("Model sharing is disabled: the item cannot belong to more than one container")]
    SharingDisabled,

    /// An item and a container from different registries were combined.
    #[error("Item and container belong to different selection registries")]
    ForeignRegistry,
}

impl SelectError {
    /// Create a label collision error.
    pub fn collision(label: impl Into<String>, surface: Surface) -> Self {
        Self::LabelCollision {
            label: label.into(),
            surface,
        }
    }

    /// Returns `true` for configuration errors (illegal labels or label setup).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::LabelCollision { .. } | Self::EmptyLabel | Self::IgnoresDefaultLabel { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message_names_label() {
        let err = SelectError::collision("save", Surface::Item);
        let msg = err.to_string();
        assert!(msg.contains("'save'"));
        assert!(msg.contains("item surface"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_ignore_default_message() {
        let err = SelectError::IgnoresDefaultLabel {
            label: "starred".to_string(),
        };
        assert!(err.to_string().contains("'starred'"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_runtime_errors_are_not_configuration() {
        assert!(!SelectError::InvalidItem.is_configuration());
        assert!(!SelectError::ContainerClosed.is_configuration());
        assert!(!SelectError::SharingDisabled.is_configuration());
    }
}
