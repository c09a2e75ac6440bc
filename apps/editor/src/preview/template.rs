//! Template descriptors for the preview surface.
//!
//! The engine does not render templates; it only needs each template's
//! capabilities (whether the layout reserves space for a photo) and identity
//! so a template switch can invalidate the pagination.

use serde::{Deserialize, Serialize};

/// The built-in template set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    Classic,
    Modern,
    Minimal,
    Sidebar,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub id: TemplateId,
    pub name: &'static str,
    /// Whether the layout renders the profile photo.
    pub supports_photo: bool,
}

/// Returns the descriptor for a template id.
pub fn descriptor(id: TemplateId) -> TemplateDescriptor {
    match id {
        TemplateId::Classic => TemplateDescriptor {
            id,
            name: "Classic",
            supports_photo: false,
        },
        TemplateId::Modern => TemplateDescriptor {
            id,
            name: "Modern",
            supports_photo: true,
        },
        TemplateId::Minimal => TemplateDescriptor {
            id,
            name: "Minimal",
            supports_photo: false,
        },
        TemplateId::Sidebar => TemplateDescriptor {
            id,
            name: "Sidebar",
            supports_photo: true,
        },
        TemplateId::Compact => TemplateDescriptor {
            id,
            name: "Compact",
            supports_photo: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_round_trips_id() {
        for id in [
            TemplateId::Classic,
            TemplateId::Modern,
            TemplateId::Minimal,
            TemplateId::Sidebar,
            TemplateId::Compact,
        ] {
            assert_eq!(descriptor(id).id, id);
        }
    }

    #[test]
    fn test_photo_capability_varies_by_template() {
        assert!(descriptor(TemplateId::Modern).supports_photo);
        assert!(!descriptor(TemplateId::Classic).supports_photo);
    }
}
