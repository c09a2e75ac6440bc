pub mod pagination;
pub mod template;

pub use pagination::{
    default_page_config, LayoutSurface, PageConfig, PageMarker, PaginationEngine,
};
pub use template::{descriptor, TemplateDescriptor, TemplateId};
