//! Grouping, ordering and template compositing of rendered maps.
//!
//! A rendered map joins a background group keyed by its filename
//! ([`groups`]), each group is date-sorted and renumbered ([`series`]),
//! and every template discovered under the template root ([`templates`])
//! receives its matching series as a labeled grid layout ([`layout`]).

mod error;
pub mod groups;
pub mod layout;
pub mod series;
pub mod templates;

pub use error::{ComposeError, Result};
pub use groups::{display_key, template_key, BackgroundGroups, RasterName};
pub use layout::{save_jpeg, save_png, slot_position, LayoutCompositor};
pub use series::{organize, OrganizedImage};
pub use templates::{collect_templates, CompositeTemplate};
