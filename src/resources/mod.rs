//! Concrete resource variants.
//!
//! Each submodule declares one resource: its static [`Descriptor`]
//! (endpoint, fields, filter keys, children) and a typed wrapper struct
//! implementing [`Resource`], plus whatever operations are specific to that
//! resource — project/task linking, section grouping, and so on.
//!
//! [`Descriptor`]: crate::entity::Descriptor
//! [`Resource`]: crate::entity::Resource

pub mod project;
pub mod section;
pub mod story;
pub mod tag;
pub mod task;
pub mod user;

pub use project::Project;
pub use section::Section;
pub use story::Story;
pub use tag::Tag;
pub use task::{ProjectRef, Task};
pub use user::User;
