//! Types shared between the reference grammar, the editing core and the
//! front ends that host a reference field.

pub mod catalog;
pub mod reference;

pub use catalog::Chapter;
pub use catalog::Character;
pub use catalog::EntityCatalog;
pub use catalog::EntitySummary;
pub use catalog::Memo;
pub use catalog::WorldSetting;
pub use reference::ChapterVariant;
pub use reference::RefKind;
pub use reference::Reference;
