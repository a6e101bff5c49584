//! View subsystem.
//!
//! # Data Flow
//! ```text
//! Accept header
//!     → negotiation.rs (ordered extension preferences)
//! (view name, data, extension hint?)
//!     → resolver.rs (candidate paths × extensions)
//!     → source.rs (existence check, read)
//!     → rendered string
//! ```

pub mod data;
pub mod negotiation;
pub mod resolver;
pub mod source;

pub use data::ViewData;
pub use negotiation::{AcceptPreference, ContentTypeTable};
pub use resolver::{LocatedView, RenderedView, ViewResolver, ViewScope};
pub use source::{FsSource, MemorySource, TemplateSource};
