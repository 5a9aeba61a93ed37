pub mod compose;
pub mod engine;
pub mod frontmatter;
pub mod layout;
pub mod price;
pub mod site;
pub mod template;

pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
