pub mod auth;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{Claims, require_admin};
pub use error::ServiceError;
pub use module::Module;
pub use types::{
    ListParams, ListPlan, ListResult, SortOrder, merge_patch, new_id, now_rfc3339, truthy,
};
