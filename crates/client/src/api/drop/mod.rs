//! Share links ("drops"): a code, optionally password protected, that
//! exposes a set of file records to other users.

mod create;
mod delete;
mod get;
mod list;
mod record;

pub use create::{CreateDropRequest, CreateDropResponse, ExpireDays, InvalidExpireDays};
pub use delete::{DeleteDropRequest, DeleteDropResponse};
pub use get::{DropDetailResponse, GetDropRequest};
pub use list::{ListDropsRequest, ListDropsResponse};
pub use record::DropRecord;
