pub mod context;
pub mod error;

pub use context::AppContext;
pub use error::{
    FeedsyncError, FetchError, ParseError, Result, StoreError, SyncError, ValidationError,
};
