pub mod entry;
pub mod feed;
pub mod ids;
pub mod status;

pub use entry::{Entry, EntryDraft, EntryId};
pub use feed::{Feed, FeedDraft, FeedId};
pub use ids::{next_id, IdAllocator};
pub use status::{ErrorKind, ProcessState, Status};
