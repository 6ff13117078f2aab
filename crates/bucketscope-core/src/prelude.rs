//! Convenient re-exports for common use.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::listing::{Breadcrumb, Listing, ObjectEntry, breadcrumbs};
pub use crate::loader::{DisplayHandle, HandleRegistry, ImageSlot, LoadState, ResourceIdentity};
pub use crate::navigation::{NavigationState, NavigationTicket, Navigator, Snapshot};
pub use crate::scenes::{ColumnPolicy, SceneRecord, SceneSet};
pub use crate::session::{AccessToken, ConnectionContext};
pub use crate::store::{ObjectBytes, ObjectStoreProvider, ObjectStoreService};
pub use crate::summary::{SummaryService, TextGenerator};
