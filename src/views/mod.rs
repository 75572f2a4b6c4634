//! Domain Views Module
//!
//! Typed read/write projections over the two low-level stores. Each view
//! owns one namespace and decides its own parse-failure policy:
//!
//! | View                 | Store      | Corrupt entry      | Cleared |
//! |----------------------|------------|--------------------|---------|
//! | `Payloads`           | content    | dropped, logged    | yes     |
//! | `SharedStates`       | content    | whole call fails   | yes     |
//! | `SemanticProperties` | content    | n/a (opaque bytes) | no      |
//! | `Sessions`           | journals   | whole call fails   | yes     |
//! | `LocalActions`       | journals   | dropped, logged    | no      |
//! | `UploadableActions`  | uploads    | dropped, logged    | yes     |

mod local_actions;
mod payloads;
mod semantic_properties;
mod sessions;
mod shared_states;
mod uploadable_actions;

use std::collections::BTreeSet;

use crate::blob::KeyedBlobStore;
use crate::error::Result;
use crate::keys::{ContentKey, Namespace};

pub use local_actions::LocalActions;
pub use payloads::Payloads;
pub use semantic_properties::SemanticProperties;
pub use sessions::Sessions;
pub use shared_states::SharedStates;
pub use uploadable_actions::UploadableActions;

/// Every stored key in one content namespace
pub(crate) fn keys_in_namespace(
    store: &dyn KeyedBlobStore,
    namespace: Namespace,
) -> Result<BTreeSet<String>> {
    Ok(store
        .all_keys()?
        .into_iter()
        .filter(|raw| {
            ContentKey::parse(raw).map_or(false, |key| key.namespace() == namespace)
        })
        .collect())
}
