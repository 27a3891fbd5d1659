//! Prelude module for convenient imports.
//!
//! Re-exports the types most call sites need:
//!
//! ```ignore
//! use weft::prelude::*;
//! ```

// Core application types
pub use crate::app::{App, AppMessage, Focus, Screen};

// Model types
pub use crate::models::{
    ApprovalDecision, ApprovalRequest, ConversationItem, ItemContent, ItemRole,
    PendingUserInputRequest, PredictionModel, ThreadKey, ThreadSummary,
};

// Reconciliation pipeline
pub use crate::events::{EventKind, ServerEvent};
pub use crate::router::EventRouter;
pub use crate::store::{StoreEffect, ThreadAction, ThreadStore};

// Derived views and prediction
pub use crate::prediction::{PredictionController, PredictionState};
pub use crate::rows::{OrganizeOptions, RowSet, RowViewCache, SortOrder, ThreadRow};

// Backend seams
pub use crate::error::{BackendError, BackendResult};
pub use crate::traits::{EventSource, ThreadBackend};
