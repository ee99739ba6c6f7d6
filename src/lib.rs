//! # recordsync
//!
//! Client-side data layer for business-record dashboards (suppliers, debtors
//! and the like) backed by a REST entity API.
//!
//! ## Features
//!
//! - **Wire Codec**: snake_case ⇄ camelCase keys, JSON-encoded list fields
//! - **Normalization**: tolerant decoding of server records into one canonical shape
//! - **Remote Sync Store**: create/update/delete followed by a full refetch, never a local patch
//! - **Query Engine**: search, stable sort, pagination and totals over the filtered set
//! - **Pluggable Transport**: reqwest over HTTP, or an in-memory fake for tests
//! - **Export**: statement model with CSV rendering
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use recordsync::prelude::*;
//!
//! let config = ClientConfig::default_config().apply_env_overrides()?;
//! let transport = Arc::new(HttpTransport::from_config(&config)?);
//! let store = RemoteSyncStore::new(EntityResource::suppliers(), transport)
//!     .with_notifier(Arc::new(TracingNotifier));
//!
//! store.refresh().await;
//! store.create(RecordPatch::new().name("Acme").amount(500.0)).await?;
//!
//! let mut state = QueryState::default();
//! state.set_search_text("acme");
//! let records = store.records();
//! let result = TableView::suppliers().run(&records, &state);
//! println!("{} matching, {:.2} due", result.page.total, result.totals.total_due);
//! ```

pub mod config;
pub mod core;
pub mod export;
pub mod transport;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Records ===
    pub use crate::core::{
        codec::{decode_list_field, encode_list_field, to_canonical_key, to_wire_key},
        field::FieldValue,
        normalize::{RecordPatch, WireRecord, denormalize, denormalize_patch, normalize},
        record::{LedgerEntry, ProductsSupplied, Record, RecordId, RecordState},
    };

    // === Sync ===
    pub use crate::core::{
        error::{SyncError, SyncResult, TransportError},
        notify::{ChannelNotifier, Notification, Notifier, NotifyKind, TracingNotifier},
        store::{EntityResource, RemoteSyncStore, SyncPhase},
        transport::{
            Method, NoToken, RemoteRequest, RemoteResponse, RemoteTransport, StaticToken,
            TokenSource,
        },
    };

    // === Query ===
    pub use crate::core::query::{
        PageInfo, QueryResult, QueryState, SortDirection, TableView, Tabular, Totals,
    };

    // === Transports ===
    #[cfg(feature = "http")]
    pub use crate::transport::HttpTransport;
    pub use crate::transport::InMemoryRemote;

    // === Export ===
    pub use crate::export::{
        DocumentRenderer, StatementDocument, StatementLine, records_to_csv, statement_to_csv,
    };

    // === Config ===
    pub use crate::config::{ClientConfig, ViewConfig};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
