//! Core module containing the record model, wire codec, sync store and query engine

pub mod codec;
pub mod error;
pub mod field;
pub mod normalize;
pub mod notify;
pub mod query;
pub mod record;
pub mod store;
pub mod transport;

pub use error::{SyncError, SyncResult, TransportError};
pub use field::FieldValue;
pub use normalize::{RecordPatch, WireRecord, denormalize, denormalize_patch, normalize};
pub use notify::{ChannelNotifier, Notification, Notifier, NotifyKind, TracingNotifier};
pub use query::{PageInfo, QueryResult, QueryState, SortDirection, TableView, Tabular, Totals};
pub use record::{LedgerEntry, ProductsSupplied, Record, RecordId, RecordState};
pub use store::{EntityResource, RemoteSyncStore, SyncPhase};
pub use transport::{
    Method, NoToken, RemoteRequest, RemoteResponse, RemoteTransport, StaticToken, TokenSource,
};
