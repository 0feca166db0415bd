//! Federated search over package and topic documents.
//!
//! Requests are built as typed data ([`dsl`]) by the [`QueryBuilder`] using a
//! configurable [`RankingPolicy`], executed in batches through a
//! [`SearchBackend`], and projected into client records by the
//! [`ResultProjector`].

pub mod dsl;
pub mod gateway;
pub mod params;
pub mod projector;
pub mod query;
pub mod scoring;

pub use gateway::{ElasticsearchBackend, HitSet, RawHit, SearchBackend, search_one};
pub use params::{PageLinks, PageRequest, Pagination, SearchParams};
pub use projector::{QuickSearchResults, ResultProjector, SearchHit, SearchPage};
pub use query::{QueryBuilder, Window};
pub use scoring::RankingPolicy;
