pub mod core;
pub mod time;
pub mod analysis;
pub mod search;
pub mod sort;
pub mod compression;
pub mod storage;
pub mod transport;
pub mod progress;

pub use crate::core::config::Config;
pub use crate::core::database::{Database, StoreOptions, SyncReport};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::session::CatalogSession;
pub use crate::core::types::{Artifact, SearchField, StringField, TimeField};

/*
┌──────────────────────────────────────────────────────────────────────────────────────┐
│                            MHS COLLECTIONS ARCHITECTURE                              │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── CORE LAYER ──────────────────────────────────────┐
│                                                                                      │
│  ┌────────────────────────────────────────────────────────────────────────────┐     │
│  │                          struct CatalogSession                             │     │
│  │  config: Config                  // Paths, editor, archive limit, codec    │     │
│  │  transport: Arc<dyn Transport>   // Where the store is published           │     │
│  │  database: Arc<Database>         // Shared with background load/sync       │     │
│  └────────────────────────────────────────────────────────────────────────────┘     │
│                                                                                      │
│  ┌────────────────────────────────────────────────────────────────────────────┐     │
│  │                             struct Database                                │     │
│  │  state: RwLock<StoreImage>       // records + timestamp + last_editor      │     │
│  │                                  // swapped whole on reload                │     │
│  └────────────────────────────────────────────────────────────────────────────┘     │
│                                                                                      │
│  ┌──────────────────────┐  ┌───────────────────────┐  ┌─────────────────────────┐   │
│  │ struct Artifact      │  │ struct TimeSpec       │  │ enum ArtifactMedia      │   │
│  │ • accession_number   │  │ • value: Instant |    │  │ • Images(Vec<String>)   │   │
│  │ • title, donor, ...  │  │   Frame{start, end}   │  │ • Bundle(V3DBundle)     │   │
│  │ • object_date        │  │ • format              │  └─────────────────────────┘   │
│  │ • submission_date    │  │ • forced_value        │                                │
│  │ • media              │  │ • syntax_string       │                                │
│  │ • field_values       │  └───────────────────────┘                                │
│  └──────────────────────┘                                                           │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────── SEARCH / SORT LAYER ────────────────────────────────┐
│                                                                                      │
│  trait Crawler ─┬─ StringCrawler   // analyzer terms, overlapping substring counts   │
│                 └─ TimeCrawler     // containment, endpoint mismatches               │
│                                                                                      │
│  rank(records, crawler)            // rayon scoring, score desc, accession asc       │
│  ArtifactSorter { field, direction }                                                 │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────── STORAGE LAYER ─────────────────────────────────────┐
│                                                                                      │
│  sync:  stamp ─► bincode ─► container (MAGIC | header | zstd) ─► temp upload         │
│               ─► rename over database.store ─► <millis>_database.store archive       │
│                                                                                      │
│  load:  download ─► container check (*.database, crc32) ─► bincode ─► sort by key    │
│                                                                                      │
│  trait Transport ─┬─ FileTransport                                                   │
│                   └─ MemoryTransport                                                 │
│  Progress ─ copy_monitored(chunk, cancel check per chunk)                            │
└──────────────────────────────────────────────────────────────────────────────────────┘
*/
