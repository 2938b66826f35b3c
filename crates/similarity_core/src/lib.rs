pub mod controller;
pub mod error;
pub mod media;
pub mod model;
pub mod source;
pub mod workbench;

pub use controller::{
    EntryStream, SimilarityStreamController, StreamConfig, StreamHandle, DEFAULT_MAX_DURATION,
    DEFAULT_TICK_INTERVAL,
};
pub use error::{StreamError, StreamResult};
pub use media::probe_video;
pub use model::{base_similarity, clamp_similarity, SimilarityBand, Verdict};
pub use source::{SimilaritySource, SyntheticSource};
pub use workbench::ComparisonWorkbench;
