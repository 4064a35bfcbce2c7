pub mod media;
pub mod realtime;
pub mod vision;

// Re-export commonly used types for convenience
pub use realtime::{
    BoxedEventHandler, ClientOptions, ConnectionState, Event, EventHandler, EventType,
    RealtimeClient, RealtimeError, RealtimeResult, ShutdownOutcome, handler_fn,
};

pub use media::{
    FrameSampler, MediaError, ParameterSets, VideoFramer, VideoFramingOptions, WaveFormat,
    concat_wavs, pcm_to_wav, repair,
};

pub use vision::{VisionClient, VisionConfig, VisionError, VisionResponse};
