pub mod config;
pub mod cycle;
pub mod reader;
pub mod sink;
pub mod transport;

pub use config::{Config, CycleConfig, SinkConfig, TransportConfig};
pub use cycle::{CycleError, aggregate, run_cycle};
pub use reader::FrameReader;
pub use sink::RecordSink;
pub use sink::http::HttpSink;
pub use sink::memory::MemorySink;
pub use sink::sqlite::SqliteSink;
pub use transport::mock::MockSource;
pub use transport::serial::SerialSource;
pub use transport::{ByteSource, TransportError};
