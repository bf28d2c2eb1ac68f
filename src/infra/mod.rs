// Adapters for the outside world: the Discogs API, CSV files and the console

pub mod csv_table;
pub mod event_channel;
pub mod http_client;

pub use event_channel::{ChannelSink, PipelineEvent};
pub use http_client::DiscogsCatalog;
