mod channels;
mod fetcher;

pub use channels::{Channels, FetcherCommand, FetcherEvent};
pub use fetcher::{Fetcher, FetcherConfig};
