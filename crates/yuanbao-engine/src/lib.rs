pub mod api;
pub mod dispatcher;
pub mod fetcher;
pub mod host;
mod http;

pub use api::{ImageLookup, ImageRequestClient};
pub use dispatcher::{DrawPlugin, DrawReport, FAILURE_NOTICE};
pub use fetcher::{ImageAsset, ImageDownload, ImageFetcher};
pub use host::ChatHost;
pub use http::{API_ACCEPT, BROWSER_USER_AGENT, IMAGE_ACCEPT};
