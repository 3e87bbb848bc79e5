mod client;
mod odata;
mod opensearch;
mod retry;

pub use self::client::CatalogClient;
pub use self::odata::ODataClient;
pub use self::opensearch::OpenSearchClient;
pub use self::retry::{RetryPolicy, Sleep};
