//! Backend API clients

pub mod client;
pub mod config;
pub mod logs;
pub mod queue;
pub mod results;
pub mod sse;
pub mod suts;

use futures::stream::BoxStream;

use crate::errors::DashboardError;

/// A response body delivered in chunks
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, DashboardError>>;

pub(crate) fn body_stream(response: reqwest::Response) -> ByteStream {
    use futures::StreamExt;

    response
        .bytes_stream()
        .map(|chunk| chunk.map(|b| b.to_vec()).map_err(DashboardError::from))
        .boxed()
}
