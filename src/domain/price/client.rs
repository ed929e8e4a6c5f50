//! Price history sub-client: the bootstrap snapshot.

use super::convert::convert_rows;
use super::PricePoint;
use crate::client::TicklineClient;
use crate::error::ChartError;
use crate::stream::BootstrapFuture;

/// Sub-client for historical klines.
pub struct PriceHistoryClient<'a> {
    pub(crate) client: &'a TicklineClient,
}

impl<'a> PriceHistoryClient<'a> {
    /// The most recent `limit` klines of the client's pair and interval as
    /// points, oldest first. Unconvertible rows are skipped.
    pub async fn klines(&self, limit: u32) -> Result<Vec<PricePoint>, ChartError> {
        let rows = self
            .client
            .http
            .get_klines(&self.client.pair, self.client.interval, Some(limit))
            .await?;
        Ok(convert_rows(rows))
    }

    /// A detached loader for the stream driver. It owns everything it needs,
    /// so it may outlive the client.
    pub fn bootstrap_loader(&self, limit: u32) -> BootstrapFuture {
        let http = self.client.http.clone();
        let pair = self.client.pair.clone();
        let interval = self.client.interval;
        Box::pin(async move {
            tracing::debug!("Fetching {} {} klines for {}", limit, interval, pair);
            let rows = http.get_klines(&pair, interval, Some(limit)).await?;
            Ok::<_, ChartError>(convert_rows(rows))
        })
    }
}
