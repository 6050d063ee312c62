//! Sequenced loading of quota availability for the quota form.

use std::future::Future;

use greendesk_core::{Availability, YearMonth};
use tracing::warn;

use crate::resources::QuotaQuery;
use crate::{ApiClient, ClientError, Fetched, RequestSequence};

/// Fetches a year's quota records and turns them into an [`Availability`]
/// snapshot. Loads share one [`RequestSequence`], so when the year changes
/// while a fetch is in flight only the newest load is reported as current.
#[derive(Debug, Clone)]
pub struct QuotaLoader {
    client: ApiClient,
    seq: RequestSequence,
}

impl QuotaLoader {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            seq: RequestSequence::new(),
        }
    }

    /// Start loading `year`. Superseded loads resolve to `Ok(Fetched::Stale)`,
    /// including ones whose request failed.
    pub fn load(
        &self,
        year: i32,
        today: YearMonth,
    ) -> impl Future<Output = Result<Fetched<Availability>, ClientError>> {
        let client = self.client.clone();
        let guarded = self
            .seq
            .run(async move { client.list_quotas(&QuotaQuery::for_year(year)).await });
        async move {
            match guarded.await {
                Fetched::Current(Ok(records)) => Ok(Fetched::Current(Availability::from_records(
                    year, today, &records,
                ))),
                Fetched::Current(Err(e)) => {
                    warn!(year, error = %e, "quota records failed to load");
                    Err(e)
                }
                Fetched::Stale => Ok(Fetched::Stale),
            }
        }
    }
}
