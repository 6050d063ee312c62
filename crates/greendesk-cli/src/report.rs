//! Compliance report: accomplishments from the backend next to the quota
//! targets on file for the same year.

use greendesk_client::resources::{ComplianceReport, QuotaQuery};
use greendesk_client::{ApiClient, ClientError, Notifier};
use greendesk_core::{QuotaRecord, ViewMode};

use crate::display;

/// Fetch the report and the year's quotas concurrently.
pub async fn fetch(
    client: &ApiClient,
    year: i32,
    view: ViewMode,
) -> Result<(ComplianceReport, Vec<QuotaRecord>), ClientError> {
    let query = QuotaQuery::for_year(year);
    futures::try_join!(client.compliance_report(year, view), client.list_quotas(&query))
}

pub async fn run(
    client: &ApiClient,
    notifier: &Notifier,
    year: i32,
    view: ViewMode,
) -> anyhow::Result<()> {
    let (report, quotas) = fetch(client, year, view).await.inspect_err(|e| {
        notifier.error(format!("Could not build report: {e}"));
    })?;
    display::print_report(&report, &quotas);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use greendesk_client::ClientConfig;
    use greendesk_core::Law;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ApiClient {
        ApiClient::new(ClientConfig::new(server.uri()).with_timeout_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_joins_report_and_quotas() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/reports/compliance"))
            .and(query_param("year", "2025"))
            .and(query_param("viewMode", "quarterly"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "year": 2025,
                "viewMode": "quarterly",
                "rows": [{"law": "RA-9275", "period": 1, "target": 6, "accomplished": 2}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/quotas"))
            .and(query_param("year", "2025"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 4, "law": "RA-9275", "year": 2025, "month": 2, "target": 6}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (report, quotas) = fetch(&test_client(&server), 2025, ViewMode::Quarterly)
            .await
            .unwrap();
        assert_eq!(report.totals_by_law()[&Law::Ra9275], (6, 2));
        assert_eq!(quotas.len(), 1);
        assert_eq!(quotas[0].id, 4);
    }

    #[tokio::test]
    async fn fetch_fails_when_quotas_fail() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/reports/compliance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "year": 2025,
                "viewMode": "monthly",
                "rows": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/quotas"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = fetch(&test_client(&server), 2025, ViewMode::Monthly)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
