//! Asynchronous completion request pipeline.
//!
//! Each submitted prompt becomes exactly one request task. The task owns
//! every transport resource it needs (including its HTTP client, which is
//! built per call and dropped when the task ends, on success and failure
//! alike) and marshals its outcome back to the UI loop over a single mpsc
//! channel. Failures are reported to the [`DiagnosticSink`] and otherwise
//! absorbed; the interface only ever observes the busy flag clearing.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{format_api_error, CompletionRequest, CompletionResponse};
use crate::utils::url::construct_api_url;

/// Receiver for completion failures.
///
/// Nothing about a failed call is shown in the chat transcript, so this is
/// the only place errors surface. Injectable so tests can assert on what
/// got reported without coupling to a logging backend.
pub trait DiagnosticSink: Send + Sync {
    fn report_failure(&self, detail: &str);
}

/// Production sink: forwards failures to `tracing`.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report_failure(&self, detail: &str) {
        tracing::error!(target: "causerie::completion", "{detail}");
    }
}

/// Terminal result of one completion call.
#[derive(Clone, Debug)]
pub enum CompletionOutcome {
    /// At least one choice came back; carries the trimmed choice text.
    Response(String),
    /// The call succeeded but returned zero choices. No message is
    /// appended for this case.
    Empty,
    /// Transport or protocol failure, already formatted for diagnostics.
    Failed(String),
}

/// Everything a single request task needs, captured at submit time.
pub struct RequestParams {
    pub base_url: String,
    pub api_key: String,
    pub organization: String,
    pub model: String,
    pub prompt: String,
    pub request_id: u64,
}

/// Spawns request tasks and funnels their outcomes to one receiver.
#[derive(Clone)]
pub struct CompletionService {
    tx: mpsc::UnboundedSender<(CompletionOutcome, u64)>,
    sink: Arc<dyn DiagnosticSink>,
}

impl CompletionService {
    pub fn new(
        sink: Arc<dyn DiagnosticSink>,
    ) -> (Self, mpsc::UnboundedReceiver<(CompletionOutcome, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, sink }, rx)
    }

    /// Fire off one completion request. Returns immediately; the outcome
    /// arrives on the receiver paired with this service.
    ///
    /// There is no guard against overlapping requests and no cancellation:
    /// submitting again while a request is outstanding runs both to
    /// settlement, and their outcomes arrive in settlement order.
    pub fn spawn_request(&self, params: RequestParams) {
        let tx = self.tx.clone();
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let request_id = params.request_id;
            let outcome = perform_request(params).await;
            settle(outcome, sink.as_ref(), &tx, request_id);
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, outcome: CompletionOutcome, request_id: u64) {
        let _ = self.tx.send((outcome, request_id));
    }
}

fn settle(
    outcome: CompletionOutcome,
    sink: &dyn DiagnosticSink,
    tx: &mpsc::UnboundedSender<(CompletionOutcome, u64)>,
    request_id: u64,
) {
    if let CompletionOutcome::Failed(detail) = &outcome {
        sink.report_failure(detail);
    }
    let _ = tx.send((outcome, request_id));
}

async fn perform_request(params: RequestParams) -> CompletionOutcome {
    // The client lives only for this call; dropping it at the end of the
    // task releases its connection pool on every exit path.
    let client = match reqwest::Client::builder().build() {
        Ok(client) => client,
        Err(e) => return CompletionOutcome::Failed(format_api_error(&e.to_string())),
    };

    let request = CompletionRequest {
        model: params.model,
        prompt: vec![params.prompt],
    };

    let url = construct_api_url(&params.base_url, "completions");
    let mut http_request = client
        .post(url)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", params.api_key));
    if !params.organization.is_empty() {
        http_request = http_request.header("OpenAI-Organization", &params.organization);
    }

    match http_request.json(&request).send().await {
        Ok(response) => {
            if !response.status().is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<no body>".to_string());
                return CompletionOutcome::Failed(format_api_error(&error_text));
            }

            match response.json::<CompletionResponse>().await {
                Ok(completion) => settle_response(completion),
                Err(e) => CompletionOutcome::Failed(format_api_error(&e.to_string())),
            }
        }
        Err(e) => CompletionOutcome::Failed(format_api_error(&e.to_string())),
    }
}

/// Map a successful response body to its outcome.
///
/// Only the first choice is consumed; its text is trimmed of leading and
/// trailing whitespace and newlines. Zero choices settle as [`CompletionOutcome::Empty`].
fn settle_response(response: CompletionResponse) -> CompletionOutcome {
    match response.choices.first() {
        Some(choice) => CompletionOutcome::Response(choice.text.trim().to_string()),
        None => CompletionOutcome::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CompletionChoice;
    use crate::utils::test_utils::CollectingSink;

    #[test]
    fn settle_response_trims_first_choice() {
        let response = CompletionResponse {
            choices: vec![CompletionChoice {
                text: "  hello world\n".to_string(),
            }],
        };
        match settle_response(response) {
            CompletionOutcome::Response(text) => assert_eq!(text, "hello world"),
            other => panic!("expected response outcome, got {:?}", other),
        }
    }

    #[test]
    fn settle_response_preserves_interior_whitespace() {
        let response = CompletionResponse {
            choices: vec![CompletionChoice {
                text: "\n\nline one\n  line two  \n".to_string(),
            }],
        };
        match settle_response(response) {
            CompletionOutcome::Response(text) => assert_eq!(text, "line one\n  line two"),
            other => panic!("expected response outcome, got {:?}", other),
        }
    }

    #[test]
    fn settle_response_maps_zero_choices_to_empty() {
        let response = CompletionResponse { choices: vec![] };
        assert!(matches!(settle_response(response), CompletionOutcome::Empty));
    }

    #[test]
    fn settle_reports_failures_to_the_sink() {
        let sink = CollectingSink::default();
        let (tx, mut rx) = mpsc::unbounded_channel();

        settle(
            CompletionOutcome::Failed("API error: boom".to_string()),
            &sink,
            &tx,
            7,
        );

        assert_eq!(sink.reports(), vec!["API error: boom".to_string()]);
        let (outcome, request_id) = rx.try_recv().expect("expected settled outcome");
        assert_eq!(request_id, 7);
        assert!(matches!(outcome, CompletionOutcome::Failed(_)));
    }

    #[test]
    fn settle_does_not_report_success_or_empty() {
        let sink = CollectingSink::default();
        let (tx, mut rx) = mpsc::unbounded_channel();

        settle(CompletionOutcome::Response("ok".to_string()), &sink, &tx, 1);
        settle(CompletionOutcome::Empty, &sink, &tx, 2);

        assert!(sink.reports().is_empty());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn outcomes_drain_in_settlement_order() {
        let (service, mut rx) = CompletionService::new(Arc::new(CollectingSink::default()));

        // Request 2 settles before request 1; the receiver sees them in
        // settlement order, not submission order.
        service.send_for_test(CompletionOutcome::Response("late submit".to_string()), 2);
        service.send_for_test(CompletionOutcome::Response("early submit".to_string()), 1);

        let (_, first_id) = rx.try_recv().unwrap();
        let (_, second_id) = rx.try_recv().unwrap();
        assert_eq!((first_id, second_id), (2, 1));
    }

    #[tokio::test]
    async fn unreachable_endpoint_settles_as_failure() {
        let sink = Arc::new(CollectingSink::default());
        let (service, mut rx) = CompletionService::new(sink.clone());

        service.spawn_request(RequestParams {
            // Connection refused immediately; no network involved.
            base_url: "http://127.0.0.1:1/v1".to_string(),
            api_key: String::new(),
            organization: String::new(),
            model: "davinci-instruct-beta".to_string(),
            prompt: "hello".to_string(),
            request_id: 42,
        });

        let (outcome, request_id) = rx.recv().await.expect("request task settles");
        assert_eq!(request_id, 42);
        assert!(matches!(outcome, CompletionOutcome::Failed(_)));
        assert_eq!(sink.reports().len(), 1);
    }
}
