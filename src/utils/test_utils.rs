#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
use crate::core::app::{App, Endpoint};
#[cfg(test)]
use crate::core::completion::DiagnosticSink;
#[cfg(test)]
use crate::core::config::Credentials;

#[cfg(test)]
pub fn create_test_app() -> App {
    let endpoint = Endpoint {
        base_url: "https://api.test.com/v1".to_string(),
        model: "davinci-instruct-beta".to_string(),
        credentials: Credentials {
            api_key: "test-key".to_string(),
            organization: String::new(),
        },
    };
    App::new(endpoint, "salut")
}

/// Diagnostic sink that records every reported failure.
#[cfg(test)]
#[derive(Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<String>>,
}

#[cfg(test)]
impl CollectingSink {
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl DiagnosticSink for CollectingSink {
    fn report_failure(&self, detail: &str) {
        self.reports.lock().unwrap().push(detail.to_string());
    }
}
