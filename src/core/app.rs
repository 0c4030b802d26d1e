//! Application state shared between the event loop and the renderer.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::completion::{CompletionOutcome, RequestParams};
use crate::core::config::Credentials;
use crate::core::greeting::GreetingBanner;
use crate::core::message::Message;
use crate::core::session::ChatSession;

/// Connection settings fixed for the lifetime of the chat loop.
pub struct Endpoint {
    pub base_url: String,
    pub model: String,
    pub credentials: Credentials,
}

pub struct App {
    pub session: ChatSession,
    pub greeting: GreetingBanner,
    pub endpoint: Endpoint,
    pub input: String,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    greeting_interacted: bool,
    next_request_id: u64,
}

impl App {
    pub fn new(endpoint: Endpoint, greeting_text: &str) -> Self {
        Self {
            session: ChatSession::new(),
            greeting: GreetingBanner::new(greeting_text),
            endpoint,
            input: String::new(),
            scroll_offset: 0,
            auto_scroll: true,
            greeting_interacted: false,
            next_request_id: 0,
        }
    }

    /// Whether the greeting banner still occupies the top of the screen.
    pub fn show_greeting(&self) -> bool {
        !self.session.greeting_dismissed()
    }

    /// First keystroke into the input field starts erasing the greeting.
    pub fn note_input_interaction(&mut self) {
        if !self.greeting_interacted && self.show_greeting() {
            self.greeting.trigger_erase();
            self.greeting_interacted = true;
        }
    }

    /// Turn the current input into a pending completion request.
    ///
    /// Dismisses the greeting for good, appends the user's message to the
    /// log, clears the input field, and marks the session busy. Empty input
    /// is submitted as-is. The caller hands the returned params to the
    /// completion service; this method itself never blocks.
    pub fn submit(&mut self) -> RequestParams {
        let text = std::mem::take(&mut self.input);

        self.session.dismiss_greeting();
        self.session.append_message(Message::mine(text.clone()));
        self.session.set_busy(true);

        self.next_request_id += 1;
        RequestParams {
            base_url: self.endpoint.base_url.clone(),
            api_key: self.endpoint.credentials.api_key.clone(),
            organization: self.endpoint.credentials.organization.clone(),
            model: self.endpoint.model.clone(),
            prompt: text,
            request_id: self.next_request_id,
        }
    }

    /// Fold a settled completion back into the session.
    ///
    /// Every outcome clears the busy flag. Only a non-empty response
    /// appends a message; empty results and failures leave the log alone.
    pub fn apply_outcome(&mut self, outcome: CompletionOutcome) {
        if let CompletionOutcome::Response(text) = outcome {
            self.session.append_message(Message::theirs(text));
        }
        self.session.set_busy(false);
    }

    /// Flatten the conversation log into renderable lines, mine on the
    /// right and theirs on the left.
    pub fn build_display_lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();
        for msg in self.session.messages() {
            if msg.is_mine {
                lines.push(
                    Line::from(Span::styled(
                        msg.text.as_str(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ))
                    .right_aligned(),
                );
            } else {
                for content_line in msg.text.lines() {
                    lines.push(Line::from(Span::styled(
                        content_line,
                        Style::default().fg(Color::White),
                    )));
                }
                if msg.text.is_empty() {
                    lines.push(Line::from(""));
                }
            }
            lines.push(Line::from(""));
        }
        lines
    }

    pub fn calculate_max_scroll_offset(&self, available_height: u16) -> u16 {
        let total_lines = self.build_display_lines().len() as u16;
        total_lines.saturating_sub(available_height)
    }

    pub fn scroll_up(&mut self, amount: u16, available_height: u16) {
        self.auto_scroll = false;
        let max_scroll = self.calculate_max_scroll_offset(available_height);
        self.scroll_offset = self.scroll_offset.saturating_sub(amount).min(max_scroll);
    }

    pub fn scroll_down(&mut self, amount: u16, available_height: u16) {
        let max_scroll = self.calculate_max_scroll_offset(available_height);
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max_scroll);
        if self.scroll_offset >= max_scroll {
            self.auto_scroll = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;

    #[test]
    fn submit_appends_mine_and_marks_busy() {
        let mut app = create_test_app();
        app.input = "write a haiku".to_string();

        let params = app.submit();

        assert_eq!(params.prompt, "write a haiku");
        assert_eq!(params.model, "davinci-instruct-beta");
        assert_eq!(app.input, "");
        assert!(app.session.is_busy());
        assert!(!app.show_greeting());

        let messages = app.session.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_mine);
        assert_eq!(messages[0].text, "write a haiku");
    }

    #[test]
    fn submit_accepts_empty_input() {
        let mut app = create_test_app();
        let params = app.submit();
        assert_eq!(params.prompt, "");
        assert_eq!(app.session.messages()[0].text, "");
    }

    #[test]
    fn one_mine_message_per_submit_in_order() {
        let mut app = create_test_app();
        for text in ["one", "two", "three"] {
            app.input = text.to_string();
            app.submit();
        }

        let mine: Vec<&str> = app
            .session
            .messages()
            .iter()
            .filter(|m| m.is_mine)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(mine, vec!["one", "two", "three"]);
    }

    #[test]
    fn response_outcome_appends_theirs_after_mine() {
        let mut app = create_test_app();
        app.input = "hello".to_string();
        app.submit();
        app.apply_outcome(CompletionOutcome::Response("hello world".to_string()));

        let messages = app.session.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_mine);
        assert!(!messages[1].is_mine);
        assert_eq!(messages[1].text, "hello world");
        assert!(!app.session.is_busy());
    }

    #[test]
    fn busy_clears_on_every_outcome() {
        let mut app = create_test_app();
        for outcome in [
            CompletionOutcome::Response("ok".to_string()),
            CompletionOutcome::Empty,
            CompletionOutcome::Failed("API error: down".to_string()),
        ] {
            app.input = "x".to_string();
            app.submit();
            assert!(app.session.is_busy());
            app.apply_outcome(outcome);
            assert!(!app.session.is_busy());
        }
    }

    #[test]
    fn repeated_failures_leave_prior_messages_intact() {
        let mut app = create_test_app();
        for _ in 0..3 {
            app.input = "ping".to_string();
            app.submit();
            app.apply_outcome(CompletionOutcome::Failed("API error: down".to_string()));
        }

        let messages = app.session.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.is_mine && m.text == "ping"));
        assert!(!app.session.is_busy());
    }

    #[test]
    fn zero_choice_response_appends_nothing() {
        let mut app = create_test_app();
        app.input = "hello".to_string();
        app.submit();
        app.apply_outcome(CompletionOutcome::Empty);

        let messages = app.session.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages.back().unwrap().is_mine);
        assert!(!app.session.is_busy());
    }

    #[test]
    fn busy_transitions_through_a_fake_completion_source() {
        use crate::core::completion::CompletionService;
        use crate::utils::test_utils::CollectingSink;
        use std::sync::Arc;

        let (service, mut rx) = CompletionService::new(Arc::new(CollectingSink::default()));
        let mut app = create_test_app();

        app.input = "hello".to_string();
        let params = app.submit();
        assert!(app.session.is_busy());

        service.send_for_test(
            CompletionOutcome::Response("hi there".to_string()),
            params.request_id,
        );
        let (outcome, request_id) = rx.try_recv().expect("outcome pending");
        assert_eq!(request_id, params.request_id);
        app.apply_outcome(outcome);

        assert!(!app.session.is_busy());
        assert_eq!(app.session.messages().back().unwrap().text, "hi there");
    }

    #[test]
    fn overlapping_submits_get_distinct_request_ids() {
        let mut app = create_test_app();
        app.input = "a".to_string();
        let first = app.submit();
        app.input = "b".to_string();
        let second = app.submit();
        assert_ne!(first.request_id, second.request_id);
        assert!(app.session.is_busy());
    }

    #[test]
    fn busy_tracks_most_recently_settled_call() {
        // Two overlapping requests: the first settlement already clears the
        // flag even though the second is still outstanding.
        let mut app = create_test_app();
        app.input = "a".to_string();
        app.submit();
        app.input = "b".to_string();
        app.submit();

        app.apply_outcome(CompletionOutcome::Response("first".to_string()));
        assert!(!app.session.is_busy());

        app.apply_outcome(CompletionOutcome::Response("second".to_string()));
        let theirs: Vec<&str> = app
            .session
            .messages()
            .iter()
            .filter(|m| !m.is_mine)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(theirs, vec!["first", "second"]);
    }

    #[test]
    fn first_interaction_triggers_erase_once() {
        let mut app = create_test_app();
        app.note_input_interaction();
        for _ in 0..5 {
            app.greeting.tick();
        }
        assert_eq!(app.greeting.displayed(), "salut");

        // A second interaction must not restart the pending erase delay:
        // the first removal still fires on the tenth tick overall.
        app.note_input_interaction();
        for _ in 0..5 {
            app.greeting.tick();
        }
        assert_eq!(app.greeting.displayed(), "salu");
    }

    #[test]
    fn display_lines_alternate_alignment() {
        let mut app = create_test_app();
        app.session.append_message(Message::mine("hi"));
        app.session.append_message(Message::theirs("hello\nthere"));

        let lines = app.build_display_lines();
        // mine + spacer + two content lines + spacer
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].alignment, Some(ratatui::layout::Alignment::Right));
        assert_eq!(lines[2].alignment, None);
    }
}
