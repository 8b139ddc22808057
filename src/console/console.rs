//! The entry console.
//!
//! Owns the session and the ledger, classifies every submitted scan, and
//! dispatches it to the matching backend operation. All methods are
//! synchronous and run on the core worker thread; serialization of rapid
//! scans comes from that thread's message queue.

use chrono::Local;

use crate::api::{ApiError, ApiResult, Attachment, Backend, LineItem, NewEntry, ScaleReading};
use crate::console::ledger::Ledger;
use crate::console::scan::{self, ScanCode};
use crate::console::session::{Session, DEFAULT_QUANTITY};

/// Outcome of one submitted scan, consumed by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Handled; the entry field should be cleared.
    Accepted,
    /// Not actionable; the input is left as typed (diagnostic log only).
    Ignored,
    /// Failed; flash the entry field, and show the message when one exists.
    Error(Option<String>),
}

pub struct Console<B: Backend> {
    backend: B,
    pub session: Session,
    pub ledger: Ledger,
}

impl<B: Backend> Console<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: Session::new(),
            ledger: Ledger::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Dispatch one submitted scan. Only the leading marker character of the
    /// trimmed input selects the behavior.
    pub fn submit(&mut self, text: &str) -> Feedback {
        match scan::classify(text) {
            ScanCode::Provider(code) => self.scan_provider(&code),
            ScanCode::Product(code) => self.scan_product(&code),
            ScanCode::Multiplier(raw) => self.scan_multiplier(&raw),
            ScanCode::Comment(comment) => self.scan_comment(&comment),
            ScanCode::Unrecognized => {
                log::debug!("[console] unrecognized scan: {text:?}");
                Feedback::Ignored
            }
        }
    }

    fn scan_provider(&mut self, code: &str) -> Feedback {
        match self.backend.entity(code) {
            Ok(entity) => {
                log::info!("[console] provider {code} -> {}", entity.name);
                self.session.last_provider = Some(entity.name);
                Feedback::Accepted
            }
            Err(err) => self.submission_error("provider lookup", err),
        }
    }

    fn scan_product(&mut self, code: &str) -> Feedback {
        let entity = match self.backend.entity(code) {
            Ok(entity) => entity,
            Err(err) => return self.submission_error("product lookup", err),
        };

        let provider = match &self.session.last_provider {
            Some(provider) => provider.clone(),
            None => {
                // Operator error: product scanned before any provider.
                // Swallow the scan without touching the ledger.
                log::info!("[console] product {code} scanned with no provider; dropped");
                return Feedback::Accepted;
            }
        };

        let entry = NewEntry {
            provider: provider.clone(),
            product: entity.name.clone(),
            category: entity.category.clone(),
            quantity: DEFAULT_QUANTITY,
            weight: self.session.last_weight,
        };

        match self.backend.create_entry(&entry) {
            Ok(created) => {
                // The backend's id and weight are authoritative.
                self.ledger.insert_front(LineItem {
                    id: created.id,
                    provider,
                    product: entity.name,
                    category: entity.category,
                    quantity: DEFAULT_QUANTITY,
                    weight: created.weight,
                    comment: String::new(),
                    timestamp: None,
                });
                self.session.last_element_id = Some(created.id);
                log::info!(
                    "[console] entry {} created ({:.2} kg)",
                    created.id,
                    created.weight
                );
                Feedback::Accepted
            }
            Err(err) => self.submission_error("entry creation", err),
        }
    }

    fn scan_multiplier(&mut self, raw: &str) -> Feedback {
        let quantity: i64 = match raw.parse() {
            Ok(quantity) => quantity,
            Err(_) => {
                log::warn!("[console] non-numeric multiplier payload: {raw:?}");
                return Feedback::Error(None);
            }
        };

        let id = match self.session.last_element_id {
            Some(id) => id,
            None => {
                log::warn!("[console] multiplier with no focused item");
                return Feedback::Error(None);
            }
        };

        match self.backend.update_quantity(id, quantity) {
            Ok(()) => {
                self.ledger.set_quantity(id, quantity);
                Feedback::Accepted
            }
            Err(err) => self.submission_error("quantity update", err),
        }
    }

    fn scan_comment(&mut self, comment: &str) -> Feedback {
        let id = match self.session.last_element_id {
            Some(id) => id,
            None => {
                log::warn!("[console] comment with no focused item");
                return Feedback::Error(None);
            }
        };

        match self.backend.update_comment(id, comment) {
            Ok(()) => {
                self.ledger.set_comment(id, comment);
                Feedback::Accepted
            }
            Err(err) => self.submission_error("comment update", err),
        }
    }

    fn submission_error(&self, what: &str, err: ApiError) -> Feedback {
        match err {
            ApiError::NotFound => {
                log::warn!("[console] {what} failed: not found");
                Feedback::Error(None)
            }
            ApiError::Rejected(message) => {
                log::warn!("[console] {what} rejected: {message}");
                Feedback::Error(Some(message))
            }
            ApiError::Transport(message) => {
                log::warn!("[console] {what} failed: {message}");
                Feedback::Error(None)
            }
        }
    }

    /// Read the scale. Polling failures are logged and dropped; the previous
    /// weight stays in effect for the next created entry.
    pub fn poll_scale(&mut self) -> Option<ScaleReading> {
        match self.backend.scale() {
            Ok(reading) => {
                self.session.last_weight = reading.value;
                Some(reading)
            }
            Err(err) => {
                log::debug!("[console] scale poll failed: {err}");
                None
            }
        }
    }

    /// Replace the ledger with the backend's current list, honoring the date
    /// filter. Each received row is inserted at the front; the focused item
    /// ends up being the last received one.
    pub fn refresh(&mut self) -> ApiResult<usize> {
        self.clear_table();
        let items = self.backend.entries(self.session.filter_date)?;
        let count = items.len();
        for item in items {
            self.session.last_element_id = Some(item.id);
            self.ledger.insert_front(item);
        }
        log::info!("[console] fetched {count} entries");
        Ok(count)
    }

    /// Drop all rows and reset the session counters. The scale weight and
    /// the date filter survive.
    pub fn clear_table(&mut self) {
        self.ledger.clear();
        self.session.reset_counters();
    }

    /// Backend delete first; the row leaves the ledger only after the call
    /// resolves. A failed delete leaves the row in place.
    pub fn delete_item(&mut self, id: u64) -> ApiResult<()> {
        self.backend.delete_entry(id)?;
        self.ledger.remove(id);
        if self.session.last_element_id == Some(id) {
            self.session.last_element_id = None;
        }
        Ok(())
    }

    /// Restrict the view to today's entries and refetch.
    pub fn show_today_only(&mut self) -> ApiResult<usize> {
        self.session.filter_date = Some(Local::now().date_naive());
        self.refresh()
    }

    /// Switch between today-only and full history, refetching either way.
    pub fn toggle_history_filter(&mut self) -> ApiResult<usize> {
        self.session.filter_date = match self.session.filter_date {
            Some(_) => None,
            None => Some(Local::now().date_naive()),
        };
        self.refresh()
    }

    /// Download the spreadsheet export.
    pub fn export(&self) -> ApiResult<Attachment> {
        self.backend.download()
    }

    /// Startup reachability probe. Failure is reported, not fatal.
    pub fn ping(&self) -> bool {
        match self.backend.ping() {
            Ok(()) => true,
            Err(err) => {
                log::warn!("[console] backend ping failed: {err}");
                false
            }
        }
    }

    /// Signal session teardown to the backend. Best-effort.
    pub fn shutdown(&self) {
        if let Err(err) = self.backend.quit() {
            log::warn!("[console] quit signal failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use crate::api::{CreatedEntry, Entity};

    /// Recording backend: every network-bound call is appended to `calls`.
    #[derive(Default)]
    struct MockBackend {
        calls: RefCell<Vec<String>>,
        entities: HashMap<String, Entity>,
        created: Option<CreatedEntry>,
        reject_create: Option<String>,
        fail_updates: bool,
        scale_value: Option<f64>,
    }

    impl MockBackend {
        fn with_entity(mut self, code: &str, name: &str, category: &str) -> Self {
            self.entities.insert(
                code.to_string(),
                Entity {
                    name: name.to_string(),
                    category: category.to_string(),
                },
            );
            self
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Backend for MockBackend {
        fn ping(&self) -> ApiResult<()> {
            self.record("ping");
            Ok(())
        }

        fn scale(&self) -> ApiResult<ScaleReading> {
            self.record("scale");
            match self.scale_value {
                Some(value) => Ok(ScaleReading {
                    value,
                    stable: true,
                }),
                None => Err(ApiError::Transport("scale offline".to_string())),
            }
        }

        fn entity(&self, code: &str) -> ApiResult<Entity> {
            self.record(format!("entity/{code}"));
            self.entities.get(code).cloned().ok_or(ApiError::NotFound)
        }

        fn create_entry(&self, entry: &NewEntry) -> ApiResult<CreatedEntry> {
            self.record(format!(
                "create {}/{}/{}/{}/{}",
                entry.provider, entry.product, entry.category, entry.quantity, entry.weight
            ));
            if let Some(message) = &self.reject_create {
                return Err(ApiError::Rejected(message.clone()));
            }
            Ok(self.created.unwrap_or(CreatedEntry { id: 1, weight: entry.weight }))
        }

        fn entries(&self, _date: Option<chrono::NaiveDate>) -> ApiResult<Vec<LineItem>> {
            self.record("entries");
            Ok(Vec::new())
        }

        fn update_quantity(&self, id: u64, quantity: i64) -> ApiResult<()> {
            self.record(format!("quantity {id}={quantity}"));
            if self.fail_updates {
                Err(ApiError::Rejected("update refused".to_string()))
            } else {
                Ok(())
            }
        }

        fn update_comment(&self, id: u64, comment: &str) -> ApiResult<()> {
            self.record(format!("comment {id}={comment}"));
            if self.fail_updates {
                Err(ApiError::Rejected("update refused".to_string()))
            } else {
                Ok(())
            }
        }

        fn delete_entry(&self, id: u64) -> ApiResult<()> {
            self.record(format!("delete {id}"));
            Ok(())
        }

        fn download(&self) -> ApiResult<Attachment> {
            self.record("download");
            Ok(Attachment {
                filename: "data.xlsx".to_string(),
                bytes: vec![1, 2, 3],
            })
        }

        fn quit(&self) -> ApiResult<()> {
            self.record("quit");
            Ok(())
        }
    }

    #[test]
    fn test_provider_scan_updates_session() {
        let backend = MockBackend::default().with_entity("1234", "Acme", "");
        let mut console = Console::new(backend);

        assert_eq!(console.submit("F1234"), Feedback::Accepted);
        assert_eq!(console.session.last_provider.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_provider_lookup_failure_leaves_session_untouched() {
        let mut console = Console::new(MockBackend::default());

        assert_eq!(console.submit("F9999"), Feedback::Error(None));
        assert_eq!(console.session.last_provider, None);
        assert_eq!(console.session.last_element_id, None);
    }

    #[test]
    fn test_product_before_provider_creates_nothing() {
        let backend = MockBackend::default().with_entity("5678", "Bread", "Bakery");
        let mut console = Console::new(backend);

        assert_eq!(console.submit("P5678"), Feedback::Accepted);
        assert!(console.ledger.is_empty());
        assert!(console
            .calls()
            .iter()
            .all(|call| !call.starts_with("create")));
    }

    #[test]
    fn test_full_scan_sequence_creates_one_entry() {
        let backend = MockBackend {
            created: Some(CreatedEntry { id: 7, weight: 250.0 }),
            scale_value: Some(250.0),
            ..MockBackend::default()
        }
        .with_entity("1234", "Acme", "")
        .with_entity("5678", "Bread", "Bakery");
        let mut console = Console::new(backend);

        console.poll_scale();
        assert_eq!(console.submit("F1234"), Feedback::Accepted);
        assert_eq!(console.submit("P5678"), Feedback::Accepted);

        let creates: Vec<String> = console
            .calls()
            .into_iter()
            .filter(|call| call.starts_with("create"))
            .collect();
        assert_eq!(creates, vec!["create Acme/Bread/Bakery/1/250".to_string()]);

        assert_eq!(console.ledger.len(), 1);
        let item = console.ledger.items().next().expect("one row");
        assert_eq!(item.id, 7);
        assert_eq!(item.provider, "Acme");
        assert_eq!(item.product, "Bread");
        assert_eq!(item.weight, 250.0);
        assert_eq!(console.session.last_element_id, Some(7));
    }

    #[test]
    fn test_rejected_create_surfaces_backend_message() {
        let backend = MockBackend {
            reject_create: Some("Poids trop faible".to_string()),
            ..MockBackend::default()
        }
        .with_entity("5678", "Composte", "Compost");
        let mut console = Console::new(backend);
        console.session.last_provider = Some("Acme".to_string());

        assert_eq!(
            console.submit("P5678"),
            Feedback::Error(Some("Poids trop faible".to_string()))
        );
        assert!(console.ledger.is_empty());
    }

    #[test]
    fn test_non_numeric_multiplier_is_local() {
        let mut console = Console::new(MockBackend::default());
        console.session.last_element_id = Some(3);

        assert_eq!(console.submit("X12a"), Feedback::Error(None));
        assert_eq!(console.submit("X"), Feedback::Error(None));
        assert!(console.calls().is_empty());
    }

    #[test]
    fn test_multiplier_updates_focused_item() {
        let backend = MockBackend {
            created: Some(CreatedEntry { id: 3, weight: 1.0 }),
            ..MockBackend::default()
        }
        .with_entity("1", "Acme", "")
        .with_entity("2", "Milk", "Dairy");
        let mut console = Console::new(backend);
        console.submit("F1");
        console.submit("P2");

        assert_eq!(console.submit("* 12"), Feedback::Accepted);
        assert!(console.calls().contains(&"quantity 3=12".to_string()));
        assert_eq!(console.ledger.get(3).map(|item| item.quantity), Some(12));
    }

    #[test]
    fn test_multiplier_without_focused_item_is_local() {
        let mut console = Console::new(MockBackend::default());

        assert_eq!(console.submit("X2"), Feedback::Error(None));
        assert!(console.calls().is_empty());
    }

    #[test]
    fn test_comment_updates_focused_item() {
        let mut console = Console::new(MockBackend::default());
        console.session.last_element_id = Some(5);
        console.ledger.insert_front(LineItem {
            id: 5,
            provider: "Acme".to_string(),
            product: "Bread".to_string(),
            category: String::new(),
            quantity: 1,
            weight: 1.0,
            comment: String::new(),
            timestamp: None,
        });

        assert_eq!(console.submit("#demi caisse"), Feedback::Accepted);
        assert_eq!(
            console.ledger.get(5).map(|item| item.comment.clone()),
            Some("demi caisse".to_string())
        );
    }

    #[test]
    fn test_unknown_marker_is_ignored_without_network() {
        let mut console = Console::new(MockBackend::default());

        assert_eq!(console.submit("Q1234"), Feedback::Ignored);
        assert_eq!(console.submit(""), Feedback::Ignored);
        assert!(console.calls().is_empty());
    }

    #[test]
    fn test_scale_failure_keeps_previous_weight() {
        let mut console = Console::new(MockBackend::default());
        console.session.last_weight = 4.2;

        assert!(console.poll_scale().is_none());
        assert_eq!(console.session.last_weight, 4.2);
    }

    #[test]
    fn test_delete_clears_focus_on_focused_item() {
        let mut console = Console::new(MockBackend::default());
        console.session.last_element_id = Some(9);
        console.ledger.insert_front(LineItem {
            id: 9,
            provider: "Acme".to_string(),
            product: "Bread".to_string(),
            category: String::new(),
            quantity: 1,
            weight: 1.0,
            comment: String::new(),
            timestamp: None,
        });

        console.delete_item(9).expect("delete succeeds");
        assert!(console.ledger.is_empty());
        assert_eq!(console.session.last_element_id, None);
    }

    impl Console<MockBackend> {
        fn calls(&self) -> Vec<String> {
            self.backend.calls()
        }
    }
}
