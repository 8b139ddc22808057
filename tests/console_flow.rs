//! End-to-end dispatch tests for the entry console, driven against a
//! recording mock backend.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::NaiveDate;

use collecte::api::{
    ApiError, ApiResult, Attachment, Backend, CreatedEntry, Entity, LineItem, NewEntry,
    ScaleReading,
};
use collecte::console::{Console, Feedback};

/// Recording backend: every network-bound call is appended to `calls`.
#[derive(Default)]
struct RecordingBackend {
    calls: RefCell<Vec<String>>,
    entities: HashMap<String, Entity>,
    scale_value: Cell<f64>,
    next_id: Cell<u64>,
    stored: RefCell<Vec<LineItem>>,
    fail_delete: Cell<bool>,
}

impl RecordingBackend {
    fn new() -> Self {
        let backend = Self::default();
        backend.next_id.set(1);
        backend
    }

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

    fn store(&self, item: LineItem) {
        self.stored.borrow_mut().push(item);
    }
}

fn line_item(id: u64, product: &str) -> LineItem {
    LineItem {
        id,
        provider: "Acme".to_string(),
        product: product.to_string(),
        category: String::new(),
        quantity: 1,
        weight: 1.0,
        comment: String::new(),
        timestamp: None,
    }
}

impl Backend for RecordingBackend {
    fn ping(&self) -> ApiResult<()> {
        self.record("ping");
        Ok(())
    }

    fn scale(&self) -> ApiResult<ScaleReading> {
        self.record("scale");
        Ok(ScaleReading {
            value: self.scale_value.get(),
            stable: true,
        })
    }

    fn entity(&self, code: &str) -> ApiResult<Entity> {
        self.record(format!("GET entity/{code}"));
        self.entities.get(code).cloned().ok_or(ApiError::NotFound)
    }

    fn create_entry(&self, entry: &NewEntry) -> ApiResult<CreatedEntry> {
        self.record(format!(
            "POST input {}/{}/{}/{}/{}",
            entry.provider, entry.product, entry.category, entry.quantity, entry.weight
        ));
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Ok(CreatedEntry {
            id,
            weight: entry.weight,
        })
    }

    fn entries(&self, date: Option<NaiveDate>) -> ApiResult<Vec<LineItem>> {
        match date {
            Some(date) => self.record(format!("GET input/{date}")),
            None => self.record("GET input"),
        }
        Ok(self.stored.borrow().clone())
    }

    fn update_quantity(&self, id: u64, quantity: i64) -> ApiResult<()> {
        self.record(format!("PUT input/{id} quantity={quantity}"));
        Ok(())
    }

    fn update_comment(&self, id: u64, comment: &str) -> ApiResult<()> {
        self.record(format!("PUT input/{id} comment={comment}"));
        Ok(())
    }

    fn delete_entry(&self, id: u64) -> ApiResult<()> {
        self.record(format!("DELETE input/{id}"));
        if self.fail_delete.get() {
            Err(ApiError::Transport("connection reset".to_string()))
        } else {
            Ok(())
        }
    }

    fn download(&self) -> ApiResult<Attachment> {
        self.record("GET download");
        Ok(Attachment {
            filename: "data_export.xlsx".to_string(),
            bytes: b"spreadsheet".to_vec(),
        })
    }

    fn quit(&self) -> ApiResult<()> {
        self.record("GET quit");
        Ok(())
    }
}

#[test]
fn unknown_markers_issue_no_request() {
    let mut console = Console::new(RecordingBackend::new());

    for input in ["Q1234", "1234", "", "   ", "f1234", "p5678"] {
        console.submit(input);
    }

    assert!(console.backend().calls().is_empty());
}

#[test]
fn product_scan_without_provider_never_creates() {
    let backend = RecordingBackend::new().with_entity("5678", "Bread", "Bakery");
    let mut console = Console::new(backend);

    assert_eq!(console.submit("P5678"), Feedback::Accepted);

    let calls = console.backend().calls();
    assert_eq!(calls, vec!["GET entity/5678".to_string()]);
    assert!(console.ledger.is_empty());
}

#[test]
fn malformed_multiplier_issues_no_request_and_flags_error() {
    let mut console = Console::new(RecordingBackend::new());
    console.session.last_element_id = Some(1);

    assert_eq!(console.submit("X12a"), Feedback::Error(None));
    assert!(console.backend().calls().is_empty());
}

#[test]
fn provider_then_product_creates_exactly_one_row() {
    let backend = RecordingBackend::new()
        .with_entity("1234", "Acme", "")
        .with_entity("5678", "Bread", "Bakery");
    backend.scale_value.set(250.0);
    backend.next_id.set(11);
    let mut console = Console::new(backend);

    console.poll_scale();
    assert_eq!(console.submit("F1234"), Feedback::Accepted);
    assert_eq!(console.submit("P5678"), Feedback::Accepted);

    let creates: Vec<String> = console
        .backend()
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("POST input"))
        .collect();
    assert_eq!(creates, vec!["POST input Acme/Bread/Bakery/1/250".to_string()]);

    assert_eq!(console.ledger.len(), 1);
    let row = console.ledger.items().next().expect("one row");
    assert_eq!(row.id, 11);
    assert_eq!(row.provider, "Acme");
    assert_eq!(row.product, "Bread");
    assert_eq!(row.category, "Bakery");
    assert_eq!(row.quantity, 1);
    assert_eq!(row.weight, 250.0);
}

#[test]
fn delete_removes_row_only_after_backend_ack() {
    let backend = RecordingBackend::new();
    backend.fail_delete.set(true);
    let mut console = Console::new(backend);
    console.ledger.insert_front(line_item(4, "bread"));

    assert!(console.delete_item(4).is_err());
    assert!(console.ledger.contains(4), "failed delete must keep the row");

    console.backend().fail_delete.set(false);
    assert!(console.delete_item(4).is_ok());
    assert!(!console.ledger.contains(4));
}

#[test]
fn refresh_after_clear_rebuilds_table_from_backend() {
    let backend = RecordingBackend::new();
    backend.store(line_item(30, "eggs"));
    backend.store(line_item(20, "milk"));
    backend.store(line_item(10, "bread"));
    let mut console = Console::new(backend);
    console.session.last_provider = Some("Acme".to_string());
    console.ledger.insert_front(line_item(99, "stale"));

    console.clear_table();
    assert!(console.ledger.is_empty());
    assert_eq!(console.session.last_provider, None);

    let count = console.refresh().expect("refresh succeeds");
    assert_eq!(count, 3);
    assert_eq!(console.ledger.len(), 3);

    // Each received row is inserted at the front, so the display reads the
    // backend list back-to-front and the focused item is the last received.
    let ids: Vec<u64> = console.ledger.items().map(|item| item.id).collect();
    assert_eq!(ids, vec![10, 20, 30]);
    assert_eq!(console.session.last_element_id, Some(10));
}

#[test]
fn history_toggle_switches_the_date_filter() {
    let mut console = Console::new(RecordingBackend::new());
    assert_eq!(console.session.filter_date, None);

    console.toggle_history_filter().expect("fetch succeeds");
    assert!(console.session.filter_date.is_some());
    let dated_call = console
        .backend()
        .calls()
        .into_iter()
        .find(|call| call.starts_with("GET input/"));
    assert!(dated_call.is_some(), "today-only fetch must carry the date");

    console.toggle_history_filter().expect("fetch succeeds");
    assert_eq!(console.session.filter_date, None);
    assert!(console
        .backend()
        .calls()
        .contains(&"GET input".to_string()));
}

#[test]
fn comment_scan_annotates_the_focused_row() {
    let backend = RecordingBackend::new()
        .with_entity("1", "Acme", "")
        .with_entity("2", "Bread", "Bakery");
    let mut console = Console::new(backend);

    console.submit("F1");
    console.submit("P2");
    assert_eq!(console.submit("#demi caisse"), Feedback::Accepted);

    let row = console.ledger.items().next().expect("one row");
    assert_eq!(row.comment, "demi caisse");
    assert!(console
        .backend()
        .calls()
        .contains(&format!("PUT input/{} comment=demi caisse", row.id)));
}
