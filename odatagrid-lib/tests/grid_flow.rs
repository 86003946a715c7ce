//! End-to-end grid flows against scripted transports.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use odatagrid_lib::AddressBar;
use odatagrid_lib::Coordinator;
use odatagrid_lib::GridConfig;
use odatagrid_lib::GridEvent;
use odatagrid_lib::LoadStatus;
use odatagrid_lib::MemoryHistory;
use odatagrid_lib::error::FetchError;
use odatagrid_lib::people_columns;
use odatagrid_lib::query::SortInput;
use odatagrid_lib::request::HttpResponse;
use odatagrid_lib::request::Transport;
use odatagrid_lib::table::CellContent;
use serde_json::json;
use tokio::sync::oneshot;

fn people_body(names: &[&str], count: u64) -> String {
    let value: Vec<_> = names
        .iter()
        .map(|name| json!({ "@odata.etag": "W/\"1\"", "UserName": name, "LastName": name, "Age": 30 }))
        .collect();
    json!({ "@odata.count": count, "value": value }).to_string()
}

/// Replies from a queue, repeating the last reply once the queue is drained.
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<HttpResponse>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn reply(&self, response: HttpResponse) {
        self.replies.lock().unwrap().push_back(response);
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.urls.lock().unwrap().push(url.to_string());
        let mut replies = self.replies.lock().unwrap();
        let response = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        response.ok_or_else(|| FetchError::transport("no scripted reply"))
    }
}

/// Holds every request until the test releases it.
#[derive(Default)]
struct GatedTransport {
    gates: Mutex<Vec<(String, oneshot::Sender<HttpResponse>)>>,
}

impl GatedTransport {
    fn release(&self, url_suffix: &str, response: HttpResponse) -> bool {
        let mut gates = self.gates.lock().unwrap();
        let Some(index) = gates.iter().position(|(url, _)| url.ends_with(url_suffix)) else {
            return false;
        };
        let (_, sender) = gates.remove(index);
        sender.send(response).is_ok()
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push((url.to_string(), tx));
        rx.await.map_err(|_| FetchError::transport("gate dropped"))
    }
}

fn grid_with(
    search: &str,
    transport: Arc<dyn Transport>,
) -> Coordinator<MemoryHistory> {
    Coordinator::with_transport(
        GridConfig::default(),
        people_columns(),
        MemoryHistory::new("/people.html", search),
        transport,
    )
    .unwrap()
}

#[tokio::test]
async fn test_initial_load_from_shared_url() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(HttpResponse::ok(people_body(&["f", "g", "h", "i", "j"], 12)));
    let mut grid = grid_with("?$orderby=LastName%20desc&page=2", transport.clone());

    assert_eq!(grid.dispatch(GridEvent::Load).await, LoadStatus::Applied);

    let urls = transport.urls();
    assert_eq!(urls.len(), 1);
    assert_eq!(
        urls[0],
        "https://services.odata.org/v4/TripPinServiceRW/People?$orderby=LastName%20desc&$count=true&$top=5&$skip=5"
    );

    let pagination = grid.pagination();
    assert_eq!(pagination.total_pages, 3);
    let page_two = pagination.control("page-2").unwrap();
    assert!(page_two.active);
    assert!(page_two.disabled);
    assert_eq!(grid.table().render().rows.len(), 5);
    assert_eq!(grid.table().current_page(), 2);
    assert_eq!(grid.sort_count(), 1);
}

#[tokio::test]
async fn test_newer_request_wins_when_older_resolves_last() {
    let transport = Arc::new(GatedTransport::default());
    let mut grid = grid_with("", transport.clone());

    let first = grid.begin(GridEvent::GoToPage(2));
    let second = grid.begin(GridEvent::GoToPage(3));
    assert!(second.generation() > first.generation());

    let first = tokio::spawn(first.wait());
    let second = tokio::spawn(second.wait());

    while !transport.release("$skip=10", HttpResponse::ok(people_body(&["page3"], 15))) {
        tokio::task::yield_now().await;
    }
    let outcome = second.await.unwrap();
    assert_eq!(grid.finish(outcome), LoadStatus::Applied);

    // Whatever the first request produced, it must not be applied.
    transport.release("$skip=5", HttpResponse::ok(people_body(&["page2"], 15)));
    let outcome = first.await.unwrap();
    assert_eq!(grid.finish(outcome), LoadStatus::Superseded);

    let rendered = grid.table().render();
    assert_eq!(rendered.rows.len(), 1);
    assert_eq!(rendered.rows[0][0].content, CellContent::Text("page3".into()));
    assert_eq!(grid.pagination().current_page, 3);
    assert_eq!(grid.address_bar().search(), "?page=3");
}

#[tokio::test]
async fn test_failed_load_keeps_last_good_page() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(HttpResponse::ok(people_body(&["a", "b"], 7)));
    transport.reply(HttpResponse::status(503, "Service Unavailable"));
    let mut grid = grid_with("", transport.clone());

    assert_eq!(grid.dispatch(GridEvent::Load).await, LoadStatus::Applied);
    assert!(grid.notice().is_none());

    let pending = grid.click("page-2").unwrap();
    assert_eq!(grid.finish(pending.wait().await), LoadStatus::Failed);

    let notice = grid.notice().unwrap();
    assert_eq!(notice.status, Some(503));
    assert_eq!(grid.table().records().len(), 2);
    assert!(grid.pagination().control("page-1").unwrap().active);
}

#[tokio::test]
async fn test_malformed_payload_degrades_to_empty_page() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(HttpResponse::ok(r#"{"value": "not a list", "@odata.count": "x"}"#));
    let mut grid = grid_with("", transport);

    assert_eq!(grid.dispatch(GridEvent::Load).await, LoadStatus::Applied);
    assert!(grid.table().records().is_empty());
    assert_eq!(grid.pagination().total_pages, 1);
    assert!(grid.pagination().previous().unwrap().disabled);
    assert!(grid.pagination().next().unwrap().disabled);
}

#[tokio::test]
async fn test_non_json_body_is_reported() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(HttpResponse::ok("<html>oops</html>"));
    let mut grid = grid_with("", transport);

    assert_eq!(grid.dispatch(GridEvent::Load).await, LoadStatus::Failed);
    assert!(grid.notice().is_some());
}

#[tokio::test]
async fn test_applying_same_sort_twice_is_idempotent() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(HttpResponse::ok(people_body(&["a"], 1)));
    let mut grid = grid_with("?tab=1", transport.clone());
    let sort = vec![SortInput::new("LastName", "desc"), SortInput::new("FirstName", "asc")];

    grid.dispatch(GridEvent::ApplySort(sort.clone())).await;
    let search = grid.address_bar().search();
    grid.dispatch(GridEvent::ApplySort(sort)).await;

    assert_eq!(grid.address_bar().search(), search);
    let urls = transport.urls();
    assert_eq!(urls[0], urls[1]);
    assert!(urls[0].contains("$orderby=LastName%20desc%2C%20FirstName%20asc"));
}

#[tokio::test]
async fn test_reset_all_clears_criteria_and_page() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(HttpResponse::ok(people_body(&["a"], 1)));
    let mut grid = grid_with(
        "?$orderby=LastName%20desc&$filter=contains(LastName,%20%27a%27)&page=2&tab=1",
        transport,
    );

    grid.dispatch(GridEvent::Load).await;
    assert_eq!(grid.filter_count(), 1);

    grid.dispatch(GridEvent::ResetAll).await;
    assert_eq!(grid.sort_count(), 0);
    assert_eq!(grid.filter_count(), 0);
    assert_eq!(grid.state().page(), 1);
    assert_eq!(grid.address_bar().search(), "?tab=1");
}

#[tokio::test]
async fn test_page_past_the_end_moves_to_last_page() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(HttpResponse::ok(people_body(&[], 7)));
    transport.reply(HttpResponse::ok(people_body(&["f", "g"], 7)));
    let mut grid = grid_with("?page=9", transport.clone());

    assert_eq!(grid.dispatch(GridEvent::Load).await, LoadStatus::Applied);
    assert_eq!(grid.state().page(), 2);
    assert_eq!(grid.address_bar().search(), "?page=2");
    assert_eq!(grid.address_bar().len(), 1);
    assert_eq!(grid.table().current_page(), 2);
    assert_eq!(grid.table().records().len(), 2);
    assert!(grid.pagination().control("page-2").unwrap().active);
    assert_eq!(grid.pagination().caption(), "Page 2 of 2");

    let urls = transport.urls();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].ends_with("$top=5&$skip=40"));
    assert!(urls[1].ends_with("$top=5&$skip=5"));
}

#[tokio::test]
async fn test_out_of_range_finish_leaves_table_untouched() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.reply(HttpResponse::ok(people_body(&["a", "b"], 7)));
    transport.reply(HttpResponse::ok(people_body(&[], 7)));
    let mut grid = grid_with("", transport);
    grid.dispatch(GridEvent::Load).await;

    let pending = grid.begin(GridEvent::GoToPage(5));
    assert_eq!(grid.finish(pending.wait().await), LoadStatus::OutOfRange);
    assert_eq!(grid.state().page(), 2);
    assert_eq!(grid.address_bar().entries(), ["", "?page=2"]);
    assert_eq!(grid.table().records().len(), 2);
    assert!(grid.pagination().control("page-1").unwrap().active);

    let pending = grid.reload();
    assert_eq!(pending.state().page(), 2);
}
