mod support;

use std::rc::Rc;
use std::time::Duration;

use futures::executor::LocalPool;
use futures::lock::Mutex;
use futures::task::LocalSpawnExt;
use serde_json::json;

use support::{Page, TestRuntime};
use wallet_views_wasm::application::cache::SnapshotCache;
use wallet_views_wasm::application::scheduler::TaskKey;
use wallet_views_wasm::application::{
    PageSelection, PollConfig, PollPolicy, PollTask, ViewBinder, WalletViewsService,
};
use wallet_views_wasm::domain::render::TX_HISTORY_PAGE;
use wallet_views_wasm::domain::session::SessionId;
use wallet_views_wasm::domain::snapshot::Snapshot;
use wallet_views_wasm::domain::view::ViewKind;
use wallet_views_wasm::infrastructure::MemoryStore;

const MOUNT_RETRY: Duration = Duration::from_millis(50);
const SUCCESS: Duration = Duration::from_secs(60);
const RETRY: Duration = Duration::from_secs(1);

fn task(page: &Page, view: ViewKind) -> PollTask<TestRuntime> {
    let binder = ViewBinder::new(view, SessionId::anonymous(), "", page.ports(), PageSelection::default());
    PollTask::new(Rc::new(Mutex::new(binder)), Rc::clone(&page.timer), PollPolicy::default())
}

#[test]
fn intervals_follow_each_outcome() {
    let page = Page::new();
    page.source.push_json(ViewKind::Balance, json!(["1", "2", "3", "4", "5"]));
    page.source.push_failure(ViewKind::Balance);
    page.source.push_json(ViewKind::Balance, json!(["1", "2", "3", "4", "5"]));
    let mut pool = LocalPool::new();
    pool.spawner().spawn_local(task(&page, ViewKind::Balance).run()).unwrap();

    pool.run_until_stalled();
    assert_eq!(page.timer.delays(), vec![MOUNT_RETRY]);
    assert_eq!(page.source.request_count(ViewKind::Balance), 0);

    page.dom.mount_view(ViewKind::Balance);
    page.timer.fire();
    pool.run_until_stalled();
    assert_eq!(page.timer.last_delay(), Some(SUCCESS));

    page.timer.fire();
    pool.run_until_stalled();
    assert_eq!(page.timer.last_delay(), Some(RETRY));
    assert_eq!(page.dom.text(wallet_views_wasm::domain::view::Target::Class("confirmed")).as_deref(), Some("1"));

    page.timer.fire();
    pool.run_until_stalled();
    assert_eq!(page.timer.delays(), vec![MOUNT_RETRY, SUCCESS, RETRY, SUCCESS]);
    assert_eq!(page.source.request_count(ViewKind::Balance), 3);
}

#[test]
fn task_stops_once_a_seen_anchor_disappears() {
    let page = Page::new();
    page.dom.mount_view(ViewKind::Balance);
    page.source.push_json(ViewKind::Balance, json!(["1", "2", "3", "4", "5"]));
    let mut pool = LocalPool::new();
    pool.spawner().spawn_local(task(&page, ViewKind::Balance).run()).unwrap();
    pool.run_until_stalled();
    assert_eq!(page.timer.pending(), 1);

    page.dom.unmount(ViewKind::Balance.anchor());
    page.timer.fire();
    pool.run_until_stalled();

    assert_eq!(page.timer.pending(), 0);
    assert_eq!(page.timer.delays(), vec![SUCCESS]);
    assert_eq!(page.source.request_count(ViewKind::Balance), 1);
}

#[test]
fn progress_view_polls_every_second_until_complete() {
    let page = Page::new();
    page.dom.mount_view(ViewKind::ConsensusBuilderProgress);
    page.source.push_json(ViewKind::ConsensusBuilderProgress, json!(["50%"]));
    page.source.push_failure(ViewKind::ConsensusBuilderProgress);
    page.source.push_json(ViewKind::ConsensusBuilderProgress, json!(["100%"]));
    let mut pool = LocalPool::new();
    pool.spawner().spawn_local(task(&page, ViewKind::ConsensusBuilderProgress).run()).unwrap();

    pool.run_until_stalled();
    page.timer.fire();
    pool.run_until_stalled();
    page.timer.fire();
    pool.run_until_stalled();

    assert_eq!(page.timer.delays(), vec![RETRY, RETRY]);
    assert_eq!(page.timer.pending(), 0);
    assert_eq!(page.dom.submitted(), vec!["refreshConsensusBuilder"]);
}

#[test]
fn service_starts_one_task_per_view_and_restarts_on_page_selection() {
    let page = Page::new();
    page.dom.mount_view(ViewKind::TxHistory);
    page.source.push_json(
        ViewKind::TxHistory,
        json!({ "lines": [], "total": 4, "current": 1 }),
    );
    let mut pool = LocalPool::new();
    let service = WalletViewsService::new(
        SessionId::new("s1").unwrap(),
        PollConfig::default(),
        page.ports(),
        pool.spawner(),
    );

    service.start().unwrap();
    pool.run_until_stalled();
    for view in ViewKind::all() {
        assert!(service.is_polling(view), "{view} is not polling");
    }
    assert_eq!(service.registry().running().len(), 5);
    assert_eq!(page.source.request_count(ViewKind::TxHistory), 1);

    service.select_page(2).unwrap();
    pool.run_until_stalled();

    let pages: Vec<Option<u32>> = page
        .source
        .requests()
        .iter()
        .filter(|request| request.view == ViewKind::TxHistory)
        .map(|request| request.page)
        .collect();
    assert_eq!(pages, vec![None, Some(2)]);
    assert!(service.is_polling(ViewKind::TxHistory));
    assert_eq!(service.registry().running().len(), 5);
    assert!(service.select_page(0).is_err());
}

#[test]
fn acknowledged_shutdown_stops_polling_and_shows_notice() {
    let page = Page::new();
    page.control.acknowledge.set(true);
    page.dom.mount_view(ViewKind::Balance);
    page.source.push_json(ViewKind::Balance, json!(["1", "2", "3", "4", "5"]));
    let mut pool = LocalPool::new();
    let service = WalletViewsService::new(
        SessionId::new("s1").unwrap(),
        PollConfig::default(),
        page.ports(),
        pool.spawner(),
    );
    service.start().unwrap();
    pool.run_until_stalled();

    assert!(pool.run_until(service.shutdown()).unwrap());
    pool.run_until_stalled();

    assert!(service.registry().running().is_empty());
    let (container, html) = page.dom.replaced().unwrap();
    assert_eq!(container, "content");
    assert!(html.contains("Wallet was shutdown. You can now close your browser."));

    page.timer.fire();
    pool.run_until_stalled();
    assert_eq!(page.source.request_count(ViewKind::Balance), 1);
}

#[test]
fn declined_shutdown_keeps_polling() {
    let page = Page::new();
    let mut pool = LocalPool::new();
    let service =
        WalletViewsService::new(SessionId::anonymous(), PollConfig::default(), page.ports(), pool.spawner());
    service.start().unwrap();
    pool.run_until_stalled();

    assert!(!pool.run_until(service.shutdown()).unwrap());
    assert_eq!(page.control.shutdowns.get(), 1);
    assert!(page.dom.replaced().is_none());
    assert_eq!(service.registry().running().len(), 5);
}

#[test]
fn heartbeat_runs_on_its_own_interval_when_enabled() {
    let page = Page::new();
    let mut pool = LocalPool::new();
    let config = PollConfig { heartbeat_enabled: true, ..PollConfig::default() };
    let service = WalletViewsService::new(SessionId::anonymous(), config, page.ports(), pool.spawner());
    service.start().unwrap();
    pool.run_until_stalled();

    assert!(service.registry().is_running(&TaskKey::Heartbeat));
    assert_eq!(page.control.heartbeats.get(), 1);
    assert!(page.timer.delays().contains(&Duration::from_secs(2)));

    page.timer.fire();
    pool.run_until_stalled();
    assert_eq!(page.control.heartbeats.get(), 2);

    assert_eq!(service.stop(), 6);
    pool.run_until_stalled();
    assert!(!service.registry().is_running(&TaskKey::Heartbeat));
}

#[test]
fn late_mounted_history_paints_the_cache_before_fetching() {
    let store = Rc::new(MemoryStore::new());
    let cached = Snapshot::decode(
        ViewKind::TxHistory,
        json!({
            "lines": [{
                "transaction_id": "abc123",
                "short_transaction_id": "abc",
                "type": "SEND",
                "amount": "-1 SCP",
                "fee": "0.01 SCP",
                "time": "2024-03-01 12:00",
                "confirmed": "No"
            }],
            "total": 1,
            "current": 1
        }),
    )
    .unwrap()
    .unwrap();
    let session = SessionId::new("s1").unwrap();
    SnapshotCache::new(Rc::clone(&store))
        .put(&session, ViewKind::TxHistory, &cached)
        .unwrap();

    let page = Page::with_store(store);
    page.source.push_failure(ViewKind::TxHistory);
    let mut pool = LocalPool::new();
    let service =
        WalletViewsService::new(session.clone(), PollConfig::default(), page.ports(), pool.spawner());
    service.start().unwrap();
    pool.run_until_stalled();
    assert_eq!(page.dom.text(TX_HISTORY_PAGE), None);

    page.dom.mount_view(ViewKind::TxHistory);
    page.timer.fire();
    pool.run_until_stalled();

    assert_eq!(page.source.request_count(ViewKind::TxHistory), 1);
    let painted = page.dom.text(TX_HISTORY_PAGE).unwrap();
    assert!(painted.contains("data-transaction-id=\"abc123\""));
    assert!(page.timer.delays().contains(&RETRY));
    assert!(SnapshotCache::new(Rc::clone(&page.store)).contains(&session, ViewKind::TxHistory));
}
