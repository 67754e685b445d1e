use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use slotgrid::item::Material;
use slotgrid::{
    ClickEvent, CloseEvent, DragEvent, GestureType, Host, HostEvent, IconBuilder, Lifecycle,
    Panel, PanelAuditStage, PanelConfig, PanelContext, PanelError, PanelHandler, RecordingAudit,
    RefreshMode, Result, RouteOutcome, SimHost, SlotItem, SoundCue, StyledText, ViewerId,
};

const FAILING_SLOT: usize = 4;
const BUY_SLOT: usize = 2;

#[derive(Clone, Default)]
struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    fn count(&self, entry: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == entry)
            .count()
    }
}

struct Workbench {
    journal: Journal,
    purchases: Arc<Mutex<Vec<ViewerId>>>,
}

impl Workbench {
    fn new(journal: Journal) -> Self {
        Self {
            journal,
            purchases: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl PanelHandler for Workbench {
    fn populate(&mut self, panel: &mut PanelContext<'_>) -> Result<()> {
        self.journal.push("populate");
        let purchases = Arc::clone(&self.purchases);
        let buy = IconBuilder::new(
            SlotItem::of("minecraft:bread").with_name(StyledText::plain("Bread")),
        )
        .on_left_click(
            move |viewer, _| {
                purchases.lock().unwrap().push(viewer);
                None
            },
            false,
        )?
        .build();
        panel.set_slot(BUY_SLOT, Some(buy))?;

        let broken = IconBuilder::new(SlotItem::of("minecraft:anvil"))
            .on_left_click(|_, _| Some("cannot place item".to_string()), true)?
            .build();
        panel.set_slot(FAILING_SLOT, Some(broken))?;
        panel.set_item(8, Some(SlotItem::of("minecraft:clock")))
    }

    fn on_panel_gesture(
        &mut self,
        _panel: &mut PanelContext<'_>,
        event: &mut ClickEvent,
    ) -> Result<()> {
        self.journal.push(format!("panel_gesture:{}", event.raw_slot));
        Ok(())
    }

    fn on_foreign_gesture(
        &mut self,
        _panel: &mut PanelContext<'_>,
        event: &mut ClickEvent,
    ) -> Result<()> {
        self.journal.push(format!("foreign_gesture:{}", event.raw_slot));
        Ok(())
    }

    fn on_close(&mut self, _panel: &mut PanelContext<'_>, _event: &CloseEvent) -> Result<()> {
        self.journal.push("close");
        Ok(())
    }

    fn on_drag(&mut self, _panel: &mut PanelContext<'_>, _event: &mut DragEvent) -> Result<()> {
        self.journal.push("drag");
        Ok(())
    }

    fn on_tick(&mut self, _panel: &mut PanelContext<'_>) -> Result<()> {
        self.journal.push("tick");
        Ok(())
    }
}

fn open_workbench(config: PanelConfig) -> (SimHost, Panel<Workbench>, ViewerId, Journal) {
    let mut host = SimHost::new();
    let viewer = ViewerId(1);
    host.connect(viewer);
    let journal = Journal::default();
    let mut panel = Panel::new(&mut host, config, Workbench::new(journal.clone())).unwrap();
    panel.open(&mut host, viewer).unwrap();
    (host, panel, viewer, journal)
}

fn deliver(host: &mut SimHost, panel: &mut Panel<Workbench>, mut event: HostEvent) -> (HostEvent, RouteOutcome) {
    let outcome = panel.handle_event(host, &mut event).unwrap();
    (event, outcome)
}

fn drain(host: &mut SimHost, panel: &mut Panel<Workbench>) -> Vec<RouteOutcome> {
    host.take_events()
        .into_iter()
        .map(|event| deliver(host, panel, event).1)
        .collect()
}

#[test]
fn requested_size_rounds_up_to_whole_rows() {
    let mut host = SimHost::new();
    let panel = Panel::new(
        &mut host,
        PanelConfig::new("Ten", 10),
        Workbench::new(Journal::default()),
    )
    .unwrap();
    assert_eq!(panel.size(), 18);
    assert_eq!(host.widget_size(panel.widget()).unwrap(), 18);
    assert_eq!(panel.lifecycle(), Lifecycle::Created);
}

#[test]
fn opening_populates_once_and_commits() {
    let (mut host, mut panel, viewer, journal) = open_workbench(PanelConfig::new("Bench", 27));

    assert_eq!(panel.lifecycle(), Lifecycle::Active);
    assert!(panel.is_populated());
    assert_eq!(host.open_widget_of(viewer), Some(panel.widget()));
    assert!(host.slot(panel.widget(), BUY_SLOT).unwrap().is_material("minecraft:bread"));
    assert_eq!(journal.count("populate"), 1);

    panel.open(&mut host, viewer).unwrap();
    assert_eq!(journal.count("populate"), 1);
}

#[test]
fn failing_action_shows_error_overlay_and_plays_failure_cue() {
    let (mut host, mut panel, viewer, _) = open_workbench(PanelConfig::new("Bench", 27));

    let click = host.click(viewer, FAILING_SLOT, GestureType::Left).unwrap();
    let (event, outcome) = deliver(&mut host, &mut panel, click);

    assert!(event.is_vetoed());
    assert_eq!(
        outcome,
        RouteOutcome::ActionFailed {
            slot: FAILING_SLOT,
            message: "cannot place item".to_string()
        }
    );

    let shown = host.slot(panel.widget(), FAILING_SLOT).unwrap();
    assert_eq!(shown.material, Material::barrier());
    let name = shown.name.as_ref().unwrap();
    assert_eq!(name.text, "Uh oh!");
    assert!(name.bold);
    assert_eq!(shown.lore.len(), 1);
    assert_eq!(shown.lore[0].text, "cannot place item");

    assert_eq!(host.sounds().len(), 1);
    assert_eq!(host.sounds()[0].0, viewer);
    assert_eq!(host.sounds()[0].1.key, SoundCue::NOTE_BLOCK_BASS);
}

#[test]
fn error_overlay_expires_after_its_duration() {
    let (mut host, mut panel, viewer, _) = open_workbench(PanelConfig::new("Bench", 27));
    let click = host.click(viewer, FAILING_SLOT, GestureType::Left).unwrap();
    deliver(&mut host, &mut panel, click);

    host.advance_ms(2999);
    panel.repopulate(&mut host).unwrap();
    assert!(host
        .slot(panel.widget(), FAILING_SLOT)
        .unwrap()
        .is_material(Material::BARRIER));

    host.advance_ms(2);
    panel.repopulate(&mut host).unwrap();
    assert!(host
        .slot(panel.widget(), FAILING_SLOT)
        .unwrap()
        .is_material("minecraft:anvil"));
    assert_eq!(panel.registry().overlay_count(), 0);
}

#[test]
fn long_failure_messages_wrap_into_lore_lines() {
    let config = PanelConfig {
        wrap_width: 10,
        ..PanelConfig::new("Bench", 27)
    };
    let (mut host, mut panel, viewer, _) = open_workbench(config);
    panel
        .show_error(
            &mut host,
            0,
            "Nope",
            slotgrid::wrap_words("the quick brown fox jumps", 10),
        )
        .unwrap();

    let shown = host.slot(panel.widget(), 0).unwrap();
    let lines: Vec<_> = shown.lore.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    assert_eq!(host.open_widget_of(viewer), Some(panel.widget()));
}

#[test]
fn successful_action_runs_with_the_clicking_viewer() {
    let (mut host, mut panel, viewer, journal) = open_workbench(PanelConfig::new("Bench", 27));
    let click = host.click(viewer, BUY_SLOT, GestureType::Left).unwrap();
    let (event, outcome) = deliver(&mut host, &mut panel, click);

    assert!(event.is_vetoed());
    assert_eq!(outcome, RouteOutcome::ActionSucceeded { slot: BUY_SLOT });
    assert_eq!(*panel.handler().purchases.lock().unwrap(), vec![viewer]);
    assert_eq!(journal.count("panel_gesture:2"), 0);
    assert!(host.sounds().is_empty());
}

#[test]
fn unbound_gesture_falls_back_to_panel_hook() {
    let (mut host, mut panel, viewer, journal) = open_workbench(PanelConfig::new("Bench", 27));

    let right = host.click(viewer, BUY_SLOT, GestureType::Right).unwrap();
    let (event, outcome) = deliver(&mut host, &mut panel, right);
    assert!(event.is_vetoed());
    assert_eq!(outcome, RouteOutcome::Fallback { slot: BUY_SLOT });

    let empty = host.click(viewer, 20, GestureType::Left).unwrap();
    deliver(&mut host, &mut panel, empty);

    assert_eq!(journal.count("panel_gesture:2"), 1);
    assert_eq!(journal.count("panel_gesture:20"), 1);
}

#[test]
fn clicks_in_own_inventory_go_to_foreign_hook() {
    let (mut host, mut panel, viewer, journal) = open_workbench(PanelConfig::new("Bench", 27));

    let plain = host
        .click_own_inventory(viewer, 5, GestureType::Left)
        .unwrap();
    let (event, outcome) = deliver(&mut host, &mut panel, plain);
    assert_eq!(outcome, RouteOutcome::Foreign);
    assert!(!event.is_vetoed());

    let shift = host
        .click_own_inventory(viewer, 6, GestureType::ShiftLeft)
        .unwrap();
    let (event, outcome) = deliver(&mut host, &mut panel, shift);
    assert_eq!(outcome, RouteOutcome::Foreign);
    assert!(event.is_vetoed());

    assert_eq!(journal.count("foreign_gesture:5"), 1);
    assert_eq!(journal.count("foreign_gesture:6"), 1);
}

#[test]
fn shift_routing_can_be_allowed() {
    let config = PanelConfig::new("Bench", 27).with_allow_shift_route(true);
    let (mut host, mut panel, viewer, _) = open_workbench(config);
    let shift = host
        .click_own_inventory(viewer, 6, GestureType::ShiftLeft)
        .unwrap();
    let (event, _) = deliver(&mut host, &mut panel, shift);
    assert!(!event.is_vetoed());
}

#[test]
fn unresolved_clicks_are_vetoed_unless_raw_access_is_enabled() {
    let (mut host, mut panel, viewer, journal) = open_workbench(PanelConfig::new("Bench", 27));
    let outside = host.click_outside(viewer, GestureType::Left);
    let (event, outcome) = deliver(&mut host, &mut panel, outside);
    assert!(event.is_vetoed());
    assert_eq!(outcome, RouteOutcome::Vetoed);

    panel.set_raw_slot_access(true);
    let outside = host.click_outside(viewer, GestureType::Left);
    let (event, outcome) = deliver(&mut host, &mut panel, outside);
    assert!(!event.is_vetoed());
    assert_eq!(outcome, RouteOutcome::Foreign);
    assert_eq!(journal.count("foreign_gesture:0"), 1);
}

#[test]
fn drag_is_vetoed_and_leaves_buffer_untouched() {
    let (mut host, mut panel, viewer, journal) = open_workbench(PanelConfig::new("Bench", 27));
    let before = panel.buffer().contents().to_vec();
    let writes = host.write_count(panel.widget());

    let drag = host.drag(viewer, vec![0, 1, 2]).unwrap();
    let (event, outcome) = deliver(&mut host, &mut panel, drag);

    assert!(event.is_vetoed());
    assert_eq!(outcome, RouteOutcome::DragVetoed);
    assert_eq!(panel.buffer().contents(), before.as_slice());
    assert_eq!(host.write_count(panel.widget()), writes);
    assert_eq!(journal.count("drag"), 0);
}

#[test]
fn drag_is_forwarded_when_enabled() {
    let config = PanelConfig::new("Bench", 27).with_allow_drag(true);
    let (mut host, mut panel, viewer, journal) = open_workbench(config);
    let drag = host.drag(viewer, vec![0, 1]).unwrap();
    let (event, outcome) = deliver(&mut host, &mut panel, drag);
    assert!(!event.is_vetoed());
    assert_eq!(outcome, RouteOutcome::DragForwarded);
    assert_eq!(journal.count("drag"), 1);
}

#[test]
fn close_with_remaining_viewer_keeps_panel_alive() {
    let (mut host, mut panel, first, journal) = open_workbench(PanelConfig::new("Bench", 27));
    let second = ViewerId(2);
    host.connect(second);
    panel.open(&mut host, second).unwrap();
    panel
        .set_refresh_interval(&mut host, 20, RefreshMode::Sync)
        .unwrap();

    host.close_view(first).unwrap();
    assert_eq!(drain(&mut host, &mut panel), vec![RouteOutcome::ViewerDeparted]);
    assert!(panel.is_listening(&host));
    assert_eq!(panel.refresh_mode(), Some(RefreshMode::Sync));
    assert_eq!(journal.count("close"), 0);

    host.close_view(second).unwrap();
    assert_eq!(drain(&mut host, &mut panel), vec![RouteOutcome::TornDown]);
    assert!(!panel.is_listening(&host));
    assert_eq!(panel.lifecycle(), Lifecycle::Closed);
    assert_eq!(panel.refresh_mode(), None);
    assert_eq!(host.active_subscriptions(panel.widget()), 0);
    assert_eq!(journal.count("close"), 1);

    let late = HostEvent::Close(CloseEvent {
        widget: panel.widget(),
        viewer: second,
    });
    let (_, outcome) = deliver(&mut host, &mut panel, late);
    assert_eq!(outcome, RouteOutcome::Ignored);
    assert_eq!(journal.count("close"), 1);
}

#[test]
fn events_for_other_widgets_are_ignored() {
    let (mut host, mut panel, viewer, _) = open_workbench(PanelConfig::new("Bench", 27));
    let own = host.own_inventory(viewer).unwrap();
    let close = HostEvent::Close(CloseEvent {
        widget: own,
        viewer,
    });
    let (_, outcome) = deliver(&mut host, &mut panel, close);
    assert_eq!(outcome, RouteOutcome::Ignored);
    assert_eq!(panel.lifecycle(), Lifecycle::Active);
}

#[test]
fn repopulate_is_idempotent() {
    let (mut host, mut panel, _, _) = open_workbench(PanelConfig::new("Bench", 27));
    let first = host.widget_contents(panel.widget()).unwrap();
    panel.repopulate(&mut host).unwrap();
    panel.repopulate(&mut host).unwrap();
    assert_eq!(host.widget_contents(panel.widget()).unwrap(), first);
    assert_eq!(panel.registry().icon_count(), 2);
}

#[test]
fn repopulate_overwrites_external_slot_changes() {
    let (mut host, mut panel, _, _) = open_workbench(PanelConfig::new("Bench", 27));
    host.poke_slot(panel.widget(), 8, None);
    host.poke_slot(panel.widget(), 9, Some(SlotItem::of("minecraft:dirt")));

    panel.repopulate(&mut host).unwrap();

    assert!(host.slot(panel.widget(), 8).unwrap().is_material("minecraft:clock"));
    assert!(host.slot(panel.widget(), 9).is_none());
}

#[test]
fn refresh_is_skipped_while_viewer_is_offline() {
    let (mut host, mut panel, viewer, journal) = open_workbench(PanelConfig::new("Bench", 27));
    let writes = host.write_count(panel.widget());
    host.disconnect(viewer);

    panel.repopulate(&mut host).unwrap();

    assert_eq!(journal.count("populate"), 1);
    assert_eq!(host.write_count(panel.widget()), writes);
    assert!(panel.buffer().is_empty());
}

#[test]
fn set_item_stays_in_the_shadow_until_commit() {
    let (mut host, mut panel, _, _) = open_workbench(PanelConfig::new("Bench", 27));
    let apple = SlotItem::of("minecraft:apple").with_amount(3);
    panel.set_item(26, Some(apple.clone())).unwrap();

    assert_eq!(panel.buffer().get(26), Some(&apple));
    assert!(panel.buffer().contains(&apple));
    assert!(host.slot(panel.widget(), 26).is_none());

    panel.repopulate(&mut host).unwrap();
    assert!(panel.buffer().get(26).is_none());
    assert!(host.slot(panel.widget(), 26).is_none());

    assert!(panel.set_item(27, Some(apple)).is_err());
}

#[test]
fn sync_refresh_fires_on_schedule() {
    let (mut host, mut panel, _, journal) = open_workbench(PanelConfig::new("Bench", 27));
    panel
        .set_refresh_interval(&mut host, 20, RefreshMode::Sync)
        .unwrap();

    panel.drive(&mut host).unwrap();
    assert_eq!(journal.count("tick"), 1);

    host.advance_ticks(10);
    panel.drive(&mut host).unwrap();
    assert_eq!(journal.count("tick"), 1);

    host.advance_ticks(10);
    panel.drive(&mut host).unwrap();
    assert_eq!(journal.count("tick"), 2);
    assert_eq!(journal.count("populate"), 3);

    host.advance_ticks(100);
    panel.drive(&mut host).unwrap();
    assert_eq!(journal.count("tick"), 3);

    panel.cancel_refresh();
    host.advance_ticks(40);
    panel.drive(&mut host).unwrap();
    assert_eq!(journal.count("tick"), 3);
}

#[test]
fn handle_commands_are_applied_on_drive() {
    let (mut host, mut panel, viewer, journal) = open_workbench(PanelConfig::new("Bench", 27));
    let handle = panel.handle();

    let worker = std::thread::spawn(move || {
        handle.show_error(1, "Busy", vec!["try later".to_string()]);
        handle.request_repopulate()
    });
    assert!(worker.join().unwrap());
    assert!(host.slot(panel.widget(), 1).is_none());

    panel.drive(&mut host).unwrap();
    assert!(host.slot(panel.widget(), 1).unwrap().is_material(Material::BARRIER));
    assert_eq!(journal.count("populate"), 3);

    panel.handle().close();
    panel.drive(&mut host).unwrap();
    assert_eq!(host.open_widget_of(viewer), None);
    assert_eq!(drain(&mut host, &mut panel), vec![RouteOutcome::TornDown]);
}

#[test]
fn show_error_off_the_authoritative_context_is_deferred() {
    let (mut host, mut panel, _, _) = open_workbench(PanelConfig::new("Bench", 27));
    host.set_authoritative(false);
    panel
        .show_error(&mut host, 3, "Later", vec!["queued".to_string()])
        .unwrap();
    assert!(host.slot(panel.widget(), 3).is_none());

    host.set_authoritative(true);
    panel.drive(&mut host).unwrap();
    let shown = host.slot(panel.widget(), 3).unwrap();
    assert_eq!(shown.name.as_ref().unwrap().text, "Later");
}

#[test]
fn show_error_rejects_slots_outside_the_panel() {
    let (mut host, mut panel, _, _) = open_workbench(PanelConfig::new("Bench", 9));
    assert!(panel.show_error(&mut host, 9, "Nope", Vec::new()).is_err());
}

#[test]
fn torn_down_panel_can_be_reopened() {
    let (mut host, mut panel, viewer, journal) = open_workbench(PanelConfig::new("Bench", 27));
    host.close_view(viewer).unwrap();
    drain(&mut host, &mut panel);
    assert!(!panel.is_listening(&host));

    panel.open(&mut host, viewer).unwrap();
    assert!(panel.is_listening(&host));
    assert_eq!(panel.lifecycle(), Lifecycle::Active);
    assert_eq!(journal.count("populate"), 1);
}

#[test]
fn refresh_cannot_be_armed_after_teardown() {
    let (mut host, mut panel, viewer, _) = open_workbench(PanelConfig::new("Bench", 27));
    host.close_view(viewer).unwrap();
    drain(&mut host, &mut panel);

    let err = panel
        .set_refresh_interval(&mut host, 20, RefreshMode::Async)
        .unwrap_err();
    assert!(matches!(err, PanelError::Closed));
    assert_eq!(panel.refresh_mode(), None);
}

#[test]
fn audit_records_the_lifecycle() {
    let audit = Arc::new(RecordingAudit::default());
    let config = PanelConfig::new("Bench", 27).with_audit(audit.clone());
    let (mut host, mut panel, viewer, _) = open_workbench(config);
    host.close_view(viewer).unwrap();
    drain(&mut host, &mut panel);

    let stages = audit.stages();
    assert_eq!(stages.first(), Some(&PanelAuditStage::Constructed));
    assert!(stages.contains(&PanelAuditStage::Populated));
    assert!(stages.contains(&PanelAuditStage::Activated));
    assert_eq!(stages.last(), Some(&PanelAuditStage::TornDown));
}

#[test]
fn metrics_count_actions_and_vetoes() {
    let mut config = PanelConfig::new("Bench", 27);
    config.enable_metrics();
    let metrics = config.metrics_handle().unwrap();
    let (mut host, mut panel, viewer, _) = open_workbench(config);

    let fail = host.click(viewer, FAILING_SLOT, GestureType::Left).unwrap();
    deliver(&mut host, &mut panel, fail);
    let buy = host.click(viewer, BUY_SLOT, GestureType::Left).unwrap();
    deliver(&mut host, &mut panel, buy);

    let snapshot = metrics.lock().unwrap().snapshot(std::time::Duration::ZERO);
    assert_eq!(snapshot.gestures, 2);
    assert_eq!(snapshot.vetoes, 2);
    assert_eq!(snapshot.actions, 2);
    assert_eq!(snapshot.action_failures, 1);
}

#[test]
fn repeated_failure_resets_the_overlay_timer() {
    let (mut host, mut panel, viewer, _) = open_workbench(PanelConfig::new("Bench", 27));
    let first_failure = host.now_epoch_ms();
    let click = host.click(viewer, FAILING_SLOT, GestureType::Left).unwrap();
    deliver(&mut host, &mut panel, click);

    host.advance_ms(2000);
    let click = host.click(viewer, FAILING_SLOT, GestureType::Left).unwrap();
    deliver(&mut host, &mut panel, click);
    assert_eq!(panel.registry().overlay_count(), 1);
    assert_eq!(
        panel.registry().overlay(FAILING_SLOT).unwrap().expires_at_epoch_ms,
        first_failure + 5000
    );

    host.advance_ms(1500);
    panel.repopulate(&mut host).unwrap();
    assert!(host
        .slot(panel.widget(), FAILING_SLOT)
        .unwrap()
        .is_material(Material::BARRIER));

    host.advance_ms(1501);
    panel.repopulate(&mut host).unwrap();
    assert!(host
        .slot(panel.widget(), FAILING_SLOT)
        .unwrap()
        .is_material("minecraft:anvil"));
}

#[test]
fn async_refresh_repopulates_through_drive() {
    let (mut host, mut panel, _, journal) = open_workbench(PanelConfig::new("Bench", 27));
    let writes = host.write_count(panel.widget());
    panel
        .set_refresh_interval(&mut host, 1, RefreshMode::Async)
        .unwrap();
    assert_eq!(panel.refresh_mode(), Some(RefreshMode::Async));

    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline && journal.count("tick") < 2 {
        panel.drive(&mut host).unwrap();
        thread::sleep(Duration::from_millis(5));
    }

    let ticks = journal.count("tick");
    assert!(ticks >= 2);
    assert!(journal.count("populate") >= 1 + ticks);
    assert!(host.write_count(panel.widget()) >= writes + ticks);
    assert!(host.slot(panel.widget(), BUY_SLOT).unwrap().is_material("minecraft:bread"));

    panel.cancel_refresh();
    assert_eq!(panel.refresh_mode(), None);
}

#[test]
fn huge_refresh_period_fires_once_without_panicking() {
    let (mut host, mut panel, _, journal) = open_workbench(PanelConfig::new("Bench", 27));
    host.advance_ticks(5);
    panel
        .set_refresh_interval(&mut host, u64::MAX, RefreshMode::Sync)
        .unwrap();

    panel.drive(&mut host).unwrap();
    host.advance_ticks(1_000);
    panel.drive(&mut host).unwrap();

    assert_eq!(journal.count("tick"), 1);
}

struct Flaky {
    failing: Arc<AtomicBool>,
}

impl PanelHandler for Flaky {
    fn populate(&mut self, panel: &mut PanelContext<'_>) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PanelError::handler("stock lookup failed"));
        }
        panel.set_item(0, Some(SlotItem::of("minecraft:chest")))
    }

    fn on_panel_gesture(
        &mut self,
        _panel: &mut PanelContext<'_>,
        _event: &mut ClickEvent,
    ) -> Result<()> {
        Ok(())
    }
}

#[test]
fn failed_hooks_leave_the_lifecycle_where_it_was() {
    let mut host = SimHost::new();
    let viewer = ViewerId(1);
    host.connect(viewer);
    let failing = Arc::new(AtomicBool::new(true));
    let mut panel = Panel::new(
        &mut host,
        PanelConfig::new("Flaky", 9),
        Flaky {
            failing: Arc::clone(&failing),
        },
    )
    .unwrap();

    let err = panel.open(&mut host, viewer).unwrap_err();
    assert!(matches!(err, PanelError::Handler(_)));
    assert_eq!(panel.lifecycle(), Lifecycle::Created);
    assert!(!panel.is_populated());

    failing.store(false, Ordering::SeqCst);
    panel.open(&mut host, viewer).unwrap();
    assert_eq!(panel.lifecycle(), Lifecycle::Active);

    failing.store(true, Ordering::SeqCst);
    assert!(panel.repopulate(&mut host).is_err());
    assert_eq!(panel.lifecycle(), Lifecycle::Active);
}
