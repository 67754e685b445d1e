//! Scripted walk through a small shop panel on the in-memory host.
//!
//! Run with `cargo run --example shop_panel`. Log records go to stdout as
//! JSON lines.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use slotgrid::logging::{LogEvent, LogSink};
use slotgrid::{
    ClickEvent, GestureType, Host, IconBuilder, Logger, LoggingResult, PanelConfig, PanelContext,
    PanelError, PanelHandler, PanelRuntime, Result, SimHost, SlotGrid, SlotItem, StyledText,
    TextColor, ViewerId, spacer,
};

struct StdoutSink;

impl LogSink for StdoutSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let line = serde_json::to_string(event)?;
        writeln!(io::stdout(), "{line}")?;
        Ok(())
    }
}

struct Shop {
    wallet: Arc<Mutex<u32>>,
    stock: Vec<(&'static str, &'static str, u32)>,
}

impl PanelHandler for Shop {
    fn populate(&mut self, panel: &mut PanelContext<'_>) -> Result<()> {
        let grid = SlotGrid::for_size(panel.size());
        for slot in grid.border() {
            panel.set_item(slot, Some(spacer()))?;
        }

        let coins = *self.wallet.lock().map_err(PanelError::handler)?;
        panel.set_item(
            4,
            Some(
                SlotItem::of("minecraft:gold_nugget")
                    .with_name(StyledText::colored(format!("{coins} coins"), TextColor::Gold)),
            ),
        )?;

        for (index, (key, label, price)) in self.stock.iter().enumerate() {
            let Some(slot) = grid.slot_at(1, 1 + index * 2) else {
                break;
            };
            let price = *price;
            let wallet = Arc::clone(&self.wallet);
            let icon = IconBuilder::new(
                SlotItem::of(*key)
                    .with_name(StyledText::plain(*label))
                    .with_lore_line(StyledText::colored(format!("{price} coins"), TextColor::Gray)),
            )
            .on_left_click(
                move |_, _| {
                    let Ok(mut balance) = wallet.lock() else {
                        return Some("wallet unavailable".to_string());
                    };
                    if *balance < price {
                        return Some(format!("you need {} more coins", price - *balance));
                    }
                    *balance -= price;
                    None
                },
                false,
            )?
            .build();
            panel.set_slot(slot, Some(icon))?;
        }
        Ok(())
    }

    fn on_panel_gesture(
        &mut self,
        panel: &mut PanelContext<'_>,
        _event: &mut ClickEvent,
    ) -> Result<()> {
        panel.request_repopulate();
        Ok(())
    }
}

fn main() -> Result<()> {
    let mut host = SimHost::new();
    let viewer = ViewerId(1);
    host.connect(viewer);

    let mut runtime = PanelRuntime::new(host);
    runtime.config_mut().logger = Some(Logger::new(StdoutSink));

    let wallet = Arc::new(Mutex::new(20));
    let shop = Shop {
        wallet: Arc::clone(&wallet),
        stock: vec![
            ("minecraft:bread", "Bread", 5),
            ("minecraft:iron_ingot", "Iron", 15),
            ("minecraft:diamond", "Diamond", 100),
        ],
    };
    let id = runtime.create(PanelConfig::new("Shop", 27), shop)?;
    runtime.open(id, viewer)?;

    let script: Vec<_> = [
        (10, GestureType::Left),
        (14, GestureType::Left),
        (12, GestureType::Left),
        (12, GestureType::ShiftLeft),
    ]
    .into_iter()
    .filter_map(|(slot, gesture)| runtime.host().click(viewer, slot, gesture))
    .collect();

    for dispatch in runtime.run_scripted(script)? {
        if let Some(outcome) = dispatch.outcome_for(id) {
            println!("{:<8} -> {:?}", dispatch.event.describe(), outcome);
        }
    }

    runtime.host_mut().advance_ticks(70);
    runtime.tick()?;
    runtime.host_mut().close_view(viewer)?;
    runtime.tick()?;

    println!(
        "wallet: {} coins, panels left: {}",
        wallet.lock().map(|w| *w).unwrap_or(0),
        runtime.panel_count()
    );
    Ok(())
}
