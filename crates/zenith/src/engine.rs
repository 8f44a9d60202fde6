//! The engine main loop.
//!
//! Every tick dispatches an [`UpdateEvent`] and a [`RenderEvent`] right away,
//! then drains the deferred queue. The loop ends when a [`QuitEvent`] is
//! delivered or the configured tick limit is reached.

use crate::config::EngineSettings;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use zenith_event_system::{
    EventManager, EventManagerStats, EventRef, Listener, QuitEvent, RenderEvent, Timestamp,
    UpdateEvent,
};

/// Stops the loop when a [`QuitEvent`] arrives.
pub struct QuitListener {
    running: AtomicBool,
    exit_code: AtomicI32,
}

impl QuitListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            running: AtomicBool::new(true),
            exit_code: AtomicI32::new(0),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code.load(Ordering::SeqCst)
    }
}

impl Listener for QuitListener {
    fn handle_event(&self, event: &EventRef) -> bool {
        let Some(quit) = event.downcast_ref::<QuitEvent>() else {
            return false;
        };
        info!("🛑 Quit requested with exit code {}", quit.exit_code);
        self.exit_code.store(quit.exit_code, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        true
    }

    fn listener_name(&self) -> &str {
        "quit"
    }
}

/// Counts update and render ticks.
#[derive(Debug, Default)]
pub struct FrameStats {
    updates: AtomicU64,
    renders: AtomicU64,
}

impl FrameStats {
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn renders(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }
}

impl Listener for FrameStats {
    fn handle_event(&self, event: &EventRef) -> bool {
        if event.is::<UpdateEvent>() {
            self.updates.fetch_add(1, Ordering::Relaxed);
        } else if event.is::<RenderEvent>() {
            self.renders.fetch_add(1, Ordering::Relaxed);
        }
        false
    }

    fn listener_name(&self) -> &str {
        "frame_stats"
    }
}

/// Summary returned by [`Engine::run`].
#[derive(Debug, Clone)]
pub struct EngineReport {
    pub ticks: u64,
    pub updates: u64,
    pub renders: u64,
    pub exit_code: i32,
    pub events: EventManagerStats,
}

pub struct Engine {
    events: Arc<EventManager>,
    settings: EngineSettings,
    quit: Arc<QuitListener>,
    frames: Arc<FrameStats>,
    tick: u64,
    last_tick: Timestamp,
}

impl Engine {
    /// Builds the loop around `events` and registers its own listeners.
    pub fn new(events: Arc<EventManager>, settings: EngineSettings) -> Self {
        let quit = QuitListener::new();
        let frames = Arc::new(FrameStats::default());

        events.connect(&quit, QuitEvent::TYPE);
        events.connect(&frames, UpdateEvent::TYPE);
        events.connect(&frames, RenderEvent::TYPE);

        let last_tick = events.now();
        Self {
            events,
            settings,
            quit,
            frames,
            tick: 0,
            last_tick,
        }
    }

    /// Runs one tick. Returns whether the loop should keep going.
    pub fn tick(&mut self) -> bool {
        self.tick += 1;
        let now = self.events.now();
        let delta = now.saturating_since(self.last_tick);
        self.last_tick = now;

        self.events
            .dispatch(&UpdateEvent::new(self.tick, delta).into_ref());
        self.events.dispatch(&RenderEvent::new(self.tick).into_ref());

        if self.settings.max_ticks > 0 && self.tick >= self.settings.max_ticks {
            debug!("Tick limit of {} reached", self.settings.max_ticks);
            self.events.queue(QuitEvent::new(0).into_ref());
        }

        if !self.events.execute(self.settings.execute_timeout()) {
            debug!(
                tick = self.tick,
                pending = self.events.active_events(),
                "events left for the next tick"
            );
        }

        self.quit.is_running()
    }

    /// Ticks until a quit event is delivered.
    pub async fn run(mut self) -> EngineReport {
        info!(
            "🎮 Engine loop started ({} ms ticks, limit {})",
            self.settings.tick_interval_ms, self.settings.max_ticks
        );

        match self.settings.tick_interval() {
            Some(period) => {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    if !self.tick() {
                        break;
                    }
                }
            }
            None => {
                while self.tick() {
                    tokio::task::yield_now().await;
                }
            }
        }

        self.report()
    }

    pub fn report(&self) -> EngineReport {
        EngineReport {
            ticks: self.tick,
            updates: self.frames.updates(),
            renders: self.frames.renders(),
            exit_code: self.quit.exit_code(),
            events: self.events.stats(),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.events.disconnect(&self.quit, QuitEvent::TYPE);
        self.events.disconnect(&self.frames, UpdateEvent::TYPE);
        self.events.disconnect(&self.frames, RenderEvent::TYPE);
    }
}
