//! Render-loop integration: the application seam and the loop drivers.

use crate::frame::ScreenBuffer;
use crate::input::{InputInjector, InputState, MouseButton, PendingAction};
use crate::pixel::AlphaMode;
use crate::rendezvous::Rendezvous;
use crate::sequencer::ActionSequencer;
use image::RgbaImage;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The application under test.
///
/// Mirrors the usual real-time loop contract: `layout` sizes the render
/// surface, `update` advances one tick of simulation from the tick's input
/// snapshot, `draw` renders the current state. Returning
/// `ControlFlow::Break` from `update` ends the loop.
pub trait Game: Send {
    /// Choose the surface size given the available space
    fn layout(&mut self, avail_width: u32, avail_height: u32) -> (u32, u32);

    /// Advance one tick; break to terminate the loop
    fn update(&mut self, input: &InputState) -> ControlFlow<()>;

    /// Render the current state into the surface
    fn draw(&mut self, surface: &mut RgbaImage);
}

/// A [`Game`] wrapped with the harness plumbing.
///
/// The wrapper owns the per-frame ordering that the whole design relies on:
///
/// * update: cancellation check, then the staged-action decision (a click is
///   always ready; a key combo only once every key reads as held), then the
///   inner update.
/// * draw: inner draw, publish the frame, serve an outstanding rendezvous,
///   hold down the keys of a staged combo, dispatch the committed action and
///   signal its completion.
///
/// Custom engine integrations drive these three methods exactly like
/// [`HeadlessHost`] does.
pub struct InstrumentedGame<G> {
    game: G,
    screen: Arc<ScreenBuffer>,
    rendezvous: Arc<Rendezvous>,
    actions: Arc<ActionSequencer>,
    cancel: Arc<AtomicBool>,
    injector: Box<dyn InputInjector>,
    frame_alpha: AlphaMode,
    /// Keys currently held down on behalf of a staged combo
    armed: Vec<crate::key::Key>,
}

impl<G: Game> InstrumentedGame<G> {
    pub(crate) fn new(
        game: G,
        screen: Arc<ScreenBuffer>,
        rendezvous: Arc<Rendezvous>,
        actions: Arc<ActionSequencer>,
        cancel: Arc<AtomicBool>,
        injector: Box<dyn InputInjector>,
        frame_alpha: AlphaMode,
    ) -> Self {
        Self {
            game,
            screen,
            rendezvous,
            actions,
            cancel,
            injector,
            frame_alpha,
            armed: Vec::new(),
        }
    }

    /// Forwarded to the inner game
    pub fn layout(&mut self, avail_width: u32, avail_height: u32) -> (u32, u32) {
        self.game.layout(avail_width, avail_height)
    }

    /// One update tick: cancellation, action decision, inner update
    pub fn update(&mut self, input: &InputState) -> ControlFlow<()> {
        if self.cancel.load(Ordering::SeqCst) {
            tracing::info!("cancellation requested, stopping render loop");
            return ControlFlow::Break(());
        }
        if let Some(action) = self.actions.staged() {
            if action_ready(&action, input) {
                self.actions.commit();
            }
        }
        self.game.update(input)
    }

    /// One draw pass: render, publish, rendezvous, inject
    pub fn draw(&mut self, surface: &mut RgbaImage) {
        self.game.draw(surface);
        let sequence = self.screen.publish(surface.clone(), self.frame_alpha);
        if self.rendezvous.pong() {
            tracing::debug!(sequence, "rendezvous served");
        }
        self.arm_staged_combo();
        self.dispatch_committed();
    }

    /// Hold down the keys of a staged combo so the next update can observe
    /// them all held and commit.
    fn arm_staged_combo(&mut self) {
        let Some(PendingAction::KeyCombo { keys }) = self.actions.staged() else {
            return;
        };
        for key in keys {
            if !self.armed.contains(&key) {
                if let Err(err) = self.injector.key_down(key) {
                    tracing::error!(%key, %err, "key press injection failed");
                }
                self.armed.push(key);
            }
        }
    }

    /// Execute the committed action and signal completion.
    ///
    /// Injection failures are logged and completion is still signaled: a
    /// broken injector must not strand the blocked requester.
    fn dispatch_committed(&mut self) {
        let Some(action) = self.actions.committed() else {
            return;
        };
        match action {
            PendingAction::Click { x, y } => {
                if let Err(err) = self.injector.pointer_move(x, y) {
                    tracing::error!(x, y, %err, "pointer move injection failed");
                }
                if let Err(err) = self.injector.click(MouseButton::Left) {
                    tracing::error!(x, y, %err, "click injection failed");
                }
            }
            PendingAction::KeyCombo { .. } => {
                for key in std::mem::take(&mut self.armed).into_iter().rev() {
                    if let Err(err) = self.injector.key_up(key) {
                        tracing::error!(%key, %err, "key release injection failed");
                    }
                }
            }
        }
        self.actions.complete();
    }
}

/// Something that can drive an instrumented game's loop to termination
pub trait RenderHost {
    /// Run update/draw ticks until the game's update breaks
    fn run<G: Game>(self, game: InstrumentedGame<G>);
}

/// Fixed-cadence loop driver for headless runs.
///
/// Samples a [`SyntheticInput`](crate::SyntheticInput) every tick, so input
/// injected by the harness loops back into the game exactly like OS events
/// would. Layout happens once, before the first tick.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    tick_rate: u32,
    available: (u32, u32),
    input: crate::input::SyntheticInput,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Create a host at 60 ticks per second with a 640x480 surface
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_rate: 60,
            available: (640, 480),
            input: crate::input::SyntheticInput::new(),
        }
    }

    /// Set the tick rate (minimum 1 tick per second)
    #[must_use]
    pub fn with_tick_rate(mut self, ticks_per_second: u32) -> Self {
        self.tick_rate = ticks_per_second.max(1);
        self
    }

    /// Set the available size passed to the game's layout
    #[must_use]
    pub const fn with_available_size(mut self, width: u32, height: u32) -> Self {
        self.available = (width, height);
        self
    }

    /// Handle to the host's loopback input
    #[must_use]
    pub fn input(&self) -> crate::input::SyntheticInput {
        self.input.clone()
    }
}

impl RenderHost for HeadlessHost {
    fn run<G: Game>(self, mut game: InstrumentedGame<G>) {
        let (width, height) = game.layout(self.available.0, self.available.1);
        let mut surface = RgbaImage::new(width.max(1), height.max(1));
        let period = Duration::from_secs(1) / self.tick_rate;

        loop {
            let tick_started = Instant::now();
            let input = self.input.sample();
            if game.update(&input).is_break() {
                break;
            }
            game.draw(&mut surface);
            if let Some(remaining) = period.checked_sub(tick_started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }
}

fn action_ready(action: &PendingAction, input: &InputState) -> bool {
    match action {
        PendingAction::Click { .. } => true,
        PendingAction::KeyCombo { keys } => keys.iter().all(|key| input.is_held(*key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SyntheticInput;
    use crate::key::Key;
    use image::Rgba;
    use std::thread;

    /// Fills the surface with a color and stops after a fixed tick count
    struct SolidGame {
        color: Rgba<u8>,
        ticks_left: u32,
    }

    impl Game for SolidGame {
        fn layout(&mut self, _w: u32, _h: u32) -> (u32, u32) {
            (8, 8)
        }

        fn update(&mut self, _input: &InputState) -> ControlFlow<()> {
            if self.ticks_left == 0 {
                return ControlFlow::Break(());
            }
            self.ticks_left -= 1;
            ControlFlow::Continue(())
        }

        fn draw(&mut self, surface: &mut RgbaImage) {
            for px in surface.pixels_mut() {
                *px = self.color;
            }
        }
    }

    fn instrumented(
        game: SolidGame,
        injector: Box<dyn InputInjector>,
    ) -> (
        InstrumentedGame<SolidGame>,
        Arc<ScreenBuffer>,
        Arc<ActionSequencer>,
        Arc<AtomicBool>,
    ) {
        let screen = Arc::new(ScreenBuffer::new());
        let actions = Arc::new(ActionSequencer::new());
        let cancel = Arc::new(AtomicBool::new(false));
        let game = InstrumentedGame::new(
            game,
            Arc::clone(&screen),
            Arc::new(Rendezvous::new()),
            Arc::clone(&actions),
            Arc::clone(&cancel),
            injector,
            AlphaMode::Straight,
        );
        (game, screen, actions, cancel)
    }

    #[test]
    fn test_headless_host_runs_to_termination() {
        let game = SolidGame {
            color: Rgba([7, 7, 7, 255]),
            ticks_left: 3,
        };
        let (game, screen, _actions, _cancel) = instrumented(game, Box::new(SyntheticInput::new()));
        HeadlessHost::new().with_tick_rate(1000).run(game);

        let frame = screen.latest().unwrap();
        assert_eq!(frame.sequence(), 3);
        assert_eq!(frame.width(), 8);
    }

    #[test]
    fn test_cancellation_breaks_before_inner_update() {
        let game = SolidGame {
            color: Rgba([0, 0, 0, 255]),
            ticks_left: u32::MAX,
        };
        let (game, screen, _actions, cancel) = instrumented(game, Box::new(SyntheticInput::new()));
        cancel.store(true, Ordering::SeqCst);
        HeadlessHost::new().with_tick_rate(1000).run(game);
        // Broke on the very first tick, before any draw
        assert!(screen.latest().is_none());
    }

    #[test]
    fn test_click_request_completes_and_loops_back() {
        let game = SolidGame {
            color: Rgba([1, 2, 3, 255]),
            ticks_left: u32::MAX,
        };
        let host = HeadlessHost::new().with_tick_rate(1000);
        // The injector must write the same loopback state the host samples
        let probe = host.input();
        let (game, _screen, actions, cancel) = instrumented(game, Box::new(host.input()));
        let loop_thread = thread::spawn(move || host.run(game));

        actions.request(PendingAction::click(5, 6));
        let state = probe.sample();
        assert_eq!(state.cursor(), crate::geometry::Point::new(5, 6));

        cancel.store(true, Ordering::SeqCst);
        loop_thread.join().unwrap();
    }

    #[test]
    fn test_key_combo_arms_commits_and_releases() {
        let game = SolidGame {
            color: Rgba([1, 2, 3, 255]),
            ticks_left: u32::MAX,
        };
        let host = HeadlessHost::new().with_tick_rate(1000);
        let probe = host.input();
        let (game, _screen, actions, cancel) = instrumented(game, Box::new(host.input()));
        let loop_thread = thread::spawn(move || host.run(game));

        actions.request(PendingAction::key_combo([Key::ControlLeft, Key::S]));
        // After completion every armed key has been released again
        assert!(probe.sample().held_keys().is_empty());

        cancel.store(true, Ordering::SeqCst);
        loop_thread.join().unwrap();
    }
}
