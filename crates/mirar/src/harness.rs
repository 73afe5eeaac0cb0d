//! The harness: runs a game under instrumentation and asserts against its
//! frames.

use crate::dump::DumpSink;
use crate::frame::{Frame, ScreenBuffer};
use crate::host::{Game, HeadlessHost, InstrumentedGame, RenderHost};
use crate::input::{InputInjector, PendingAction, SyntheticInput};
use crate::key::Key;
use crate::matcher;
use crate::pattern::Pattern;
use crate::pixel::AlphaMode;
use crate::rendezvous::Rendezvous;
use crate::result::{MirarError, MirarResult};
use crate::selector::{Selector, SelectorSpec};
use crate::sequencer::ActionSequencer;
use crate::text::{text_pattern, FontFace};
use image::Rgba;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

const DEFAULT_DUMP_DIR: &str = "_mirar_dump";

/// Harness configuration
pub struct Options {
    font: Option<Arc<dyn FontFace>>,
    color: Rgba<u8>,
    dump_failures: bool,
    dump_dir: PathBuf,
    tick_rate: u32,
    available: (u32, u32),
    frame_alpha: AlphaMode,
    injector: Option<Box<dyn InputInjector>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            font: None,
            color: Rgba([255, 255, 255, 255]),
            dump_failures: false,
            dump_dir: PathBuf::from(DEFAULT_DUMP_DIR),
            tick_rate: 60,
            available: (640, 480),
            frame_alpha: AlphaMode::Straight,
            injector: None,
        }
    }
}

impl Options {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Font face used to render text selectors
    #[must_use]
    pub fn with_font(mut self, face: impl FontFace + 'static) -> Self {
        self.font = Some(Arc::new(face));
        self
    }

    /// Color text selectors are rendered in (default white)
    #[must_use]
    pub const fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    /// Write a debug image per failed assertion.
    ///
    /// The dump directory is recreated empty when the harness starts.
    #[must_use]
    pub const fn with_failure_dumps(mut self) -> Self {
        self.dump_failures = true;
        self
    }

    /// Directory for failure artifacts (implies nothing by itself; see
    /// [`with_failure_dumps`](Self::with_failure_dumps))
    #[must_use]
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dir.into();
        self
    }

    /// Render-loop cadence in ticks per second (default 60)
    #[must_use]
    pub fn with_tick_rate(mut self, ticks_per_second: u32) -> Self {
        self.tick_rate = ticks_per_second.max(1);
        self
    }

    /// Available size handed to the game's layout (default 640x480)
    #[must_use]
    pub const fn with_available_size(mut self, width: u32, height: u32) -> Self {
        self.available = (width, height);
        self
    }

    /// Alpha encoding of the frames the game draws (default straight)
    #[must_use]
    pub const fn with_frame_alpha(mut self, alpha: AlphaMode) -> Self {
        self.frame_alpha = alpha;
        self
    }

    /// Replace the input injector.
    ///
    /// Defaults to the headless host's loopback input; pass an OS-level
    /// injector when the game runs in a real window.
    #[must_use]
    pub fn with_injector(mut self, injector: Box<dyn InputInjector>) -> Self {
        self.injector = Some(injector);
        self
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("font", &self.font.as_ref().map(|_| "<font face>"))
            .field("color", &self.color)
            .field("dump_failures", &self.dump_failures)
            .field("dump_dir", &self.dump_dir)
            .field("tick_rate", &self.tick_rate)
            .field("available", &self.available)
            .field("frame_alpha", &self.frame_alpha)
            .finish_non_exhaustive()
    }
}

/// Start a game under the harness on the built-in headless host.
///
/// Blocks until the first frame has been drawn, so every subsequent
/// assertion has a screen to look at.
pub fn run<G: Game + 'static>(game: G, mut options: Options) -> MirarResult<Harness> {
    let host = HeadlessHost::new()
        .with_tick_rate(options.tick_rate)
        .with_available_size(options.available.0, options.available.1);
    if options.injector.is_none() {
        options.injector = Some(Box::new(host.input()));
    }
    run_with_host(game, host, options)
}

/// Start a game under the harness on a caller-supplied host.
///
/// A host driving a real window should bring an OS-level injector via
/// [`Options::with_injector`]; without one, injected input goes to a
/// loopback store nothing samples.
pub fn run_with_host<G, H>(game: G, host: H, mut options: Options) -> MirarResult<Harness>
where
    G: Game + 'static,
    H: RenderHost + Send + 'static,
{
    let dump = if options.dump_failures {
        Some(DumpSink::create(&options.dump_dir)?)
    } else {
        None
    };

    let screen = Arc::new(ScreenBuffer::new());
    let rendezvous = Arc::new(Rendezvous::new());
    let actions = Arc::new(ActionSequencer::new());
    let cancel = Arc::new(AtomicBool::new(false));

    let injector = options
        .injector
        .take()
        .unwrap_or_else(|| Box::new(SyntheticInput::new()));
    let instrumented = InstrumentedGame::new(
        game,
        Arc::clone(&screen),
        Arc::clone(&rendezvous),
        Arc::clone(&actions),
        Arc::clone(&cancel),
        injector,
        options.frame_alpha,
    );

    tracing::info!(tick_rate = options.tick_rate, "starting render loop");
    let thread = std::thread::spawn(move || host.run(instrumented));

    let harness = Harness {
        screen,
        rendezvous,
        actions,
        cancel,
        thread: Some(thread),
        font: options.font,
        color: options.color,
        dump,
    };
    // Synchronize with the first drawn frame
    harness.rendezvous.ping();
    Ok(harness)
}

/// Handle to a running instrumented game.
///
/// All assertions rendezvous with the render loop first, so they observe a
/// frame drawn after every previously confirmed action. Operations are
/// strictly one-at-a-time; the harness is not meant to be shared across
/// concurrently asserting threads.
pub struct Harness {
    screen: Arc<ScreenBuffer>,
    rendezvous: Arc<Rendezvous>,
    actions: Arc<ActionSequencer>,
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    font: Option<Arc<dyn FontFace>>,
    color: Rgba<u8>,
    dump: Option<DumpSink>,
}

impl Harness {
    /// Assert the selector is present. Non-fatal: a miss is reported in the
    /// return value and logged, with a debug artifact when enabled.
    pub fn should(&self, spec: impl Into<SelectorSpec>) -> MirarResult<(Selector, bool)> {
        let (selector, frame) = self.locate(spec.into())?;
        let found = selector.is_matched();
        if !found {
            let detail = self.dump_failure("should", &selector, frame.as_deref())?;
            tracing::error!("selector not found{detail}");
        }
        Ok((selector, found))
    }

    /// Assert the selector is absent. Non-fatal counterpart of
    /// [`must_not`](Self::must_not).
    pub fn should_not(&self, spec: impl Into<SelectorSpec>) -> MirarResult<bool> {
        let (selector, frame) = self.locate(spec.into())?;
        if selector.is_matched() {
            let detail = self.dump_failure("should_not", &selector, frame.as_deref())?;
            tracing::error!(rect = ?selector.rect(), "selector unexpectedly found{detail}");
            return Ok(false);
        }
        Ok(true)
    }

    /// Assert the selector is present; a miss aborts via
    /// [`AssertionFailed`](MirarError::AssertionFailed).
    pub fn must(&self, spec: impl Into<SelectorSpec>) -> MirarResult<Selector> {
        let (selector, frame) = self.locate(spec.into())?;
        if !selector.is_matched() {
            let detail = self.dump_failure("must", &selector, frame.as_deref())?;
            return Err(MirarError::assertion(format!(
                "selector not found{detail}"
            )));
        }
        Ok(selector)
    }

    /// Assert the selector is absent; a find aborts via
    /// [`AssertionFailed`](MirarError::AssertionFailed).
    pub fn must_not(&self, spec: impl Into<SelectorSpec>) -> MirarResult<()> {
        let (selector, frame) = self.locate(spec.into())?;
        if selector.is_matched() {
            let detail = self.dump_failure("must_not", &selector, frame.as_deref())?;
            return Err(MirarError::assertion(format!(
                "selector unexpectedly found{detail}"
            )));
        }
        Ok(())
    }

    /// Every match of the selector on the current frame, overlaps included
    pub fn get_all(&self, spec: impl Into<SelectorSpec>) -> MirarResult<Vec<Selector>> {
        let pattern = self.resolve(spec.into())?;
        self.rendezvous.ping();
        let Some(frame) = self.screen.latest() else {
            return Ok(Vec::new());
        };
        Ok(matcher::find_all(&frame, &pattern)
            .into_iter()
            .map(|rect| Selector::new(pattern.clone(), Some(rect), Arc::clone(&self.actions)))
            .collect())
    }

    /// Tap all given keys as one simultaneous combo.
    ///
    /// Blocks until the render loop has executed the tap. An empty key list
    /// is a no-op.
    pub fn key_tap(&self, keys: &[Key]) -> MirarResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        self.actions.request(PendingAction::key_combo(keys));
        Ok(())
    }

    /// Stop the render loop and wait for it to exit.
    ///
    /// Must only be called while no rendezvous is outstanding; a ping left
    /// unserved after termination would block its caller permanently.
    pub fn close(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("render loop thread panicked");
            } else {
                tracing::info!("render loop stopped");
            }
        }
    }

    fn resolve(&self, spec: SelectorSpec) -> MirarResult<Pattern> {
        let pattern = match spec {
            SelectorSpec::Text(text) => {
                let face = self.font.as_ref().ok_or_else(|| {
                    MirarError::config("text selector requires a font face, see Options::with_font")
                })?;
                text_pattern(face.as_ref(), &text, self.color)
            }
            SelectorSpec::Image(image) => Pattern::new(image),
            SelectorSpec::Pattern(pattern) => pattern,
        };
        if pattern.is_empty() {
            return Err(MirarError::config("selector pattern has no pixels"));
        }
        Ok(pattern)
    }

    fn locate(&self, spec: SelectorSpec) -> MirarResult<(Selector, Option<Arc<Frame>>)> {
        let pattern = self.resolve(spec)?;
        self.rendezvous.ping();
        let frame = self.screen.latest();
        let rect = frame.as_ref().and_then(|frame| matcher::find(frame, &pattern));
        Ok((
            Selector::new(pattern, rect, Arc::clone(&self.actions)),
            frame,
        ))
    }

    fn dump_failure(
        &self,
        assertion: &str,
        selector: &Selector,
        frame: Option<&Frame>,
    ) -> MirarResult<String> {
        let (Some(sink), Some(frame)) = (self.dump.as_ref(), frame) else {
            return Ok(String::new());
        };
        let path = sink.write(assertion, frame, selector.pattern(), selector.rect())?;
        Ok(format!("\nimage at: {}", path.display()))
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("running", &self.thread.is_some())
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}
