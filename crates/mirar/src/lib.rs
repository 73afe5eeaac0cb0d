//! Mirar: frame-synchronized visual assertions for render-loop applications
//!
//! Mirar (Spanish: "to look/watch") lets a test thread drive a real-time
//! update/draw loop: rendezvous with frame boundaries, search the latest
//! frame for rendered text or a bitmap, and inject clicks and key combos at
//! a safe point of the frame lifecycle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       MIRAR Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  test thread                        render loop (host-driven)    │
//! │  ───────────                        ──────────────────────────   │
//! │  should("Click Me")                 update: cancel? commit?      │
//! │    │  ping ───────────────────────▶ draw:  render, publish,      │
//! │    │◀──────────────────── pong ───        inject, complete       │
//! │    ▼                                                             │
//! │  ScreenBuffer ──▶ matcher ──▶ Selector ──▶ click()/key_tap()     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut harness = mirar::run(game, Options::new().with_font(face))?;
//! let button = harness.must("Click Me")?;
//! button.click();
//! harness.must("Clicked Me")?;
//! harness.close();
//! ```
//!
//! The two threads coordinate exclusively through single-slot rendezvous
//! signals; the render loop never blocks on the tester. Assertions are
//! strictly one-at-a-time; concurrent assertions are not supported.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays))]

mod dump;
mod frame;
mod geometry;
mod harness;
mod host;
mod input;
mod key;
pub mod matcher;
mod pattern;
mod pixel;
mod rendezvous;
mod result;
mod selector;
mod sequencer;
mod text;

pub use frame::{Frame, ScreenBuffer};
pub use geometry::{Point, Rect};
pub use harness::{run, run_with_host, Harness, Options};
pub use host::{Game, HeadlessHost, InstrumentedGame, RenderHost};
pub use input::{InputInjector, InputState, MouseButton, PendingAction, SyntheticInput};
pub use key::Key;
pub use pattern::Pattern;
pub use pixel::{is_wildcard, rgb_equal, to_straight, AlphaMode};
pub use rendezvous::Rendezvous;
pub use result::{MirarError, MirarResult};
pub use selector::{Selector, SelectorSpec};
pub use sequencer::ActionSequencer;
pub use text::{text_pattern, FontFace};
