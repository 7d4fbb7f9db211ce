//! Staring-contest session lifecycle.
//!
//! The game is a single timed session: the player starts it, holds their
//! gaze on the camera for as long as they can, and the session ends the
//! moment they look away. Natural blinks do not end the game by default.
//!
//! ## States
//!
//! 1. **IDLE** - Waiting for the player to start
//! 2. **RUNNING** - Gaze session active, clock running
//! 3. **ENDED** - Game over; the frozen clock is the score
//!
//! ## State Transitions
//!
//! ```text
//!                     start                gaze averted
//!        ┌──────┐ ───────────► ┌─────────┐ ───────────► ┌───────┐
//!        │ IDLE │              │ RUNNING │              │ ENDED │
//!        └──────┘ ◄─────────── └─────────┘              └───────┘
//!            ▲        reset      │      ▲                   │
//!            │                   └──────┘                   │
//!            │              gazing / blinking edges         │
//!            │                 (clock keeps running)        │
//!            │                        reset                 │
//!            └──────────────────────────────────────────────┘
//! ```
//!
//! With the strict blink rule enabled (`end_on_blink`), a pure-blink edge
//! also moves RUNNING to ENDED.
//!
//! ## Events
//!
//! Subscribers receive a [`manager::SessionChange`] on every transition,
//! carrying the previous/new state, the reason, and, when the session just
//! ended, the final elapsed time for score submission.

pub mod manager;
pub mod session;
pub mod stopwatch;

pub use manager::{GameManager, GameStatus, SessionChange};
pub use session::{SessionEvent, SessionState, SessionStateMachine, TransitionReason};
pub use stopwatch::{format_elapsed, Stopwatch};
