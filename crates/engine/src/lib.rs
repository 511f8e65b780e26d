//! Engine module - action dispatch and hints for controllers
//!
//! Controllers speak in [`GameAction`](tile_match_types::GameAction)s.
//! [`apply_action`] maps each one onto the matching session call, and
//! [`hint`] suggests the swap with the largest immediate clear.

pub mod dispatch;
pub mod hint;

pub use dispatch::{apply_action, ActionResult};
pub use hint::{hint, hints, Hint};
