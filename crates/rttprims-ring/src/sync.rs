//! Memory ordering of the position words.
//!
//! The probe has no call path into this code and no way to take part in a
//! fence, so the protocol only relies on aligned 32-bit loads and stores being
//! indivisible. By default positions are therefore accessed with `Relaxed`
//! atomics: the compiler may not cache them across a spin loop, but no barrier
//! orders the buffer copy against the position update. That is enough on
//! single-core Cortex-M targets. Weakly-ordered targets (or multi-threaded
//! hosts) enable the `acquire-release` feature to close the gap.

use core::sync::atomic::Ordering;

/// Ordering used when loading the counterpart's position.
#[cfg(not(feature = "acquire-release"))]
pub(crate) const LOAD: Ordering = Ordering::Relaxed;

/// Ordering used when publishing our own position.
#[cfg(not(feature = "acquire-release"))]
pub(crate) const STORE: Ordering = Ordering::Relaxed;

#[cfg(feature = "acquire-release")]
pub(crate) const LOAD: Ordering = Ordering::Acquire;

#[cfg(feature = "acquire-release")]
pub(crate) const STORE: Ordering = Ordering::Release;

/// Our own position is only ever written by us.
pub(crate) const OWN: Ordering = Ordering::Relaxed;
