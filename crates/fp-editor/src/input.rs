//! Input abstraction layer.
//!
//! Normalizes mouse and touch events into a unified `PointerEvent`
//! consumed by the gesture engine. Coordinates are viewport pixels;
//! `time_ms` is a monotonic timestamp from the host platform, used for
//! double-tap detection.

/// A normalized pointer event from any pointing device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer pressed (mouse down, touch start).
    Down { x: f32, y: f32, time_ms: f64 },

    /// Pointer moved while pressed.
    Move { x: f32, y: f32, time_ms: f64 },

    /// Pointer released.
    Up { x: f32, y: f32, time_ms: f64 },
}

impl PointerEvent {
    pub fn down(x: f32, y: f32, time_ms: f64) -> Self {
        Self::Down { x, y, time_ms }
    }

    pub fn moved(x: f32, y: f32, time_ms: f64) -> Self {
        Self::Move { x, y, time_ms }
    }

    pub fn up(x: f32, y: f32, time_ms: f64) -> Self {
        Self::Up { x, y, time_ms }
    }

    /// The event's viewport position.
    pub fn position(&self) -> (f32, f32) {
        match *self {
            Self::Down { x, y, .. } | Self::Move { x, y, .. } | Self::Up { x, y, .. } => (x, y),
        }
    }

    pub fn time_ms(&self) -> f64 {
        match *self {
            Self::Down { time_ms, .. } | Self::Move { time_ms, .. } | Self::Up { time_ms, .. } => {
                time_ms
            }
        }
    }
}
