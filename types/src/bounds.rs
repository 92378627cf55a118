//! Game-defined bounds for every count the engine publishes.

/// Inclusive range a published value must stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u8,
    pub max: u8,
}

impl Bounds {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Clamp a raw (possibly oversized) count into range.
    pub fn clamp(&self, raw: usize) -> u8 {
        let capped = raw.min(self.max as usize) as u8;
        capped.max(self.min)
    }

    pub fn contains(&self, value: u8) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const HAND_BOUNDS: Bounds = Bounds::new(0, 10);
pub const BOARD_BOUNDS: Bounds = Bounds::new(0, 7);
pub const SHOP_BOUNDS: Bounds = Bounds::new(3, 7);
pub const TIER_BOUNDS: Bounds = Bounds::new(1, 6);
