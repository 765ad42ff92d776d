use super::constants::{
    INITIAL_ZONE_RADIUS, MIN_ZONE_RADIUS, SHRINK_AMOUNT, SHRINK_INTERVAL_MS, SHRINK_WARNING_MS,
};
use super::math::{cell_in_zone, distance_from_center};
use super::types::{Cell, Point, SafeZone};

impl SafeZone {
    pub fn new(now: i64) -> Self {
        Self {
            radius: INITIAL_ZONE_RADIUS,
            shrinking: false,
            next_shrink_at: now + SHRINK_INTERVAL_MS,
        }
    }

    pub fn schedule_from(&mut self, now: i64) {
        self.shrinking = false;
        self.next_shrink_at = now + SHRINK_INTERVAL_MS;
    }

    pub fn at_floor(&self) -> bool {
        self.radius <= MIN_ZONE_RADIUS
    }

    /// Shrinks by one step when the deadline has passed. Returns whether the radius changed.
    pub fn try_shrink(&mut self, now: i64) -> bool {
        if now < self.next_shrink_at || self.at_floor() {
            return false;
        }
        self.radius = (self.radius - SHRINK_AMOUNT).max(MIN_ZONE_RADIUS);
        self.shrinking = false;
        // Advance from the old deadline so tick jitter does not accumulate.
        self.next_shrink_at += SHRINK_INTERVAL_MS;
        if self.next_shrink_at <= now {
            self.next_shrink_at = now + SHRINK_INTERVAL_MS;
        }
        true
    }

    /// Raises `shrinking` during the warning window before a pending shrink.
    /// Returns whether the flag flipped.
    pub fn refresh_warning(&mut self, now: i64) -> bool {
        let warn = !self.at_floor() && self.next_shrink_at - now <= SHRINK_WARNING_MS;
        if warn == self.shrinking {
            return false;
        }
        self.shrinking = warn;
        true
    }

    pub fn seconds_until_shrink(&self, now: i64) -> Option<i64> {
        if self.at_floor() {
            return None;
        }
        let remaining = (self.next_shrink_at - now).max(0);
        Some((remaining + 999) / 1000)
    }

    pub fn contains_cell(&self, cell: Cell) -> bool {
        cell_in_zone(cell, self.radius)
    }

    pub fn contains_point(&self, point: Point) -> bool {
        distance_from_center(point.x, point.y) <= self.radius
    }
}
