use super::constants::{GRID_CENTER, GRID_SIZE};
use super::types::{Cell, Point};

pub fn wrap_axis(value: i32) -> i32 {
    value.rem_euclid(GRID_SIZE)
}

pub fn wrap_cell(cell: Cell) -> Cell {
    Cell {
        x: wrap_axis(cell.x),
        y: wrap_axis(cell.y),
    }
}

pub fn distance_from_center(x: f64, y: f64) -> f64 {
    ((x - GRID_CENTER).powi(2) + (y - GRID_CENTER).powi(2)).sqrt()
}

pub fn cell_distance_from_center(cell: Cell) -> f64 {
    distance_from_center(cell.x as f64, cell.y as f64)
}

pub fn cell_in_zone(cell: Cell, radius: f64) -> bool {
    cell_distance_from_center(cell) <= radius
}

pub fn in_grid_bounds(point: Point) -> bool {
    let size = GRID_SIZE as f64;
    point.x >= 0.0 && point.y >= 0.0 && point.x < size && point.y < size
}

pub fn floor_cell(point: Point) -> Cell {
    Cell {
        x: point.x.floor() as i32,
        y: point.y.floor() as i32,
    }
}
