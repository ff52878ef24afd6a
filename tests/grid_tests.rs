//! Grid geometry through the facade crate

use honeycomb_stack::core::{compute_cell_positions, GameConfig, Grid};
use honeycomb_stack::types::{CellCoord, GridPreset, Point, CELL_SIZE, CELL_SPACING};

#[test]
fn test_preset_cell_positions() {
    let cells = compute_cell_positions(5, 5, CELL_SIZE, CELL_SPACING, Point::new(35.0, 187.0))
        .unwrap();
    assert_eq!(cells.len(), 25);
    assert_eq!(cells[0].center, Point::new(35.0, 187.0));
    assert_eq!(cells[4].center, Point::new(355.0, 187.0));
    assert_eq!(cells[24].center, Point::new(355.0, 507.0));
    assert_eq!(cells[7].coord, CellCoord::new(1, 2));
}

#[test]
fn test_every_preset_builds() {
    for preset in GridPreset::ALL {
        let grid = Grid::from_config(&GameConfig::from_preset(preset)).unwrap();
        assert_eq!(grid.len(), preset.cell_count());
        assert_eq!((grid.rows(), grid.columns()), (preset.rows, preset.columns));
        assert_eq!(grid.center(0), preset.origin);
    }
}

#[test]
fn test_locate_is_fuzzy_within_tolerance() {
    let grid = Grid::from_config(&GameConfig::default()).unwrap();
    assert_eq!(grid.locate(Point::new(115.4, 187.6)), Some(1));
    assert_eq!(grid.locate(Point::new(116.0, 187.0)), None);
}

#[test]
fn test_zero_dimension_grid_is_rejected() {
    assert!(compute_cell_positions(0, 5, CELL_SIZE, CELL_SPACING, Point::default()).is_err());
}
