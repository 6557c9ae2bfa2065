//! Tile-grid layout of the Brazilian states for the choropleth.
//!
//! Each state is one equal-sized tile placed roughly where it sits on the
//! map, so small north-eastern states stay readable.

/// Half the side of a tile, in grid units.
pub const TILE_HALF: f64 = 0.46;

/// (code, column, row) with row 0 at the top.
const TILES: [(&str, u8, u8); 27] = [
    ("RR", 2, 0),
    ("AP", 4, 0),
    ("AM", 2, 1),
    ("PA", 3, 1),
    ("MA", 4, 1),
    ("CE", 5, 1),
    ("RN", 6, 1),
    ("AC", 1, 2),
    ("RO", 2, 2),
    ("TO", 3, 2),
    ("PI", 4, 2),
    ("PE", 5, 2),
    ("PB", 6, 2),
    ("MT", 2, 3),
    ("GO", 3, 3),
    ("BA", 4, 3),
    ("SE", 5, 3),
    ("AL", 6, 3),
    ("MS", 2, 4),
    ("DF", 3, 4),
    ("MG", 4, 4),
    ("ES", 5, 4),
    ("SP", 3, 5),
    ("RJ", 4, 5),
    ("PR", 3, 6),
    ("SC", 3, 7),
    ("RS", 3, 8),
];

/// Plot coordinates of a state's tile centre, or `None` for an unknown code.
/// Codes are matched case-insensitively.
pub fn tile_position(code: &str) -> Option<[f64; 2]> {
    let code = code.trim();
    TILES
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|&(_, col, row)| [f64::from(col), -f64::from(row)])
}

/// Corners of the tile centred on `centre`, counter-clockwise.
pub fn tile_corners([x, y]: [f64; 2]) -> Vec<[f64; 2]> {
    vec![
        [x - TILE_HALF, y - TILE_HALF],
        [x + TILE_HALF, y - TILE_HALF],
        [x + TILE_HALF, y + TILE_HALF],
        [x - TILE_HALF, y + TILE_HALF],
    ]
}
