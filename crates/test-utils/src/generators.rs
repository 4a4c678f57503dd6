//! Test data generators for creating synthetic tree inventories.
//!
//! These generators create predictable, verifiable feature sets that can be
//! used across the test suite.

use canopy_common::{BoundingBox, FeatureSet};

use crate::fixtures::{time, FeatureBuilder};

const GENERA: [&str; 4] = ["Acer", "Quercus", "Prunus", "Tilia"];
const STATUSES: [&str; 3] = ["INSVC", "INSVC", "PLANNED"];
const OWNERS: [&str; 2] = ["SDOT", "PRIV"];

/// Creates a `cols` x `rows` grid of trees evenly spread over `bbox`.
///
/// Feature `i` (row-major, starting at id 1) gets:
/// - genus `GENERA[i % 4]`, status `STATUSES[i % 3]`, ownership `OWNERS[i % 2]`
/// - diameter `i % 30` inches (so every 30th tree has no usable diameter)
/// - condition rating `i % 6` (so bucket "0" is out of domain)
/// - planted `i % 50` years before the reference time
///
/// # Example
///
/// ```
/// use canopy_common::BoundingBox;
/// use test_utils::grid_of_trees;
///
/// let set = grid_of_trees(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 10, 5);
/// assert_eq!(set.len(), 50);
/// ```
pub fn grid_of_trees(bbox: BoundingBox, cols: usize, rows: usize) -> FeatureSet {
    let dx = bbox.width() / cols.max(1) as f64;
    let dy = bbox.height() / rows.max(1) as f64;

    let mut features = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let i = row * cols + col;
            let lon = bbox.west + (col as f64 + 0.5) * dx;
            let lat = bbox.south + (row as f64 + 0.5) * dy;
            features.push(
                FeatureBuilder::new(i as i64 + 1)
                    .at(lon, lat)
                    .genus(GENERA[i % GENERA.len()])
                    .status(STATUSES[i % STATUSES.len()])
                    .ownership(OWNERS[i % OWNERS.len()])
                    .diameter((i % 30) as f64)
                    .condition(&(i % 6).to_string())
                    .planted_ms(time::planted_years_ago((i % 50) as f64))
                    .build(),
            );
        }
    }
    FeatureSet::new(features)
}
