//! Tile document ids of the form `<root>/<data type>/<z>/<x>/<y>`.

use std::str::FromStr;

use crate::error::IdError;

/// Upper bound on the values one coordinate argument may expand to.
pub const MAX_COORDS: usize = 4096;

/// Upper bound on the ids a single [`TileRange`] may produce.
pub const MAX_TILES: usize = 65_536;

/// `Planetoid_<id>`, the collection root every generated document lives under.
pub fn planetoid_root(planetoid_id: i32) -> String {
    format!("Planetoid_{planetoid_id}")
}

/// Ids for one level of detail over a grid of x and y coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRange {
    collection_root: String,
    data_type: String,
    z: u16,
    xs: Vec<i64>,
    ys: Vec<i64>,
}

impl TileRange {
    pub fn new(
        collection_root: impl Into<String>,
        data_type: &str,
        z: u16,
        xs: Vec<i64>,
        ys: Vec<i64>,
    ) -> Result<Self, IdError> {
        let data_type = data_type.trim();
        if data_type.is_empty() {
            return Err(IdError::BlankDataType);
        }

        let count = xs.len().saturating_mul(ys.len());
        if count > MAX_TILES {
            return Err(IdError::TooManyTiles {
                count,
                limit: MAX_TILES,
            });
        }

        Ok(Self {
            collection_root: collection_root.into(),
            data_type: data_type.to_string(),
            z,
            xs,
            ys,
        })
    }

    pub fn len(&self) -> usize {
        self.xs.len() * self.ys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every id, x outermost.
    pub fn ids(&self) -> impl Iterator<Item = String> + '_ {
        self.xs.iter().flat_map(move |x| {
            self.ys.iter().map(move |y| {
                format!(
                    "{}/{}/{}/{x}/{y}",
                    self.collection_root, self.data_type, self.z
                )
            })
        })
    }
}

/// A coordinate list parsed from `"3"`, `"0..4"`, `"0..=11"` or a comma
/// separated mix such as `"0,6..8"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coords(pub Vec<i64>);

impl FromStr for Coords {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IdError::InvalidRange(s.to_string());
        let number = |part: &str| part.trim().parse::<i64>().map_err(|_| invalid());

        let mut coords = Vec::new();
        for part in s.split(',') {
            let (start, end) = if let Some((start, end)) = part.split_once("..=") {
                let (start, end) = (number(start)?, number(end)?);
                if start > end {
                    return Err(IdError::ReversedRange(s.to_string()));
                }
                (start, i128::from(end) + 1)
            } else if let Some((start, end)) = part.split_once("..") {
                let (start, end) = (number(start)?, number(end)?);
                if start > end {
                    return Err(IdError::ReversedRange(s.to_string()));
                }
                (start, i128::from(end))
            } else {
                let value = number(part)?;
                (value, i128::from(value) + 1)
            };

            // Checked in i128 so the full i64 span cannot overflow.
            let span = end - i128::from(start);
            if coords.len() as i128 + span > MAX_COORDS as i128 {
                return Err(IdError::TooManyCoords {
                    input: s.to_string(),
                    limit: MAX_COORDS,
                });
            }
            coords.extend((0..span as i64).map(|offset| start + offset));
        }
        Ok(Coords(coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_iterate_x_outer_y_inner() {
        let range = TileRange::new(
            planetoid_root(8),
            "com.PlanetoidGen.Procedural.HeightMapGrayscaleEncoded",
            0,
            vec![0, 1],
            vec![4, 5],
        )
        .unwrap();

        let ids: Vec<String> = range.ids().collect();
        assert_eq!(range.len(), 4);
        assert_eq!(
            ids,
            [
                "Planetoid_8/com.PlanetoidGen.Procedural.HeightMapGrayscaleEncoded/0/0/4",
                "Planetoid_8/com.PlanetoidGen.Procedural.HeightMapGrayscaleEncoded/0/0/5",
                "Planetoid_8/com.PlanetoidGen.Procedural.HeightMapGrayscaleEncoded/0/1/4",
                "Planetoid_8/com.PlanetoidGen.Procedural.HeightMapGrayscaleEncoded/0/1/5",
            ]
        );
    }

    #[test]
    fn data_type_is_trimmed_and_required() {
        let range = TileRange::new("Planetoid_2", " Satelite ", 12, vec![20], vec![20]).unwrap();
        assert_eq!(range.ids().next().unwrap(), "Planetoid_2/Satelite/12/20/20");

        assert_eq!(
            TileRange::new("Planetoid_2", "  ", 12, vec![], vec![]),
            Err(IdError::BlankDataType)
        );
    }

    #[test]
    fn empty_axis_yields_no_ids() {
        let range = TileRange::new("Planetoid_2", "Satelite", 1, vec![0, 1], vec![]).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.ids().count(), 0);
    }

    #[test]
    fn coords_parse_ranges_and_lists() {
        assert_eq!("3".parse::<Coords>(), Ok(Coords(vec![3])));
        assert_eq!("0..3".parse::<Coords>(), Ok(Coords(vec![0, 1, 2])));
        assert_eq!("0..=2".parse::<Coords>(), Ok(Coords(vec![0, 1, 2])));
        assert_eq!("0, 6..8,11".parse::<Coords>(), Ok(Coords(vec![0, 6, 7, 11])));
        assert_eq!("-1..1".parse::<Coords>(), Ok(Coords(vec![-1, 0])));
    }

    #[test]
    fn coords_reject_reversed_ranges() {
        for input in ["5..2", "5..=4", "0,3..1"] {
            assert_eq!(
                input.parse::<Coords>(),
                Err(IdError::ReversedRange(input.to_string()))
            );
        }
        assert_eq!("2..2".parse::<Coords>(), Ok(Coords(vec![])));
    }

    #[test]
    fn coords_refuse_huge_expansions() {
        for input in [
            "0..=9223372036854775807",
            "-9223372036854775808..9223372036854775807",
            "0..10000000000",
            "0..4096,4096",
        ] {
            assert!(matches!(
                input.parse::<Coords>(),
                Err(IdError::TooManyCoords { limit: MAX_COORDS, .. })
            ));
        }
        assert_eq!("0..4096".parse::<Coords>().unwrap().0.len(), MAX_COORDS);
        assert_eq!(
            "9223372036854775807".parse::<Coords>(),
            Ok(Coords(vec![i64::MAX]))
        );
    }

    #[test]
    fn tile_range_caps_the_grid() {
        let xs: Vec<i64> = (0..300).collect();
        let ys: Vec<i64> = (0..300).collect();
        assert_eq!(
            TileRange::new("Planetoid_1", "T", 0, xs, ys),
            Err(IdError::TooManyTiles {
                count: 90_000,
                limit: MAX_TILES
            })
        );
    }

    #[test]
    fn coords_reject_garbage() {
        for input in ["", "a", "0..", "1,,2", "0..=x"] {
            assert_eq!(
                input.parse::<Coords>(),
                Err(IdError::InvalidRange(input.to_string()))
            );
        }
    }
}
