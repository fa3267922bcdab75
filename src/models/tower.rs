//! Radio tower records as read from the sites dataset.

use serde::Deserialize;

use super::Generation;

/// One radio site: operator, Lambert-93 position and the generations it serves.
///
/// Records are created once at load time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TowerRecord {
    /// Operator name exactly as it appears in the dataset
    pub operator: String,
    /// Lambert-93 easting in metres
    pub x: i64,
    /// Lambert-93 northing in metres
    pub y: i64,
    pub has_2g: bool,
    pub has_3g: bool,
    pub has_4g: bool,
}

impl TowerRecord {
    pub fn new(operator: impl Into<String>, x: i64, y: i64, generations: [bool; 3]) -> Self {
        let [has_2g, has_3g, has_4g] = generations;
        Self {
            operator: operator.into(),
            x,
            y,
            has_2g,
            has_3g,
            has_4g,
        }
    }

    /// Case-folded operator key used in coverage maps
    pub fn operator_key(&self) -> String {
        self.operator.to_lowercase()
    }

    /// Whether this tower serves the given generation
    pub fn offers(&self, generation: Generation) -> bool {
        match generation {
            Generation::G2 => self.has_2g,
            Generation::G3 => self.has_3g,
            Generation::G4 => self.has_4g,
        }
    }
}

/// Raw CSV row, header `Operateur,x,y,2G,3G,4G`.
#[derive(Debug, Deserialize)]
pub(crate) struct TowerRow {
    #[serde(rename = "Operateur")]
    pub operator: String,
    pub x: i64,
    pub y: i64,
    #[serde(rename = "2G")]
    pub g2: u8,
    #[serde(rename = "3G")]
    pub g3: u8,
    #[serde(rename = "4G")]
    pub g4: u8,
}

impl TryFrom<TowerRow> for TowerRecord {
    type Error = String;

    fn try_from(row: TowerRow) -> Result<Self, Self::Error> {
        let flag = |column: &str, value: u8| match value {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(format!("column {} must be 0 or 1, got {}", column, other)),
        };

        Ok(Self {
            has_2g: flag("2G", row.g2)?,
            has_3g: flag("3G", row.g3)?,
            has_4g: flag("4G", row.g4)?,
            operator: row.operator,
            x: row.x,
            y: row.y,
        })
    }
}
