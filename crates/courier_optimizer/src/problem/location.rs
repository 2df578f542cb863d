use fxhash::FxHashMap;
use geo::Point;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{define_id_newtype, geometry::Positioned};

define_id_newtype!(LocationId);

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Loading,
    Processing,
    Unloading,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Location {
    id: LocationId,
    name: String,
    x: f64,
    y: f64,
    #[serde(rename = "type")]
    kind: LocationKind,
}

impl Location {
    pub fn new(
        id: LocationId,
        name: impl Into<String>,
        x: f64,
        y: f64,
        kind: LocationKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            x,
            y,
            kind,
        }
    }

    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn kind(&self) -> LocationKind {
        self.kind
    }
}

impl Positioned for Location {
    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

pub fn find_by_name<'a>(locations: &'a [Location], name: &str) -> Option<&'a Location> {
    locations.iter().find(|location| location.name == name)
}

/// Name lookup built once per batch. Resolves duplicate names like
/// [`find_by_name`]: the first location wins.
pub struct LocationIndex<'a> {
    by_name: FxHashMap<&'a str, &'a Location>,
}

impl<'a> LocationIndex<'a> {
    pub fn new(locations: &'a [Location]) -> Self {
        let mut by_name = FxHashMap::default();
        for location in locations {
            by_name.entry(location.name()).or_insert(location);
        }

        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&'a Location> {
        self.by_name.get(name).copied()
    }
}
