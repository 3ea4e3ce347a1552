//! Recommendation parameters for the Spotify recommendations endpoint.
//!
//! [`RecommendationParams`] is produced either from a language model response
//! (see [`RecommendationParams::from_llm_value`]) or built by hand for seeded
//! lookups such as similar tracks. It serializes into the query string of
//! `GET /recommendations`.

pub mod schema;

use std::{collections::BTreeMap, fmt};

use serde_json::{Map, Value};

use crate::{
    debug,
    genres::{self, MAX_SEED_GENRES},
};
use schema::{AUDIO_FEATURES, AudioFeature, FEATURE_PREFIXES, FeatureKind};

/// Spotify accepts between 1 and 100 recommended tracks per request.
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    NotAnObject,
    MissingField(String),
    WrongType { field: String, expected: &'static str },
    OutOfRange { field: String, value: f64 },
    UnknownFeature(String),
    NoGenreSeeds,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::NotAnObject => write!(f, "response is not a JSON object"),
            SchemaError::MissingField(field) => write!(f, "field '{}' is missing", field),
            SchemaError::WrongType { field, expected } => {
                write!(f, "field '{}' is not a {}", field, expected)
            }
            SchemaError::OutOfRange { field, value } => {
                write!(f, "field '{}' is out of range: {}", field, value)
            }
            SchemaError::UnknownFeature(name) => write!(f, "unknown audio feature '{}'", name),
            SchemaError::NoGenreSeeds => write!(f, "no valid genre seeds in response"),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Lower bound, upper bound and target value of one audio feature.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub target: Option<f64>,
}

impl FeatureRange {
    pub fn new(min: f64, max: f64, target: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            target: Some(target),
        }
    }

    fn get(&self, prefix: &str) -> Option<f64> {
        match prefix {
            "min" => self.min,
            "max" => self.max,
            _ => self.target,
        }
    }

    fn set(&mut self, prefix: &str, value: f64) {
        match prefix {
            "min" => self.min = Some(value),
            "max" => self.max = Some(value),
            _ => self.target = Some(value),
        }
    }

    fn is_complete(&self) -> bool {
        self.min.is_some() && self.max.is_some() && self.target.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationParams {
    pub seed_genres: Vec<String>,
    pub seed_artists: Vec<String>,
    pub seed_tracks: Vec<String>,
    pub market: Option<String>,
    pub limit: Option<u32>,
    features: BTreeMap<&'static str, FeatureRange>,
}

impl RecommendationParams {
    /// Parameters seeded with a single track and no audio feature bounds.
    pub fn for_track(track_id: &str) -> Self {
        Self {
            seed_tracks: vec![track_id.to_string()],
            ..Default::default()
        }
    }

    /// Validates a structured language model response.
    ///
    /// Every `min_`, `max_` and `target_` field of every audio feature must be
    /// present, numeric and inside the feature's range. Suggested genres are
    /// filtered against the genre seed catalog and capped at five; a response
    /// without any usable genre is rejected. An unusable market is dropped.
    pub fn from_llm_value(value: &Value) -> Result<Self, SchemaError> {
        let object = value.as_object().ok_or(SchemaError::NotAnObject)?;

        let mut params = Self {
            seed_genres: parse_seed_genres(object)?,
            market: parse_market(object)?,
            ..Default::default()
        };

        for feature in AUDIO_FEATURES {
            let mut range = FeatureRange::default();

            for prefix in FEATURE_PREFIXES {
                let field = feature.field(prefix);
                let number = object
                    .get(&field)
                    .ok_or_else(|| SchemaError::MissingField(field.clone()))?
                    .as_f64()
                    .ok_or_else(|| SchemaError::WrongType {
                        field: field.clone(),
                        expected: "number",
                    })?;

                if !feature.in_range(number) {
                    return Err(SchemaError::OutOfRange {
                        field,
                        value: number,
                    });
                }

                range.set(prefix, number);
            }

            params.features.insert(feature.name, range);
        }

        Ok(params)
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureRange> {
        self.features.get(name)
    }

    pub fn set_feature(&mut self, name: &str, range: FeatureRange) -> Result<(), SchemaError> {
        let feature =
            schema::audio_feature(name).ok_or_else(|| SchemaError::UnknownFeature(name.into()))?;

        for prefix in FEATURE_PREFIXES {
            if let Some(value) = range.get(prefix) {
                if !feature.in_range(value) {
                    return Err(SchemaError::OutOfRange {
                        field: feature.field(prefix),
                        value,
                    });
                }
            }
        }

        self.features.insert(feature.name, range);
        Ok(())
    }

    /// True when every audio feature carries all three values.
    pub fn is_complete(&self) -> bool {
        AUDIO_FEATURES.iter().all(|f| {
            self.features
                .get(f.name)
                .is_some_and(FeatureRange::is_complete)
        })
    }

    /// Overwrites the requested track count, clamped to what Spotify accepts.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = Some(limit.clamp(MIN_LIMIT, MAX_LIMIT));
    }

    /// Query string pairs for `GET /recommendations`.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();

        let seeds = [
            ("seed_artists", &self.seed_artists),
            ("seed_genres", &self.seed_genres),
            ("seed_tracks", &self.seed_tracks),
        ];
        for (key, values) in seeds {
            if !values.is_empty() {
                query.push((key.to_string(), values.join(",")));
            }
        }

        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(market) = &self.market {
            query.push(("market".to_string(), market.clone()));
        }

        for feature in AUDIO_FEATURES {
            let Some(range) = self.features.get(feature.name) else {
                continue;
            };

            for prefix in FEATURE_PREFIXES {
                if let Some(value) = range.get(prefix) {
                    query.push((feature.field(prefix), format_value(feature, value)));
                }
            }
        }

        query
    }

    /// Flat JSON view, used for verbose logging.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("seed_genres".into(), Value::from(self.seed_genres.clone()));
        if !self.seed_tracks.is_empty() {
            map.insert("seed_tracks".into(), Value::from(self.seed_tracks.clone()));
        }
        if !self.seed_artists.is_empty() {
            map.insert("seed_artists".into(), Value::from(self.seed_artists.clone()));
        }
        if let Some(market) = &self.market {
            map.insert("market".into(), Value::from(market.clone()));
        }
        if let Some(limit) = self.limit {
            map.insert("limit".into(), Value::from(limit));
        }

        for feature in AUDIO_FEATURES {
            if let Some(range) = self.features.get(feature.name) {
                for prefix in FEATURE_PREFIXES {
                    if let Some(value) = range.get(prefix) {
                        map.insert(feature.field(prefix), Value::from(value));
                    }
                }
            }
        }

        Value::Object(map)
    }
}

fn format_value(feature: &AudioFeature, value: f64) -> String {
    match feature.kind {
        FeatureKind::Integer => format!("{}", value.round() as i64),
        FeatureKind::Ratio | FeatureKind::Decimal => format!("{}", value),
    }
}

fn parse_seed_genres(object: &Map<String, Value>) -> Result<Vec<String>, SchemaError> {
    let wrong_type = || SchemaError::WrongType {
        field: "seed_genres".to_string(),
        expected: "list of strings",
    };

    let values = object
        .get("seed_genres")
        .ok_or_else(|| SchemaError::MissingField("seed_genres".to_string()))?
        .as_array()
        .ok_or_else(wrong_type)?;

    let suggestions = values
        .iter()
        .map(|v| v.as_str().ok_or_else(wrong_type))
        .collect::<Result<Vec<&str>, SchemaError>>()?;

    let mut genres = genres::filter_genre_seeds(suggestions);
    if genres.len() > MAX_SEED_GENRES {
        debug!(
            "Keeping the first {} of {} genre seeds",
            MAX_SEED_GENRES,
            genres.len()
        );
        genres.truncate(MAX_SEED_GENRES);
    }

    if genres.is_empty() {
        return Err(SchemaError::NoGenreSeeds);
    }

    Ok(genres)
}

fn parse_market(object: &Map<String, Value>) -> Result<Option<String>, SchemaError> {
    let market = object
        .get("market")
        .ok_or_else(|| SchemaError::MissingField("market".to_string()))?
        .as_str()
        .ok_or_else(|| SchemaError::WrongType {
            field: "market".to_string(),
            expected: "string",
        })?
        .trim()
        .to_uppercase();

    if market.len() == 2 && market.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(Some(market))
    } else {
        debug!("Ignoring market '{}': not a country code", market);
        Ok(None)
    }
}
