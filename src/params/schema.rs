//! JSON schemas handed to the language model.
//!
//! Every structured-output request builds its schema here, and the
//! recommendation schema is derived from the same [`AUDIO_FEATURES`] table
//! that validation and query serialization use, so the three never drift.

use serde_json::{Map, Value, json};

use crate::genres::GENRE_SEEDS;

pub const RECOMMENDATION_PARAMS_SCHEMA: &str = "RecommendationsParams";
pub const GENRE_SEEDS_SCHEMA: &str = "GenreSeeds";
pub const GENRE_METADATA_SCHEMA: &str = "GenreMetadata";

/// The bound prefixes every audio feature is requested with.
pub const FEATURE_PREFIXES: [&str; 3] = ["min", "max", "target"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// A fraction between 0 and 1.
    Ratio,
    /// A whole number, sent to Spotify without a fractional part.
    Integer,
    /// An unbounded or loosely bounded decimal.
    Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct AudioFeature {
    pub name: &'static str,
    pub kind: FeatureKind,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub description: &'static str,
}

impl AudioFeature {
    const fn ratio(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FeatureKind::Ratio,
            lower: Some(0.0),
            upper: Some(1.0),
            description,
        }
    }

    pub fn field(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.name)
    }

    pub fn in_range(&self, value: f64) -> bool {
        value.is_finite()
            && self.lower.is_none_or(|lower| value >= lower)
            && self.upper.is_none_or(|upper| value <= upper)
    }

    fn range_label(&self) -> String {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => format!(" (Range: {}-{})", lower, upper),
            (Some(lower), None) => format!(" (Minimum: {})", lower),
            _ => String::new(),
        }
    }
}

pub const AUDIO_FEATURES: &[AudioFeature] = &[
    AudioFeature::ratio("acousticness", "acousticness"),
    AudioFeature::ratio("danceability", "danceability"),
    AudioFeature {
        name: "duration_ms",
        kind: FeatureKind::Integer,
        lower: Some(0.0),
        upper: None,
        description: "track duration in milliseconds",
    },
    AudioFeature::ratio("energy", "energy"),
    AudioFeature::ratio("instrumentalness", "instrumentalness"),
    AudioFeature {
        name: "key",
        kind: FeatureKind::Integer,
        lower: Some(0.0),
        upper: Some(11.0),
        description: "key in pitch class notation",
    },
    AudioFeature::ratio("liveness", "liveness"),
    AudioFeature {
        name: "loudness",
        kind: FeatureKind::Decimal,
        lower: None,
        upper: None,
        description: "loudness in decibels",
    },
    AudioFeature {
        name: "mode",
        kind: FeatureKind::Integer,
        lower: Some(0.0),
        upper: Some(1.0),
        description: "modality, 0 for minor and 1 for major",
    },
    AudioFeature {
        name: "popularity",
        kind: FeatureKind::Integer,
        lower: Some(0.0),
        upper: Some(100.0),
        description: "popularity",
    },
    AudioFeature::ratio("speechiness", "speechiness"),
    AudioFeature {
        name: "tempo",
        kind: FeatureKind::Decimal,
        lower: Some(0.0),
        upper: None,
        description: "tempo in beats per minute",
    },
    AudioFeature::ratio("valence", "valence (musical positiveness)"),
];

pub fn audio_feature(name: &str) -> Option<&'static AudioFeature> {
    AUDIO_FEATURES.iter().find(|f| f.name == name)
}

/// Schema of the recommendation parameters requested from the language model.
///
/// All properties are required and no others are allowed, which is what
/// strict structured output expects.
pub fn recommendation_params() -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    properties.insert(
        "seed_genres".to_string(),
        json!({
            "type": "array",
            "description": "Between one and five Spotify genre seeds that fit the description",
            "items": { "type": "string", "enum": GENRE_SEEDS },
        }),
    );
    required.push(Value::from("seed_genres"));

    properties.insert(
        "market".to_string(),
        json!({
            "type": "string",
            "description": "An ISO 3166-1 alpha-2 country code",
        }),
    );
    required.push(Value::from("market"));

    for feature in AUDIO_FEATURES {
        let json_type = match feature.kind {
            FeatureKind::Integer => "integer",
            FeatureKind::Ratio | FeatureKind::Decimal => "number",
        };

        for prefix in FEATURE_PREFIXES {
            let label = match prefix {
                "min" => "Minimum",
                "max" => "Maximum",
                _ => "Target",
            };
            let field = feature.field(prefix);

            properties.insert(
                field.clone(),
                json!({
                    "type": json_type,
                    "description": format!(
                        "{} value for {}{}",
                        label,
                        feature.description,
                        feature.range_label()
                    ),
                }),
            );
            required.push(Value::from(field));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

pub fn genre_seeds() -> Value {
    json!({
        "type": "object",
        "properties": {
            "genres": {
                "type": "array",
                "description": "Spotify genre seeds that match the description",
                "items": { "type": "string" },
            },
        },
        "required": ["genres"],
        "additionalProperties": false,
    })
}

pub fn genre_metadata() -> Value {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });

    json!({
        "type": "object",
        "properties": {
            "genre": { "type": "string" },
            "description": { "type": "string" },
            "subgenres": string_list,
            "instruments": string_list,
            "rhythms": string_list,
            "lyricThemes": string_list,
            "timePeriods": { "type": "string" },
            "regions": string_list,
            "mood": { "type": "string" },
            "popularity": { "type": "number" },
        },
        "required": [
            "genre",
            "description",
            "subgenres",
            "instruments",
            "rhythms",
            "lyricThemes",
            "timePeriods",
            "regions",
            "mood",
            "popularity"
        ],
        "additionalProperties": false,
    })
}
