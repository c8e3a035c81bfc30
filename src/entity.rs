pub mod descriptor;

use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

use serde::Serialize;
use serde_json::Value;

pub use self::descriptor::{Projection, SENSORS, SensorDescriptor};
use crate::{coordinator::Source, telemetry::Observation};

/// Rendered in place of a timestamp before the first successful refresh.
pub const NEVER: &str = "never";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityValue {
    Number(f64),
    Text(String),
    Unavailable,
}

impl From<&Value> for EntityValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(number) => number.as_f64().map_or(Self::Unavailable, Self::Number),
            Value::String(text) => Self::Text(text.clone()),
            Value::Bool(flag) => Self::Text(flag.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => Self::Unavailable,
        }
    }
}

impl Display for EntityValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityState {
    pub value: EntityValue,
    pub available: bool,
}

impl Projection {
    fn project(self, observation: &Observation) -> EntityState {
        match self {
            Self::Field(key) => {
                let value =
                    observation.snapshot.get(key).map_or(EntityValue::Unavailable, EntityValue::from);
                EntityState { available: value != EntityValue::Unavailable, value }
            }
            Self::Status => EntityState {
                value: EntityValue::Text(observation.status.to_string()),
                available: true,
            },
            Self::LastUpdate => match observation.last_updated_at {
                Some(at) => EntityState {
                    value: EntityValue::Text(at.format("%Y-%m-%d %H:%M:%S %Z").to_string()),
                    available: true,
                },
                None => {
                    EntityState { value: EntityValue::Text(NEVER.to_owned()), available: false }
                }
            },
        }
    }
}

/// Read-only projection of the coordinator state.
///
/// Entities never talk to the network: they only look at whatever the
/// coordinator has published at the moment they are queried.
#[derive(Clone)]
pub struct Entity {
    descriptor: &'static SensorDescriptor,
    source: Arc<dyn Source>,
}

impl Entity {
    pub fn new(descriptor: &'static SensorDescriptor, source: Arc<dyn Source>) -> Self {
        Self { descriptor, source }
    }

    /// All the known sensors, sharing the same source.
    pub fn all(source: &Arc<dyn Source>) -> Vec<Self> {
        SENSORS.iter().map(|descriptor| Self::new(descriptor, Arc::clone(source))).collect()
    }

    #[must_use]
    pub const fn descriptor(&self) -> &'static SensorDescriptor {
        self.descriptor
    }

    pub fn state(&self) -> EntityState {
        self.descriptor.projection.project(&self.source.observe())
    }
}
