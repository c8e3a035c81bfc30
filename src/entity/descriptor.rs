use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Power,
    Energy,
    Battery,
    Timestamp,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Diagnostic,
}

/// What an entity reads from the coordinator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Projection {
    /// Telemetry field of the current snapshot.
    Field(&'static str),

    /// Outcome of the latest refresh.
    Status,

    /// Time of the latest successful refresh.
    LastUpdate,
}

#[derive(Copy, Clone, Debug, Serialize)]
pub struct SensorDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub category: Option<EntityCategory>,

    #[serde(skip)]
    pub projection: Projection,
}

impl SensorDescriptor {
    const fn power(key: &'static str, name: &'static str) -> Self {
        Self {
            key,
            name,
            unit: Some("W"),
            device_class: Some(DeviceClass::Power),
            state_class: Some(StateClass::Measurement),
            category: None,
            projection: Projection::Field(key),
        }
    }

    const fn energy(key: &'static str, name: &'static str) -> Self {
        Self {
            key,
            name,
            unit: Some("kWh"),
            device_class: Some(DeviceClass::Energy),
            state_class: Some(StateClass::TotalIncreasing),
            category: None,
            projection: Projection::Field(key),
        }
    }

    const fn diagnostic(key: &'static str, name: &'static str, projection: Projection) -> Self {
        Self {
            key,
            name,
            unit: None,
            device_class: None,
            state_class: None,
            category: Some(EntityCategory::Diagnostic),
            projection,
        }
    }

    #[must_use]
    pub fn unique_id(&self) -> String {
        format!("solax_{}", self.key)
    }
}

/// Entities exposed for every configured device.
pub static SENSORS: &[SensorDescriptor] = &[
    SensorDescriptor::power("acpower", "AC Power"),
    SensorDescriptor::energy("yieldtoday", "Yield Today"),
    SensorDescriptor::energy("yieldtotal", "Yield Total"),
    SensorDescriptor {
        key: "soc",
        name: "Battery SoC",
        unit: Some("%"),
        device_class: Some(DeviceClass::Battery),
        state_class: Some(StateClass::Measurement),
        category: None,
        projection: Projection::Field("soc"),
    },
    SensorDescriptor::power("batPower", "Battery Power"),
    SensorDescriptor::power("feedinpower", "Feed-in Power"),
    SensorDescriptor::energy("feedinenergy", "Feed-in Energy"),
    SensorDescriptor::energy("consumeenergy", "Consumed Energy"),
    SensorDescriptor::power("powerdc1", "PV1 Power"),
    SensorDescriptor::power("powerdc2", "PV2 Power"),
    SensorDescriptor::power("powerdc3", "PV3 Power"),
    SensorDescriptor::power("powerdc4", "PV4 Power"),
    SensorDescriptor::diagnostic(
        "inverterStatus",
        "Inverter Status",
        Projection::Field("inverterStatus"),
    ),
    SensorDescriptor::diagnostic("uploadTime", "Upload Time", Projection::Field("uploadTime")),
    SensorDescriptor::diagnostic("status", "Status", Projection::Status),
    SensorDescriptor {
        device_class: Some(DeviceClass::Timestamp),
        ..SensorDescriptor::diagnostic("last_update", "Last Update", Projection::LastUpdate)
    },
];
