// Reading domain model
use serde::{Deserialize, Deserializer};

const KEY_SEPARATOR: char = '-';

/// Sortable reading key, `YYYY-MM-DD-HH-MM-SS`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadingKey(String);

impl ReadingKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parts(&self) -> Vec<&str> {
        self.0.split(KEY_SEPARATOR).collect()
    }

    /// Time-of-day label used by the live charts: "08:00:00"
    pub fn time_label(&self) -> String {
        self.parts()
            .into_iter()
            .skip(3)
            .take(3)
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Day-only label used on the historical x-axis: "2024-01-01"
    pub fn day_label(&self) -> String {
        self.parts()
            .into_iter()
            .take(3)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Full date and time for tooltips: "2024-01-01 08:00:00"
    pub fn tooltip_label(&self) -> String {
        let time = self.time_label();
        if time.is_empty() {
            self.day_label()
        } else {
            format!("{} {}", self.day_label(), time)
        }
    }
}

impl std::fmt::Display for ReadingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four tracked physical quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TempDht,
    HumDht,
    TempBmp,
    PresBmp,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::TempDht,
        Metric::HumDht,
        Metric::TempBmp,
        Metric::PresBmp,
    ];

    /// Position in [`Metric::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Metric::TempDht => 0,
            Metric::HumDht => 1,
            Metric::TempBmp => 2,
            Metric::PresBmp => 3,
        }
    }

    /// Field name in the stored record
    pub fn field(&self) -> &'static str {
        match self {
            Metric::TempDht => "tempDHT",
            Metric::HumDht => "humDHT",
            Metric::TempBmp => "tempBMP",
            Metric::PresBmp => "presionBMP",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::TempDht => "Temp DHT22 (°C)",
            Metric::HumDht => "Humidity DHT22 (%)",
            Metric::TempBmp => "Temp BMP280 (°C)",
            Metric::PresBmp => "Pressure BMP280 (hPa)",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::TempDht | Metric::TempBmp => "°C",
            Metric::HumDht => "%",
            Metric::PresBmp => "hPa",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Metric::TempDht => "red",
            Metric::HumDht => "blue",
            Metric::TempBmp => "orange",
            Metric::PresBmp => "green",
        }
    }
}

/// One stored sensor record. Missing or non-numeric fields become `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Reading {
    #[serde(rename = "tempDHT", default, deserialize_with = "lenient_number")]
    pub temp_dht: Option<f64>,
    #[serde(rename = "humDHT", default, deserialize_with = "lenient_number")]
    pub hum_dht: Option<f64>,
    #[serde(rename = "tempBMP", default, deserialize_with = "lenient_number")]
    pub temp_bmp: Option<f64>,
    #[serde(rename = "presionBMP", default, deserialize_with = "lenient_number")]
    pub pres_bmp: Option<f64>,
}

impl Reading {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TempDht => self.temp_dht,
            Metric::HumDht => self.hum_dht,
            Metric::TempBmp => self.temp_bmp,
            Metric::PresBmp => self.pres_bmp,
        }
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}
