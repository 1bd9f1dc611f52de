/// The three measured quantities, one chart each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    AirQuality,
    SoundLevel,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::AirQuality, Metric::SoundLevel];

    /// Key of this metric in the device's JSON output.
    pub fn json_key(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::AirQuality => "airQuality",
            Metric::SoundLevel => "soundLevel",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::AirQuality => "Air Quality",
            Metric::SoundLevel => "Sound Level",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::AirQuality => "ppm",
            Metric::SoundLevel => "dB",
        }
    }

    /// Axis/legend title, e.g. "Temperature (°C)".
    pub fn title(&self) -> String {
        format!("{} ({})", self.label(), self.unit())
    }
}
