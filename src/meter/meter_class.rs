use super::meter_options::MeterOptions;

/// Display band of a meter value. Has no effect on decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterClass {
    Normal,
    Warning,
    Danger,
}

impl MeterClass {
    #[must_use]
    pub fn classify(level: f32, options: &MeterOptions) -> Self {
        if level >= options.danger_threshold {
            Self::Danger
        } else if level >= options.warning_threshold {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}
