use super::meter_class::MeterClass;

/// Where a meter draws itself (a bar element in the UI, stdout in the demo binary).
pub trait MeterSink {
    fn render(&mut self, level: f32, class: MeterClass);
}

/// Remembers the last rendered value. Useful in tests and headless runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastRendered {
    pub level: f32,
    pub class: MeterClass,
    pub renders: usize,
}

impl Default for LastRendered {
    fn default() -> Self {
        Self {
            level: 0.0,
            class: MeterClass::Normal,
            renders: 0,
        }
    }
}

impl MeterSink for LastRendered {
    fn render(&mut self, level: f32, class: MeterClass) {
        self.level = level;
        self.class = class;
        self.renders += 1;
    }
}
