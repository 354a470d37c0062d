use std::{cell::RefCell, f64::consts::PI, rc::Rc};

/// Square patch drawn over the background, in sample-raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub size: u32,
    pub value: u8,
    /// Cell size of a checkerboard alternating `value` and the background;
    /// 0 draws a solid block.
    pub checker: u32,
}

impl Block {
    fn shade(&self, x: u32, y: u32) -> Option<u8> {
        if !(self.x..self.x + self.size).contains(&x) || !(self.y..self.y + self.size).contains(&y) {
            return None;
        }
        if self.checker == 0 {
            return Some(self.value);
        }
        let cell = (x - self.x) / self.checker + (y - self.y) / self.checker;
        (cell % 2 == 0).then_some(self.value)
    }
}

#[derive(Debug)]
struct SceneState {
    background: u8,
    block: Option<Block>,
    tone_hz: f32,
    tone_amplitude: f32,
    noise_amplitude: f32,
    sample_rate: f32,
    /// Index of the next PCM sample handed out.
    sample_pos: u64,
}

/// What the remote camera and microphone are "seeing": a flat gray room with
/// an optional block, and an optional sine tone over white noise.
///
/// Cloning shares the scene, so a test can keep a handle and script it while
/// the session owns the streams built from it.
#[derive(Debug, Clone)]
pub struct SyntheticScene(Rc<RefCell<SceneState>>);

impl Default for SyntheticScene {
    fn default() -> Self {
        Self::new(48_000.0)
    }
}

impl SyntheticScene {
    #[must_use]
    pub fn new(sample_rate: f32) -> Self {
        Self(Rc::new(RefCell::new(SceneState {
            background: 128,
            block: None,
            tone_hz: 1_000.0,
            tone_amplitude: 0.0,
            noise_amplitude: 0.0,
            sample_rate,
            sample_pos: 0,
        })))
    }

    pub fn set_background(&self, value: u8) {
        self.0.borrow_mut().background = value;
    }

    pub fn place_block(&self, block: Block) {
        self.0.borrow_mut().block = Some(block);
    }

    pub fn clear_block(&self) {
        self.0.borrow_mut().block = None;
    }

    #[must_use]
    pub fn block(&self) -> Option<Block> {
        self.0.borrow().block
    }

    pub fn set_tone(&self, hz: f32, amplitude: f32) {
        let mut s = self.0.borrow_mut();
        s.tone_hz = hz;
        s.tone_amplitude = amplitude.clamp(0.0, 1.0);
    }

    /// Adds uniform white noise on top of the tone.
    pub fn set_noise(&self, amplitude: f32) {
        self.0.borrow_mut().noise_amplitude = amplitude.clamp(0.0, 1.0);
    }

    /// Stops both the tone and the noise.
    pub fn silence(&self) {
        let mut s = self.0.borrow_mut();
        s.tone_amplitude = 0.0;
        s.noise_amplitude = 0.0;
    }

    #[must_use]
    pub fn sample_rate(&self) -> f32 {
        self.0.borrow().sample_rate
    }

    /// Renders the scene at `width × height` as packed RGBA.
    pub fn render(&self, width: u32, height: u32, out: &mut Vec<u8>) {
        let s = self.0.borrow();
        let bg = s.background;
        out.clear();
        out.reserve(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let v = s.block.and_then(|b| b.shade(x, y)).unwrap_or(bg);
                out.extend_from_slice(&[v, v, v, 255]);
            }
        }
    }

    /// Writes the next `out.len()` samples of the tone and advances the scene.
    pub fn fill_pcm(&self, out: &mut [f32]) {
        let mut s = self.0.borrow_mut();
        let cycles_per_sample = f64::from(s.tone_hz) / f64::from(s.sample_rate);
        let start = s.sample_pos;
        for (i, sample) in out.iter_mut().enumerate() {
            // Only the fractional cycle matters; keeps precision over long runs.
            let cycle = ((start + i as u64) as f64 * cycles_per_sample).fract();
            let tone = s.tone_amplitude * (2.0 * PI * cycle).sin() as f32;
            let noise = if s.noise_amplitude > 0.0 {
                s.noise_amplitude * (rand::random::<f32>() * 2.0 - 1.0)
            } else {
                0.0
            };
            *sample = (tone + noise).clamp(-1.0, 1.0);
        }
        s.sample_pos = start + out.len() as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_drawn_over_background() {
        let scene = SyntheticScene::default();
        scene.set_background(0);
        scene.place_block(Block {
            x: 2,
            y: 1,
            size: 2,
            value: 255,
            checker: 0,
        });
        let mut out = Vec::new();
        scene.render(4, 4, &mut out);
        assert_eq!(out.len(), 64);
        let px = |x: usize, y: usize| out[(y * 4 + x) * 4];
        assert_eq!(px(2, 1), 255);
        assert_eq!(px(3, 2), 255);
        assert_eq!(px(1, 1), 0);
        assert_eq!(px(2, 3), 0);
    }

    #[test]
    fn checker_block_alternates_with_background() {
        let scene = SyntheticScene::default();
        scene.set_background(0);
        scene.place_block(Block {
            x: 0,
            y: 0,
            size: 4,
            value: 200,
            checker: 2,
        });
        let mut out = Vec::new();
        scene.render(4, 4, &mut out);
        let px = |x: usize, y: usize| out[(y * 4 + x) * 4];
        assert_eq!(px(0, 0), 200);
        assert_eq!(px(1, 1), 200);
        assert_eq!(px(2, 0), 0);
        assert_eq!(px(2, 2), 200);
    }

    #[test]
    fn silent_scene_yields_zero_samples() {
        let scene = SyntheticScene::default();
        let mut pcm = [1.0f32; 64];
        scene.fill_pcm(&mut pcm);
        assert!(pcm.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn tone_stays_within_amplitude() {
        let scene = SyntheticScene::default();
        scene.set_tone(440.0, 0.5);
        let mut pcm = [0.0f32; 512];
        scene.fill_pcm(&mut pcm);
        assert!(pcm.iter().all(|s| s.abs() <= 0.5 + 1e-6));
        assert!(pcm.iter().any(|s| s.abs() > 0.4));
    }
}
