//! Target synthesis: sample particle rest positions from rasterized text.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{
    ALPHA_THRESHOLD, DEFAULT_SEED, FALLBACK_SPREAD, PHASE_RANGE, RASTER_STRIDE, TARGET_JITTER,
    TARGET_WORLD_HEIGHT, TARGET_WORLD_WIDTH, TARGET_Y_LIFT,
};
use crate::simulation::glyph::{render_text, FontSpec};

/// Per-particle rest positions (z is implicitly 0) and wobble phases.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSet {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub phase: Vec<f32>,
}

impl TargetSet {
    pub fn len(&self) -> usize {
        self.x.len()
    }
}

/// Collect every `RASTER_STRIDE`-th pixel whose alpha passes the threshold.
fn scan_candidates(canvas: &RgbaImage) -> Vec<(u32, u32)> {
    let mut candidates = Vec::new();
    for y in (0..canvas.height()).step_by(RASTER_STRIDE as usize) {
        for x in (0..canvas.width()).step_by(RASTER_STRIDE as usize) {
            if canvas.get_pixel(x, y).0[3] > ALPHA_THRESHOLD {
                candidates.push((x, y));
            }
        }
    }
    candidates
}

/// Map a raster pixel to world units: centered, scaled, y-flipped.
fn pixel_to_world(px: u32, py: u32, width: u32, height: u32) -> (f32, f32) {
    let x = (px as f32 / width as f32 - 0.5) * TARGET_WORLD_WIDTH;
    let y = -(py as f32 / height as f32 - 0.5) * TARGET_WORLD_HEIGHT + TARGET_Y_LIFT;
    (x, y)
}

/// Render `text`, then draw `count` targets from its opaque pixels with replacement.
///
/// When nothing renders, targets are scattered over a square instead.
pub fn generate_targets<R: Rng>(text: &str, font: &FontSpec, count: usize, rng: &mut R) -> TargetSet {
    let canvas = render_text(text, font);
    let candidates = scan_candidates(&canvas);

    let mut targets = TargetSet {
        x: Vec::with_capacity(count),
        y: Vec::with_capacity(count),
        phase: Vec::with_capacity(count),
    };

    if candidates.is_empty() {
        log::warn!("Text {:?} rendered no pixels, scattering targets", text);
        for _ in 0..count {
            targets.x.push((rng.gen::<f32>() - 0.5) * FALLBACK_SPREAD);
            targets.y.push((rng.gen::<f32>() - 0.5) * FALLBACK_SPREAD);
            targets.phase.push(0.0);
        }
        return targets;
    }

    log::debug!("Text {:?} produced {} candidate pixels", text, candidates.len());

    for _ in 0..count {
        let (px, py) = candidates[rng.gen_range(0..candidates.len())];
        let (x, y) = pixel_to_world(px, py, canvas.width(), canvas.height());
        targets.x.push(x + (rng.gen::<f32>() - 0.5) * TARGET_JITTER);
        targets.y.push(y + (rng.gen::<f32>() - 0.5) * TARGET_JITTER);
        targets.phase.push(rng.gen::<f32>() * PHASE_RANGE);
    }

    targets
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TargetKey {
    text: String,
    font: FontSpec,
    count: usize,
}

/// Lookup-or-compute cache of target sets keyed by (text, font, count).
///
/// Entries live as long as the cache and are never invalidated. Each key is
/// generated with a RNG seeded from the cache seed, so the result does not
/// depend on which keys were requested before it.
pub struct TargetCache {
    seed: u64,
    entries: Mutex<HashMap<TargetKey, Arc<TargetSet>>>,
}

impl TargetCache {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Process-wide cache, created on first use.
    pub fn global() -> &'static TargetCache {
        static GLOBAL: OnceLock<TargetCache> = OnceLock::new();
        GLOBAL.get_or_init(|| TargetCache::new(DEFAULT_SEED))
    }

    pub fn get_or_generate(&self, text: &str, font: &FontSpec, count: usize) -> Arc<TargetSet> {
        let key = TargetKey {
            text: text.to_string(),
            font: font.clone(),
            count,
        };

        // A poisoned lock only means another generator panicked; the map is still valid.
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = entries.get(&key) {
            log::debug!("Target cache hit for {:?} x{}", text, count);
            return Arc::clone(existing);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let targets = Arc::new(generate_targets(text, font, count, &mut rng));
        log::info!("Generated {} targets for {:?} ({})", count, text, font);
        entries.insert(key, Arc::clone(&targets));
        targets
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_else(|e| e.into_inner().len())
    }
}
