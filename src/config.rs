/// Number of particles in the field
pub const PARTICLE_COUNT: usize = 5000;

/// Seed for particle initialization and target sampling
pub const DEFAULT_SEED: u64 = 0x5EED_0F_5146;

/// Text the formed regime spells out
pub const FORMATION_TEXT: &str = "SINGULARITY";

/// Font shorthand used as part of the target cache key
pub const FORMATION_FONT: &str = "900 150px Inter, sans-serif";

// ============================================
// Target Raster
// ============================================

/// Offscreen canvas dimensions in pixels
pub const RASTER_WIDTH: u32 = 2000;
pub const RASTER_HEIGHT: u32 = 800;

/// Glyph cell height in pixels (fixed so sampling density stays stable)
pub const GLYPH_SIZE_PX: u32 = 150;

/// Pixel stride when scanning the raster for candidates
pub const RASTER_STRIDE: u32 = 4;

/// Alpha a pixel must exceed to become a target candidate
pub const ALPHA_THRESHOLD: u8 = 128;

/// World extent of the raster along each axis
pub const TARGET_WORLD_WIDTH: f32 = 120.0;
pub const TARGET_WORLD_HEIGHT: f32 = 50.0;

/// Vertical lift applied to targets so the text sits above center
pub const TARGET_Y_LIFT: f32 = 8.0;

/// Total span of the per-target positional jitter (±0.1)
pub const TARGET_JITTER: f32 = 0.2;

/// Upper bound of the per-particle phase offset
pub const PHASE_RANGE: f32 = 100.0;

/// Side of the square used when the glyph renders to nothing
pub const FALLBACK_SPREAD: f32 = 150.0;

/// Font weights at or above this render bold
pub const BOLD_WEIGHT: u16 = 600;

// ============================================
// Chaotic Field
// ============================================

/// Initial ring radius range of the chaotic cloud
pub const CHAOS_RADIUS_MIN: f32 = 5.0;
pub const CHAOS_RADIUS_SPAN: f32 = 40.0;

/// Initial vertical spread of the chaotic cloud
pub const CHAOS_HEIGHT_SPAN: f32 = 50.0;

/// Ambient drift amplitude and spatial/temporal frequencies
pub const DRIFT_AMPLITUDE: f32 = 0.008;
pub const DRIFT_SPATIAL_FREQ: f32 = 0.08;
pub const DRIFT_TIME_FREQ: f32 = 0.1;

/// Toroidal wrap bounds (half extents)
pub const WRAP_HALF_X: f32 = 60.0;
pub const WRAP_HALF_Y: f32 = 50.0;

/// Velocity damping in the chaotic regime
pub const CHAOS_DAMPING: f32 = 0.96;

// ============================================
// Pointer Interaction
// ============================================

/// Exponential smoothing factor applied to the raw pointer each frame
pub const POINTER_SMOOTHING: f32 = 0.1;

/// Pointer speed below which no force is applied
pub const POINTER_SPEED_EPSILON: f32 = 0.001;

/// Scale from normalized pointer coordinates to world units
pub const POINTER_WORLD_SCALE_X: f32 = 45.0;
pub const POINTER_WORLD_SCALE_Y: f32 = 35.0;

/// Chaotic regime drag radius (squared), falloff distance and strength
pub const DRAG_RADIUS_SQ: f32 = 60.0;
pub const DRAG_FALLOFF: f32 = 7.74;
pub const DRAG_STRENGTH: f32 = 3.0;

/// Formed regime interaction radius (squared), falloff distance and strength
pub const PUSH_RADIUS_SQ: f32 = 35.0;
pub const PUSH_FALLOFF: f32 = 5.91;
pub const PUSH_STRENGTH: f32 = 4.0;

/// Total span of the random impulse added in the formed regime (±0.075)
pub const PUSH_JITTER: f32 = 0.15;

// ============================================
// Mode Control
// ============================================

/// Progress is counted in 1/250 steps so holds and releases stay exact:
/// +0.008 per held frame, -0.02 per released frame
pub const PROGRESS_STEPS: u32 = 250;
pub const PROGRESS_RISE_STEPS: u32 = 2;
pub const PROGRESS_FALL_STEPS: u32 = 5;

/// Noise amplitude once formed, and the easing rate toward it
pub const FORMED_NOISE: f32 = 0.08;
pub const NOISE_EASE: f32 = 0.03;

/// Noise below this is treated as off
pub const NOISE_EPSILON: f32 = 1e-4;

// ============================================
// Formed Regime
// ============================================

/// Velocity damping in the formed regime
pub const FORMED_DAMPING: f32 = 0.90;

/// Fraction of the remaining distance to the target covered each frame
pub const SPRING_PULL: f32 = 0.05;

/// Time frequencies of the formed wobble
pub const WOBBLE_TIME_FREQ: f32 = 0.8;
pub const WOBBLE_DEPTH_TIME_FREQ: f32 = 0.5;

/// Spatial frequencies of the formed wobble
pub const WOBBLE_SPATIAL_FREQ: f32 = 0.1;
pub const WOBBLE_DEPTH_SPATIAL_FREQ: f32 = 0.2;

// ============================================
// Presentation
// ============================================

/// Opacity the particle field fades in to, and the fade rate
pub const TARGET_OPACITY: f32 = 0.8;
pub const OPACITY_EASE: f32 = 0.05;

/// World-space size of one particle sprite
pub const PARTICLE_SIZE: f32 = 0.07;

/// Camera setup
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_Z: f32 = 35.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

// ============================================
// Shell
// ============================================

/// Initial window size
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 800;

/// Delay between completion and revealing dependent UI
pub const UI_REVEAL_DELAY_MS: u64 = 500;

/// Pixels scrolled per mouse-wheel line
pub const SCROLL_LINE_PX: f32 = 40.0;
