/// Hue sub-ranges treated as red when the hue wraparound color is selected.
pub const RED_LOW_HUE: (u8, u8) = (0, 10);
pub const RED_HIGH_HUE: (u8, u8) = (160, 179);

/// Largest 8-bit hue value (degrees / 2).
pub const MAX_HUE: u8 = 179;

/// Radius of the 5x5 square element used for erosion and dilation.
pub const MORPH_KERNEL_RADIUS: u8 = 2;

/// Overlap sensitivity must exceed this for the watershed pass to run.
pub const OVERLAP_SENSITIVITY_GATE: f64 = 0.3;
/// Fraction of the peak distance that counts as a confident cell interior.
pub const SURE_FOREGROUND_RATIO: f64 = 0.7;
/// 3x3 dilations used to grow the sure-background area.
pub const SURE_BACKGROUND_ITERATIONS: usize = 3;
/// Weight of the painted watershed overlay when blending the annotation.
pub const WATERSHED_OVERLAY_ALPHA: f32 = 0.7;

pub const DEBUG_IMAGE_NAME: &str = "processed_image.png";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_DIR_NAME: &str = "CellClick";

/// Default inter-click delay bounds in milliseconds.
pub const DEFAULT_CLICK_DELAY_MS: (u64, u64) = (100, 200);

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
