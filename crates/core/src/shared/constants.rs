pub const CASCADE_FILE_NAME: &str = "haarcascade_frontalface_alt2.xml";
pub const CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_alt2.xml";

/// Install prefixes whose `haarcascades/` directory holds OpenCV's stock cascades.
pub const OPENCV_DATA_DIRS: &[&str] = &[
    "/usr/share/opencv4",
    "/usr/local/share/opencv4",
    "/opt/homebrew/share/opencv4",
    "/usr/share/opencv",
];

/// Default locations, relative to the working directory.
pub const DEFAULT_CASCADE_PATH: &str = "cascades/haarcascade_frontalface_alt2.xml";
pub const DEFAULT_TRAINING_IMAGES_DIR: &str = "training_images";
pub const DEFAULT_MODEL_DIR: &str = "model";

pub const LABELS_FILE_NAME: &str = "labels.pickle";
pub const MODEL_FILE_NAME: &str = "trainer.yml";

/// File-name suffixes accepted as training images. Matching is case-sensitive.
pub const TRAINING_IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg"];

/// Extensions accepted by `recognize` and `enroll` inputs (case-insensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const DEFAULT_SCALE_FACTOR: f64 = 1.5;
pub const DEFAULT_MIN_NEIGHBORS: u32 = 5;

/// Upper bound on images kept per subject by `enroll`.
pub const MAX_ENROLL_IMAGES: usize = 20;
