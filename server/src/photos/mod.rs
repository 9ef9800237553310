pub mod processing;

pub use processing::{
    generate_thumbnail, ThumbnailError, DEFAULT_THUMBNAIL_SIZE, MAX_THUMBNAIL_SIZE,
};
