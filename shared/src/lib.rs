// Domain types shared by the data engine and whatever renders its output.
pub mod error;
pub mod locale;
pub mod models;
pub mod theme;
pub mod utils;

pub use error::ModelError;
pub use models::{Bar, ColorScheme, ColorTag, Dataset, TimeFrame, TimePoint, VolumeBar};
