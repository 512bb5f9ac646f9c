pub mod histogram;
pub mod intensity_windowing;
pub mod histogram_matching;

pub use histogram::{Histogram, ImageToHistogramFilter, HISTOGRAM_BINS, MARGINAL_SCALE};
pub use intensity_windowing::IntensityWindowingFilter;
pub use histogram_matching::{
    HistogramMatchingFilter, IntensityMapping, MATCH_HISTOGRAM_LEVELS, MATCH_POINTS,
};
