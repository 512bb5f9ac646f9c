use burn::tensor::backend::Backend;
use crate::error::{PreprocessError, Result};
use crate::image::Image;

/// Intensity windowing filter.
///
/// Maps the input window `[window_minimum, window_maximum]` linearly onto
/// the output range, which defaults to `[0.0, 1.0]`. Voxels below the
/// window become the output minimum and voxels above it the output maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityWindowingFilter {
    window_minimum: f64,
    window_maximum: f64,
    output_minimum: f64,
    output_maximum: f64,
}

impl IntensityWindowingFilter {
    /// Create a filter for the given input window and a `[0, 1]` output range.
    pub fn new(window_minimum: f64, window_maximum: f64) -> Self {
        Self {
            window_minimum,
            window_maximum,
            output_minimum: 0.0,
            output_maximum: 1.0,
        }
    }

    /// Set the output range.
    pub fn with_output_range(mut self, output_minimum: f64, output_maximum: f64) -> Self {
        self.output_minimum = output_minimum;
        self.output_maximum = output_maximum;
        self
    }

    pub fn window(&self) -> (f64, f64) {
        (self.window_minimum, self.window_maximum)
    }

    pub fn output_range(&self) -> (f64, f64) {
        (self.output_minimum, self.output_maximum)
    }

    /// Slope of the linear map.
    pub fn scale(&self) -> f64 {
        (self.output_maximum - self.output_minimum) / (self.window_maximum - self.window_minimum)
    }

    /// Offset of the linear map.
    pub fn shift(&self) -> f64 {
        self.output_minimum - self.window_minimum * self.scale()
    }

    /// Map a single intensity.
    pub fn map_value(&self, value: f64) -> f64 {
        if value < self.window_minimum {
            return self.output_minimum;
        }
        if value > self.window_maximum {
            return self.output_maximum;
        }
        (value * self.scale() + self.shift()).clamp(self.output_minimum, self.output_maximum)
    }

    fn validate(&self) -> Result<()> {
        let finite = [
            self.window_minimum,
            self.window_maximum,
            self.output_minimum,
            self.output_maximum,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !finite || self.window_maximum <= self.window_minimum {
            return Err(PreprocessError::degenerate_window(
                self.window_minimum,
                self.window_maximum,
            ));
        }
        if self.output_maximum < self.output_minimum {
            return Err(PreprocessError::invalid_configuration(format!(
                "output range [{}, {}] is inverted",
                self.output_minimum, self.output_maximum
            )));
        }
        Ok(())
    }

    /// Apply the filter to an image.
    pub fn apply<B: Backend, const D: usize>(&self, image: &Image<B, D>) -> Result<Image<B, D>> {
        self.validate()?;

        // Subtract the window minimum before scaling, as a two-part f32 sum
        // so a large intensity offset does not eat the window's precision.
        let minimum_high = self.window_minimum as f32;
        let minimum_low = (self.window_minimum - minimum_high as f64) as f32;

        let data = image
            .data()
            .clone()
            .sub_scalar(minimum_high)
            .sub_scalar(minimum_low)
            .mul_scalar(self.scale() as f32)
            .add_scalar(self.output_minimum as f32)
            .clamp(self.output_minimum as f32, self.output_maximum as f32);

        Ok(image.with_data(data))
    }
}
