//! Partitioning of the target image into full-width horizontal stripes.

use heatmap_common::PixelRect;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// How a run splits the image, resolved once the image height is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripeLayout {
    /// Stripes of a fixed number of rows.
    Rows(u32),
    /// A fixed number of equal stripes.
    Count(u32),
}

impl StripeLayout {
    pub fn plan(&self, width: u32, height: u32) -> Result<StripePlan> {
        match *self {
            StripeLayout::Rows(rows) => StripePlan::from_stripe_height(width, height, rows),
            StripeLayout::Count(count) => StripePlan::from_stripe_count(width, height, count),
        }
    }
}

/// Full-width stripes of equal height covering an image top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripePlan {
    width: u32,
    height: u32,
    stripe_height: u32,
}

impl StripePlan {
    /// Split `height` rows into `stripe_count` equal stripes.
    pub fn from_stripe_count(width: u32, height: u32, stripe_count: u32) -> Result<Self> {
        if stripe_count == 0 {
            return Err(RenderError::configuration("stripe count must be at least 1"));
        }
        if height % stripe_count != 0 {
            return Err(RenderError::configuration(format!(
                "image height {} is not divisible by stripe count {}",
                height, stripe_count
            )));
        }
        Self::build(width, height, height / stripe_count)
    }

    /// Split `height` rows into stripes of `stripe_height` rows.
    pub fn from_stripe_height(width: u32, height: u32, stripe_height: u32) -> Result<Self> {
        if stripe_height == 0 {
            return Err(RenderError::configuration("stripe height must be at least 1"));
        }
        if height % stripe_height != 0 {
            return Err(RenderError::configuration(format!(
                "image height {} is not divisible by stripe height {}",
                height, stripe_height
            )));
        }
        Self::build(width, height, stripe_height)
    }

    fn build(width: u32, height: u32, stripe_height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::configuration(format!(
                "image must be non-empty, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            stripe_height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stripe_height(&self) -> u32 {
        self.stripe_height
    }

    pub fn stripe_count(&self) -> u32 {
        self.height / self.stripe_height
    }

    /// Bytes of an RGB buffer holding one stripe.
    pub fn stripe_bytes(&self) -> usize {
        self.width as usize * self.stripe_height as usize * crate::colorizer::CHANNELS
    }

    /// Stripes in raster order.
    pub fn stripes(&self) -> impl Iterator<Item = PixelRect> + '_ {
        (0..self.stripe_count())
            .map(move |i| PixelRect::new(0, i * self.stripe_height, self.width, self.stripe_height))
    }
}
