//! Numeric bound for raster cell types

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types usable as raster cell values.
///
/// Covers the casts and nodata checks the analysis kernels need without
/// committing the grid to a single numeric type.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Default no-data sentinel for this type.
    fn default_nodata() -> Self;

    /// Whether this value represents no-data.
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Convert to f64 for arithmetic.
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// Convert from f64, rounding and saturating at the type's bounds.
    ///
    /// NaN maps to zero. This is the cast used when rescaling index and
    /// filter responses into 8-bit intensity rasters.
    fn saturate_from_f64(v: f64) -> Self;
}

macro_rules! impl_element_int {
    ($t:ty) => {
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::MIN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                match nodata {
                    Some(nd) => *self == nd,
                    None => false,
                }
            }

            fn saturate_from_f64(v: f64) -> Self {
                if v.is_nan() {
                    return 0;
                }
                v.round().clamp(<$t>::MIN as f64, <$t>::MAX as f64) as $t
            }
        }
    };
}

macro_rules! impl_element_float {
    ($t:ty) => {
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::NAN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                    None => false,
                }
            }

            fn saturate_from_f64(v: f64) -> Self {
                v as $t
            }
        }
    };
}

impl_element_int!(u8);
impl_element_int!(u16);
impl_element_int!(u32);
impl_element_int!(i16);
impl_element_int!(i32);
impl_element_float!(f32);
impl_element_float!(f64);
