//! ss-stats: extreme-value statistics for annual-maximum samples.
//!
//! Provides the GEV distribution, L-moment starting estimates,
//! maximum-likelihood fitting via a deterministic Nelder-Mead search,
//! and a one-sample Kolmogorov-Smirnov goodness-of-fit test.

pub mod error;
pub mod fit;
pub mod gev;
pub mod kstest;
pub mod lmoments;
pub mod simplex;

pub use error::{FitError, StatsResult};
pub use fit::{FitConfig, GevFit, fit_gev};
pub use gev::Gev;
pub use kstest::{ks_statistic, ks_test};
pub use lmoments::{LMoments, sample_l_moments};
