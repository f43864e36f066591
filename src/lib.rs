//! Next-year salary projection from current salary bands and a chain of
//! adjustment factors (inflation, skills premium, demand, geography).
//!
//! [`pipeline::run`] is the entry point: it fetches the four input datasets
//! through a [`provider::DatasetProvider`], inner-joins them by role and
//! projects every experience tier.

pub mod adjust;
pub mod config;
pub mod dataset;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod join;
pub mod pipeline;
pub mod provider;
pub mod report;

pub use crate::config::{FallbackPolicy, Settings};
pub use crate::error::{PipelineError, SourceError};
pub use crate::pipeline::{run, ResultTable};
