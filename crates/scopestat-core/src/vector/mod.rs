//! Label-indexed metric vectors.
//!
//! [`EntityVector`] is the generic lookup-or-create engine; [`Int64Vector`]
//! and [`HistogramVector`] specialize it and expose the collector getters.

mod entity;
mod histogram;
mod int64;

pub use entity::EntityVector;
pub use histogram::HistogramVector;
pub use int64::Int64Vector;

use crate::error::Result;

/// A vector whose entries are fetched by ordered label values.
pub trait LabeledVector: Send + Sync + 'static {
    /// Shared handle to one entry.
    type Entity;

    /// Label names, fixed at creation.
    fn labels(&self) -> &[String];

    /// Look up or create the entry for `values`.
    fn entity<S: AsRef<str>>(&self, values: &[S]) -> Result<Self::Entity>;
}
