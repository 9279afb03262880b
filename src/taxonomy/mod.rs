// Keyword taxonomy — industry documents, matching parameters, and the
// provider trait the classifier reads them through.

pub mod documents;
pub mod loader;
pub mod models;
pub mod traits;

pub use loader::{Taxonomy, TaxonomyLoader};
pub use traits::{ParameterProvider, StaticProvider};
