//! Search intents and the query builder.

mod builder;
mod intent;
mod params;

pub use builder::{build, RESULT_LIMIT};
pub use intent::{SearchIntent, SearchRequest, ShowContext};
pub use params::QueryParams;
