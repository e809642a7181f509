//! Standard APIs we use everywhere.

pub use anyhow::{Context as _, Result};
pub use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
pub use tracing::{debug, error, info, instrument, trace, warn};
