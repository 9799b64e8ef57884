pub mod bump;
pub mod config;
pub mod context;
pub mod error;
pub mod io;
pub mod naming;
pub mod paths;
pub mod registry;
pub mod router;
pub mod scaffold;
pub mod shell;
pub mod ui;

pub use context::Context;
pub use error::{JikkoError, Result};
pub use registry::{CommandPath, Handler, Registry};
pub use router::{Outcome, Router, RouterConfig};
