pub mod functions;
pub mod project;
pub mod rename;
pub mod runs;
pub mod server;
pub mod snapshots;
pub mod util;

pub use functions::*;
pub use project::*;
pub use rename::*;
pub use runs::*;
pub use server::*;
pub use snapshots::*;
pub use util::*;
