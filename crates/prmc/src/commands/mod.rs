mod collect;
mod compress;
mod config;
mod list;
mod process;

pub use collect::*;
pub use compress::*;
pub use config::*;
pub use list::*;
pub use process::*;
