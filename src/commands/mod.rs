mod caveats;
mod install;
mod paths;
mod verify;

pub use caveats::{CAVEATS, caveats};
pub use install::{InstallOptions, install, run};
pub use paths::{paths, render_paths};
pub use verify::{VERIFY_MARKER, verify};
