pub use crate::features::registry::{DEFAULT_PROFILE_FILE, load, parse, resolve_profile_path};
