use std::path::{Path, PathBuf};

use cafe_engine::EngineConfig;

const DESKTOP_DIR: &str = "Desktop";
const OUTPUT_DIR: &str = "ws portfolio";

/// `<home>/Desktop/ws portfolio`, or `None` when the platform reports no home.
pub(crate) fn output_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| output_dir_under(&home))
}

fn output_dir_under(home: &Path) -> PathBuf {
    home.join(DESKTOP_DIR).join(OUTPUT_DIR)
}

/// Library defaults throughout: the Time Out article, 20 entries, UTC timestamps.
pub(crate) fn engine_config(output_dir: PathBuf) -> EngineConfig {
    EngineConfig::default_with_output(output_dir)
}
