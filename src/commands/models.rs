use crate::utils::config::UnclassifiedPolicy;
use std::path::PathBuf;

/// Arguments for the demo command
#[derive(Debug, Clone)]
pub struct DemoArgs {
    /// Output path for JSON profile
    pub output_json: PathBuf,

    /// Output path for collapsed stacks (optional)
    pub output_collapsed: Option<PathBuf>,

    /// Number of top hot paths to include in profile
    pub top_paths: usize,

    /// Multiplier applied to every simulated step's sleep
    pub scale: f64,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Bar width of the text summary in characters
    pub width: usize,

    /// Attribution of steps recorded without a layer
    pub unclassified: UnclassifiedPolicy,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            output_json: PathBuf::from("tuneup-profile.json"),
            output_collapsed: None,
            top_paths: 10,
            scale: 1.0,
            print_summary: false,
            width: 50,
            unclassified: UnclassifiedPolicy::default(),
        }
    }
}
