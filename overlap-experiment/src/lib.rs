pub mod config;
pub mod labels;
pub mod results;
pub mod state;
pub use config::{ExperimentConfig, load_config};
pub use labels::load_trials;
pub use results::{ResultWriter, SavedResults};
pub use state::{SessionEvent, SessionStateMachine};
