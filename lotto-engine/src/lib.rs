pub mod audit;
pub mod candidate;
pub mod config;
pub mod display;
pub mod exclusion;
pub mod generator;
pub mod predictor;
pub mod report;
pub mod score;
pub mod simulation;
pub mod validator;

pub use candidate::Candidate;
pub use config::{Preset, PredictorConfig};
pub use exclusion::{Exclusion, ExclusionSet, KillRule};
pub use predictor::{PredictionResult, Predictor};
pub use simulation::{Rank, SimulationHarness, SimulationReport, SimulationSettings, Strategy, Target};
