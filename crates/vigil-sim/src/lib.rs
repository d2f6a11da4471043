//! # vigil-sim - synthetic series and detection runs
//!
//! Generators, anomaly injection and the orchestration that feeds a series
//! into a `vigil-core` detector and renders the result.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         vigil-sim                            │
//! │                                                              │
//! │  ┌─────────────┐   ┌──────────────┐   ┌──────────────────┐   │
//! │  │  generator  │──►│    engine    │──►│      render      │   │
//! │  │ (synthetic) │   │ (Orchestrator│   │ (static/realtime)│   │
//! │  └─────────────┘   │  + RunConfig)│   └──────────────────┘   │
//! │                    └──────┬───────┘                          │
//! │                           ▼                                  │
//! │                vigil_core::build_detector                    │
//! │                                                              │
//! │  menu: numbered prompts over the same pieces                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use vigil_sim::{GeneratorConfig, Orchestrator, RunConfig, SeriesSource};
//!
//! let config = RunConfig {
//!     source: SeriesSource::Generator(GeneratorConfig::default()),
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! let outcome = Orchestrator::new(config).unwrap().run().unwrap();
//! assert_eq!(outcome.series.len(), 1000);
//! ```
//!
//! ## Generators
//!
//! | Kind              | Parameters                         |
//! |-------------------|------------------------------------|
//! | `random_walk`     | steps, drift, volatility           |
//! | `brownian_motion` | steps, drift, volatility           |
//! | `seasonal`        | steps, period, noise_std           |
//! | `poisson`         | steps, lambda                      |
//! | `arima`           | steps, ar, d, ma, constant, noise  |
//! | `garch`           | steps, omega, alpha, beta          |
//! | `data_stream`     | steps                              |

pub mod engine;
pub mod generator;
pub mod menu;
pub mod render;

pub use engine::{
    GeneratorConfig, InjectionConfig, Orchestrator, RunConfig, RunOutcome, SeriesSource, compare,
    detect,
};
pub use generator::{
    ArimaParams, GarchParams, add_anomalies, arima_data, brownian_motion, data_stream, garch_data,
    poisson_process, random_walk, seasonal_data, seeded_rng,
};
pub use menu::Menu;
pub use render::{render_realtime, render_static};
