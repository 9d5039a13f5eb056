//! Core library for the `weather-lookup` widget.
//!
//! This crate defines:
//! - Query normalization and the OpenWeather request component
//! - Rendering of lookup outcomes into a display region
//! - The submission controller tying a form input to both
//! - Configuration & credentials handling
//!
//! It is used by `lookup-cli`, but any host that can provide an input field and
//! show a [`render::Region`] can drive it.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod query;
pub mod render;

pub use config::Config;
pub use controller::{InputField, Rendered, SubmissionController, SubmitOutcome, TextInput};
pub use error::LookupError;
pub use model::{Coordinates, WeatherRecord};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use query::{LocationQuery, normalize_query};
pub use render::{DisplayRegion, Node, Region, Renderer};
