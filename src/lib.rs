//! HLMC willingness questionnaire — Yes/No wizard scored by a pre-trained
//! logistic pipeline.

pub mod app;
pub mod channels;
pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod schema;
pub mod sessions;
pub mod wizard;
