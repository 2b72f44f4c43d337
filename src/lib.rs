#![forbid(unsafe_code)]

pub mod app;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod gemini;
pub mod genai;
pub mod generation;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod openai;
pub mod photos;
pub mod prompts;
pub mod social;
pub mod store;
