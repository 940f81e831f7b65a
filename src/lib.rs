//! Client-side account session handling for a shopping assistant: sign-in,
//! registration with emailed one-time codes, token refresh, logout and a
//! chat front-end over an OpenAI-compatible completion endpoint.
//!
//! The library is split into `app_lib` (HTTP, configuration, storage),
//! `features` (auth, profile and chat state) and `cli` (the `chatgate` binary).

pub mod app_lib;
pub mod cli;
pub mod features;
