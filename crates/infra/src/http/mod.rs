//! Thin reqwest wrapper shared by the API client and the token refresher

mod client;

pub use client::{HttpClient, HttpClientBuilder};
