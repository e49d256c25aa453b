pub mod client;

pub use client::H2Client;
