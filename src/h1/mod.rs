pub mod client;

pub use client::H1Client;
