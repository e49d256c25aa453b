pub mod cli;
pub mod client;
pub mod h1;
pub mod h2;
pub mod logger;
pub mod stream;
pub mod transport;
pub mod types;
pub mod utils;

pub use client::execute;
pub use h1::client::H1Client;
pub use h2::client::H2Client;
pub use stream::*;
pub use transport::Transport;
pub use types::*;
pub use utils::*;
