pub mod envelope;
pub mod error;
pub mod header;
pub mod protocol;
pub mod request;
pub mod response;
pub mod target;

pub use envelope::*;
pub use error::*;
pub use header::*;
pub use protocol::*;
pub use request::*;
pub use response::*;
pub use target::*;
