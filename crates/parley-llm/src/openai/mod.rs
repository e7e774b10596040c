pub mod client;
pub mod tools;
pub mod translate;
pub mod transport;
pub mod wire;

pub use client::OpenAICompatibleClient;
pub use translate::{message_from_wire, response_from_wire, to_wire};
pub use transport::HttpTransport;
