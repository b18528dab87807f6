pub mod ack;
pub mod fields;
pub mod post;
pub mod request;

pub use ack::*;
pub use post::*;
pub use request::*;
