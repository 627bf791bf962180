//! # Exchange
//!
//! Cross-boundary exchange of serialized scene messages.
//!
//! The host only sees three integers per direction: the high and low 32-bit
//! halves of a buffer address, and its byte length. This crate owns the
//! outbound double buffer behind that triple and the inbound side of the
//! handshake.
//!
//! ## Lifetime contract
//!
//! A descriptor returned by [`ExchangeBuffer::publish`] stays valid, with
//! unchanged content, until the next call to `publish`. Two slots are kept so
//! that writing step N+1 never touches the bytes published in step N.
//!
//! ```
//! use exchange::ExchangeBuffer;
//!
//! let mut buffer = ExchangeBuffer::new();
//! let descriptor = buffer.publish(b"scene").unwrap();
//! assert_eq!(descriptor.len, 5);
//! assert_eq!(buffer.published(), Some(&b"scene"[..]));
//! ```

mod buffer;
mod codec;
mod descriptor;

pub use buffer::ExchangeBuffer;
pub use codec::WireCodec;
pub use descriptor::{consume, decode_address, encode_address, BufferDescriptor, InboundGrant};
