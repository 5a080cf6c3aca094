//! Reader and writer engines over blocking byte streams.
//!
//! - [`source`]: the [`Source`](source::Source) capability consumed by readers
//! - [`lines`] / [`chunks`]: line-oriented and fixed-chunk sources over any [`Read`](std::io::Read)
//! - [`reader`]: the [`Reader`](reader::Reader) engine
//! - [`sink`]: the [`Sink`](sink::Sink) capability and its line / raw byte framings
//! - [`request`]: write requests and their completion targets
//! - [`writer`]: the [`Writer`](writer::Writer) engine

pub mod chunks;
pub mod lines;
mod queue;
pub mod reader;
pub mod request;
pub mod sink;
pub mod source;
pub mod writer;
