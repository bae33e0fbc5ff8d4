//! Descriptive statistics and charts for exported network captures.
//!
//! Every table in an input directory gets a packet-length-over-time bar chart
//! and an inter-packet delay PDF with an exponential fit. A fixed set of
//! traffic classes is then compared on one CCDF chart of normalized packet
//! sizes.

pub mod batch;
pub mod color;
pub mod config;
pub mod data;
pub mod output;
pub mod plot;
pub mod stats;
