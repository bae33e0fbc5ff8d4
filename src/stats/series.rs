use crate::data::model::ObservationTable;

/// `(Time, Length)` pairs for the packet-length bar chart, in table order.
pub fn packet_length_series(table: &ObservationTable) -> Vec<(f64, u32)> {
    table
        .times()
        .iter()
        .copied()
        .zip(table.lengths().iter().copied())
        .collect()
}
