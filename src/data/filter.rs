use serde::{Deserialize, Serialize};

use super::model::{LabeledDatasets, ObservationTable};

// ---------------------------------------------------------------------------
// CCDF group selection
// ---------------------------------------------------------------------------

/// A named series on the combined CCDF chart: every dataset whose label
/// starts with `prefix` is a candidate, `label` is the legend text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcdfGroup {
    pub prefix: String,
    pub label: String,
}

impl CcdfGroup {
    pub fn new(prefix: &str, label: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            label: label.to_string(),
        }
    }
}

/// The four messaging-app traffic classes compared on the CCDF chart.
pub fn default_ccdf_groups() -> Vec<CcdfGroup> {
    vec![
        CcdfGroup::new("WhatsApp_text", "Text Group"),
        CcdfGroup::new("WhatsApp_photos", "Photos Group"),
        CcdfGroup::new("WhatsApp_audio", "Audio Group"),
        CcdfGroup::new("WhatsApp_videos", "Video Group"),
    ]
}

/// One CCDF group paired with the dataset that feeds it, if any.
#[derive(Debug, Clone, Copy)]
pub struct CcdfSelection<'a> {
    pub group: &'a CcdfGroup,
    pub dataset: Option<(&'a str, &'a ObservationTable)>,
}

/// Resolve each group to a dataset, preserving group order.
///
/// When several labels share a prefix the last one in label order wins.
pub fn select_ccdf_inputs<'a>(
    datasets: &'a LabeledDatasets,
    groups: &'a [CcdfGroup],
) -> Vec<CcdfSelection<'a>> {
    groups
        .iter()
        .map(|group| CcdfSelection {
            group,
            dataset: datasets
                .iter()
                .rev()
                .find(|(label, _)| label.starts_with(&group.prefix))
                .map(|(label, table)| (label.as_str(), table)),
        })
        .collect()
}
