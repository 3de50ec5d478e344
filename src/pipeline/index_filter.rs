//! Label selection over a flattened mask

use std::collections::BTreeMap;

/// Linear indices whose label equals `target`, in ascending scan order
///
/// An absent label yields an empty vector, not an error.
#[must_use]
pub fn filter_indices(labels: &[u32], target: u32) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter_map(|(index, &label)| (label == target).then_some(index))
        .collect()
}

/// Number of pixels carrying `target`
#[must_use]
pub fn count_label(labels: &[u32], target: u32) -> usize {
    labels.iter().filter(|&&label| label == target).count()
}

/// Pixel count for every label present, ordered by label
#[must_use]
pub fn label_histogram(labels: &[u32]) -> BTreeMap<u32, usize> {
    let mut histogram = BTreeMap::new();
    for &label in labels {
        *histogram.entry(label).or_insert(0) += 1;
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_preserves_scan_order() {
        let labels = [0, 1, 1, 0, 2, 1];
        assert_eq!(filter_indices(&labels, 1), vec![1, 2, 5]);
        assert_eq!(filter_indices(&labels, 2), vec![4]);
    }

    #[test]
    fn test_absent_label_is_empty() {
        let labels = [0, 1, 2];
        assert!(filter_indices(&labels, 7).is_empty());
        assert!(filter_indices(&[], 0).is_empty());
    }

    #[test]
    fn test_result_never_longer_than_input() {
        let labels = [4u32; 16];
        let indices = filter_indices(&labels, 4);
        assert_eq!(indices.len(), labels.len());
        assert_eq!(indices, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_counts_and_histogram() {
        let labels = [3, 0, 3, 12, 3, 0];
        assert_eq!(count_label(&labels, 3), 3);
        assert_eq!(count_label(&labels, 5), 0);

        let histogram = label_histogram(&labels);
        assert_eq!(histogram.len(), 3);
        assert_eq!(histogram.get(&0), Some(&2));
        assert_eq!(histogram.get(&3), Some(&3));
        assert_eq!(histogram.get(&12), Some(&1));
        assert_eq!(histogram.keys().copied().collect::<Vec<_>>(), vec![0, 3, 12]);
    }
}
