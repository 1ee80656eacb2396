use ndarray::Array2;
use std::collections::BTreeSet;

/// One-hot encoding of categorical columns.
///
/// Each input row holds one value per field. Every field contributes one
/// output column per distinct value it takes, in sorted order.
pub fn one_hot_encode<S: AsRef<str>>(rows: &[Vec<S>]) -> Array2<f64> {
    let n_fields = rows.iter().map(Vec::len).max().unwrap_or(0);

    let categories: Vec<Vec<&str>> = (0..n_fields)
        .map(|field| {
            rows.iter()
                .filter_map(|row| row.get(field).map(AsRef::as_ref))
                .collect::<BTreeSet<&str>>()
                .into_iter()
                .collect()
        })
        .collect();

    let width: usize = categories.iter().map(Vec::len).sum();
    let mut encoded = Array2::<f64>::zeros((rows.len(), width));

    for (i, row) in rows.iter().enumerate() {
        let mut offset = 0;
        for (field, values) in categories.iter().enumerate() {
            if let Some(value) = row.get(field) {
                if let Ok(pos) = values.binary_search(&value.as_ref()) {
                    encoded[[i, offset + pos]] = 1.0;
                }
            }
            offset += values.len();
        }
    }

    encoded
}
