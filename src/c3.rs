// Copyright 2024 - 2026 Martin Pool

//! C3 linearization, as used for MATLAB method resolution order.

/// Merge parent linearizations per the C3 rules.
///
/// `sequences` holds the MRO of every direct base followed by the list of
/// direct bases itself; elements are compared through `key`. Returns `None`
/// when the hierarchies are inconsistent and no valid linearization exists.
pub(crate) fn c3_merge<T: Clone>(
    sequences: Vec<Vec<T>>,
    key: impl Fn(&T) -> String,
) -> Option<Vec<T>> {
    let mut seqs: Vec<Vec<T>> = sequences.into_iter().filter(|s| !s.is_empty()).collect();
    let mut result: Vec<T> = Vec::new();
    while !seqs.is_empty() {
        // A good head appears in no other sequence's tail.
        let head = seqs
            .iter()
            .map(|seq| key(&seq[0]))
            .find(|candidate| {
                !seqs
                    .iter()
                    .any(|seq| seq[1..].iter().any(|item| key(item) == *candidate))
            })?;
        let chosen = seqs
            .iter()
            .find_map(|seq| (key(&seq[0]) == head).then(|| seq[0].clone()))
            .expect("head came from seqs");
        result.push(chosen);
        for seq in &mut seqs {
            seq.retain(|item| key(item) != head);
        }
        seqs.retain(|seq| !seq.is_empty());
    }
    Some(result)
}
