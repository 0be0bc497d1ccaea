// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Combination of the partial records fetched for one target.
use crate::{failure::Failure, record::Record};

/// Merges partial records for the same target into one record.
///
/// Parts are folded left to right with [`Record::merge`], so a later part
/// replaces any field an earlier part already set. The first failed part ends
/// the merge and is returned unchanged; because `parts` is consumed lazily, no
/// part after it is ever produced. Pass fetches as a lazy iterator to skip
/// optional add-ons once the base fetch has failed.
///
/// # Errors
///
/// Returns the first [`Failure`] among `parts`.
///
/// # Example
///
/// ```
/// use gitfo::{Record, merge};
///
/// let base = Record::new().with("name", "Hello-World",).with("stars", 1_i64,);
/// let update = Record::new().with("stars", 2_i64,);
/// let merged = merge([Ok(base,), Ok(update,)],).expect("no failures",);
/// assert_eq!(merged.keys().collect::<Vec<_,>>(), ["name", "stars"]);
/// ```
pub fn merge<I,>(parts: I,) -> Result<Record, Failure,>
where
    I: IntoIterator<Item = Result<Record, Failure,>,>,
{
    parts.into_iter().try_fold(Record::new(), |mut merged, part| {
        merged.merge(part?,);
        Ok(merged,)
    },)
}
