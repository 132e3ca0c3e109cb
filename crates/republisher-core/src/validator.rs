use crate::common::{ContentId, Error};

/// Keeps the entries that are canonical UUIDs, in their original order.
///
/// Every rejected entry is logged at `warn` together with the parse error.
/// The result is built fresh; the input is consumed, never edited in place.
pub fn validate_identifiers<I>(candidates: I) -> Vec<ContentId>
where
    I: IntoIterator<Item = String>,
{
    candidates
        .into_iter()
        .filter_map(|candidate| match ContentId::try_from(candidate) {
            Ok(id) => Some(id),
            Err(Error::InvalidIdentifier { value, source }) => {
                tracing::warn!("Skipping UUID: [{value}]. Error: [{source}]");
                None
            }
            Err(err) => {
                tracing::warn!("Skipping UUID. Error: [{err}]");
                None
            }
        })
        .collect()
}
