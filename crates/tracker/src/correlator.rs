//! Event correlation: picking events of one kind out of a block's batch.

use zkv_types::{ChainEvent, EventField, EventSignature};

/// Fields of every event matching `signature`, in batch order.
pub fn matching(
    events: &[ChainEvent],
    signature: EventSignature,
) -> impl Iterator<Item = &[EventField]> {
    events
        .iter()
        .filter(move |event| event.is(signature))
        .map(|event| event.fields.as_slice())
}

/// Call `callback` with the fields of every event matching `signature`.
///
/// Visits all matches in batch order; a block may carry more than one.
pub fn for_each_matching<F>(events: &[ChainEvent], signature: EventSignature, mut callback: F)
where
    F: FnMut(&[EventField]),
{
    for fields in matching(events, signature) {
        callback(fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkv_test_helpers::fixtures;

    #[test]
    fn test_visits_every_match_in_order() {
        let mut events = fixtures::noise();
        events.push(fixtures::new_element(fixtures::hash(1), 10));
        events.push(fixtures::new_attestation(9, fixtures::hash(2)));
        events.push(fixtures::new_element(fixtures::hash(3), 11));

        let mut seen = Vec::new();
        for_each_matching(&events, EventSignature::NEW_ELEMENT, |fields| {
            seen.push(fields[1].to_string());
        });

        assert_eq!(seen, vec!["10", "11"]);
    }

    #[test]
    fn test_no_match() {
        let events = fixtures::noise();
        let mut calls = 0;
        for_each_matching(&events, EventSignature::NEW_ATTESTATION, |_| calls += 1);
        assert_eq!(calls, 0);
        assert_eq!(matching(&[], EventSignature::NEW_ELEMENT).count(), 0);
    }
}
