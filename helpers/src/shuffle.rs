//! Random permutation of record values.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::Value;

/// Return the record's values in random order, as a sequence.
///
/// Mapping keys are dropped. With a seed the permutation is reproducible; the
/// seeded generator is private to the call. Scalars are returned unchanged.
pub fn shuffle(record: &Value, seed: Option<u64>) -> Value {
    match seed {
        Some(seed) => shuffle_with(record, &mut StdRng::seed_from_u64(seed)),
        None => shuffle_with(record, &mut rand::rng()),
    }
}

/// Shuffle using a caller-provided generator.
pub fn shuffle_with<R: Rng + ?Sized>(record: &Value, rng: &mut R) -> Value {
    let mut values: Vec<Value> = match record {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map.values().cloned().collect(),
        scalar => return scalar.clone(),
    };
    values.shuffle(rng);
    Value::Array(values)
}
