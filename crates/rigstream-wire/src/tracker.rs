//! Tracker-frame record carried in each frame body
//!
//! `{"animationValues":{"<attr>":<float>,...}}`

use rigstream_core::{RigError, RigResult, TrackerWeights};

use crate::codec::{deserialize, serialize};
use crate::field;
use crate::schema::{Field, Record};

/// One server update
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackerRecord {
    pub animation_values: TrackerWeights,
}

impl Record for TrackerRecord {
    const NAME: &'static str = "TrackerRecord";

    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<TrackerRecord>; 1] =
            [field!(TrackerRecord, "animationValues" => animation_values: TrackerWeights)];
        &FIELDS
    }
}

/// Decode a raw frame body into tracker weights
pub fn decode_tracker_frame(body: &[u8]) -> RigResult<TrackerWeights> {
    let text = std::str::from_utf8(body)
        .map_err(|e| RigError::MalformedRecord(format!("frame body is not UTF-8: {}", e)))?;
    let record: TrackerRecord = deserialize(text)?;
    Ok(record.animation_values)
}

/// Encode tracker weights as a frame body (used by capture servers and tests)
pub fn encode_tracker_frame(weights: &TrackerWeights) -> String {
    serialize(&TrackerRecord {
        animation_values: weights.clone(),
    })
}
