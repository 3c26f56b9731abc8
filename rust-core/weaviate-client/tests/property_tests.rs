// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for search result reconstruction

use proptest::prelude::*;
use uuid::Uuid;
use weaviate_client::proto::{ResultAdditionalProps, ResultProperties, SearchReply, SearchResult};
use weaviate_client::{build_result_tree, MetadataQuery};
use weaviate_model::Metadata;

fn arb_metadata_query() -> impl Strategy<Value = MetadataQuery> {
    prop::array::uniform8(any::<bool>()).prop_map(|flags| MetadataQuery {
        uuid: flags[0],
        vector: flags[1],
        creation_time_unix: flags[2],
        last_update_time_unix: flags[3],
        distance: flags[4],
        certainty: flags[5],
        score: flags[6],
        explain_score: flags[7],
    })
}

fn arb_returned() -> impl Strategy<Value = ResultAdditionalProps> {
    (prop::array::uniform6(any::<bool>()), any::<i64>(), -1.0f32..1.0).prop_map(|(present, time, value)| {
        ResultAdditionalProps {
            id: Uuid::new_v4().to_string(),
            vector: vec![value],
            creation_time_unix: time,
            creation_time_unix_present: present[0],
            last_update_time_unix: time,
            last_update_time_unix_present: present[1],
            distance: value,
            distance_present: present[2],
            certainty: value,
            certainty_present: present[3],
            score: value,
            score_present: present[4],
            explain_score: "explained".into(),
            explain_score_present: present[5],
        }
    })
}

proptest! {
    #[test]
    fn test_metadata_fields_require_request_and_presence(
        request in arb_metadata_query(),
        returned in arb_returned(),
        rows in 0usize..4,
    ) {
        let reply = SearchReply {
            results: (0..rows)
                .map(|_| SearchResult {
                    properties: Some(ResultProperties::default()),
                    additional_properties: Some(returned.clone()),
                })
                .collect(),
            took: 0.0,
        };

        let results = build_result_tree(reply, &[], Some(request));
        prop_assert_eq!(results.len(), rows);
        for row in results {
            let m = row.metadata;
            prop_assert_eq!(m.uuid.is_some(), request.uuid);
            prop_assert_eq!(m.vector.is_some(), request.vector);
            prop_assert_eq!(
                m.creation_time_unix.is_some(),
                request.creation_time_unix && returned.creation_time_unix_present
            );
            prop_assert_eq!(
                m.last_update_time_unix.is_some(),
                request.last_update_time_unix && returned.last_update_time_unix_present
            );
            prop_assert_eq!(m.distance.is_some(), request.distance && returned.distance_present);
            prop_assert_eq!(m.certainty.is_some(), request.certainty && returned.certainty_present);
            prop_assert_eq!(m.score.is_some(), request.score && returned.score_present);
            prop_assert_eq!(m.explain_score.is_some(), request.explain_score && returned.explain_score_present);
        }
    }

    #[test]
    fn test_unrequested_metadata_is_always_empty(returned in arb_returned()) {
        let reply = SearchReply {
            results: vec![SearchResult {
                properties: None,
                additional_properties: Some(returned),
            }],
            took: 0.0,
        };
        let results = build_result_tree(reply, &[], None);
        prop_assert_eq!(results[0].metadata.clone(), Metadata::default());
    }
}
