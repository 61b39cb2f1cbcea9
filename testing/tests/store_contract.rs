//! Repository behaviour exercised through trait objects, the way the server
//! holds its stores.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use std::sync::Arc;

use proptest::prelude::*;
use yamdb_core::YamdbError;
use yamdb_core::catalog::{TitleFilter, TitlePatch, Taxonomy};
use yamdb_core::environment::Clock;
use yamdb_core::feedback::{NewComment, NewReview};
use yamdb_core::pagination::PageRequest;
use yamdb_core::rating::average_score;
use yamdb_core::repository::{CatalogRepository, FeedbackRepository, UserRepository};
use yamdb_core::role::Role;
use yamdb_testing::{InMemoryStore, fixtures, test_clock};

struct Stores {
    users: Arc<dyn UserRepository>,
    catalog: Arc<dyn CatalogRepository>,
    feedback: Arc<dyn FeedbackRepository>,
}

fn stores() -> Stores {
    let store = Arc::new(InMemoryStore::new());
    Stores {
        users: store.clone(),
        catalog: store.clone(),
        feedback: store,
    }
}

#[tokio::test]
async fn deleting_a_user_removes_their_feedback() {
    let s = stores();
    let title = fixtures::seed_title(s.catalog.as_ref(), "Andrei Rublev")
        .await
        .unwrap();
    let author = fixtures::seed_user(s.users.as_ref(), "critic", Role::User)
        .await
        .unwrap();
    let other = fixtures::seed_user(s.users.as_ref(), "reader", Role::User)
        .await
        .unwrap();

    let review = s
        .feedback
        .create_review(NewReview {
            title_id: title.id,
            author_id: author.id,
            text: "Long".to_string(),
            score: 9,
            pub_date: test_clock().now(),
        })
        .await
        .unwrap();
    let reply = s
        .feedback
        .create_comment(NewComment {
            review_id: review.id,
            author_id: other.id,
            text: "Agreed".to_string(),
            pub_date: test_clock().now(),
        })
        .await
        .unwrap();

    s.users.delete_user(author.id).await.unwrap();

    assert_eq!(s.feedback.get_review(title.id, review.id).await.unwrap(), None);
    assert_eq!(s.feedback.get_comment(review.id, reply.id).await.unwrap(), None);
    let title = s.catalog.get_title(title.id).await.unwrap().unwrap();
    assert_eq!(title.rating, None);
}

#[tokio::test]
async fn deleting_a_genre_keeps_its_titles() {
    let s = stores();
    let title = fixtures::seed_title(s.catalog.as_ref(), "Ivan's Childhood")
        .await
        .unwrap();
    s.catalog
        .delete_taxon(Taxonomy::Genre, "drama".to_string())
        .await
        .unwrap();
    let title = s.catalog.get_title(title.id).await.unwrap().unwrap();
    assert!(title.genres.is_empty());
}

#[tokio::test]
async fn title_filters_and_pages() {
    let s = stores();
    for name in ["Solaris", "Stalker", "Mirror"] {
        fixtures::seed_title(s.catalog.as_ref(), name).await.unwrap();
    }

    let filter = TitleFilter {
        name: Some("s".to_string()),
        genre: Some("drama".to_string()),
        ..TitleFilter::default()
    };
    let first = s
        .catalog
        .list_titles(filter.clone(), PageRequest::new(1, 1))
        .await
        .unwrap();
    assert_eq!(first.count, 2);
    assert_eq!(first.next, Some(2));
    assert_eq!(first.results[0].name, "Solaris");

    let err = s
        .catalog
        .list_titles(filter, PageRequest::new(3, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, YamdbError::NotFound { .. }));
}

#[tokio::test]
async fn renaming_a_title_to_a_taken_name_fails() {
    let s = stores();
    fixtures::seed_title(s.catalog.as_ref(), "Solaris").await.unwrap();
    let stalker = fixtures::seed_title(s.catalog.as_ref(), "Stalker").await.unwrap();

    let err = s
        .catalog
        .update_title(
            stalker.id,
            TitlePatch {
                name: Some("Solaris".to_string()),
                ..TitlePatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, YamdbError::Validation(ref e) if e.contains("name")));
    let unchanged = s.catalog.get_title(stalker.id).await.unwrap().unwrap();
    assert_eq!(unchanged.name, "Stalker");
}

proptest! {
    #[test]
    fn stored_rating_matches_average(scores in prop::collection::vec(1i32..=10, 0..8)) {
        let rating = tokio_test::block_on(async {
            let s = stores();
            let title = fixtures::seed_title(s.catalog.as_ref(), "Nostalghia").await.unwrap();
            for (i, score) in scores.iter().enumerate() {
                let user = fixtures::seed_user(s.users.as_ref(), &format!("u{i}"), Role::User)
                    .await
                    .unwrap();
                s.feedback
                    .create_review(NewReview {
                        title_id: title.id,
                        author_id: user.id,
                        text: "t".to_string(),
                        score: *score,
                        pub_date: test_clock().now(),
                    })
                    .await
                    .unwrap();
            }
            s.catalog.get_title(title.id).await.unwrap().unwrap().rating
        });
        prop_assert_eq!(rating, average_score(scores));
    }
}
