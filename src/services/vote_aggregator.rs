//! Read-time vote aggregation. Tallies are always derived from the vote rows
//! themselves; nothing here is persisted.

use uuid::Uuid;

use crate::models::{Comment, CommentView, CommentVote, VoteSummary, VoteTally};

pub fn tally<'a, I>(votes: I) -> VoteTally
where
    I: IntoIterator<Item = &'a CommentVote>,
{
    votes
        .into_iter()
        .fold(VoteTally::default(), |mut acc, vote| {
            if vote.is_upvote {
                acc.upvotes += 1;
            } else {
                acc.downvotes += 1;
            }
            acc
        })
}

pub fn user_vote<'a, I>(votes: I, viewer_id: Option<Uuid>) -> Option<bool>
where
    I: IntoIterator<Item = &'a CommentVote>,
{
    let viewer_id = viewer_id?;
    votes
        .into_iter()
        .find(|vote| vote.user_id == viewer_id)
        .map(|vote| vote.is_upvote)
}

pub fn summarize(tally: VoteTally, user_vote: Option<bool>) -> VoteSummary {
    VoteSummary {
        upvotes: tally.upvotes,
        downvotes: tally.downvotes,
        user_vote,
    }
}

/// Joins a stored comment with its author and live vote state.
pub fn enrich(
    comment: Comment,
    author_email: Option<String>,
    votes: &[&CommentVote],
    viewer_id: Option<Uuid>,
) -> CommentView {
    let VoteTally { upvotes, downvotes } = tally(votes.iter().copied());
    let user_vote = user_vote(votes.iter().copied(), viewer_id);

    CommentView {
        id: comment.id,
        content_id: comment.content_id,
        author_id: comment.author_id,
        content: comment.content,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
        parent_id: comment.parent_id,
        is_approved: comment.is_approved,
        author_email,
        upvotes,
        downvotes,
        user_vote,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn vote(comment_id: Uuid, user_id: Uuid, is_upvote: bool) -> CommentVote {
        CommentVote {
            comment_id,
            user_id,
            is_upvote,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tally_partitions_by_direction() {
        let comment_id = Uuid::new_v4();
        let votes = vec![
            vote(comment_id, Uuid::new_v4(), true),
            vote(comment_id, Uuid::new_v4(), true),
            vote(comment_id, Uuid::new_v4(), false),
        ];

        assert_eq!(
            tally(&votes),
            VoteTally {
                upvotes: 2,
                downvotes: 1
            }
        );
        assert_eq!(tally(&Vec::<CommentVote>::new()), VoteTally::default());
    }

    #[test]
    fn user_vote_requires_a_viewer() {
        let comment_id = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let votes = vec![vote(comment_id, viewer, false)];

        assert_eq!(user_vote(&votes, Some(viewer)), Some(false));
        assert_eq!(user_vote(&votes, Some(Uuid::new_v4())), None);
        assert_eq!(user_vote(&votes, None), None);
    }

    #[test]
    fn enrich_carries_comment_fields_through() {
        let now = Utc::now();
        let viewer = Uuid::new_v4();
        let comment = Comment {
            id: Uuid::new_v4(),
            content_id: "5114".to_string(),
            author_id: Uuid::new_v4(),
            content: "Best ending of the season".to_string(),
            parent_id: None,
            is_approved: true,
            created_at: now,
            updated_at: now,
        };
        let up = vote(comment.id, viewer, true);

        let view = enrich(
            comment.clone(),
            Some("fan@example.com".to_string()),
            &[&up],
            Some(viewer),
        );

        assert_eq!(view.id, comment.id);
        assert_eq!(view.content, comment.content);
        assert_eq!(view.author_email.as_deref(), Some("fan@example.com"));
        assert_eq!((view.upvotes, view.downvotes), (1, 0));
        assert_eq!(view.user_vote, Some(true));
    }
}
