use std::collections::HashMap;
use crate::models::{Participant, RankedParticipant, Vote};

/// Returns `false` when `voter_name` already appears on one of `existing_votes`.
///
/// Names are compared exactly as submitted: no trimming, no case folding.
pub fn can_vote(voter_name: &str, existing_votes: &[Vote]) -> bool {
    !existing_votes.iter().any(|vote| vote.voter_name == voter_name)
}

/// Number of votes per participant id. Every vote is counted, including those
/// pointing at ids that are not registered; callers look counts up by id.
pub fn count_votes(votes: &[Vote]) -> HashMap<&str, u32> {
    votes.iter().fold(HashMap::new(), |mut counts, vote| {
        *counts.entry(vote.voted_for.as_str()).or_insert(0) += 1;
        counts
    })
}

/// Orders participants by vote count and assigns competition ranks ("1224").
///
/// Participants with equal counts keep their input order and share a rank; the
/// next lower count takes its 1-based position, so `[5, 5, 3]` ranks as
/// `[1, 1, 3]`. Votes for unknown participants are ignored.
pub fn rank(participants: &[Participant], votes: &[Vote]) -> Vec<RankedParticipant> {
    let counts = count_votes(votes);

    let mut ranked: Vec<RankedParticipant> = participants.iter()
        .map(|participant| RankedParticipant {
            vote_count: counts.get(participant.id.as_str()).copied().unwrap_or(0),
            participant: participant.clone(),
            rank: 0,
        })
        .collect();

    // stable: ties stay in store order
    ranked.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));

    let mut current_rank = 1;
    let mut previous_count = None;
    for (idx, entry) in ranked.iter_mut().enumerate() {
        if previous_count.map_or(false, |count| entry.vote_count < count) {
            current_rank = idx as u32 + 1;
        }
        entry.rank = current_rank;
        previous_count = Some(entry.vote_count);
    }

    ranked
}
