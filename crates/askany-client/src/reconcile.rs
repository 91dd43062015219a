//! Question-list reconciliation and display ordering.
//!
//! Everything here is pure: no I/O, no clock, no shared state. The poll loop
//! calls [`merge`] on each tick and persists the result afterwards.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use askany_shared::{ClientId, Question, QuestionId, SessionMode};

/// Merge a freshly fetched server list with the locally cached list.
///
/// - every server question is kept, in server order, with server fields;
/// - cached questions owned by `self_id` that the server did not return are
///   appended (a submit can race the next poll);
/// - other cached questions are dropped;
/// - every question owned by `self_id` is marked `is_mine` and a missing
///   spotlight flag becomes `false`.
///
/// Servers may strip `clientId` from responses, so ownership of a server
/// question falls back to the cached copy with the same id.
pub fn merge(server: &[Question], local: &[Question], self_id: &ClientId) -> Vec<Question> {
    let server_ids: HashSet<&QuestionId> = server.iter().map(|q| &q.id).collect();

    let mut local_by_id: HashMap<&QuestionId, &Question> = HashMap::with_capacity(local.len());
    for q in local {
        local_by_id.entry(&q.id).or_insert(q);
    }

    let mut merged: Vec<Question> = server
        .iter()
        .map(|q| {
            let mut q = q.clone();
            if q.client_id.is_none() {
                q.client_id = local_by_id.get(&q.id).and_then(|c| c.client_id.clone());
            }
            q
        })
        .collect();

    let mut appended: HashSet<&QuestionId> = HashSet::new();
    for q in local {
        if q.is_owned_by(self_id) && !server_ids.contains(&q.id) && appended.insert(&q.id) {
            merged.push(q.clone());
        }
    }

    for q in &mut merged {
        stamp_ownership(q, self_id);
    }

    merged
}

/// Set `is_mine` from the owning client and normalize the spotlight flag of
/// own questions.
pub fn stamp_ownership(q: &mut Question, self_id: &ClientId) {
    q.is_mine = q.is_owned_by(self_id);
    if q.is_mine && q.is_spotlighted.is_none() {
        q.is_spotlighted = Some(false);
    }
}

/// Stable sort by descending upvote count.
pub fn sort_by_upvotes(questions: &mut [Question]) {
    questions.sort_by(|a, b| b.upvote_count.cmp(&a.upvote_count));
}

/// Replace the question with the same id. Returns `false` if none matched.
pub fn replace_by_id(questions: &mut [Question], updated: Question) -> bool {
    match questions.iter_mut().find(|q| q.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

/// Who is looking at the list and in which session mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewMode {
    pub is_owner: bool,
    pub mode: SessionMode,
}

impl ViewMode {
    fn owner_spotlight(&self) -> bool {
        self.is_owner && self.mode == SessionMode::Spotlight
    }

    fn participant_spotlight(&self) -> bool {
        !self.is_owner && self.mode == SessionMode::Spotlight
    }
}

/// The display partitions of a question list, each sorted by upvotes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Arrangement {
    /// Unanswered spotlighted questions. Only filled for an owner in
    /// spotlight mode.
    pub spotlighted: Vec<Question>,
    pub unanswered: Vec<Question>,
    pub answered: Vec<Question>,
}

impl Arrangement {
    pub fn len(&self) -> usize {
        self.spotlighted.len() + self.unanswered.len() + self.answered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All questions in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.spotlighted
            .iter()
            .chain(self.unanswered.iter())
            .chain(self.answered.iter())
    }
}

/// Partition and order questions for display.
///
/// Unanswered questions come before answered ones. An owner in spotlight mode
/// gets the unanswered questions split into spotlighted and the rest. A
/// participant in spotlight mode only sees spotlighted questions.
pub fn arrange(questions: &[Question], view: ViewMode) -> Arrangement {
    let mut arrangement = Arrangement::default();

    for q in questions {
        if view.participant_spotlight() && !q.spotlighted() {
            continue;
        }

        let bucket = if q.is_answered {
            &mut arrangement.answered
        } else if view.owner_spotlight() && q.spotlighted() {
            &mut arrangement.spotlighted
        } else {
            &mut arrangement.unanswered
        };
        bucket.push(q.clone());
    }

    sort_by_upvotes(&mut arrangement.spotlighted);
    sort_by_upvotes(&mut arrangement.unanswered);
    sort_by_upvotes(&mut arrangement.answered);
    arrangement
}
